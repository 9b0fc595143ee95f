//! Application configuration with layered loading.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. TOML config file (if SHELLKEEP_CONFIG_FILE set)
//! 3. Environment variables (SHELLKEEP_*)

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::key::Origin;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database holding the cache regions.
    ///
    /// Set via SHELLKEEP_DB_PATH.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin the worker is scoped to, e.g. `https://app.example.com`.
    ///
    /// Set via SHELLKEEP_ORIGIN.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Deployment file with the resource manifest and the shell list.
    ///
    /// Set via SHELLKEEP_MANIFEST_PATH. Required to start the server.
    #[serde(default)]
    pub manifest_path: Option<PathBuf>,

    /// User-Agent string for network fetches.
    ///
    /// Set via SHELLKEEP_USER_AGENT.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Largest response body accepted from the network.
    ///
    /// Set via SHELLKEEP_MAX_BYTES.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Redirects followed per fetch.
    ///
    /// Set via SHELLKEEP_MAX_REDIRECTS.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./shellkeep-cache.sqlite")
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_user_agent() -> String {
    "shellkeep/0.1".into()
}

fn default_max_bytes() -> usize {
    64 * 1024 * 1024
}

fn default_max_redirects() -> usize {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: default_origin(),
            manifest_path: None,
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file or environment cannot be
    /// parsed, or if validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SHELLKEEP_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SHELLKEEP_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into()),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// The configured origin in canonical form.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin does not parse.
    pub fn origin(&self) -> Result<Origin, ConfigError> {
        Origin::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })
    }

    /// Deployment file path, required only when a worker is built.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no manifest path is set.
    pub fn require_manifest_path(&self) -> Result<&Path, ConfigError> {
        self.manifest_path.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "manifest_path".into(),
            hint: "Set SHELLKEEP_MANIFEST_PATH to the deployment JSON file".into(),
        })
    }
}
