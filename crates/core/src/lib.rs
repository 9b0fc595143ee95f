//! Core of shellkeep, a cache lifecycle reconciler for Flutter web app shells.
//!
//! This crate provides:
//! - The resource manifest and request-key normalization
//! - Named cache regions over an in-memory or SQLite backend
//! - The worker lifecycle: install, activate, fetch interception, messages
//! - Unified error types and layered configuration

pub mod config;
pub mod error;
pub mod host;
pub mod key;
pub mod lifecycle;
pub mod manifest;
pub mod network;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use host::{HostRuntime, WorkerHost, WorkerState};
pub use key::Origin;
pub use lifecycle::{
    ActivateKind, ActivateReport, ControlMessage, FetchOutcome, ResponseSource, Worker, WorkerStatus,
};
pub use manifest::{AppShell, Deployment, Manifest};
pub use network::{CacheMode, FetchRequest, Fetcher};
pub use store::{CacheStore, CachedResponse, MemoryStore, Region, SqliteStore};
