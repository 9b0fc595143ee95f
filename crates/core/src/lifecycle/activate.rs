//! Activate: reconcile the content region against the new manifest.
//!
//! 1. Open Content, Staging and ManifestRecord.
//! 2. Read the previously activated manifest.
//! 3. Without one, rebuild Content from scratch. With one, evict every
//!    Content entry whose path left the manifest or whose fingerprint changed.
//! 4. Copy Staging over Content (shell files win), drop Staging, record the
//!    new manifest and claim open pages.
//!
//! Any failure resets all three regions. The cache contents cannot be
//! trusted after a partial run, and an empty cache is always safe.

use futures_util::future::try_join_all;
use serde::Serialize;

use super::Worker;
use crate::Error;
use crate::host::WorkerState;
use crate::manifest::Manifest;
use crate::store::{CachedResponse, MANIFEST_KEY, Region};

/// Which reconciliation path an activate took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivateKind {
    /// No recorded manifest; Content was rebuilt from Staging.
    Fresh,
    /// Upgraded from a recorded manifest.
    Upgrade,
    /// Reconciliation failed and every region was deleted.
    RolledBack,
}

/// Outcome of one activate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct ActivateReport {
    pub kind: ActivateKind,
    /// Content keys evicted as stale or changed.
    pub evicted: Vec<String>,
    /// Content entries reused from the previous version.
    pub retained: usize,
    /// Entries copied from Staging into Content.
    pub migrated: usize,
    pub error: Option<String>,
}

impl ActivateReport {
    fn rolled_back(error: &Error) -> Self {
        Self {
            kind: ActivateKind::RolledBack,
            evicted: Vec::new(),
            retained: 0,
            migrated: 0,
            error: Some(error.to_string()),
        }
    }
}

impl Worker {
    /// Handle the host's activate event.
    ///
    /// Never fails: a reconciliation error is logged, the regions are reset
    /// and the report says so. The host must not be left waiting.
    pub async fn activate(&self) -> ActivateReport {
        self.host.state_changed(WorkerState::Activating);

        let report = match self.reconcile().await {
            Ok(report) => {
                tracing::info!(
                    kind = ?report.kind,
                    evicted = report.evicted.len(),
                    retained = report.retained,
                    migrated = report.migrated,
                    digest = %self.manifest.digest(),
                    "cache reconciled"
                );
                report
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to upgrade worker cache; resetting all regions");
                self.reset_regions().await;
                ActivateReport::rolled_back(&e)
            }
        };

        self.host.state_changed(WorkerState::Activated);
        report
    }

    async fn reconcile(&self) -> Result<ActivateReport, Error> {
        for region in Region::ALL {
            self.store.open(region).await?;
        }

        let previous = match self.store.get(Region::ManifestRecord, MANIFEST_KEY).await? {
            Some(record) => Some(Manifest::from_json(&record.body)?),
            None => None,
        };

        let (kind, evicted, retained) = match previous {
            None => {
                self.store.delete_region(Region::Content).await?;
                self.store.open(Region::Content).await?;
                (ActivateKind::Fresh, Vec::new(), 0)
            }
            Some(previous) => {
                let (evicted, retained) = self.evict_stale(&previous).await?;
                (ActivateKind::Upgrade, evicted, retained)
            }
        };

        let migrated = self.migrate_staging().await?;
        self.store.delete_region(Region::Staging).await?;
        self.record_manifest().await?;
        self.host.claim_clients();

        Ok(ActivateReport { kind, evicted, retained, migrated, error: None })
    }

    /// Delete Content entries the new manifest no longer vouches for.
    ///
    /// Deletes on distinct keys are independent and issued together.
    async fn evict_stale(&self, previous: &Manifest) -> Result<(Vec<String>, usize), Error> {
        let keys = self.store.keys(Region::Content).await?;
        let (stale, kept): (Vec<String>, Vec<String>) = keys
            .into_iter()
            .partition(|key| self.manifest.is_stale(previous, &self.origin.stored_key(key)));

        try_join_all(stale.iter().map(|key| self.store.delete(Region::Content, key))).await?;

        for key in &stale {
            tracing::debug!(key = %key, "evicted stale content");
        }

        Ok((stale, kept.len()))
    }

    async fn migrate_staging(&self) -> Result<usize, Error> {
        let mut migrated = 0;
        for key in self.store.keys(Region::Staging).await? {
            if let Some(response) = self.store.get(Region::Staging, &key).await? {
                self.store.put(Region::Content, &key, &response).await?;
                migrated += 1;
            }
        }
        Ok(migrated)
    }

    async fn record_manifest(&self) -> Result<(), Error> {
        let record = CachedResponse::new(200, self.manifest.to_json()?).with_header("content-type", "application/json");
        self.store.put(Region::ManifestRecord, MANIFEST_KEY, &record).await
    }

    async fn reset_regions(&self) {
        for region in Region::ALL {
            if let Err(e) = self.store.delete_region(region).await {
                tracing::warn!(region = %region, error = %e, "failed to delete region during reset");
            }
        }
    }
}
