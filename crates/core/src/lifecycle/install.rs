//! Install: stage the application shell.

use super::Worker;
use crate::Error;
use crate::host::WorkerState;
use crate::network::CacheMode;
use crate::store::Region;

impl Worker {
    /// Handle the host's install event.
    ///
    /// Asks the host to skip waiting right away, then fetches every shell
    /// resource with intermediate caches bypassed and stages the responses.
    /// Any failed or non-ok fetch fails the install and nothing is staged;
    /// the Content and ManifestRecord regions are never touched here.
    pub async fn install(&self) -> Result<(), Error> {
        self.host.skip_waiting();
        self.host.state_changed(WorkerState::Installing);

        match self.stage_shell().await {
            Ok(staged) => {
                tracing::info!(staged, digest = %self.manifest.digest(), "application shell staged");
                self.host.state_changed(WorkerState::Installed);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "install failed; shell not staged");
                self.host.state_changed(WorkerState::Redundant);
                Err(e)
            }
        }
    }

    async fn stage_shell(&self) -> Result<usize, Error> {
        let responses = self.fetch_all(self.shell.paths(), CacheMode::Reload).await?;

        self.store.open(Region::Staging).await?;
        for (key, response) in &responses {
            self.store.put(Region::Staging, key, response).await?;
        }

        Ok(responses.len())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;

    #[tokio::test]
    async fn test_install_stages_shell() {
        let fx = Fixture::new();
        fx.worker.install().await.unwrap();

        assert_eq!(fx.keys(Region::Staging).await, vec!["index.html", "main.dart.js"]);
        assert!(fx.keys(Region::Content).await.is_empty());
        assert_eq!(fx.body(Region::Staging, "main.dart.js").await.unwrap(), body_for("main.dart.js", "m1"));
    }

    #[tokio::test]
    async fn test_install_skips_waiting_and_reports_state() {
        let fx = Fixture::new();
        fx.worker.install().await.unwrap();

        assert!(fx.host.skip_waiting_requested());
        assert_eq!(fx.host.state(), WorkerState::Installed);
    }

    #[tokio::test]
    async fn test_install_bypasses_http_cache() {
        let fx = Fixture::new();
        fx.worker.install().await.unwrap();

        let requests = fx.network.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.cache == CacheMode::Reload));
    }

    #[tokio::test]
    async fn test_install_network_failure_stages_nothing() {
        let fx = Fixture::new();
        fx.network.unreachable("index.html");

        let result = fx.worker.install().await;
        assert!(matches!(result, Err(Error::Network(_))));
        assert!(fx.keys(Region::Staging).await.is_empty());
        assert_eq!(fx.host.state(), WorkerState::Redundant);
    }

    #[tokio::test]
    async fn test_install_non_ok_fails() {
        let fx = Fixture::new();
        fx.network.serve_status("main.dart.js", 500);

        let result = fx.worker.install().await;
        assert!(matches!(result, Err(Error::HttpError(_))));
        assert!(fx.keys(Region::Staging).await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_install_leaves_prior_caches() {
        let fx = Fixture::new();
        fx.worker.install().await.unwrap();
        fx.worker.activate().await;
        let content = fx.keys(Region::Content).await;
        let record = fx.keys(Region::ManifestRecord).await;

        let next = fx.upgrade(&[("index.html", "r2"), ("main.dart.js", "m2")], &["main.dart.js"]);
        fx.network.set_offline(true);
        assert!(next.install().await.is_err());

        assert_eq!(fx.keys(Region::Content).await, content);
        assert_eq!(fx.keys(Region::ManifestRecord).await, record);
    }
}
