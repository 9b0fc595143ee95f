//! Page → worker control channel.

use std::collections::HashSet;
use std::str::FromStr;

use tokio::task::JoinHandle;

use super::Worker;
use crate::Error;
use crate::network::CacheMode;
use crate::store::Region;

/// Commands a hosting page may post to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    /// Activate immediately; the page reloads itself to benefit.
    SkipWaiting,
    /// Warm Content with every manifest resource it is missing.
    DownloadOffline,
}

impl FromStr for ControlMessage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skipWaiting" => Ok(ControlMessage::SkipWaiting),
            "downloadOffline" => Ok(ControlMessage::DownloadOffline),
            other => Err(Error::InvalidInput(format!("unrecognized control message: {other}"))),
        }
    }
}

impl Worker {
    /// Handle a message posted by a page.
    ///
    /// Fire-and-forget: `downloadOffline` runs on a spawned task whose handle
    /// is returned so the host can keep the event open until it finishes.
    /// Unrecognized messages are ignored.
    ///
    /// # Panics
    ///
    /// `downloadOffline` spawns onto the current Tokio runtime and panics if
    /// called outside one.
    pub fn on_message(&self, data: &str) -> Option<JoinHandle<Result<usize, Error>>> {
        match data.parse::<ControlMessage>() {
            Ok(ControlMessage::SkipWaiting) => {
                self.host.skip_waiting();
                None
            }
            Ok(ControlMessage::DownloadOffline) => {
                let worker = self.clone();
                Some(tokio::spawn(async move {
                    let result = worker.download_offline().await;
                    if let Err(e) = &result {
                        tracing::warn!(error = %e, "offline download failed");
                    }
                    result
                }))
            }
            Err(e) => {
                tracing::debug!(error = %e, "ignoring message");
                None
            }
        }
    }

    /// Fetch and store every manifest resource not yet in Content.
    ///
    /// All-or-nothing: every fetch must come back ok before anything is
    /// written. Returns the number of resources stored.
    pub async fn download_offline(&self) -> Result<usize, Error> {
        let present: HashSet<String> = self
            .store
            .keys(Region::Content)
            .await?
            .iter()
            .map(|key| self.origin.stored_key(key))
            .collect();

        let missing: Vec<String> = self
            .manifest
            .paths()
            .filter(|path| !present.contains(*path))
            .map(str::to_string)
            .collect();

        if missing.is_empty() {
            tracing::debug!("content already complete");
            return Ok(0);
        }

        let responses = self.fetch_all(&missing, CacheMode::Default).await?;
        for (key, response) in &responses {
            self.store.put(Region::Content, key, response).await?;
        }

        tracing::info!(stored = responses.len(), "offline download complete");
        Ok(responses.len())
    }
}
