//! Host runtime capabilities.
//!
//! The worker never schedules itself. The host decides when install,
//! activate, fetch and message run, and exposes the two control levers the
//! worker may pull: skip the waiting phase, and claim already-open pages.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// Lifecycle state of this worker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Script loaded, no lifecycle event seen yet.
    #[default]
    Parsed,
    Installing,
    /// Installed and waiting for activation.
    Installed,
    Activating,
    /// Active and eligible to control pages.
    Activated,
    /// Install failed or replaced.
    Redundant,
}

/// Capabilities the host runtime grants the worker.
pub trait HostRuntime: Send + Sync {
    /// Become active without waiting for old instances' pages to close.
    fn skip_waiting(&self);

    /// Take control of pages that are already open.
    fn claim_clients(&self);

    /// Observe lifecycle transitions.
    fn state_changed(&self, _state: WorkerState) {}
}

/// In-process host that records what the worker asked for.
#[derive(Debug, Default)]
pub struct WorkerHost {
    state: Mutex<WorkerState>,
    skip_waiting: AtomicBool,
    clients_claimed: AtomicBool,
}

impl WorkerHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::Acquire)
    }

    pub fn clients_claimed(&self) -> bool {
        self.clients_claimed.load(Ordering::Acquire)
    }
}

impl HostRuntime for WorkerHost {
    fn skip_waiting(&self) {
        tracing::debug!("skip waiting requested");
        self.skip_waiting.store(true, Ordering::Release);
    }

    fn claim_clients(&self) {
        tracing::debug!("claiming open clients");
        self.clients_claimed.store(true, Ordering::Release);
    }

    fn state_changed(&self, state: WorkerState) {
        let mut current = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        tracing::info!(from = ?*current, to = ?state, "worker state changed");
        *current = state;
    }
}
