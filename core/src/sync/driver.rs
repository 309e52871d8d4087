//! The outer retry loop around [`sync_tree`].
//!
//! # Lifecycle
//!
//! 1. `Syncing`: open a fresh session, run one full pass, close the session.
//! 2. `Backoff`: sleep for the retry interval after a failed pass, or for
//!    the poll interval after a successful one.
//! 3. Back to `Syncing`. There is no terminal state.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::errors::SyncError;
use crate::files::{Connector, RemoteSession};

use super::engine::sync_tree;
use super::{PassReport, SyncOptions};

/// Wait after a failed pass before reconnecting.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(60);
/// Wait after a successful pass before walking the tree again.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Where the driver loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Syncing,
    Backoff(Duration),
}

/// Runs sync passes forever against sessions produced by a [`Connector`].
pub struct SyncDriver<C: Connector> {
    connector: C,
    remote_root: String,
    local_root: PathBuf,
    options: SyncOptions,
    retry_interval: Duration,
    poll_interval: Duration,
}

impl<C: Connector> SyncDriver<C> {
    pub fn new(connector: C, remote_root: impl Into<String>, local_root: impl Into<PathBuf>) -> Self {
        Self {
            connector,
            remote_root: remote_root.into(),
            local_root: local_root.into(),
            options: SyncOptions::default(),
            retry_interval: DEFAULT_RETRY_INTERVAL,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Connect, run one pass, and close the session.
    ///
    /// The session is closed whether or not the pass succeeded. A failure
    /// to close is logged and does not change the result.
    pub fn attempt(&self) -> Result<PassReport, SyncError> {
        let mut session = self.connector.connect()?;
        info!("SFTP connection established to {}", self.connector.describe());

        let result = sync_tree(
            &mut session,
            &self.remote_root,
            &self.local_root,
            &self.options,
        );

        match session.close() {
            Ok(()) => info!("SFTP connection closed"),
            Err(e) => warn!("Failed to close SFTP connection: {e}"),
        }
        result
    }

    /// Advance the state machine by one step.
    ///
    /// `sleep` is called with the backoff duration when leaving `Backoff`.
    pub fn step(&self, state: DriverState, sleep: &mut impl FnMut(Duration)) -> DriverState {
        match state {
            DriverState::Syncing => self.next_state(&self.attempt()),
            DriverState::Backoff(wait) => {
                sleep(wait);
                DriverState::Syncing
            }
        }
    }

    /// The state following a finished attempt.
    pub fn next_state(&self, result: &Result<PassReport, SyncError>) -> DriverState {
        match result {
            Ok(report) => {
                info!("Sync pass complete: {report}");
                DriverState::Backoff(self.poll_interval)
            }
            Err(e) => {
                error!("Sync pass failed: {e}");
                info!("Retrying in {} seconds...", self.retry_interval.as_secs());
                DriverState::Backoff(self.retry_interval)
            }
        }
    }

    /// Loop forever. Only external termination stops the process.
    pub fn run(self) -> ! {
        info!(
            "Mirroring {}:{} into {}",
            self.connector.describe(),
            self.remote_root,
            self.local_root.display()
        );
        let mut state = DriverState::Syncing;
        let mut sleep = std::thread::sleep;
        loop {
            state = self.step(state, &mut sleep);
        }
    }
}
