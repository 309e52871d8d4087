//! Incremental one-way mirroring of a remote tree.
//!
//! [`engine`] performs a single pass; [`driver`] repeats passes forever,
//! backing off after failures.

pub mod driver;
pub mod engine;

use std::fmt;

pub use driver::{DriverState, SyncDriver};
pub use engine::{sync_file, sync_tree};

/// Tunables for the file sync decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Allowed difference between local and remote modification times.
    /// Zero requires an exact match.
    pub mtime_tolerance_secs: u64,
}

/// What happened to a single remote file during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Local copy already had the remote size and modification time.
    Skipped,
    /// The file was transferred; carries the number of bytes written.
    Downloaded(u64),
}

/// Counters collected over one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub directories: u64,
    pub downloaded: u64,
    pub skipped: u64,
    pub failed: u64,
    pub bytes: u64,
}

impl PassReport {
    pub(crate) fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Skipped => self.skipped += 1,
            FileOutcome::Downloaded(bytes) => {
                self.downloaded += 1;
                self.bytes += bytes;
            }
        }
    }

    /// Whether every file visited in the pass is now in sync.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} directories, {} downloaded ({} bytes), {} up to date, {} failed",
            self.directories, self.downloaded, self.bytes, self.skipped, self.failed
        )
    }
}
