//! Blocking remote file access used by the sync engine.
//!
//! The engine only needs to list directories and pull files, so the
//! transport surface is deliberately small. [`Connector`] produces a fresh
//! session for every sync attempt.

use std::path::Path;

use crate::errors::SyncError;
use crate::files::RemoteEntry;

/// An open, authenticated session against one remote host.
pub trait RemoteSession {
    /// List the entries directly under `path`, in server order.
    ///
    /// `.` and `..` are never returned.
    fn list_dir(&mut self, path: &str) -> Result<Vec<RemoteEntry>, SyncError>;

    /// Copy the remote file at `remote_path` to `local_path`, replacing any
    /// existing content. Returns the number of bytes written.
    fn fetch(&mut self, remote_path: &str, local_path: &Path) -> Result<u64, SyncError>;

    /// Tear the session down. Called exactly once per opened session.
    fn close(&mut self) -> Result<(), SyncError>;
}

/// Opens remote sessions.
pub trait Connector {
    type Session: RemoteSession;

    /// Connect and authenticate a new session.
    fn connect(&self) -> Result<Self::Session, SyncError>;

    /// Human-readable target for log lines, e.g. `user@host:22`.
    fn describe(&self) -> String;
}
