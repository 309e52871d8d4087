//! Error types for the sftpmirror core crate.
//!
//! [`SyncError`] carries the failure kinds a synchronization pass can hit.
//! Per-file kinds are isolated by the tree walk; everything else aborts the
//! pass and is handed to the driver, which backs off and retries.

use thiserror::Error;

/// Errors raised while loading the mirror configuration.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A configuration error (invalid values, missing fields, parse failures).
    #[error("Config error: {0}")]
    Config(String),

    /// A low-level I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while mirroring a remote tree.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Establishing or authenticating the remote session failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Enumerating a remote directory failed.
    #[error("Listing {path} failed: {message}")]
    Listing { path: String, message: String },

    /// Creating a local directory failed.
    #[error("Creating local directory {path} failed: {message}")]
    LocalDirectory { path: String, message: String },

    /// Fetching one file failed (remote read, local write or stamp).
    #[error("Transfer of {path} failed: {message}")]
    Transfer { path: String, message: String },

    /// The downloaded file does not have the size the remote reported.
    #[error("Size mismatch for {path}: expected {expected} bytes, found {actual}")]
    Verification {
        path: String,
        expected: u64,
        actual: u64,
    },
}

impl SyncError {
    /// Whether this error only concerns a single file.
    ///
    /// Per-file errors are logged and skipped; the remaining kinds abort the
    /// whole pass.
    pub fn is_per_file(&self) -> bool {
        matches!(self, Self::Transfer { .. } | Self::Verification { .. })
    }

    pub(crate) fn transfer(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Transfer {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn listing(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Listing {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
