//! SSH/SFTP backend for the sync engine.
//!
//! [`SshConnector`] opens one authenticated SSH session per sync attempt
//! and wraps it in an [`SftpSession`] implementing
//! [`RemoteSession`](crate::files::RemoteSession).

pub mod auth;
mod sftp;

pub use self::sftp::{SftpSession, SshConnector};
