//! SFTP-backed [`RemoteSession`].
//!
//! Everything runs on the calling thread in blocking mode; the sync engine
//! never issues overlapping requests.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;

use tracing::debug;

use crate::config::SshConfig;
use crate::errors::SyncError;
use crate::files::{Connector, EntryKind, RemoteEntry, RemoteSession};

use super::auth::connect_and_authenticate;

/// Read buffer for downloads. Larger than `io::copy`'s default so each SFTP
/// round trip carries more data.
const DOWNLOAD_BUFFER_SIZE: usize = 256 * 1024;

/// Opens SFTP sessions using an [`SshConfig`].
#[derive(Debug, Clone)]
pub struct SshConnector {
    config: SshConfig,
}

impl SshConnector {
    pub fn new(config: SshConfig) -> Self {
        Self { config }
    }
}

impl Connector for SshConnector {
    type Session = SftpSession;

    fn connect(&self) -> Result<SftpSession, SyncError> {
        let session = connect_and_authenticate(&self.config)?;
        session.set_blocking(true);

        let sftp = session
            .sftp()
            .map_err(|e| SyncError::Connection(format!("SFTP init failed: {e}")))?;

        Ok(SftpSession { session, sftp })
    }

    fn describe(&self) -> String {
        format!(
            "{}@{}:{}",
            self.config.username, self.config.host, self.config.port
        )
    }
}

/// A connected SFTP channel and the SSH session carrying it.
pub struct SftpSession {
    session: ssh2::Session,
    sftp: ssh2::Sftp,
}

impl RemoteSession for SftpSession {
    fn list_dir(&mut self, path: &str) -> Result<Vec<RemoteEntry>, SyncError> {
        let entries = self
            .sftp
            .readdir(Path::new(path))
            .map_err(|e| SyncError::listing(path, format!("readdir failed: {e}")))?;

        let mut result = Vec::with_capacity(entries.len());
        for (pathbuf, stat) in entries {
            let name = pathbuf
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            if name.is_empty() || name == "." || name == ".." {
                continue;
            }

            result.push(RemoteEntry {
                name,
                kind: EntryKind::from_mode(stat.perm),
                size: stat.size.unwrap_or(0),
                modified: stat.mtime.unwrap_or(0),
                accessed: stat.atime.unwrap_or(0),
            });
        }
        Ok(result)
    }

    fn fetch(&mut self, remote_path: &str, local_path: &Path) -> Result<u64, SyncError> {
        let remote = self
            .sftp
            .open(Path::new(remote_path))
            .map_err(|e| SyncError::transfer(remote_path, format!("open failed: {e}")))?;
        let mut local = File::create(local_path).map_err(|e| {
            SyncError::transfer(
                remote_path,
                format!("create {} failed: {e}", local_path.display()),
            )
        })?;

        let mut reader = BufReader::with_capacity(DOWNLOAD_BUFFER_SIZE, remote);
        let bytes = io::copy(&mut reader, &mut local)
            .map_err(|e| SyncError::transfer(remote_path, format!("copy failed: {e}")))?;
        local
            .flush()
            .map_err(|e| SyncError::transfer(remote_path, format!("flush failed: {e}")))?;

        debug!("Fetched {bytes} bytes from {remote_path}");
        Ok(bytes)
    }

    fn close(&mut self) -> Result<(), SyncError> {
        self.session
            .disconnect(None, "sftpmirror pass finished", None)
            .map_err(|e| SyncError::Connection(format!("Disconnect failed: {e}")))
    }
}
