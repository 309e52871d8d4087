//! Shared test utilities for sftpmirror core integration tests.
//!
//! Provides a directory-backed fake remote with fault injection for engine
//! and driver tests, plus Docker container checks and SSH configuration
//! builders for the SFTP tests.

// Each integration test is compiled as its own crate, so not every test file
// uses every function from this shared module. Suppress dead_code warnings.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use filetime::FileTime;
use sftpmirror_core::errors::SyncError;
use sftpmirror_core::files::{Connector, EntryKind, RemoteEntry, RemoteSession};

// --- Directory-backed fake remote ---

/// Faults and counters shared between a [`LocalConnector`] and the sessions
/// it hands out.
#[derive(Default)]
pub struct RemoteFaults {
    /// File names whose fetch fails with a transfer error.
    pub failing_fetches: HashSet<String>,
    /// File names whose fetch writes only half of the content.
    pub short_fetches: HashSet<String>,
    /// Directory names whose listing fails.
    pub failing_listings: HashSet<String>,
    /// Remote paths fetched so far, in order.
    pub fetched: Vec<String>,
    pub connects: u32,
    pub closes: u32,
    /// Fail every connect while set.
    pub refuse_connections: bool,
}

pub type SharedFaults = Rc<RefCell<RemoteFaults>>;

/// A "remote" tree that is really a local directory. Remote paths are the
/// directory's own absolute paths joined with `/`. Listings are sorted by
/// name.
pub struct LocalRemote {
    faults: SharedFaults,
}

impl LocalRemote {
    pub fn new(faults: SharedFaults) -> Self {
        Self { faults }
    }
}

fn last_component(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

impl RemoteSession for LocalRemote {
    fn list_dir(&mut self, path: &str) -> Result<Vec<RemoteEntry>, SyncError> {
        if self
            .faults
            .borrow()
            .failing_listings
            .contains(last_component(path))
        {
            return Err(SyncError::Listing {
                path: path.to_string(),
                message: "permission denied".to_string(),
            });
        }

        let read_dir = std::fs::read_dir(path).map_err(|e| SyncError::Listing {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| SyncError::Listing {
                path: path.to_string(),
                message: e.to_string(),
            })?;
            let metadata = entry.metadata().unwrap();
            entries.push(RemoteEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                kind: if metadata.is_dir() {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                },
                size: metadata.len(),
                modified: FileTime::from_last_modification_time(&metadata).unix_seconds() as u64,
                accessed: FileTime::from_last_access_time(&metadata).unix_seconds() as u64,
            });
        }
        // read_dir order is platform dependent; list by name.
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn fetch(&mut self, remote_path: &str, local_path: &Path) -> Result<u64, SyncError> {
        let name = last_component(remote_path).to_string();
        let mut faults = self.faults.borrow_mut();
        faults.fetched.push(remote_path.to_string());

        if faults.failing_fetches.contains(&name) {
            return Err(SyncError::Transfer {
                path: remote_path.to_string(),
                message: "connection reset by peer".to_string(),
            });
        }

        let mut data = std::fs::read(remote_path).unwrap();
        if faults.short_fetches.contains(&name) {
            data.truncate(data.len() / 2);
        }
        std::fs::write(local_path, &data).map_err(|e| SyncError::Transfer {
            path: remote_path.to_string(),
            message: e.to_string(),
        })?;
        Ok(data.len() as u64)
    }

    fn close(&mut self) -> Result<(), SyncError> {
        self.faults.borrow_mut().closes += 1;
        Ok(())
    }
}

/// Hands out [`LocalRemote`] sessions sharing one set of faults.
pub struct LocalConnector {
    pub faults: SharedFaults,
}

impl LocalConnector {
    pub fn new() -> Self {
        Self {
            faults: Rc::new(RefCell::new(RemoteFaults::default())),
        }
    }
}

impl Connector for LocalConnector {
    type Session = LocalRemote;

    fn connect(&self) -> Result<LocalRemote, SyncError> {
        let mut faults = self.faults.borrow_mut();
        faults.connects += 1;
        if faults.refuse_connections {
            return Err(SyncError::Connection("Connection refused".to_string()));
        }
        Ok(LocalRemote::new(self.faults.clone()))
    }

    fn describe(&self) -> String {
        "test@localhost:0".to_string()
    }
}

/// Remote-style path string for a local directory.
pub fn remote_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Write `data` to `dir/name` and give it the supplied mtime and atime.
pub fn write_file(dir: &Path, name: &str, data: &[u8], mtime: i64, atime: i64) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, data).unwrap();
    filetime::set_file_times(
        &path,
        FileTime::from_unix_time(atime, 0),
        FileTime::from_unix_time(mtime, 0),
    )
    .unwrap();
    path
}

/// Whole-second mtime of a local file.
pub fn mtime_of(path: &Path) -> i64 {
    FileTime::from_last_modification_time(&std::fs::metadata(path).unwrap()).unix_seconds()
}

// --- Docker-based SFTP tests ---

/// Check if a TCP port is reachable on the given host.
///
/// Returns `true` if a TCP connection can be established within 2 seconds.
pub fn is_port_reachable(host: &str, port: u16) -> bool {
    let addr = format!("{host}:{port}");
    if let Ok(addr) = addr.parse() {
        TcpStream::connect_timeout(&addr, Duration::from_secs(2)).is_ok()
    } else {
        false
    }
}

/// Skip the current test if a Docker container is not reachable on the given port.
///
/// Prints a message to stderr and returns early (runtime check instead of
/// `#[ignore]`).
macro_rules! require_docker {
    ($port:expr) => {
        if !common::is_port_reachable("127.0.0.1", $port) {
            eprintln!(
                "SKIPPED: Docker container not reachable on port {} \
                 (start with: cd tests/docker && docker compose up -d)",
                $port
            );
            return;
        }
    };
}
pub(crate) use require_docker;

/// ssh-password container (password auth, OpenSSH latest).
pub const PORT_SSH_PASSWORD: u16 = 2201;
/// sftp-stress container (pre-populated SFTP test data).
pub const PORT_SFTP_STRESS: u16 = 2210;

/// Build an `SshConfig` for password authentication against a test container.
pub fn ssh_password_config(port: u16) -> sftpmirror_core::config::SshConfig {
    sftpmirror_core::config::SshConfig {
        host: "127.0.0.1".to_string(),
        port,
        username: "testuser".to_string(),
        auth_method: "password".to_string(),
        password: Some("testpass".to_string()),
        ..Default::default()
    }
}
