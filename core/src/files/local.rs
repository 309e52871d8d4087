use std::io;
use std::path::Path;

use filetime::FileTime;

use crate::errors::SyncError;

/// Size and modification time of an existing local file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalFileState {
    pub size: u64,
    /// Whole seconds since the Unix epoch.
    pub modified_secs: i64,
    /// Sub-second part of the modification time.
    pub modified_nanos: u32,
}

impl LocalFileState {
    /// Whether the local modification time matches `remote_secs`.
    ///
    /// With a zero tolerance the times must be identical, including a zero
    /// sub-second part. Otherwise the difference may be up to
    /// `tolerance_secs` in either direction.
    pub fn mtime_matches(&self, remote_secs: u64, tolerance_secs: u64) -> bool {
        let remote = remote_secs as i128 * 1_000_000_000;
        let local = self.modified_secs as i128 * 1_000_000_000 + self.modified_nanos as i128;
        (local - remote).unsigned_abs() <= tolerance_secs as u128 * 1_000_000_000
    }
}

/// Read the current state of a local file.
///
/// Returns `Ok(None)` when nothing exists at `path`.
pub fn probe(path: &Path) -> io::Result<Option<LocalFileState>> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let mtime = FileTime::from_last_modification_time(&metadata);
    Ok(Some(LocalFileState {
        size: metadata.len(),
        modified_secs: mtime.unix_seconds(),
        modified_nanos: mtime.nanoseconds(),
    }))
}

/// Create `path` and any missing ancestors. No-op if it already exists.
pub fn ensure_dir(path: &Path) -> Result<(), SyncError> {
    std::fs::create_dir_all(path).map_err(|e| SyncError::LocalDirectory {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Set the access and modification times of `path` to whole-second values.
pub fn stamp_times(path: &Path, accessed: u64, modified: u64) -> io::Result<()> {
    filetime::set_file_times(
        path,
        FileTime::from_unix_time(accessed as i64, 0),
        FileTime::from_unix_time(modified as i64, 0),
    )
}
