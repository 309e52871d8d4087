//! A single synchronization pass over a remote tree.
//!
//! The walk keeps an explicit stack of open directories, each holding the
//! entries not yet handled, so arbitrarily deep trees never grow the call
//! stack. Entries are handled in the order the server lists them, and a
//! subdirectory is entered as soon as it is met.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::errors::SyncError;
use crate::files::{join_remote, local, normalize_remote_root, RemoteEntry, RemoteSession};

use super::{FileOutcome, PassReport, SyncOptions};

/// A listed directory whose remaining entries are still to be handled.
struct DirFrame {
    remote_dir: String,
    local_dir: PathBuf,
    entries: std::vec::IntoIter<RemoteEntry>,
}

/// Mirror everything under `remote_root` into `local_root`.
///
/// Per-file transfer and verification failures are logged, counted in the
/// returned report, and do not stop the pass. Listing a remote directory or
/// creating a local one aborts the pass with the error; files already
/// written stay in place and later entries are not touched.
pub fn sync_tree<S: RemoteSession + ?Sized>(
    session: &mut S,
    remote_root: &str,
    local_root: &Path,
    options: &SyncOptions,
) -> Result<PassReport, SyncError> {
    let mut report = PassReport::default();
    let root = open_dir(
        session,
        normalize_remote_root(remote_root),
        local_root.to_path_buf(),
        &mut report,
    )?;
    let mut stack = vec![root];

    while let Some(frame) = stack.last_mut() {
        let Some(entry) = frame.entries.next() else {
            stack.pop();
            continue;
        };

        if !is_plain_name(&entry.name) {
            warn!(
                "Skipping unsafe entry name {:?} in {}",
                entry.name, frame.remote_dir
            );
            continue;
        }

        let remote_child = join_remote(&frame.remote_dir, &entry.name);
        let local_child = frame.local_dir.join(&entry.name);

        if entry.is_dir() {
            let child = open_dir(session, remote_child, local_child, &mut report)?;
            stack.push(child);
            continue;
        }

        match sync_file(session, &remote_child, &local_child, &entry, options) {
            Ok(outcome) => report.record(outcome),
            Err(e) if e.is_per_file() => {
                warn!("Error downloading {remote_child}: {e}");
                report.failed += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}

/// Create the local directory, then list its remote counterpart.
fn open_dir<S: RemoteSession + ?Sized>(
    session: &mut S,
    remote_dir: String,
    local_dir: PathBuf,
    report: &mut PassReport,
) -> Result<DirFrame, SyncError> {
    local::ensure_dir(&local_dir)?;
    let entries = session.list_dir(&remote_dir)?;
    report.directories += 1;
    debug!("Listed {remote_dir}: {} entries", entries.len());

    Ok(DirFrame {
        remote_dir,
        local_dir,
        entries: entries.into_iter(),
    })
}

/// Download `remote_path` to `local_path` unless the local copy is in sync.
///
/// A local file is in sync when its size equals `entry.size` and its
/// modification time equals `entry.modified` (within
/// [`SyncOptions::mtime_tolerance_secs`]). After a download the local size
/// is checked against the remote size, then the remote access and
/// modification times are copied onto the local file.
pub fn sync_file<S: RemoteSession + ?Sized>(
    session: &mut S,
    remote_path: &str,
    local_path: &Path,
    entry: &RemoteEntry,
    options: &SyncOptions,
) -> Result<FileOutcome, SyncError> {
    let current = local::probe(local_path).map_err(|e| {
        SyncError::transfer(remote_path, format!("stat {}: {e}", local_path.display()))
    })?;

    if let Some(state) = current {
        if state.size == entry.size
            && state.mtime_matches(entry.modified, options.mtime_tolerance_secs)
        {
            debug!("Up to date: {remote_path}");
            return Ok(FileOutcome::Skipped);
        }
    }

    info!("Downloading: {remote_path} -> {}", local_path.display());
    session.fetch(remote_path, local_path)?;

    let actual = std::fs::metadata(local_path)
        .map(|m| m.len())
        .map_err(|e| {
            SyncError::transfer(remote_path, format!("stat {}: {e}", local_path.display()))
        })?;
    if actual != entry.size {
        return Err(SyncError::Verification {
            path: local_path.display().to_string(),
            expected: entry.size,
            actual,
        });
    }

    local::stamp_times(local_path, entry.accessed, entry.modified).map_err(|e| {
        SyncError::transfer(
            remote_path,
            format!("setting times on {}: {e}", local_path.display()),
        )
    })?;

    Ok(FileOutcome::Downloaded(actual))
}

/// A listing name that stays inside its parent directory when joined.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !(cfg!(windows) && name.contains('\\'))
}
