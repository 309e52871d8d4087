pub mod local;
pub mod remote;

pub use remote::{Connector, RemoteSession};

/// Mask selecting the file type bits of a POSIX mode.
const S_IFMT: u32 = 0o170000;
/// File type bits of a directory.
const S_IFDIR: u32 = 0o040000;

/// Whether a remote entry is descended into or downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    /// Classify a remote entry from its POSIX mode bits.
    ///
    /// Anything that is not a directory (regular files, symlinks, devices)
    /// is treated as a file. A missing mode is treated as a file too.
    pub fn from_mode(mode: Option<u32>) -> Self {
        match mode {
            Some(mode) if mode & S_IFMT == S_IFDIR => Self::Directory,
            _ => Self::File,
        }
    }
}

/// One item of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
    /// Modification time, seconds since the Unix epoch.
    pub modified: u64,
    /// Access time, seconds since the Unix epoch.
    pub accessed: u64,
}

impl RemoteEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Join a child name onto a `/`-separated remote directory path.
pub fn join_remote(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Strip trailing slashes from a remote root, keeping `/` itself intact.
pub fn normalize_remote_root(root: &str) -> String {
    let trimmed = root.trim_end_matches('/');
    if trimmed.is_empty() && root.starts_with('/') {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
