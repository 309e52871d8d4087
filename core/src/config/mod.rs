pub mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::CoreError;
use crate::sync::SyncOptions;

/// How the server's host key is checked during the SSH handshake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HostKeyPolicy {
    /// Accept any host key without consulting known_hosts (trust on first use).
    #[default]
    AcceptAll,
    /// Verify known hosts; unknown hosts are appended to the known_hosts file.
    AcceptNew,
    /// Only connect to hosts whose key is already present and matches.
    Strict,
}

/// SSH connection settings for the remote side of the mirror.
///
/// - `port`: defaults to 22.
/// - `auth_method`: `"agent"` (default), `"key"` or `"password"`.
/// - `password`: the login password, or the key passphrase for `"key"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshConfig {
    pub host: String,
    #[serde(default = "default_ssh_port")]
    pub port: u16,
    pub username: String,
    #[serde(default = "default_auth_method")]
    pub auth_method: String,
    pub password: Option<String>,
    pub key_path: Option<String>,
    #[serde(default)]
    pub host_key_policy: HostKeyPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_hosts_path: Option<String>,
    /// Connect and per-operation timeout; 0 blocks indefinitely.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_ssh_port(),
            username: String::new(),
            auth_method: default_auth_method(),
            password: None,
            key_path: None,
            host_key_policy: HostKeyPolicy::default(),
            known_hosts_path: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SshConfig {
    /// Return a copy with all `${env:...}` placeholders and `~` expanded.
    pub fn expand(mut self) -> Self {
        self.host = expand::expand_env_placeholders(&self.host);
        self.username = expand::expand_env_placeholders(&self.username);
        self.key_path = self.key_path.map(|s| {
            // Strip surrounding quotes — users often paste paths like "C:\...\key"
            let stripped = s.trim().trim_matches('"').trim_matches('\'');
            expand::expand_tilde(&expand::expand_env_placeholders(stripped))
        });
        self.password = self.password.map(|s| expand::expand_env_placeholders(&s));
        self.known_hosts_path = self
            .known_hosts_path
            .map(|s| expand::expand_tilde(&expand::expand_env_placeholders(&s)));
        self
    }

    /// The known_hosts file consulted by the verifying host key policies.
    pub fn known_hosts_file(&self) -> PathBuf {
        let raw = self
            .known_hosts_path
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("~/.ssh/known_hosts");
        PathBuf::from(expand::expand_tilde(raw))
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Complete configuration of one mirror: where to pull from, where to
/// write, and how often to retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorConfig {
    pub ssh: SshConfig,
    pub remote_root: String,
    pub local_root: String,
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default)]
    pub mtime_tolerance_secs: u64,
}

impl MirrorConfig {
    /// Read, expand and validate a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let contents = std::fs::read_to_string(path)?;
        let config: MirrorConfig = serde_json::from_str(&contents).map_err(|e| {
            CoreError::Config(format!("Failed to parse {}: {e}", path.display()))
        })?;
        debug!("Loaded mirror configuration from {}", path.display());

        let config = config.expand();
        config.validate()?;
        Ok(config)
    }

    /// Return a copy with all `${env:...}` placeholders and `~` expanded.
    pub fn expand(mut self) -> Self {
        self.ssh = self.ssh.expand();
        self.remote_root = expand::expand_env_placeholders(&self.remote_root);
        self.local_root =
            expand::expand_tilde(&expand::expand_env_placeholders(&self.local_root));
        self
    }

    /// Reject configurations that cannot possibly connect or sync.
    pub fn validate(&self) -> Result<(), CoreError> {
        let required = [
            ("ssh.host", &self.ssh.host),
            ("ssh.username", &self.ssh.username),
            ("remoteRoot", &self.remote_root),
            ("localRoot", &self.local_root),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CoreError::Config(format!("{field} must not be empty")));
            }
        }
        if self.ssh.port == 0 {
            return Err(CoreError::Config("ssh.port must not be 0".to_string()));
        }
        Ok(())
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            mtime_tolerance_secs: self.mtime_tolerance_secs,
        }
    }
}

// --- Default value functions ---

fn default_ssh_port() -> u16 {
    22
}

fn default_auth_method() -> String {
    "agent".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_interval_secs() -> u64 {
    60
}

fn default_poll_interval_secs() -> u64 {
    60
}
