//! Typed configuration models.
//!
//! # Design
//! - Pure data carriers consumed by the provider adapter and symlink worker.
//! - Keeps parsing conveniences (wildcard roots, timeouts) next to the data.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Marker suffix that widens a mount root to its immediate subdirectories.
pub const WILDCARD_SUFFIX: &str = "/*";

const DEFAULT_TIMEOUT_SECS: u64 = 100;

/// Credentials and transport knobs for the remote debrid provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// API key presented as a bearer token on every request.
    pub api_key: String,
    /// Base URL of the provider's REST API.
    pub base_url: String,
    /// Request timeout in seconds applied to every API call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ProviderSettings {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Location of the provider's remotely-mounted output on the local host.
///
/// The configured root may carry a trailing `/*`, in which case searches also
/// cover the root's immediate subdirectories (one level).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountSettings {
    /// Mount root path, optionally wildcard-suffixed.
    pub root: String,
}

impl MountSettings {
    /// Whether the configured root requests the one-level subdirectory scan.
    #[must_use]
    pub fn wildcard(&self) -> bool {
        self.root.ends_with(WILDCARD_SUFFIX)
    }

    /// The mount root with any wildcard marker stripped.
    #[must_use]
    pub fn root_path(&self) -> PathBuf {
        let trimmed = self
            .root
            .strip_suffix(WILDCARD_SUFFIX)
            .unwrap_or(&self.root);
        Path::new(trimmed).to_path_buf()
    }
}
