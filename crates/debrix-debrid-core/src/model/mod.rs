//! Core debrid domain types shared across the workspace.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raw status sentinel recorded when the provider no longer knows a torrent.
///
/// A "not found" answer for a previously-known remote id is a legitimate
/// steady state (the user or the provider deleted it upstream), so it is
/// absorbed into this sentinel rather than surfaced as an error.
pub const DELETED_SENTINEL: &str = "deleted";

/// Normalized torrent status derived from the provider's raw status string.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TorrentStatus {
    /// Provider is converting or queueing the torrent before download.
    Processing,
    /// Provider is waiting for a file selection to be submitted.
    WaitingForFileSelection,
    /// Provider is downloading (or compressing) the torrent content.
    Downloading,
    /// Provider finished downloading the torrent content.
    Finished,
    /// Provider is uploading the torrent content to its hosts.
    Uploading,
    /// Provider reported a failure, or the raw status was unrecognized.
    Error,
}

impl TorrentStatus {
    /// Normalize a provider raw status string.
    ///
    /// Total and case-sensitive: every string outside the known table maps to
    /// [`TorrentStatus::Error`] so that unknown provider states fail closed.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "magnet_conversion" => Self::Processing,
            "waiting_files_selection" => Self::WaitingForFileSelection,
            "queued" | "downloading" | "compressing" => Self::Downloading,
            "downloaded" => Self::Finished,
            "uploading" => Self::Uploading,
            _ => Self::Error,
        }
    }

    /// Machine-friendly discriminator used in events and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::WaitingForFileSelection => "waiting_for_file_selection",
            Self::Downloading => "downloading",
            Self::Finished => "finished",
            Self::Uploading => "uploading",
            Self::Error => "error",
        }
    }
}

/// Individual file inside a provider-side torrent snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteFile {
    /// Provider-assigned file identifier.
    pub id: i64,
    /// Path of the file within the torrent payload.
    pub path: String,
    /// File size in bytes.
    pub bytes: u64,
    /// Whether the provider currently has this file selected.
    pub selected: bool,
}

/// Ephemeral snapshot of a torrent as reported by the provider.
///
/// Constructed fresh on every fetch and never cached; timestamps have
/// already been corrected for the provider's clock offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteTorrent {
    /// Provider-assigned torrent identifier.
    pub id: String,
    /// Primary filename reported by the provider.
    pub filename: String,
    /// Original filename reported at admission time.
    pub original_filename: String,
    /// Info-hash of the torrent content.
    pub hash: String,
    /// Byte size of the selected payload.
    pub bytes: u64,
    /// Byte size of the full original payload.
    pub original_bytes: u64,
    /// Host label the provider stores the content on.
    pub host: String,
    /// Number of chunks the provider split the content into.
    pub split: u64,
    /// Download progress percentage reported by the provider.
    pub progress: f64,
    /// Raw provider status string.
    pub status_raw: String,
    /// When the torrent was added, offset-corrected.
    pub added: Option<DateTime<Utc>>,
    /// When the provider finished processing, offset-corrected.
    pub ended: Option<DateTime<Utc>>,
    /// Files contained in the torrent, when the provider supplies them.
    pub files: Vec<RemoteFile>,
    /// Resolved download links published so far.
    pub links: Vec<String>,
    /// Current download speed in bytes per second, while downloading.
    pub speed: Option<u64>,
    /// Seeder count observed by the provider, while downloading.
    pub seeders: Option<u64>,
}

/// Individual file tracked on the local record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalFile {
    /// Provider-assigned file identifier.
    pub id: i64,
    /// Path of the file within the torrent payload.
    pub path: String,
    /// File size in bytes.
    pub bytes: u64,
    /// Whether the file is part of the current selection.
    pub selected: bool,
}

/// Strategy for choosing which files of a torrent to materialize.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Keep every file.
    #[default]
    All,
    /// Keep only files the provider's availability index already has cached.
    AvailableOnly,
    /// Keep only files matching the configured manual suffix patterns.
    Manual,
}

/// Per-torrent file selection parameters.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SelectionPolicy {
    /// Selection strategy to apply.
    pub mode: SelectionMode,
    /// Drop files at or below this many megabytes, when set.
    pub min_file_size_mb: Option<u64>,
    /// Keep only files whose path matches this pattern, when set.
    ///
    /// Mutually exclusive with `exclude_regex` at application time; when both
    /// are configured only the include pattern is applied.
    pub include_regex: Option<String>,
    /// Drop files whose path matches this pattern, when set.
    pub exclude_regex: Option<String>,
    /// Filename suffix patterns used by [`SelectionMode::Manual`].
    #[serde(default)]
    pub manual_files: Vec<String>,
}

/// Locally persisted torrent record owned by the orchestrator.
///
/// The synchronizer mutates only the provider-derived fields; identity and
/// selection policy belong to the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalTorrent {
    /// Local identifier assigned at admission.
    pub id: Uuid,
    /// Provider-assigned torrent identifier.
    pub remote_id: String,
    /// Info-hash of the torrent content.
    pub hash: String,
    /// Display name derived from the provider's filenames.
    pub name: String,
    /// Payload size in bytes.
    pub size: u64,
    /// Last known file listing snapshot.
    pub files: Vec<LocalFile>,
    /// Host label the provider stores the content on.
    pub host: String,
    /// Number of chunks the provider split the content into.
    pub split: u64,
    /// Download progress percentage.
    pub progress: f64,
    /// When the torrent was added provider-side.
    pub added: Option<DateTime<Utc>>,
    /// When the provider finished processing.
    pub ended: Option<DateTime<Utc>>,
    /// Current download speed in bytes per second.
    pub speed: Option<u64>,
    /// Seeder count observed by the provider.
    pub seeders: Option<u64>,
    /// Raw provider status string (or the deleted sentinel).
    pub status_raw: String,
    /// Normalized status derived from `status_raw`.
    pub status: TorrentStatus,
    /// File selection parameters for this torrent.
    pub selection: SelectionPolicy,
}

/// A cached file advertised by the provider's availability index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailableFile {
    /// Filename of the cached file, absent for malformed entries.
    pub filename: Option<String>,
    /// Size of the cached file in bytes.
    pub filesize: u64,
}

/// Availability index for one info-hash: host label to cached variants,
/// each variant being the set of files one cached copy carries. Ordered by
/// host label so that downstream deduplication is deterministic.
pub type AvailabilityIndex = BTreeMap<String, Vec<Vec<AvailableFile>>>;

/// Account details reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    /// Account username.
    pub username: String,
    /// Whether the account currently has premium standing.
    pub premium: bool,
    /// When the premium standing expires, when known.
    pub expiration: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_table_matches_provider_contract() {
        let cases = [
            ("magnet_error", TorrentStatus::Error),
            ("magnet_conversion", TorrentStatus::Processing),
            ("waiting_files_selection", TorrentStatus::WaitingForFileSelection),
            ("queued", TorrentStatus::Downloading),
            ("downloading", TorrentStatus::Downloading),
            ("downloaded", TorrentStatus::Finished),
            ("error", TorrentStatus::Error),
            ("virus", TorrentStatus::Error),
            ("dead", TorrentStatus::Error),
            ("compressing", TorrentStatus::Downloading),
            ("uploading", TorrentStatus::Uploading),
        ];

        for (raw, expected) in cases {
            assert_eq!(TorrentStatus::from_raw(raw), expected, "raw status {raw}");
        }
    }

    #[test]
    fn unknown_raw_status_normalizes_to_error() {
        assert_eq!(TorrentStatus::from_raw(""), TorrentStatus::Error);
        assert_eq!(TorrentStatus::from_raw("deleted"), TorrentStatus::Error);
        assert_eq!(TorrentStatus::from_raw("Downloaded"), TorrentStatus::Error);
        assert_eq!(TorrentStatus::from_raw("paused"), TorrentStatus::Error);
    }

    #[test]
    fn selection_mode_serializes_snake_case() {
        let mode: SelectionMode =
            serde_json::from_str("\"available_only\"").expect("mode parse");
        assert_eq!(mode, SelectionMode::AvailableOnly);
    }
}
