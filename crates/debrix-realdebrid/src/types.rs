//! Wire DTOs for the Real-Debrid REST API.
//!
//! Shapes are deliberately lenient: the provider omits fields depending on
//! torrent state, and the availability index degrades to empty arrays for
//! hashes it has never seen.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Torrent record as returned by `/torrents` and `/torrents/info/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TorrentRecord {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) filename: String,
    #[serde(default)]
    pub(crate) original_filename: String,
    #[serde(default)]
    pub(crate) hash: String,
    #[serde(default)]
    pub(crate) bytes: u64,
    #[serde(default)]
    pub(crate) original_bytes: u64,
    #[serde(default)]
    pub(crate) host: String,
    #[serde(default)]
    pub(crate) split: u64,
    #[serde(default)]
    pub(crate) progress: f64,
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) added: Option<String>,
    #[serde(default)]
    pub(crate) ended: Option<String>,
    #[serde(default)]
    pub(crate) files: Vec<FileRecord>,
    #[serde(default)]
    pub(crate) links: Vec<String>,
    #[serde(default)]
    pub(crate) speed: Option<u64>,
    #[serde(default)]
    pub(crate) seeders: Option<u64>,
}

/// File entry nested in a torrent detail record.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FileRecord {
    pub(crate) id: i64,
    pub(crate) path: String,
    pub(crate) bytes: u64,
    #[serde(default)]
    pub(crate) selected: u8,
}

/// Account record returned by `/user`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserRecord {
    pub(crate) username: String,
    #[serde(default, rename = "type")]
    pub(crate) account_type: String,
    #[serde(default)]
    pub(crate) expiration: Option<String>,
}

/// Identifier envelope returned by the add-torrent endpoints.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AddTorrentResponse {
    pub(crate) id: String,
}

/// Envelope returned by `/unrestrict/link`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UnrestrictResponse {
    pub(crate) download: String,
}

/// One cached file inside an availability variant.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AvailabilityEntry {
    #[serde(default)]
    pub(crate) filename: Option<String>,
    #[serde(default)]
    pub(crate) filesize: u64,
}

/// Variants listed per host: each a map of file id to cached file detail.
pub(crate) type AvailabilityVariants = Vec<BTreeMap<String, AvailabilityEntry>>;

/// Per-hash availability payload.
///
/// The provider answers with a host map for cached hashes but degrades to a
/// bare empty array for unknown ones, hence the untagged fallback.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum HashAvailability {
    /// Host label to cached variants.
    Hosts(BTreeMap<String, AvailabilityVariants>),
    /// Empty placeholder for hashes the provider has never cached. The
    /// payload exists only to give serde an array shape to match.
    Empty(#[allow(dead_code)] Vec<serde_json::Value>),
}

/// Body of `/torrents/instantAvailability/{hash}`: hash to availability.
pub(crate) type AvailabilityResponse = BTreeMap<String, HashAvailability>;
