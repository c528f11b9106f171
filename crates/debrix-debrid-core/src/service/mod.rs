//! Provider and downloader traits implemented by adapters.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::error::DebridResult;
use crate::model::{AvailabilityIndex, RemoteTorrent, UserInfo};

/// Remote debrid provider API surface consumed by the synchronizer.
///
/// Implementations wrap a single provider account. All calls are sequential
/// round trips; retry cadence is owned by the caller.
#[async_trait]
pub trait DebridProvider: Send + Sync {
    /// Fetch one page of the torrent listing, preserving remote ordering.
    async fn list_torrents(&self, offset: usize, limit: usize)
    -> DebridResult<Vec<RemoteTorrent>>;

    /// Fetch account details for the configured credentials.
    async fn user_info(&self) -> DebridResult<UserInfo>;

    /// Add a torrent by magnet link, returning the provider-assigned id.
    async fn add_magnet(&self, magnet: &str) -> DebridResult<String>;

    /// Add a torrent from raw metainfo bytes, returning the provider-assigned id.
    async fn add_file(&self, bytes: &[u8]) -> DebridResult<String>;

    /// Look up the cached-availability index for an info-hash.
    async fn availability(&self, hash: &str) -> DebridResult<AvailabilityIndex>;

    /// Fetch the detail snapshot for a single torrent.
    async fn torrent_info(&self, id: &str) -> DebridResult<RemoteTorrent>;

    /// Submit the set of file identifiers the provider should materialize.
    async fn select_files(&self, id: &str, file_ids: &[i64]) -> DebridResult<()>;

    /// Delete a torrent from the provider account.
    async fn delete(&self, id: &str) -> DebridResult<()>;

    /// Unrestrict a hosted link into a direct download URL.
    async fn unrestrict_link(&self, link: &str) -> DebridResult<String>;

    /// Read the provider's wall clock, used for clock-offset calibration.
    ///
    /// The provider reports local time without a usable zone marker, hence
    /// the naive timestamp.
    async fn server_time(&self) -> DebridResult<NaiveDateTime>;
}

/// Request payload handed to a downloader strategy.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// Local identifier of the torrent the file belongs to.
    pub torrent_id: Uuid,
    /// Remote locator for the content (unrestricted link or mount URI).
    pub uri: String,
    /// Path where the local filesystem entry should be created.
    pub destination: PathBuf,
    /// Path of the expected file relative to the torrent payload root.
    pub expected_path: String,
}

/// Downloader strategy contract shared by the symlink resolver and its
/// sibling strategies.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Materialize one file locally, returning the resolved physical path.
    async fn download(&self, request: DownloadRequest) -> anyhow::Result<PathBuf>;

    /// Pause the strategy; a no-op for strategies without transfer state.
    async fn pause(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Resume the strategy; a no-op for strategies without transfer state.
    async fn resume(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Request cooperative cancellation of in-flight work.
    fn cancel(&self);
}
