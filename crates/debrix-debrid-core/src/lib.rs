//! Provider-agnostic debrid domain types and contracts.
//!
//! Layout: `model` (torrent snapshots, status normalization, selection
//! policy data), `service` (the `DebridProvider` and `Downloader` traits
//! implemented by adapters), `error` (structured error taxonomy).

pub mod error;
pub mod model;
pub mod service;

pub use error::{DebridError, DebridResult};
pub use model::{
    AvailabilityIndex, AvailableFile, DELETED_SENTINEL, LocalFile, LocalTorrent, RemoteFile,
    RemoteTorrent, SelectionMode, SelectionPolicy, TorrentStatus, UserInfo,
};
pub use service::{DebridProvider, DownloadRequest, Downloader};
