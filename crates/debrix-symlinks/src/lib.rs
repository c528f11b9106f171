#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

//! Symlink resolution worker for remotely-mounted debrid output.
//!
//! The provider materializes finished torrents behind an rclone-style mount;
//! this worker searches the mount for the expected file with a bounded,
//! linearly backed-off retry loop and then creates a local symbolic link to
//! the physical path it found. The mount is eventually consistent, which is
//! the reason for the retry loop rather than a single existence check.

use std::collections::HashSet;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use debrix_config::MountSettings;
use debrix_debrid_core::{DownloadRequest, Downloader};
use debrix_events::{Event, EventBus};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub mod error;

pub use error::{SymlinkError, SymlinkResult};

/// Archive extensions this strategy rejects up front: it can only link to
/// already-materialized files, never extract.
const UNSUPPORTED_EXTENSIONS: [&str; 3] = ["zip", "rar", "tar"];

/// Retry budget for the mount search.
const MAX_ATTEMPTS: u32 = 10;

/// Backoff unit; attempt `n` sleeps `n` units before the next scan.
const RETRY_UNIT: Duration = Duration::from_millis(1000);

/// Resolves expected files under a remote mount into local symlinks.
///
/// Each instance owns its own cancellation signal and emits its own event
/// stream; instances for different files may run concurrently and share
/// nothing beyond the read-only mount configuration.
pub struct SymlinkService {
    events: EventBus,
    mount: MountSettings,
    cancel: CancellationToken,
}

impl SymlinkService {
    /// Construct a worker for the given mount configuration.
    #[must_use]
    pub fn new(events: EventBus, mount: MountSettings) -> Self {
        Self {
            events,
            mount,
            cancel: CancellationToken::new(),
        }
    }

    /// Resolve the expected file and create the destination symlink.
    ///
    /// Emits `LinkStarted`, one `LinkProgress` per attempt, and exactly one
    /// terminal `LinkCompleted`/`LinkFailed`; the outcome is also the return
    /// value, so callers need not subscribe at all.
    ///
    /// # Errors
    ///
    /// Returns [`SymlinkError`] when the request is rejected, the mount root
    /// is missing, the file never appears, the link cannot be created, or
    /// cancellation is requested.
    pub async fn resolve(&self, request: &DownloadRequest) -> SymlinkResult<PathBuf> {
        let outcome = self.run(request).await;
        match &outcome {
            Ok(physical) => {
                info!(
                    torrent = %request.torrent_id,
                    physical = %physical.display(),
                    destination = %request.destination.display(),
                    "symlink resolved"
                );
                self.events.publish(Event::LinkCompleted {
                    torrent_id: request.torrent_id,
                    physical_path: physical.display().to_string(),
                });
            }
            Err(err) => {
                self.events.publish(Event::LinkFailed {
                    torrent_id: request.torrent_id,
                    message: err.to_string(),
                });
            }
        }
        outcome
    }

    async fn run(&self, request: &DownloadRequest) -> SymlinkResult<PathBuf> {
        let expected = Path::new(&request.expected_path);
        let Some(filename) = expected.file_name().map(|name| name.to_string_lossy()) else {
            return Err(SymlinkError::InvalidRequest {
                field: "expected_path",
                reason: "missing_file_name",
            });
        };
        let filename = filename.into_owned();

        self.events.publish(Event::LinkStarted {
            torrent_id: request.torrent_id,
            file: filename.clone(),
        });

        if let Some(extension) = unsupported_extension(&filename) {
            return Err(SymlinkError::UnsupportedExtension { extension });
        }

        let root = self.mount.root_path();
        let wildcard = self.mount.wildcard();
        if !root.is_dir() {
            return Err(SymlinkError::MissingMountRoot { path: root });
        }

        let candidates = build_candidates(expected, &filename);
        debug!(
            torrent = %request.torrent_id,
            file = %filename,
            candidates = candidates.len(),
            wildcard,
            "searching mount for expected file"
        );

        for attempt in 1..=MAX_ATTEMPTS {
            if self.cancel.is_cancelled() {
                return Err(SymlinkError::Cancelled);
            }

            self.events.publish(Event::LinkProgress {
                torrent_id: request.torrent_id,
                attempt,
                attempts_total: MAX_ATTEMPTS,
            });

            if let Some(physical) = scan(&root, wildcard, &candidates, &filename)? {
                debug!(
                    torrent = %request.torrent_id,
                    attempt,
                    physical = %physical.display(),
                    "expected file located"
                );
                return self.link(request, &physical);
            }

            if attempt < MAX_ATTEMPTS {
                tokio::select! {
                    () = self.cancel.cancelled() => return Err(SymlinkError::Cancelled),
                    () = tokio::time::sleep(RETRY_UNIT * attempt) => {}
                }
            }
        }

        let listing: Vec<String> = WalkDir::new(&root)
            .max_depth(2)
            .into_iter()
            .filter_map(Result::ok)
            .map(|entry| entry.path().display().to_string())
            .collect();
        warn!(
            torrent = %request.torrent_id,
            file = %filename,
            root = %root.display(),
            ?listing,
            "expected file never appeared under mount root"
        );

        Err(SymlinkError::NotFound {
            file: filename,
            attempts: MAX_ATTEMPTS,
        })
    }

    fn link(&self, request: &DownloadRequest, physical: &Path) -> SymlinkResult<PathBuf> {
        if let Some(parent) = request.destination.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SymlinkError::Io {
                operation: "create_destination_dir",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        // Creation failing and the post-creation check failing are the same
        // outcome: no usable link at the destination.
        if let Err(err) = create_symlink(physical, &request.destination) {
            return Err(SymlinkError::LinkFailed {
                path: request.destination.clone(),
                detail: err.to_string(),
            });
        }
        if request.destination.symlink_metadata().is_err() {
            return Err(SymlinkError::LinkFailed {
                path: request.destination.clone(),
                detail: "link missing after creation".to_string(),
            });
        }

        Ok(physical.to_path_buf())
    }
}

#[async_trait::async_trait]
impl Downloader for SymlinkService {
    async fn download(&self, request: DownloadRequest) -> anyhow::Result<PathBuf> {
        self.resolve(&request).await.map_err(anyhow::Error::from)
    }

    fn cancel(&self) {
        self.cancel.cancel();
    }
}

fn unsupported_extension(filename: &str) -> Option<String> {
    let extension = Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())?;
    UNSUPPORTED_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}

/// Candidate relative subpaths in priority order: ancestor directory names
/// walking from the expected file upward, the bare filename, the filename
/// without its extension, and the empty subpath.
fn build_candidates(expected: &Path, filename: &str) -> Vec<String> {
    let mut ordered = Vec::new();

    if let Some(parent) = expected.parent() {
        let mut names: Vec<String> = parent
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        names.reverse();
        ordered.extend(names);
    }

    ordered.push(filename.to_string());
    if let Some(stem) = Path::new(filename).file_stem() {
        ordered.push(stem.to_string_lossy().into_owned());
    }
    ordered.push(String::new());

    let mut seen = HashSet::new();
    ordered.retain(|candidate| seen.insert(candidate.clone()));
    ordered
}

/// One scan pass: check every candidate subpath under the mount root (and,
/// in wildcard mode, under each immediate subdirectory), first hit wins.
fn scan(
    root: &Path,
    wildcard: bool,
    candidates: &[String],
    filename: &str,
) -> SymlinkResult<Option<PathBuf>> {
    let mut search_roots = vec![root.to_path_buf()];
    if wildcard {
        let entries = std::fs::read_dir(root).map_err(|source| SymlinkError::Io {
            operation: "read_mount_root",
            path: root.to_path_buf(),
            source,
        })?;
        for entry in entries.filter_map(Result::ok) {
            if entry.path().is_dir() {
                search_roots.push(entry.path());
            }
        }
    }

    for search_root in &search_roots {
        for candidate in candidates {
            let path = if candidate.is_empty() {
                search_root.join(filename)
            } else {
                search_root.join(candidate).join(filename)
            };
            if path.is_file() {
                return Ok(Some(path));
            }
        }
    }

    Ok(None)
}

#[cfg(unix)]
fn create_symlink(original: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn create_symlink(original: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(original, link)
}
