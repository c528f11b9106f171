//! Remote-state synchronizer: pagination, merge, selection, link readiness.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use debrix_debrid_core::{
    DELETED_SENTINEL, DebridError, DebridProvider, DebridResult, LocalFile, LocalTorrent,
    RemoteTorrent, SelectionMode, TorrentStatus,
};
use debrix_events::{Event, EventBus};
use regex::Regex;
use tracing::{debug, info, warn};

/// Fixed page size used when walking the provider's torrent listing.
const PAGE_SIZE: usize = 5000;

/// How long a single straggling link is tolerated after the provider marks
/// the torrent ended, before the link is accepted as final.
const LINK_SETTLE_SECONDS: i64 = 60;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Correction applied to provider timestamps.
///
/// The provider reports local time stamped with the wrong offset; the delta
/// between our wall clock and its reported clock, captured once, fixes every
/// timestamp it returns.
#[derive(Debug, Clone, Copy)]
pub struct ClockOffset {
    delta: TimeDelta,
}

impl ClockOffset {
    /// Compute the offset from our wall clock and the provider's reported time.
    #[must_use]
    pub fn from_server_time(now: DateTime<Utc>, server: NaiveDateTime) -> Self {
        Self {
            delta: now - server.and_utc(),
        }
    }

    /// Apply the correction to a provider-reported timestamp.
    #[must_use]
    pub fn apply(&self, timestamp: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
        timestamp.map(|value| value + self.delta)
    }

    /// The raw correction delta.
    #[must_use]
    pub const fn delta(&self) -> TimeDelta {
        self.delta
    }
}

/// Synchronizes provider-side torrent state into local records.
///
/// Construction is the explicit initialization step: `connect` performs the
/// one clock-offset calibration round trip and returns an immutable value,
/// so there is no lazily-initialized state for concurrent callers to race on.
#[derive(Clone)]
pub struct Synchronizer {
    provider: Arc<dyn DebridProvider>,
    events: EventBus,
    offset: ClockOffset,
}

impl Synchronizer {
    /// Calibrate the clock offset and build a synchronizer.
    ///
    /// # Errors
    ///
    /// Returns [`DebridError`] when the server-time round trip fails.
    pub async fn connect(provider: Arc<dyn DebridProvider>, events: EventBus) -> DebridResult<Self> {
        let server = provider.server_time().await?;
        let offset = ClockOffset::from_server_time(Utc::now(), server);
        info!(delta_ms = offset.delta().num_milliseconds(), "calibrated provider clock offset");
        Ok(Self {
            provider,
            events,
            offset,
        })
    }

    /// The clock offset captured at construction.
    #[must_use]
    pub const fn offset(&self) -> ClockOffset {
        self.offset
    }

    fn correct(&self, torrent: &mut RemoteTorrent) {
        torrent.added = self.offset.apply(torrent.added);
        torrent.ended = self.offset.apply(torrent.ended);
    }

    /// Fetch the complete torrent listing, page by page.
    ///
    /// Remote ordering is preserved. A short page terminates the walk; a full
    /// page triggers one more request, so an exact-multiple listing costs one
    /// trailing empty fetch. Any page failure fails the whole call.
    ///
    /// # Errors
    ///
    /// Returns [`DebridError`] from the first failing page fetch.
    pub async fn get_torrents(&self) -> DebridResult<Vec<RemoteTorrent>> {
        let mut collected = Vec::new();
        let mut offset = 0;

        loop {
            let page = self.provider.list_torrents(offset, PAGE_SIZE).await?;
            let count = page.len();
            debug!(offset, count, "fetched listing page");
            for mut torrent in page {
                self.correct(&mut torrent);
                collected.push(torrent);
            }
            if count < PAGE_SIZE {
                break;
            }
            offset += count;
        }

        Ok(collected)
    }

    /// Fetch the offset-corrected detail snapshot for one torrent.
    ///
    /// # Errors
    ///
    /// Returns [`DebridError::NotFound`] when the provider no longer knows
    /// the id, or the transport failure otherwise.
    pub async fn get_info(&self, id: &str) -> DebridResult<RemoteTorrent> {
        let mut torrent = self.provider.torrent_info(id).await?;
        self.correct(&mut torrent);
        Ok(torrent)
    }

    /// Merge a provider snapshot into the local record.
    ///
    /// When `snapshot` is absent or incomplete (no ended timestamp or no
    /// filename) the detail endpoint is consulted first. A provider-side
    /// "not found" is absorbed: the raw status becomes the deleted sentinel
    /// and the record is otherwise left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DebridError`] for transport failures; never for a missing
    /// remote resource.
    pub async fn update_local_from_remote(
        &self,
        local: &mut LocalTorrent,
        snapshot: Option<RemoteTorrent>,
    ) -> DebridResult<()> {
        let remote = match snapshot {
            Some(remote) if remote.ended.is_some() && !remote.filename.is_empty() => remote,
            _ => match self.get_info(&local.remote_id).await {
                Ok(remote) => remote,
                Err(DebridError::NotFound { .. }) => {
                    warn!(
                        torrent = %local.remote_id,
                        "torrent vanished upstream, recording deleted sentinel"
                    );
                    local.status_raw = DELETED_SENTINEL.to_string();
                    self.events.publish(Event::TorrentGone {
                        torrent_id: local.id,
                        remote_id: local.remote_id.clone(),
                    });
                    return Ok(());
                }
                Err(err) => return Err(err),
            }
        };

        local.name = if remote.filename.is_empty() {
            remote.original_filename.clone()
        } else {
            remote.filename.clone()
        };
        local.size = if remote.bytes > 0 {
            remote.bytes
        } else {
            remote.original_bytes
        };
        if !remote.hash.is_empty() {
            local.hash = remote.hash.clone();
        }
        if !remote.files.is_empty() {
            local.files = remote
                .files
                .iter()
                .map(|file| LocalFile {
                    id: file.id,
                    path: file.path.clone(),
                    bytes: file.bytes,
                    selected: file.selected,
                })
                .collect();
        }
        local.host = remote.host.clone();
        local.split = remote.split;
        local.progress = remote.progress;
        local.added = remote.added;
        local.ended = remote.ended;
        local.speed = remote.speed;
        local.seeders = remote.seeders;
        local.status_raw = remote.status_raw.clone();
        local.status = TorrentStatus::from_raw(&remote.status_raw);

        self.events.publish(Event::TorrentSynced {
            torrent_id: local.id,
            remote_id: local.remote_id.clone(),
            status: local.status.kind().to_string(),
        });

        Ok(())
    }

    /// Choose which files to materialize and submit the selection.
    ///
    /// Mode picks the base set (availability match, everything, or manual
    /// suffixes), then the size threshold and at most one of the two regex
    /// filters narrow it. Filtering that would empty the set is discarded and
    /// the full file set is used instead. Local selected flags are updated to
    /// mirror what was submitted.
    ///
    /// # Errors
    ///
    /// Returns [`DebridError::Configuration`] for an unparsable regex and
    /// [`DebridError`] for provider failures.
    pub async fn select_files(&self, torrent: &mut LocalTorrent) -> DebridResult<Vec<i64>> {
        let all = torrent.files.clone();

        let mut picked: Vec<LocalFile> = match torrent.selection.mode {
            SelectionMode::AvailableOnly => {
                let index = self.provider.availability(&torrent.hash).await?;
                let available = flatten_available(&index);
                all.iter()
                    .filter(|file| available.iter().any(|name| file.path.ends_with(name)))
                    .cloned()
                    .collect()
            }
            SelectionMode::All => all.clone(),
            SelectionMode::Manual => all
                .iter()
                .filter(|file| {
                    torrent
                        .selection
                        .manual_files
                        .iter()
                        .any(|suffix| file.path.ends_with(suffix))
                })
                .cloned()
                .collect(),
        };

        if let Some(min_mb) = torrent.selection.min_file_size_mb {
            let threshold = min_mb * BYTES_PER_MB;
            picked.retain(|file| file.bytes > threshold);
        }

        // Include and exclude are mutually exclusive; include wins.
        if let Some(pattern) = torrent.selection.include_regex.as_deref() {
            let include = compile_rule(pattern, "include_regex")?;
            picked.retain(|file| include.is_match(&file.path));
        } else if let Some(pattern) = torrent.selection.exclude_regex.as_deref() {
            let exclude = compile_rule(pattern, "exclude_regex")?;
            picked.retain(|file| !exclude.is_match(&file.path));
        }

        let mut reason = match torrent.selection.mode {
            SelectionMode::AvailableOnly => "available_only",
            SelectionMode::All => "all",
            SelectionMode::Manual => "manual",
        };

        if picked.is_empty() && !all.is_empty() {
            picked = all.clone();
            reason = "fallback_full_set";
        }

        let ids: Vec<i64> = picked.iter().map(|file| file.id).collect();
        self.provider.select_files(&torrent.remote_id, &ids).await?;

        let chosen: HashSet<i64> = ids.iter().copied().collect();
        for file in &mut torrent.files {
            file.selected = chosen.contains(&file.id);
        }

        info!(
            torrent = %torrent.remote_id,
            selected = ids.len(),
            total = all.len(),
            reason,
            "submitted file selection"
        );
        self.events.publish(Event::SelectionApplied {
            torrent_id: torrent.id,
            selected: ids.len(),
            total: all.len(),
            reason: reason.to_string(),
        });

        Ok(ids)
    }

    /// Retrieve download links once the provider has published a stable set.
    ///
    /// The provider may publish links incrementally after marking a torrent
    /// finished; a single straggling link is tolerated for sixty seconds
    /// past the ended timestamp before being accepted as final. `None` means
    /// "not ready yet, poll again".
    ///
    /// # Errors
    ///
    /// Returns [`DebridError`] when the fresh detail fetch fails.
    pub async fn get_download_links(
        &self,
        torrent: &LocalTorrent,
    ) -> DebridResult<Option<Vec<String>>> {
        let remote = self.get_info(&torrent.remote_id).await?;
        if remote.links.is_empty() {
            return Ok(None);
        }

        let links: Vec<String> = remote
            .links
            .iter()
            .filter(|link| !link.is_empty())
            .cloned()
            .collect();
        if links.is_empty() {
            return Ok(None);
        }

        let selected = torrent.files.iter().filter(|file| file.selected).count();
        if selected == links.len() {
            return Ok(Some(links));
        }

        if torrent.selection.manual_files.len() == links.len() {
            return Ok(Some(links));
        }

        if links.len() == 1
            && let Some(ended) = remote.ended
            && Utc::now() - ended > TimeDelta::seconds(LINK_SETTLE_SECONDS)
        {
            return Ok(Some(links));
        }

        debug!(
            torrent = %torrent.remote_id,
            links = links.len(),
            selected,
            "download links not settled yet"
        );
        Ok(None)
    }
}

/// Flatten the availability index into filenames, deduplicated on the
/// (filename, filesize) pair with first occurrence winning. Entries without
/// a filename are dropped.
fn flatten_available(index: &debrix_debrid_core::AvailabilityIndex) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for variants in index.values() {
        for variant in variants {
            for file in variant {
                let Some(name) = file.filename.as_deref() else {
                    continue;
                };
                if name.is_empty() {
                    continue;
                }
                if seen.insert((name.to_string(), file.filesize)) {
                    names.push(name.to_string());
                }
            }
        }
    }
    names
}

fn compile_rule(pattern: &str, field: &'static str) -> DebridResult<Regex> {
    Regex::new(pattern).map_err(|_| DebridError::Configuration {
        section: "selection",
        field,
    })
}
