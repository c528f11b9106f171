//! Conversion from Real-Debrid wire records into domain types.
//!
//! Timestamps are parsed as reported; the synchronizer applies the clock
//! offset on top, so conversion stays a pure shape mapping.

use chrono::{DateTime, Utc};
use debrix_debrid_core::{AvailabilityIndex, AvailableFile, RemoteFile, RemoteTorrent, UserInfo};

use crate::types::{AvailabilityResponse, HashAvailability, TorrentRecord, UserRecord};

pub(crate) fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
}

pub(crate) fn torrent_from_record(record: TorrentRecord) -> RemoteTorrent {
    let files = record
        .files
        .into_iter()
        .map(|file| RemoteFile {
            id: file.id,
            path: file.path,
            bytes: file.bytes,
            selected: file.selected != 0,
        })
        .collect();

    RemoteTorrent {
        added: parse_timestamp(record.added.as_deref()),
        ended: parse_timestamp(record.ended.as_deref()),
        id: record.id,
        filename: record.filename,
        original_filename: record.original_filename,
        hash: record.hash,
        bytes: record.bytes,
        original_bytes: record.original_bytes,
        host: record.host,
        split: record.split,
        progress: record.progress,
        status_raw: record.status,
        files,
        links: record.links,
        speed: record.speed,
        seeders: record.seeders,
    }
}

pub(crate) fn availability_from_response(
    hash: &str,
    response: AvailabilityResponse,
) -> AvailabilityIndex {
    let mut index = AvailabilityIndex::new();
    let Some(HashAvailability::Hosts(hosts)) = response
        .get(hash)
        .or_else(|| response.get(hash.to_lowercase().as_str()))
    else {
        return index;
    };

    for (host, variants) in hosts {
        let mut converted = Vec::with_capacity(variants.len());
        for variant in variants {
            // Variant keys are numeric file ids serialized as strings; sort
            // them numerically so dedupe order is stable.
            let mut entries: Vec<_> = variant.iter().collect();
            entries.sort_by_key(|(id, _)| id.parse::<i64>().unwrap_or(i64::MAX));
            converted.push(
                entries
                    .into_iter()
                    .map(|(_, entry)| AvailableFile {
                        filename: entry.filename.clone(),
                        filesize: entry.filesize,
                    })
                    .collect(),
            );
        }
        index.insert(host.clone(), converted);
    }

    index
}

pub(crate) fn user_from_record(record: UserRecord) -> UserInfo {
    UserInfo {
        premium: record.account_type == "premium",
        expiration: parse_timestamp(record.expiration.as_deref()),
        username: record.username,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use debrix_debrid_core::TorrentStatus;

    type TestResult<T> = Result<T>;

    #[test]
    fn torrent_record_maps_to_domain_snapshot() -> TestResult<()> {
        let record: TorrentRecord = serde_json::from_str(
            r#"{
                "id": "ABCDEF",
                "filename": "Show.S01.1080p",
                "original_filename": "Show.S01",
                "hash": "deadbeef",
                "bytes": 1000,
                "original_bytes": 2000,
                "host": "real-debrid.com",
                "split": 2,
                "progress": 42.5,
                "status": "downloading",
                "added": "2026-08-29T10:00:00Z",
                "files": [
                    {"id": 1, "path": "/show/episode1.mkv", "bytes": 500, "selected": 1},
                    {"id": 2, "path": "/show/episode2.mkv", "bytes": 500, "selected": 0}
                ],
                "links": ["https://real-debrid.com/d/one"],
                "speed": 1024,
                "seeders": 7
            }"#,
        )?;

        let torrent = torrent_from_record(record);
        assert_eq!(torrent.id, "ABCDEF");
        assert_eq!(torrent.files.len(), 2);
        assert!(torrent.files[0].selected);
        assert!(!torrent.files[1].selected);
        assert!(torrent.added.is_some());
        assert!(torrent.ended.is_none());
        assert_eq!(
            TorrentStatus::from_raw(&torrent.status_raw),
            TorrentStatus::Downloading
        );
        Ok(())
    }

    #[test]
    fn malformed_timestamps_are_dropped() {
        assert!(parse_timestamp(Some("yesterday")).is_none());
        assert!(parse_timestamp(None).is_none());
    }

    #[test]
    fn availability_flattens_hosts_and_orders_files_numerically() -> TestResult<()> {
        let response: AvailabilityResponse = serde_json::from_str(
            r#"{
                "deadbeef": {
                    "rd": [
                        {
                            "10": {"filename": "b.mkv", "filesize": 2},
                            "2": {"filename": "a.mkv", "filesize": 1}
                        }
                    ]
                }
            }"#,
        )?;

        let index = availability_from_response("deadbeef", response);
        let variants = index.get("rd").expect("rd host present");
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0][0].filename.as_deref(), Some("a.mkv"));
        assert_eq!(variants[0][1].filename.as_deref(), Some("b.mkv"));
        Ok(())
    }

    #[test]
    fn availability_tolerates_empty_array_payload() -> TestResult<()> {
        let response: AvailabilityResponse = serde_json::from_str(r#"{"deadbeef": []}"#)?;
        let index = availability_from_response("deadbeef", response);
        assert!(index.is_empty());
        Ok(())
    }

    #[test]
    fn user_record_maps_premium_flag() -> TestResult<()> {
        let record: UserRecord = serde_json::from_str(
            r#"{"username": "demo", "type": "premium", "expiration": "2027-01-01T00:00:00Z"}"#,
        )?;
        let user = user_from_record(record);
        assert!(user.premium);
        assert!(user.expiration.is_some());
        Ok(())
    }
}
