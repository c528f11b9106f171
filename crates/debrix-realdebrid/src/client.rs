//! Real-Debrid HTTP client implementing the provider contract.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use debrix_config::{ConfigError, ProviderSettings, validate_provider_settings};
use debrix_debrid_core::{
    AvailabilityIndex, DebridError, DebridProvider, DebridResult, RemoteTorrent, UserInfo,
};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::convert::{availability_from_response, torrent_from_record, user_from_record};
use crate::types::{
    AddTorrentResponse, AvailabilityResponse, TorrentRecord, UnrestrictResponse, UserRecord,
};

const SERVER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// HTTP client for the Real-Debrid REST API.
///
/// Credentials are validated eagerly at construction; a missing API key is a
/// fatal configuration error and never retried. Transport failures are
/// logged with the associated torrent identity and propagated so the caller
/// can retry on its own cadence.
#[derive(Clone, Debug)]
pub struct RealDebridClient {
    http: reqwest::Client,
    base_url: String,
}

impl RealDebridClient {
    /// Construct a client for the given provider settings.
    ///
    /// # Errors
    ///
    /// Returns [`DebridError::Configuration`] when the settings are invalid
    /// and [`DebridError::Transport`] when the HTTP client cannot be built.
    pub fn new(settings: &ProviderSettings) -> DebridResult<Self> {
        validate_provider_settings(settings).map_err(|err| match err {
            ConfigError::MissingField { section, field }
            | ConfigError::InvalidField { section, field, .. } => {
                DebridError::Configuration { section, field }
            }
        })?;

        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", settings.api_key.trim());
        let mut value = HeaderValue::from_str(&bearer).map_err(|_| DebridError::Configuration {
            section: "provider",
            field: "api_key",
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .default_headers(headers)
            .build()
            .map_err(|err| DebridError::transport("build_client", None, err))?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn send(
        &self,
        operation: &'static str,
        torrent: Option<&str>,
        request: reqwest::RequestBuilder,
    ) -> DebridResult<Response> {
        let response = request.send().await.map_err(|err| {
            warn!(
                operation,
                torrent = torrent.unwrap_or("-"),
                error = %err,
                "real-debrid request failed"
            );
            DebridError::transport(operation, torrent.map(str::to_string), err)
        })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DebridError::NotFound {
                torrent: torrent.unwrap_or_default().to_string(),
            });
        }

        response.error_for_status().map_err(|err| {
            warn!(
                operation,
                torrent = torrent.unwrap_or("-"),
                error = %err,
                "real-debrid request rejected"
            );
            DebridError::transport(operation, torrent.map(str::to_string), err)
        })
    }

    async fn decode<T: DeserializeOwned>(
        operation: &'static str,
        response: Response,
    ) -> DebridResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|err| DebridError::Protocol {
                operation,
                detail: err.to_string(),
            })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        torrent: Option<&str>,
        path: &str,
    ) -> DebridResult<T> {
        let response = self
            .send(operation, torrent, self.http.get(self.url(path)))
            .await?;
        Self::decode(operation, response).await
    }
}

#[async_trait]
impl DebridProvider for RealDebridClient {
    async fn list_torrents(
        &self,
        offset: usize,
        limit: usize,
    ) -> DebridResult<Vec<RemoteTorrent>> {
        let path = format!("torrents?offset={offset}&limit={limit}");
        let records: Vec<TorrentRecord> = self.get_json("list_torrents", None, &path).await?;
        debug!(offset, count = records.len(), "fetched torrent listing page");
        Ok(records.into_iter().map(torrent_from_record).collect())
    }

    async fn user_info(&self) -> DebridResult<UserInfo> {
        let record: UserRecord = self.get_json("user_info", None, "user").await?;
        Ok(user_from_record(record))
    }

    async fn add_magnet(&self, magnet: &str) -> DebridResult<String> {
        let request = self
            .http
            .post(self.url("torrents/addMagnet"))
            .form(&[("magnet", magnet)]);
        let response = self.send("add_magnet", None, request).await?;
        let added: AddTorrentResponse = Self::decode("add_magnet", response).await?;
        Ok(added.id)
    }

    async fn add_file(&self, bytes: &[u8]) -> DebridResult<String> {
        let request = self
            .http
            .put(self.url("torrents/addTorrent"))
            .body(bytes.to_vec());
        let response = self.send("add_file", None, request).await?;
        let added: AddTorrentResponse = Self::decode("add_file", response).await?;
        Ok(added.id)
    }

    async fn availability(&self, hash: &str) -> DebridResult<AvailabilityIndex> {
        let path = format!("torrents/instantAvailability/{hash}");
        let response: AvailabilityResponse = self.get_json("availability", None, &path).await?;
        Ok(availability_from_response(hash, response))
    }

    async fn torrent_info(&self, id: &str) -> DebridResult<RemoteTorrent> {
        let path = format!("torrents/info/{id}");
        let record: TorrentRecord = self.get_json("torrent_info", Some(id), &path).await?;
        Ok(torrent_from_record(record))
    }

    async fn select_files(&self, id: &str, file_ids: &[i64]) -> DebridResult<()> {
        let joined = file_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let request = self
            .http
            .post(self.url(&format!("torrents/selectFiles/{id}")))
            .form(&[("files", joined.as_str())]);
        self.send("select_files", Some(id), request).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> DebridResult<()> {
        let request = self.http.delete(self.url(&format!("torrents/delete/{id}")));
        self.send("delete", Some(id), request).await?;
        Ok(())
    }

    async fn unrestrict_link(&self, link: &str) -> DebridResult<String> {
        let request = self
            .http
            .post(self.url("unrestrict/link"))
            .form(&[("link", link)]);
        let response = self.send("unrestrict_link", None, request).await?;
        let unrestricted: UnrestrictResponse = Self::decode("unrestrict_link", response).await?;
        Ok(unrestricted.download)
    }

    async fn server_time(&self) -> DebridResult<NaiveDateTime> {
        let response = self.send("server_time", None, self.http.get(self.url("time"))).await?;
        let body = response
            .text()
            .await
            .map_err(|err| DebridError::transport("server_time", None, err))?;
        NaiveDateTime::parse_from_str(body.trim(), SERVER_TIME_FORMAT).map_err(|err| {
            DebridError::Protocol {
                operation: "server_time",
                detail: err.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_key: &str) -> ProviderSettings {
        ProviderSettings {
            api_key: api_key.to_string(),
            base_url: "https://api.real-debrid.com/rest/1.0/".to_string(),
            timeout_secs: 100,
        }
    }

    #[test]
    fn blank_api_key_is_a_fatal_configuration_error() {
        let err = RealDebridClient::new(&settings("  ")).expect_err("expected rejection");
        assert!(matches!(
            err,
            DebridError::Configuration {
                section: "provider",
                field: "api_key",
            }
        ));
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = RealDebridClient::new(&settings("key")).expect("client builds");
        assert_eq!(
            client.url("torrents/info/ABC"),
            "https://api.real-debrid.com/rest/1.0/torrents/info/ABC"
        );
    }

    #[test]
    fn debug_output_does_not_leak_credentials() {
        let client = RealDebridClient::new(&settings("secret-key")).expect("client builds");
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("secret-key"));
    }

    #[test]
    fn server_time_format_parses_provider_payload() {
        let parsed = NaiveDateTime::parse_from_str("2026-08-30 12:30:00", SERVER_TIME_FORMAT);
        assert!(parsed.is_ok());
    }
}
