//! Music info client
//!
//! Best-effort lookup of release date, lyrics and link for a new song via
//! `GET <base_url>/info?group=<artist>&song=<title>`.
//!
//! [`MetadataProvider::lookup`] cannot fail: transport errors, non-2xx
//! responses, undecodable bodies and timeouts are logged and turned into an
//! empty [`SongDetail`], so song creation never depends on the provider
//! being reachable.

use async_trait::async_trait;
use music_lib_common::config::MusicInfoConfig;
use music_lib_common::{Error, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::repository::check_release_date;

const USER_AGENT: &str = concat!("music-lib/", env!("CARGO_PKG_VERSION"));

/// Enrichment fields returned by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDetail {
    /// `DD.MM.YYYY`
    pub release_date: String,
    pub text: String,
    pub link: String,
}

/// Faults swallowed by [`MusicInfoClient::lookup`]
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Wire shape; keys may be missing or null
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MusicInfoResponse {
    release_date: Option<String>,
    text: Option<String>,
    link: Option<String>,
}

impl From<MusicInfoResponse> for SongDetail {
    fn from(r: MusicInfoResponse) -> Self {
        Self {
            release_date: r.release_date.unwrap_or_default(),
            text: r.text.unwrap_or_default(),
            link: r.link.unwrap_or_default(),
        }
    }
}

/// External metadata lookup consumed by the catalog service
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Look up details for `title` by `artist`; empty fields on any fault
    async fn lookup(&self, artist: &str, title: &str) -> SongDetail;
}

/// HTTP client for the music info endpoint
pub struct MusicInfoClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl MusicInfoClient {
    /// Create client with the configured request timeout
    pub fn new(config: &MusicInfoConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn info_url(&self) -> std::result::Result<reqwest::Url, EnrichmentError> {
        let raw = format!("{}/info", self.base_url);
        reqwest::Url::parse(&raw).map_err(|e| EnrichmentError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    /// Query the provider, surfacing every fault
    pub async fn fetch(
        &self,
        artist: &str,
        title: &str,
    ) -> std::result::Result<SongDetail, EnrichmentError> {
        let url = self.info_url()?;

        debug!(artist, title, url = %url, "Querying music info");

        let response = self
            .http_client
            .get(url)
            .query(&[("group", artist), ("song", title)])
            .send()
            .await
            .map_err(|e| EnrichmentError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EnrichmentError::ApiError(status.as_u16(), error_text));
        }

        let info: MusicInfoResponse = response
            .json()
            .await
            .map_err(|e| EnrichmentError::ParseError(e.to_string()))?;

        Ok(info.into())
    }
}

#[async_trait]
impl MetadataProvider for MusicInfoClient {
    async fn lookup(&self, artist: &str, title: &str) -> SongDetail {
        let mut detail = match self.fetch(artist, title).await {
            Ok(detail) => detail,
            Err(e) => {
                warn!(artist, title, error = %e, "Music info lookup failed; continuing without details");
                return SongDetail::default();
            }
        };

        // Storage rejects malformed dates; drop just that field.
        if check_release_date(&detail.release_date).is_err() {
            warn!(
                artist,
                title,
                release_date = %detail.release_date,
                "Music info returned malformed release date; discarding it"
            );
            detail.release_date.clear();
        }

        detail
    }
}
