//! HTTP client for the statewise data feed.

use pulsewatch_core::{StatewisePayload, parse_last_modified};
use reqwest::header::LAST_MODIFIED;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("no usable Last-Modified header in response")]
    NoSignal,
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}")]
    Status { status: u16 },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Client for a single data URL.
///
/// Every request carries a fresh random `t` query parameter so that no cache
/// between us and the origin can answer with a stale copy.
pub struct DataSourceClient {
    client: reqwest::Client,
    data_url: String,
}

impl DataSourceClient {
    pub fn new(data_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), data_url)
    }

    pub fn with_client(client: reqwest::Client, data_url: impl Into<String>) -> Self {
        Self {
            client,
            data_url: data_url.into(),
        }
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// Issue a `HEAD` request and return the feed's modification time in epoch ms.
    pub async fn probe_modification_time(&self) -> Result<i64, ProbeError> {
        let resp = self
            .client
            .head(&self.data_url)
            .query(&[("t", cache_buster())])
            .send()
            .await?;

        // HeaderMap lookups are case-insensitive.
        let raw = resp
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|value| value.to_str().ok())
            .ok_or(ProbeError::NoSignal)?;

        let modified = parse_last_modified(raw).ok_or(ProbeError::NoSignal)?;
        debug!(url = %self.data_url, last_modified = raw, "probed feed");
        Ok(modified)
    }

    /// Download and parse the full payload.
    pub async fn fetch_snapshot(&self) -> Result<StatewisePayload, FetchError> {
        info!(url = %self.data_url, "fetching feed");
        let resp = self
            .client
            .get(&self.data_url)
            .query(&[("t", cache_buster())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = resp.bytes().await?;
        let payload: StatewisePayload = serde_json::from_slice(&bytes)?;
        info!(rows = payload.rows().len(), "fetched feed");
        Ok(payload)
    }
}

fn cache_buster() -> String {
    rand::random::<f64>().to_string()
}
