//! HTTP client for the classified videos API
//!
//! Two endpoints are used:
//! - `POST /api/videos/classified` returns a channel's classified videos in a
//!   time window
//! - `POST /api/quick-editor/skip-keyword/{add|remove}` toggles whether a
//!   suggested keyword is skipped for a channel

use std::time::Duration;

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::analytics::ReviewPeriod;
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::types::VideoRecord;

/// Request body of `POST /api/videos/classified`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedVideosRequest {
    pub channel_id: String,
    /// Window start, ISO with `+00:00` suffix
    pub start: String,
    /// Window end, ISO with `+00:00` suffix
    pub end: String,
}

impl ClassifiedVideosRequest {
    /// Build the request for a review period.
    ///
    /// The API treats `end` as inclusive, so the last minute of the period is
    /// sent rather than the exclusive bound.
    pub fn for_period(channel_id: &str, period: ReviewPeriod, offset: &FixedOffset) -> Self {
        let end = period.end(offset) - chrono::Duration::minutes(1);
        Self {
            channel_id: channel_id.to_string(),
            start: format_api_timestamp(period.start(offset)),
            end: format_api_timestamp(end),
        }
    }
}

fn format_api_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Response body of `POST /api/videos/classified`
#[derive(Debug, Deserialize)]
struct ClassifiedVideosResponse {
    #[serde(default)]
    videos: Vec<VideoRecord>,
}

/// Request body of the skip-keyword endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipKeywordRequest {
    pub channel_id: String,
    pub keyword: String,
}

/// Path of the skip-keyword endpoint for the requested state.
pub(crate) fn skip_keyword_path(skipped: bool) -> &'static str {
    if skipped {
        "/api/quick-editor/skip-keyword/add"
    } else {
        "/api/quick-editor/skip-keyword/remove"
    }
}

/// HTTP client for the classified videos API
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client from configuration
    ///
    /// Returns an error if the configuration is invalid or missing required fields.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| Error::Config("api.base_url is required".to_string()))?
            .trim_end_matches('/')
            .to_string();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Base URL requests are sent to (no trailing slash)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a channel's classified videos for a window.
    pub async fn fetch_classified(
        &self,
        request: &ClassifiedVideosRequest,
    ) -> Result<Vec<VideoRecord>> {
        let url = format!("{}/api/videos/classified", self.base_url);

        tracing::debug!(
            channel_id = %request.channel_id,
            start = %request.start,
            end = %request.end,
            "Fetching classified videos"
        );

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Api(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status.is_success() {
            let body: ClassifiedVideosResponse = response
                .json()
                .await
                .map_err(|e| Error::Api(format!("failed to parse response: {}", e)))?;
            tracing::info!(
                channel_id = %request.channel_id,
                count = body.videos.len(),
                "Fetched classified videos"
            );
            Ok(body.videos)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            Err(Error::Api(format!(
                "classified videos request failed ({}): {}",
                status, error_text
            )))
        }
    }

    /// Mark a suggested keyword as skipped (or not) for a channel.
    pub async fn set_skip_keyword(
        &self,
        channel_id: &str,
        keyword: &str,
        skipped: bool,
    ) -> Result<()> {
        let url = format!("{}{}", self.base_url, skip_keyword_path(skipped));
        let request = SkipKeywordRequest {
            channel_id: channel_id.to_string(),
            keyword: keyword.to_string(),
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Api(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(channel_id, keyword, skipped, "Updated keyword skip state");
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            Err(Error::Api(format!(
                "skip keyword request failed ({}): {}",
                status, error_text
            )))
        }
    }
}

/// Synchronous wrapper for [`ApiClient`]
///
/// Provides blocking methods for use in synchronous code.
pub struct SyncApiClient {
    inner: ApiClient,
    runtime: tokio::runtime::Runtime,
}

impl SyncApiClient {
    /// Create a new sync client from configuration
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Api(format!("failed to create runtime: {}", e)))?;

        Ok(Self {
            inner: ApiClient::new(config)?,
            runtime,
        })
    }

    /// Fetch a channel's classified videos for a review period (blocking)
    pub fn fetch_classified(
        &self,
        channel_id: &str,
        period: ReviewPeriod,
        offset: &FixedOffset,
    ) -> Result<Vec<VideoRecord>> {
        let request = ClassifiedVideosRequest::for_period(channel_id, period, offset);
        self.runtime.block_on(self.inner.fetch_classified(&request))
    }

    /// Mark a suggested keyword as skipped or not (blocking)
    pub fn set_skip_keyword(&self, channel_id: &str, keyword: &str, skipped: bool) -> Result<()> {
        self.runtime
            .block_on(self.inner.set_skip_keyword(channel_id, keyword, skipped))
    }
}
