//! REST client for the training video API.
//!
//! Wraps `GET /api/videos/{id}`, `GET /api/progress/{session}/{video}` and
//! `POST /api/progress` using [`reqwest`]. The [`TrainingBackend`] trait is
//! the seam the session and reporter are written against.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use trainvid_core::types::{DbId, Timestamp};

use crate::config::PlayerConfig;

/// Video metadata as returned by the server.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub storage_path: String,
    pub created_at: Timestamp,
}

impl VideoInfo {
    /// Absolute URL of the media file on the given server.
    pub fn media_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.storage_path)
    }
}

/// Progress record as returned by the server.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressInfo {
    pub session_id: String,
    pub video_id: DbId,
    #[serde(default)]
    pub last_position: f64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub watched_videos: i32,
    #[serde(default)]
    pub video_duration: Option<f64>,
}

/// Body of `POST /api/progress`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub session_id: String,
    pub video_id: DbId,
    pub current_time: f64,
    pub video_duration: Option<f64>,
}

/// Errors from the REST client layer.
#[derive(Debug, thiserror::Error)]
pub enum PlayerApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The configured base URL cannot be turned into a request URL.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// The session id was rejected before any request was made.
    #[error("Invalid session: {0}")]
    InvalidSession(String),
}

/// Operations the playback client needs from the server.
#[async_trait]
pub trait TrainingBackend: Send + Sync {
    async fn get_video(&self, video_id: DbId) -> Result<VideoInfo, PlayerApiError>;

    async fn get_progress(
        &self,
        session_id: &str,
        video_id: DbId,
    ) -> Result<ProgressInfo, PlayerApiError>;

    async fn report_progress(
        &self,
        report: &ProgressReport,
    ) -> Result<ProgressInfo, PlayerApiError>;
}

/// HTTP client for one training video server.
pub struct PlayerApi {
    client: reqwest::Client,
    base_url: String,
}

impl PlayerApi {
    /// Create a client from configuration.
    pub fn new(config: &PlayerConfig) -> Result<Self, PlayerApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config.base_url.clone()))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }

    /// Parse a JSON response body, or return an [`PlayerApiError::Api`]
    /// if the status code is not successful.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PlayerApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlayerApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl TrainingBackend for PlayerApi {
    async fn get_video(&self, video_id: DbId) -> Result<VideoInfo, PlayerApiError> {
        let response = self
            .client
            .get(self.endpoint(&format!("/videos/{video_id}")))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn get_progress(
        &self,
        session_id: &str,
        video_id: DbId,
    ) -> Result<ProgressInfo, PlayerApiError> {
        let mut url = reqwest::Url::parse(&self.endpoint("/progress"))
            .map_err(|e| PlayerApiError::InvalidUrl(e.to_string()))?;
        // Push segments so the opaque session id is percent-encoded.
        url.path_segments_mut()
            .map_err(|()| PlayerApiError::InvalidUrl(self.base_url.clone()))?
            .push(session_id)
            .push(&video_id.to_string());

        let response = self.client.get(url).send().await?;
        Self::parse_response(response).await
    }

    async fn report_progress(
        &self,
        report: &ProgressReport,
    ) -> Result<ProgressInfo, PlayerApiError> {
        let response = self
            .client
            .post(self.endpoint("/progress"))
            .json(report)
            .send()
            .await?;
        Self::parse_response(response).await
    }
}
