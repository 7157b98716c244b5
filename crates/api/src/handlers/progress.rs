//! Handlers for the `/progress` resource.
//!
//! Progress is keyed by an explicit, client-supplied session id and a video
//! id. Reads never fail with 404: a pair that has not been reported yet
//! comes back as a zero-value record.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use trainvid_core::error::CoreError;
use trainvid_core::progress::{validate_report, validate_session_id, PlaybackReport};
use trainvid_core::types::DbId;
use trainvid_db::models::progress::ProgressView;
use trainvid_db::repositories::{ProgressRepo, VideoRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Request body for `POST /api/progress`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportProgressRequest {
    pub session_id: String,
    pub video_id: DbId,
    pub current_time: f64,
    /// Browsers serialize an unknown (`NaN`) duration as `null`.
    #[serde(default)]
    pub video_duration: Option<f64>,
}

/// POST /api/progress
///
/// Applies a playback report to the session's record for the video,
/// creating the record on first report.
pub async fn report(
    State(state): State<AppState>,
    Json(input): Json<ReportProgressRequest>,
) -> AppResult<Json<ProgressView>> {
    validate_session_id(&input.session_id)?;
    let report = PlaybackReport {
        current_time: input.current_time,
        video_duration: input.video_duration,
    };
    validate_report(&report)?;

    if !VideoRepo::exists(&state.pool, input.video_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Video",
            id: input.video_id,
        }));
    }

    let record =
        ProgressRepo::record_report(&state.pool, &input.session_id, input.video_id, &report)
            .await?;

    tracing::debug!(
        session_id = %record.session_id,
        video_id = record.video_id,
        last_position = record.last_position,
        completed = record.completed,
        "Progress updated",
    );

    Ok(Json(ProgressView::from(&record)))
}

/// GET /api/progress/{session_id}/{video_id}
pub async fn get(
    State(state): State<AppState>,
    Path((session_id, video_id)): Path<(String, DbId)>,
) -> AppResult<Json<ProgressView>> {
    let view = ProgressRepo::find(&state.pool, &session_id, video_id)
        .await?
        .map(|row| ProgressView::from(&row))
        .unwrap_or_else(|| ProgressView::not_started(&session_id, video_id));
    Ok(Json(view))
}
