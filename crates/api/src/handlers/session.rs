//! Handlers for the `/sessions` resource.
//!
//! Session-scoped read models: every record of one session, and the
//! dashboard view that lays the catalog out as a watch sequence.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use trainvid_core::progress::validate_session_id;
use trainvid_core::sequence::{build_sequence, completed_count, ModuleStatus};
use trainvid_db::models::progress::{ProgressView, SessionProgress};
use trainvid_db::models::video::Video;
use trainvid_db::repositories::{ProgressRepo, VideoRepo};

use crate::error::AppResult;
use crate::state::AppState;

/// One module of the dashboard: the video plus the session's status for it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardModule {
    pub video: Video,
    #[serde(flatten)]
    pub status: ModuleStatus,
}

/// Response body for `GET /api/sessions/{session_id}/dashboard`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub session_id: String,
    pub total_count: usize,
    pub completed_count: usize,
    pub modules: Vec<DashboardModule>,
}

/// GET /api/sessions/{session_id}/progress
pub async fn list_progress(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<Json<Vec<ProgressView>>> {
    validate_session_id(&session_id)?;
    let rows = ProgressRepo::list_by_session(&state.pool, &session_id).await?;
    Ok(Json(rows.iter().map(ProgressView::from).collect()))
}

/// GET /api/sessions/{session_id}/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<Json<DashboardResponse>> {
    validate_session_id(&session_id)?;

    let videos = VideoRepo::list(&state.pool).await?;
    let by_video: HashMap<_, _> = ProgressRepo::list_by_session(&state.pool, &session_id)
        .await?
        .into_iter()
        .map(|row| (row.video_id, row))
        .collect();

    let statuses = build_sequence(
        videos
            .iter()
            .map(|v| by_video.get(&v.id).map(SessionProgress::snapshot)),
    );
    let completed = completed_count(&statuses);

    let modules: Vec<DashboardModule> = videos
        .into_iter()
        .zip(statuses)
        .map(|(video, status)| DashboardModule { video, status })
        .collect();

    Ok(Json(DashboardResponse {
        session_id,
        total_count: modules.len(),
        completed_count: completed,
        modules,
    }))
}
