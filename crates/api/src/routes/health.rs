use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Whether the upload directory exists and uploads can be served.
    pub uploads_ready: bool,
}

/// GET /health -- database and upload directory status.
///
/// Always 200; `status` is `degraded` when either check fails.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = trainvid_db::health_check(&state.pool).await.is_ok();
    let uploads_ready = tokio::fs::metadata(&state.config.upload_dir)
        .await
        .is_ok_and(|m| m.is_dir());

    if !db_healthy {
        tracing::warn!("Health check: database unreachable");
    }
    if !uploads_ready {
        tracing::warn!(
            upload_dir = %state.config.upload_dir.display(),
            "Health check: upload directory missing",
        );
    }

    let status = if db_healthy && uploads_ready { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        uploads_ready,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
