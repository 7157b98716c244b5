//! Route definitions for the `/progress` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::progress;
use crate::state::AppState;

/// Routes mounted at `/progress`.
///
/// ```text
/// POST   /                          -> report
/// GET    /{session_id}/{video_id}   -> get
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(progress::report))
        .route("/{session_id}/{video_id}", get(progress::get))
}
