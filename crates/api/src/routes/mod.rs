pub mod health;
pub mod progress;
pub mod session;
pub mod video;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /videos                                 list, upload (multipart)
/// /videos/{id}                            get
///
/// /progress                               report playback position (POST)
/// /progress/{session_id}/{video_id}       get progress (zero value if none)
///
/// /sessions/{session_id}/progress         all records for a session
/// /sessions/{session_id}/dashboard        module sequence for a session
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/videos", video::router())
        .nest("/progress", progress::router())
        .nest("/sessions", session::router())
}
