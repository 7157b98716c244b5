//! Route definitions for the `/sessions` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::session;
use crate::state::AppState;

/// Routes mounted at `/sessions`.
///
/// ```text
/// GET    /{session_id}/progress    -> list_progress
/// GET    /{session_id}/dashboard   -> dashboard
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{session_id}/progress", get(session::list_progress))
        .route("/{session_id}/dashboard", get(session::dashboard))
}
