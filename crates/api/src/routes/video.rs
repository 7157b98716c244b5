//! Route definitions for the `/videos` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::video;
use crate::state::AppState;

/// Routes mounted at `/videos`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create (multipart: title, description, file)
/// GET    /{id}    -> get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(video::list).post(video::create))
        .route("/{id}", get(video::get_by_id))
}
