//! Video entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use trainvid_core::types::{DbId, Timestamp};

/// A row from the `videos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    /// Relative locator of the stored blob, e.g. `uploads/1718000000000.mp4`.
    pub storage_path: String,
    pub created_at: Timestamp,
}

/// DTO for creating a new video.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVideo {
    pub title: String,
    pub description: Option<String>,
    pub storage_path: String,
}
