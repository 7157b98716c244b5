//! Session progress entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use trainvid_core::progress::{ProgressSnapshot, ProgressState};
use trainvid_core::types::{DbId, Timestamp};

/// A row from the `session_progress` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProgress {
    pub id: DbId,
    pub session_id: String,
    pub video_id: DbId,
    pub last_position: f64,
    pub completed: bool,
    pub watched_videos: i32,
    pub video_duration: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SessionProgress {
    /// The state-machine view of this row.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            last_position: self.last_position,
            completed: self.completed,
            watched_videos: self.watched_videos,
            video_duration: self.video_duration,
        }
    }
}

/// DTO for writing the full state of a (session, video) pair.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertSessionProgress {
    pub session_id: String,
    pub video_id: DbId,
    pub last_position: f64,
    pub completed: bool,
    pub watched_videos: i32,
    pub video_duration: Option<f64>,
}

impl UpsertSessionProgress {
    pub fn from_snapshot(session_id: &str, video_id: DbId, snapshot: &ProgressSnapshot) -> Self {
        Self {
            session_id: session_id.to_string(),
            video_id,
            last_position: snapshot.last_position,
            completed: snapshot.completed,
            watched_videos: snapshot.watched_videos,
            video_duration: snapshot.video_duration,
        }
    }
}

/// API representation of a progress record.
///
/// Also used for pairs with no stored row, in which case every field is the
/// zero value and `updated_at` is `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub session_id: String,
    pub video_id: DbId,
    pub last_position: f64,
    pub completed: bool,
    pub watched_videos: i32,
    pub video_duration: Option<f64>,
    pub state: String,
    pub updated_at: Option<Timestamp>,
}

impl ProgressView {
    /// The neutral record for a pair that has never been reported.
    pub fn not_started(session_id: &str, video_id: DbId) -> Self {
        let snapshot = ProgressSnapshot::NOT_STARTED;
        Self {
            session_id: session_id.to_string(),
            video_id,
            last_position: snapshot.last_position,
            completed: snapshot.completed,
            watched_videos: snapshot.watched_videos,
            video_duration: snapshot.video_duration,
            state: ProgressState::NotStarted.as_str().to_string(),
            updated_at: None,
        }
    }
}

impl From<&SessionProgress> for ProgressView {
    fn from(row: &SessionProgress) -> Self {
        let snapshot = row.snapshot();
        Self {
            session_id: row.session_id.clone(),
            video_id: row.video_id,
            last_position: row.last_position,
            completed: row.completed,
            watched_videos: row.watched_videos,
            video_duration: row.video_duration,
            state: ProgressState::of(Some(&snapshot)).as_str().to_string(),
            updated_at: Some(row.updated_at),
        }
    }
}
