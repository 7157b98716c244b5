//! Repository for the `session_progress` table.
//!
//! One row per (session_id, video_id), guarded by the
//! `uq_session_progress_session_video` constraint. Writes are upserts on
//! that key. `last_position` is last-write-wins; `completed`,
//! `watched_videos` and a known `video_duration` are merged so a write
//! computed from a stale read can never undo a completion.

use sqlx::PgPool;
use trainvid_core::progress::{apply_report, PlaybackReport};
use trainvid_core::types::DbId;

use crate::models::progress::{SessionProgress, UpsertSessionProgress};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, session_id, video_id, last_position, completed, \
    watched_videos, video_duration, created_at, updated_at";

/// Provides find-or-create progress operations.
pub struct ProgressRepo;

impl ProgressRepo {
    // ── Standard CRUD ────────────────────────────────────────────────

    /// Find the record for a (session, video) pair.
    pub async fn find(
        pool: &PgPool,
        session_id: &str,
        video_id: DbId,
    ) -> Result<Option<SessionProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM session_progress WHERE session_id = $1 AND video_id = $2"
        );
        sqlx::query_as::<_, SessionProgress>(&query)
            .bind(session_id)
            .bind(video_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or update the record for a (session, video) pair.
    ///
    /// On conflict the completion fields only move forward and a missing
    /// duration keeps the stored one.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertSessionProgress,
    ) -> Result<SessionProgress, sqlx::Error> {
        let query = format!(
            "INSERT INTO session_progress
                (session_id, video_id, last_position, completed, watched_videos, video_duration)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT ON CONSTRAINT uq_session_progress_session_video DO UPDATE SET
                last_position = EXCLUDED.last_position,
                completed = session_progress.completed OR EXCLUDED.completed,
                watched_videos = GREATEST(session_progress.watched_videos, EXCLUDED.watched_videos),
                video_duration = COALESCE(EXCLUDED.video_duration, session_progress.video_duration),
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SessionProgress>(&query)
            .bind(&input.session_id)
            .bind(input.video_id)
            .bind(input.last_position)
            .bind(input.completed)
            .bind(input.watched_videos)
            .bind(input.video_duration)
            .fetch_one(pool)
            .await
    }

    /// List every record for a session in catalog order of the videos.
    pub async fn list_by_session(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Vec<SessionProgress>, sqlx::Error> {
        sqlx::query_as::<_, SessionProgress>(
            "SELECT p.id, p.session_id, p.video_id, p.last_position, p.completed, \
                    p.watched_videos, p.video_duration, p.created_at, p.updated_at \
             FROM session_progress p \
             JOIN videos v ON v.id = p.video_id \
             WHERE p.session_id = $1 \
             ORDER BY v.created_at ASC, v.id ASC",
        )
        .bind(session_id)
        .fetch_all(pool)
        .await
    }

    // ── Progress-specific operations ─────────────────────────────────

    /// Apply a playback report to the stored record and persist the result.
    ///
    /// Reads the current row (if any), runs the state-machine transition and
    /// issues exactly one write. The report is assumed to be validated.
    pub async fn record_report(
        pool: &PgPool,
        session_id: &str,
        video_id: DbId,
        report: &PlaybackReport,
    ) -> Result<SessionProgress, sqlx::Error> {
        let existing = Self::find(pool, session_id, video_id).await?;
        let previous = existing.as_ref().map(SessionProgress::snapshot);
        let next = apply_report(previous.as_ref(), report);

        if next.completed && !previous.is_some_and(|p| p.completed) {
            tracing::info!(session_id, video_id, "Video completed for session");
        }

        Self::upsert(
            pool,
            &UpsertSessionProgress::from_snapshot(session_id, video_id, &next),
        )
        .await
    }
}
