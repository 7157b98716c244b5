//! Repository for the `videos` table.

use sqlx::PgPool;
use trainvid_core::types::DbId;

use crate::models::video::{CreateVideo, Video};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, storage_path, created_at";

/// Provides catalog operations for videos.
pub struct VideoRepo;

impl VideoRepo {
    /// Insert a new video, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateVideo) -> Result<Video, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos (title, description, storage_path)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.storage_path)
            .fetch_one(pool)
            .await
    }

    /// Find a video by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = $1");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all videos in catalog order: creation time ascending, ties
    /// broken by ID.
    pub async fn list(pool: &PgPool) -> Result<Vec<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos ORDER BY created_at ASC, id ASC");
        sqlx::query_as::<_, Video>(&query).fetch_all(pool).await
    }

    /// Whether a video with the given ID exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM videos WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
