//! Handlers for the `/videos` resource.
//!
//! Videos are listed in catalog order (creation time ascending), which is
//! the order viewers are expected to watch them in.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use trainvid_core::error::CoreError;
use trainvid_core::types::DbId;
use trainvid_core::upload;
use trainvid_db::models::video::{CreateVideo, Video};
use trainvid_db::repositories::VideoRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Multipart field names accepted for the video file.
const FILE_FIELDS: &[&str] = &["file", "video"];

/// GET /api/videos
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Video>>> {
    let videos = VideoRepo::list(&state.pool).await?;
    Ok(Json(videos))
}

/// GET /api/videos/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Video>> {
    let video = VideoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Video",
            id,
        }))?;
    Ok(Json(video))
}

/// POST /api/videos
///
/// Accepts a multipart form with a required `title`, an optional
/// `description` and a required `file` (or `video`) field. The file is
/// written to the blob store first; if the catalog insert then fails the
/// blob is removed again.
pub async fn create(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Video>)> {
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut file_data: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "title" => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            "description" => {
                description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            n if FILE_FIELDS.contains(&n) => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file_data = Some((filename, data.to_vec()));
            }
            _ => {} // ignore unknown fields
        }
    }

    let title = upload::validate_title(title.as_deref().unwrap_or(""))?;
    let description = upload::normalize_description(description);

    let (filename, data) = file_data.ok_or_else(|| {
        AppError::Core(CoreError::Validation("Missing required 'file' field".into()))
    })?;
    let ext = upload::validate_video_extension(&filename)?;
    if data.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Uploaded file is empty".into(),
        )));
    }

    let stored_name = upload::stored_filename(chrono::Utc::now(), &ext);
    let storage_path = state.blob_store.put(&stored_name, &data).await?;

    let input = CreateVideo {
        title,
        description,
        storage_path,
    };

    match VideoRepo::create(&state.pool, &input).await {
        Ok(video) => {
            tracing::info!(
                video_id = video.id,
                storage_path = %video.storage_path,
                bytes = data.len(),
                "Video uploaded",
            );
            Ok((StatusCode::CREATED, Json(video)))
        }
        Err(e) => {
            if let Err(cleanup) = state.blob_store.remove(&input.storage_path).await {
                tracing::warn!(
                    storage_path = %input.storage_path,
                    error = %cleanup,
                    "Failed to remove orphaned upload",
                );
            }
            Err(e.into())
        }
    }
}
