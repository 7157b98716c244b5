//! HTTP-level integration tests for progress tracking and session views.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post_json};
use serde_json::json;
use sqlx::PgPool;
use trainvid_db::models::video::CreateVideo;
use trainvid_db::repositories::VideoRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_video(pool: &PgPool, title: &str) -> i64 {
    VideoRepo::create(
        pool,
        &CreateVideo {
            title: title.to_string(),
            description: None,
            storage_path: format!("uploads/{title}.mp4"),
        },
    )
    .await
    .unwrap()
    .id
}

async fn report(
    pool: &PgPool,
    session_id: &str,
    video_id: i64,
    current_time: f64,
    duration: f64,
) -> serde_json::Value {
    let dir = tempfile::tempdir().unwrap();
    let app = build_test_app(pool.clone(), dir.path());
    let response = post_json(
        app,
        "/api/progress",
        json!({
            "sessionId": session_id,
            "videoId": video_id,
            "currentTime": current_time,
            "videoDuration": duration,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

async fn get_json(pool: &PgPool, uri: &str) -> (StatusCode, serde_json::Value) {
    let dir = tempfile::tempdir().unwrap();
    let app = build_test_app(pool.clone(), dir.path());
    let response = get(app, uri).await;
    let status = response.status();
    (status, body_json(response).await)
}

// ---------------------------------------------------------------------------
// Test: report / get scenario
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_progress_scenario(pool: PgPool) {
    let video_id = create_video(&pool, "v1").await;

    let p = report(&pool, "s1", video_id, 10.0, 100.0).await;
    assert_eq!(p["lastPosition"], 10.0);
    assert_eq!(p["completed"], false);
    assert_eq!(p["watchedVideos"], 0);
    assert_eq!(p["state"], "in_progress");

    let p = report(&pool, "s1", video_id, 100.0, 100.0).await;
    assert_eq!(p["lastPosition"], 100.0);
    assert_eq!(p["completed"], true);
    assert_eq!(p["watchedVideos"], 1);

    let p = report(&pool, "s1", video_id, 50.0, 100.0).await;
    assert_eq!(p["lastPosition"], 50.0);
    assert_eq!(p["completed"], true);
    assert_eq!(p["watchedVideos"], 1);
    assert_eq!(p["state"], "completed");

    let (status, p) = get_json(&pool, &format!("/api/progress/s1/{video_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(p["sessionId"], "s1");
    assert_eq!(p["lastPosition"], 50.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_unreported_progress_returns_zero_value(pool: PgPool) {
    let video_id = create_video(&pool, "v1").await;

    let (status, p) = get_json(&pool, &format!("/api/progress/nobody/{video_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(p["lastPosition"], 0.0);
    assert_eq!(p["completed"], false);
    assert_eq!(p["watchedVideos"], 0);
    assert_eq!(p["state"], "not_started");
    assert!(p["updatedAt"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_null_duration_does_not_complete(pool: PgPool) {
    let video_id = create_video(&pool, "v1").await;

    let dir = tempfile::tempdir().unwrap();
    let app = build_test_app(pool, dir.path());
    let response = post_json(
        app,
        "/api/progress",
        json!({
            "sessionId": "s1",
            "videoId": video_id,
            "currentTime": 12.5,
            "videoDuration": null,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let p = body_json(response).await;
    assert_eq!(p["completed"], false);
    assert_eq!(p["lastPosition"], 12.5);
}

// ---------------------------------------------------------------------------
// Test: report validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_negative_current_time_is_rejected(pool: PgPool) {
    let video_id = create_video(&pool, "v1").await;

    let dir = tempfile::tempdir().unwrap();
    let app = build_test_app(pool, dir.path());
    let response = post_json(
        app,
        "/api/progress",
        json!({
            "sessionId": "s1",
            "videoId": video_id,
            "currentTime": -3.0,
            "videoDuration": 100.0,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_blank_session_is_rejected(pool: PgPool) {
    let video_id = create_video(&pool, "v1").await;

    let dir = tempfile::tempdir().unwrap();
    let app = build_test_app(pool, dir.path());
    let response = post_json(
        app,
        "/api/progress",
        json!({
            "sessionId": "  ",
            "videoId": video_id,
            "currentTime": 3.0,
            "videoDuration": 100.0,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_report_for_unknown_video_returns_404(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let app = build_test_app(pool, dir.path());
    let response = post_json(
        app,
        "/api/progress",
        json!({
            "sessionId": "s1",
            "videoId": 424242,
            "currentTime": 3.0,
            "videoDuration": 100.0,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: session views
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_session_progress_is_scoped_to_session(pool: PgPool) {
    let v1 = create_video(&pool, "v1").await;
    let v2 = create_video(&pool, "v2").await;

    report(&pool, "s1", v2, 5.0, 60.0).await;
    report(&pool, "s1", v1, 60.0, 60.0).await;
    report(&pool, "s2", v1, 1.0, 60.0).await;

    let (status, json) = get_json(&pool, "/api/sessions/s1/progress").await;
    assert_eq!(status, StatusCode::OK);

    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["videoId"], v1);
    assert_eq!(records[1]["videoId"], v2);
    assert!(records.iter().all(|r| r["sessionId"] == "s1"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dashboard_unlocks_after_completed_prefix(pool: PgPool) {
    let v1 = create_video(&pool, "v1").await;
    let v2 = create_video(&pool, "v2").await;
    let _v3 = create_video(&pool, "v3").await;

    report(&pool, "s1", v1, 60.0, 60.0).await;
    report(&pool, "s1", v2, 30.0, 60.0).await;

    let (status, json) = get_json(&pool, "/api/sessions/s1/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sessionId"], "s1");
    assert_eq!(json["totalCount"], 3);
    assert_eq!(json["completedCount"], 1);

    let modules = json["modules"].as_array().unwrap();
    assert_eq!(modules[0]["video"]["title"], "v1");
    assert_eq!(modules[0]["position"], 1);
    assert_eq!(modules[0]["unlocked"], true);
    assert_eq!(modules[1]["unlocked"], true);
    assert_eq!(modules[1]["percentWatched"], 50.0);
    assert_eq!(modules[2]["unlocked"], false);
    assert_eq!(modules[2]["state"], "not_started");
    assert!(modules[2]["percentWatched"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dashboard_for_new_session_unlocks_only_first(pool: PgPool) {
    create_video(&pool, "v1").await;
    create_video(&pool, "v2").await;

    let (_, json) = get_json(&pool, "/api/sessions/fresh/dashboard").await;
    let unlocked: Vec<bool> = json["modules"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["unlocked"].as_bool().unwrap())
        .collect();
    assert_eq!(unlocked, vec![true, false]);
    assert_eq!(json["completedCount"], 0);
}
