#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use trainvid_api::config::ServerConfig;
use trainvid_api::router::build_app_router;
use trainvid_api::state::AppState;
use trainvid_api::storage::{BlobStore, LocalBlobStore};

/// Multipart boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "trainvid-test-boundary";

/// Build a test `ServerConfig` with safe defaults, storing uploads in
/// `upload_dir`.
pub fn test_config(upload_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: String::new(),
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        upload_dir: upload_dir.to_path_buf(),
        max_upload_bytes: 10 * 1024 * 1024,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and upload directory.
pub fn build_test_app(pool: PgPool, upload_dir: &Path) -> Router {
    build_test_app_with_store(pool, upload_dir, Arc::new(LocalBlobStore::new(upload_dir)))
}

/// Like [`build_test_app`] but with a caller-supplied blob store.
pub fn build_test_app_with_store(
    pool: PgPool,
    upload_dir: &Path,
    blob_store: Arc<dyn BlobStore>,
) -> Router {
    let config = test_config(upload_dir);
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        blob_store,
    };
    build_app_router(state, &config)
}

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with a `multipart/form-data` body built by
/// [`multipart_body`].
pub async fn post_multipart(app: Router, uri: &str, body: Vec<u8>) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// A multipart part: `(field name, optional file name, content)`.
pub type Part<'a> = (&'a str, Option<&'a str>, &'a [u8]);

/// Encode parts as a `multipart/form-data` body using [`BOUNDARY`].
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(f) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}
