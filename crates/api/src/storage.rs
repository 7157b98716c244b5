//! Blob storage for uploaded video files.
//!
//! Handlers talk to a [`BlobStore`]; the server wires in a
//! [`LocalBlobStore`] rooted at the configured upload directory, whose
//! contents are also served statically under `/uploads`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use trainvid_core::error::CoreError;

/// URL prefix under which uploaded files are served.
pub const UPLOADS_PREFIX: &str = "uploads";

/// Number of alternative names tried when a stored filename already exists.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// A storage backend for uploaded video blobs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under a name derived from `filename` and return the
    /// locator recorded in the catalog (e.g. `uploads/1718000000000.mp4`).
    async fn put(&self, filename: &str, data: &[u8]) -> Result<String, CoreError>;

    /// Remove a previously stored blob by its locator.
    async fn remove(&self, locator: &str) -> Result<(), CoreError>;
}

/// Stores blobs as files in a local directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a locator back to a path inside the root directory.
    ///
    /// Rejects locators that do not carry the uploads prefix or that try
    /// to escape the root.
    fn resolve(&self, locator: &str) -> Result<PathBuf, CoreError> {
        let name = locator
            .strip_prefix(UPLOADS_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && !name.contains('/') && !name.contains(".."))
            .ok_or_else(|| CoreError::Storage(format!("Invalid blob locator '{locator}'")))?;
        Ok(self.root.join(name))
    }
}

/// Candidate name for the `attempt`-th try: `name.ext`, then `name-1.ext`, ...
fn candidate_name(filename: &str, attempt: u32) -> String {
    if attempt == 0 {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}-{attempt}.{ext}"),
        None => format!("{filename}-{attempt}"),
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, filename: &str, data: &[u8]) -> Result<String, CoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| CoreError::Storage(e.to_string()))?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = candidate_name(filename, attempt);
            let path = self.root.join(&name);

            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(CoreError::Storage(e.to_string())),
            };

            if let Err(e) = file.write_all(data).await {
                if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                    tracing::warn!(
                        path = %path.display(),
                        error = %cleanup,
                        "Failed to remove partially written blob",
                    );
                }
                return Err(CoreError::Storage(e.to_string()));
            }
            file.flush()
                .await
                .map_err(|e| CoreError::Storage(e.to_string()))?;

            tracing::debug!(path = %path.display(), bytes = data.len(), "Stored uploaded blob");
            return Ok(format!("{UPLOADS_PREFIX}/{name}"));
        }

        Err(CoreError::Storage(format!(
            "Could not find a free name for '{filename}'"
        )))
    }

    async fn remove(&self, locator: &str) -> Result<(), CoreError> {
        let path = self.resolve(locator)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| CoreError::Storage(e.to_string()))
    }
}
