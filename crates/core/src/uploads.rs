//! Transient upload files.
//!
//! Every uploaded file is written to the upload directory under a unique name, read back once
//! and then deleted. Deletion failures are logged and swallowed so they never mask the outcome of
//! the request that produced the file.

use crate::{EraError, EraResult};
use std::path::{Path, PathBuf};

/// Directory that holds transient upload files.
#[derive(Clone, Debug)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory (and parents) if it does not exist yet.
    pub async fn ensure_exists(&self) -> EraResult<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(EraError::UploadDirCreation)
    }

    /// Write `bytes` to a new uniquely named file.
    ///
    /// The name is `<unix-millis>-<uuid>-<sanitised original name>`.
    pub async fn stage(&self, original_name: &str, bytes: &[u8]) -> EraResult<StagedUpload> {
        let filename = format!(
            "{}-{}-{}",
            chrono::Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4().simple(),
            sanitise_filename(original_name)
        );
        let path = self.root.join(filename);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(EraError::FileWrite)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "staged upload");

        Ok(StagedUpload {
            path,
            original_name: original_name.to_string(),
        })
    }
}

/// A file written by [`UploadDir::stage`] that has not been discarded yet.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    original_name: String,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub async fn read(&self) -> EraResult<Vec<u8>> {
        tokio::fs::read(&self.path).await.map_err(EraError::FileRead)
    }

    /// Delete the file. Failure is logged, never returned.
    pub async fn discard(self) {
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            let err = EraError::FileRemove(e);
            tracing::warn!(path = %self.path.display(), "{}", err);
        }
    }
}

/// Keep ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
///
/// Leading dots are stripped so the result can never be hidden or a traversal component, and an
/// empty result becomes `upload`.
pub fn sanitise_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
