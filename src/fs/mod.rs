//! # FileSystem
//!
//! Async wrappers over `tokio::fs`. Every failure is logged with the
//! operation and path, then returned as an [`FsError`]; a missing path is
//! always [`FsError::NotFound`] so callers can treat absence as an ordinary
//! outcome.

mod listing;
mod transfer;
mod tree;
mod write;

pub use listing::{Entry, EntryKind};

use serde::de::DeserializeOwned;
use std::io;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::config::FsConfig;
use crate::encoding::{Content, Encoding};
use crate::error::{EncodingError, FsError, Result};

/// Stateless handle; cloning is cheap and the config is never mutated.
#[derive(Debug, Clone, Default)]
pub struct FileSystem {
    config: FsConfig,
}

/// Wraps and logs an I/O failure.
pub(crate) fn io_failure(op: &'static str, path: &Path, source: io::Error) -> FsError {
    let err = FsError::io(op, path, source);
    warn!(op, path = %path.display(), error = %err, "filesystem operation failed");
    err
}

pub(crate) fn encoding_failure(
    op: &'static str,
    path: &Path,
    encoding: Encoding,
    source: EncodingError,
) -> FsError {
    let err = FsError::Encoding {
        path: path.to_path_buf(),
        encoding,
        source,
    };
    warn!(op, path = %path.display(), %encoding, error = %err, "content conversion failed");
    err
}

pub(crate) fn json_failure(op: &'static str, path: &Path, source: serde_json::Error) -> FsError {
    let err = FsError::Json {
        path: path.to_path_buf(),
        source,
    };
    warn!(op, path = %path.display(), error = %err, "JSON processing failed");
    err
}

impl FileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    pub async fn read_file_bytes(&self, path: impl AsRef<Path>) -> Result<Vec<u8>> {
        let path = path.as_ref();
        fs::read(path).await.map_err(|e| io_failure("read", path, e))
    }

    /// Reads the whole file as text in the configured default encoding.
    pub async fn read_file_content(&self, path: impl AsRef<Path>) -> Result<String> {
        self.read_file_content_with(path, self.config.default_encoding())
            .await
    }

    pub async fn read_file_content_with(
        &self,
        path: impl AsRef<Path>,
        encoding: Encoding,
    ) -> Result<String> {
        let path = path.as_ref();
        let bytes = self.read_file_bytes(path).await?;
        encoding
            .decode(bytes)
            .map_err(|e| encoding_failure("decode", path, encoding, e))
    }

    /// Appends to the file, creating it if absent. The parent directory must exist.
    pub async fn append_to_file(
        &self,
        path: impl AsRef<Path>,
        data: impl Into<Content>,
    ) -> Result<()> {
        self.append_to_file_with(path, data, self.config.default_encoding())
            .await
    }

    pub async fn append_to_file_with(
        &self,
        path: impl AsRef<Path>,
        data: impl Into<Content>,
        encoding: Encoding,
    ) -> Result<()> {
        let path = path.as_ref();
        let bytes = data
            .into()
            .into_bytes(encoding)
            .map_err(|e| encoding_failure("encode", path, encoding, e))?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| io_failure("open for append", path, e))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| io_failure("append to", path, e))?;
        file.flush()
            .await
            .map_err(|e| io_failure("append to", path, e))?;

        debug!("Appended {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    pub async fn get_file_size(&self, path: impl AsRef<Path>) -> Result<u64> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| io_failure("stat", path, e))?;
        Ok(metadata.len())
    }

    pub async fn read_json_file<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> Result<T> {
        let path = path.as_ref();
        let raw = self.read_file_content_with(path, Encoding::Utf8).await?;
        serde_json::from_str(&raw).map_err(|e| json_failure("parse JSON", path, e))
    }

    /// `false` for a missing path, and also for a path that could not be
    /// checked (logged). Use [`FileSystem::try_exists`] to tell them apart.
    pub async fn path_exists(&self, path: impl AsRef<Path>) -> bool {
        self.try_exists(path).await.unwrap_or(false)
    }

    pub async fn try_exists(&self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        fs::try_exists(path)
            .await
            .map_err(|e| io_failure("check existence of", path, e))
    }

    /// Creates the directory and any missing ancestors. Succeeds if it already exists.
    pub async fn create_directory(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::create_dir_all(path)
            .await
            .map_err(|e| io_failure("create directory", path, e))?;
        debug!("Ensured directory {}", path.display());
        Ok(())
    }

    /// Like [`FileSystem::create_directory`] but never fails; the outcome is
    /// the return value.
    pub async fn ensure_directory_exists(&self, path: impl AsRef<Path>) -> bool {
        self.create_directory(path).await.is_ok()
    }
}
