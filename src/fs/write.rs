use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use super::{encoding_failure, io_failure, json_failure, FileSystem};
use crate::encoding::{Content, Encoding};
use crate::error::Result;

impl FileSystem {
    /// Creates parent directories for the given file path if they don't exist
    async fn create_parent_dirs(&self, path: &Path) -> Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.create_directory(parent).await,
            _ => Ok(()),
        }
    }

    /// Writes (truncating) after creating the parent directory. If the
    /// directory cannot be created the write is not attempted.
    pub async fn write_content_to_file(
        &self,
        path: impl AsRef<Path>,
        data: impl Into<Content>,
    ) -> Result<()> {
        self.write_content_to_file_with(path, data, self.config.default_encoding())
            .await
    }

    pub async fn write_content_to_file_with(
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

        self.create_parent_dirs(path).await?;
        fs::write(path, &bytes)
            .await
            .map_err(|e| io_failure("write", path, e))?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    /// Serializes `value` as JSON and writes it like
    /// [`FileSystem::write_content_to_file`].
    pub async fn write_json_file<T: Serialize + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        value: &T,
    ) -> Result<()> {
        let path = path.as_ref();
        let json = if self.config.pretty_json() {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
        .map_err(|e| json_failure("serialize JSON", path, e))?;
        self.write_content_to_file_with(path, json, Encoding::Utf8)
            .await
    }
}
