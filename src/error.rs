use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::encoding::Encoding;

pub type Result<T, E = FsError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Content is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("Content is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("Content is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
    #[error("Unknown encoding: {0}")]
    Unknown(String),
}

#[derive(Error, Debug)]
pub enum FsError {
    #[error("Failed to {op} {}: path not found", path.display())]
    NotFound { op: &'static str, path: PathBuf },

    #[error("Failed to {op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to process JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to convert {} as {encoding}: {source}", path.display())]
    Encoding {
        path: PathBuf,
        encoding: Encoding,
        #[source]
        source: EncodingError,
    },
}

impl FsError {
    /// Wraps an I/O error with the operation and path it came from.
    /// `ErrorKind::NotFound` becomes [`FsError::NotFound`].
    pub fn io(op: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { op, path }
        } else {
            Self::Io { op, path, source }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path, .. }
            | Self::Io { path, .. }
            | Self::Json { path, .. }
            | Self::Encoding { path, .. } => path,
        }
    }
}

/// Treats [`FsError::NotFound`] as an expected outcome.
pub trait NotFoundExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> NotFoundExt<T> for Result<T> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
