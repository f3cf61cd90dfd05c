use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

use crate::encoding::Encoding;
use crate::error::Result;
use crate::fs::{io_failure, json_failure};

pub const ENCODING_ENV_VAR: &str = "FSHELPERS_ENCODING";

/// What `copy_directory` does with symbolic links found in the source tree.
/// Links are never followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymlinkPolicy {
    /// Recreate the link at the destination with the same target.
    #[default]
    Preserve,
    Skip,
}

/// What `move_file` does when a rename crosses filesystems (EXDEV).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossDevicePolicy {
    #[default]
    Fail,
    /// Copy to the destination, then remove the source. Not atomic.
    CopyAndDelete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    default_encoding: Encoding,
    symlinks: SymlinkPolicy,
    cross_device: CrossDevicePolicy,
    pretty_json: bool,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            default_encoding: Encoding::Utf8,
            symlinks: SymlinkPolicy::Preserve,
            cross_device: CrossDevicePolicy::Fail,
            pretty_json: true,
        }
    }
}

impl FsConfig {
    /// Reads a JSON config file. Missing fields take their defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .await
            .map_err(|e| io_failure("read config", path, e))?;
        let config =
            serde_json::from_str(&raw).map_err(|e| json_failure("parse config", path, e))?;
        debug!("Loaded filesystem config from {}", path.display());
        Ok(config)
    }

    /// Defaults, with `FSHELPERS_ENCODING` applied when it names a known encoding.
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var(ENCODING_ENV_VAR) {
            Ok(name) => match name.parse() {
                Ok(encoding) => config.with_default_encoding(encoding),
                Err(e) => {
                    warn!("Ignoring {}: {}", ENCODING_ENV_VAR, e);
                    config
                }
            },
            Err(_) => config,
        }
    }

    pub fn with_default_encoding(mut self, encoding: Encoding) -> Self {
        self.default_encoding = encoding;
        self
    }

    pub fn with_symlinks(mut self, policy: SymlinkPolicy) -> Self {
        self.symlinks = policy;
        self
    }

    pub fn with_cross_device(mut self, policy: CrossDevicePolicy) -> Self {
        self.cross_device = policy;
        self
    }

    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }

    // Getters
    pub fn default_encoding(&self) -> Encoding {
        self.default_encoding
    }
    pub fn symlinks(&self) -> SymlinkPolicy {
        self.symlinks
    }
    pub fn cross_device(&self) -> CrossDevicePolicy {
        self.cross_device
    }
    pub fn pretty_json(&self) -> bool {
        self.pretty_json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FsError;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[tokio::test]
    async fn test_load_fills_missing_fields() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("fs.json");
        fs::write(&path, r#"{"default_encoding": "latin1", "symlinks": "skip"}"#)
            .await
            .unwrap();

        let config = FsConfig::load(&path).await.unwrap();
        assert_eq!(config.default_encoding(), Encoding::Latin1);
        assert_eq!(config.symlinks(), SymlinkPolicy::Skip);
        assert_eq!(config.cross_device(), CrossDevicePolicy::Fail);
        assert!(config.pretty_json());
    }

    #[tokio::test]
    async fn test_load_reports_missing_and_malformed_files() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("absent.json");
        assert!(FsConfig::load(&missing).await.unwrap_err().is_not_found());

        let bad = temp_dir.path().join("bad.json");
        fs::write(&bad, "{\"cross_device\": \"teleport\"}").await.unwrap();
        assert!(matches!(
            FsConfig::load(&bad).await,
            Err(FsError::Json { .. })
        ));
    }

    // tokio::test runs on the current thread, so the scoped subscriber sees every event
    #[tokio::test]
    async fn test_load_failures_are_logged_with_op() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("absent.json");
        let bad = temp_dir.path().join("bad.json");
        fs::write(&bad, "{not json").await.unwrap();

        assert!(FsConfig::load(&missing).await.is_err());
        assert!(FsConfig::load(&bad).await.is_err());

        let text = logs.text();
        assert!(text.contains("read config"), "{text}");
        assert!(text.contains("absent.json"), "{text}");
        assert!(text.contains("parse config"), "{text}");
        assert!(text.contains("bad.json"), "{text}");
    }

    #[test]
    fn test_builder_setters() {
        let config = FsConfig::default()
            .with_default_encoding(Encoding::Hex)
            .with_cross_device(CrossDevicePolicy::CopyAndDelete)
            .with_pretty_json(false);
        assert_eq!(config.default_encoding(), Encoding::Hex);
        assert_eq!(config.cross_device(), CrossDevicePolicy::CopyAndDelete);
        assert!(!config.pretty_json());
        assert_eq!(config.symlinks(), SymlinkPolicy::Preserve);
    }
}
