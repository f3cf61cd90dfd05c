use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use super::{io_failure, FileSystem};
use crate::config::CrossDevicePolicy;
use crate::error::Result;

#[cfg(unix)]
fn is_cross_device(e: &io::Error) -> bool {
    e.raw_os_error() == Some(libc::EXDEV)
}

// ERROR_NOT_SAME_DEVICE
#[cfg(windows)]
fn is_cross_device(e: &io::Error) -> bool {
    e.raw_os_error() == Some(17)
}

#[cfg(not(any(unix, windows)))]
fn is_cross_device(_e: &io::Error) -> bool {
    false
}

impl FileSystem {
    /// Copies one file, overwriting `dst` the way the OS does.
    pub async fn copy_file(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<()> {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        let bytes = fs::copy(src, dst)
            .await
            .map_err(|e| io_failure("copy", src, e))?;
        debug!("Copied {} -> {} ({} bytes)", src.display(), dst.display(), bytes);
        Ok(())
    }

    /// Renames `src` to `dst`. Across filesystems this fails unless the
    /// config allows [`CrossDevicePolicy::CopyAndDelete`].
    pub async fn move_file(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<()> {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        match fs::rename(src, dst).await {
            Ok(()) => {
                debug!("Moved {} -> {}", src.display(), dst.display());
                Ok(())
            }
            Err(e)
                if is_cross_device(&e)
                    && self.config.cross_device() == CrossDevicePolicy::CopyAndDelete =>
            {
                info!(
                    "Rename across filesystems, copying {} -> {} instead",
                    src.display(),
                    dst.display()
                );
                self.copy_then_remove(src, dst).await
            }
            Err(e) => Err(io_failure("move", src, e)),
        }
    }

    /// Non-atomic move: the source is removed only after the copy succeeded.
    async fn copy_then_remove(&self, src: &Path, dst: &Path) -> Result<()> {
        self.copy_file(src, dst).await?;
        fs::remove_file(src)
            .await
            .map_err(|e| io_failure("remove moved", src, e))
    }

    /// Returns `true` when a file was removed, `false` when it was already absent.
    pub async fn delete_file_if_exists(&self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_failure("remove", path, e)),
        }
    }
}
