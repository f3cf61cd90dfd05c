use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use super::{io_failure, EntryKind, FileSystem};
use crate::config::SymlinkPolicy;
use crate::error::Result;

/// Canonical form of a path that may not exist yet: the nearest existing
/// ancestor is resolved and the missing components are appended to it.
async fn resolve_prospective(path: &Path) -> Result<PathBuf> {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        match fs::canonicalize(existing).await {
            Ok(real) => return Ok(missing.iter().rev().fold(real, |acc, name| acc.join(name))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        missing.push(name.to_os_string());
                        existing = if parent.as_os_str().is_empty() {
                            Path::new(".")
                        } else {
                            parent
                        };
                    }
                    _ => return Err(io_failure("resolve", path, e)),
                }
            }
            Err(e) => return Err(io_failure("resolve", path, e)),
        }
    }
}

// Directory links on Windows are removed as directories.
#[cfg(windows)]
async fn remove_link(path: &Path) -> io::Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(_) => fs::remove_dir(path).await,
    }
}

#[cfg(not(windows))]
async fn remove_link(path: &Path) -> io::Result<()> {
    fs::remove_file(path).await
}

impl FileSystem {
    /// Copies a directory tree depth-first. Symbolic links are never
    /// followed; they are recreated or skipped per the config. The first
    /// failure stops the copy and nothing already copied is rolled back.
    pub async fn copy_directory(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<()> {
        let (src, dst) = (src.as_ref(), dst.as_ref());

        let src_real = fs::canonicalize(src)
            .await
            .map_err(|e| io_failure("resolve", src, e))?;
        self.reject_nested_destination(&src_real, dst).await?;
        self.create_directory(dst).await?;

        let mut pending: Vec<(PathBuf, PathBuf)> = vec![(src.to_path_buf(), dst.to_path_buf())];
        while let Some((from, to)) = pending.pop() {
            self.create_directory(&to).await?;

            for (name, kind) in self.read_entries(&from).await? {
                let (src_child, dst_child) = (from.join(&name), to.join(&name));
                match kind {
                    EntryKind::File => {
                        self.unlink_if_symlink(&dst_child).await?;
                        self.copy_file(&src_child, &dst_child).await?
                    }
                    EntryKind::Directory => {
                        self.unlink_if_symlink(&dst_child).await?;
                        pending.push((src_child, dst_child))
                    }
                    EntryKind::Symlink => match self.config.symlinks() {
                        SymlinkPolicy::Preserve => self.copy_symlink(&src_child, &dst_child).await?,
                        SymlinkPolicy::Skip => debug!("Skipping link {}", src_child.display()),
                    },
                    EntryKind::Other => warn!("Skipping special file {}", src_child.display()),
                }
            }
        }

        debug!("Copied tree {} -> {}", src.display(), dst.display());
        Ok(())
    }

    // A destination inside the source would be listed and copied into itself forever.
    // Must run before anything is created.
    async fn reject_nested_destination(&self, src_real: &Path, dst: &Path) -> Result<()> {
        let dst_real = resolve_prospective(dst).await?;

        if dst_real.starts_with(src_real) {
            let e = io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("destination {} is inside the source tree", dst.display()),
            );
            return Err(io_failure("copy directory", src_real, e));
        }
        Ok(())
    }

    // An existing link at a destination path would be written through.
    async fn unlink_if_symlink(&self, path: &Path) -> Result<()> {
        match fs::symlink_metadata(path).await {
            Ok(meta) if meta.file_type().is_symlink() => {
                debug!("Replacing link {}", path.display());
                remove_link(path)
                    .await
                    .map_err(|e| io_failure("remove link", path, e))
            }
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_failure("inspect", path, e)),
        }
    }

    async fn copy_symlink(&self, src: &Path, dst: &Path) -> Result<()> {
        let target = fs::read_link(src)
            .await
            .map_err(|e| io_failure("read link", src, e))?;
        self.unlink_if_symlink(dst).await?;
        self.delete_file_if_exists(dst).await?;

        let link = dst.to_path_buf();
        let created = tokio::task::spawn_blocking(move || symlink::symlink_auto(&target, &link))
            .await
            .unwrap_or_else(|e| Err(io::Error::new(io::ErrorKind::Other, e)));
        created.map_err(|e| io_failure("create link", dst, e))
    }

    /// Removes a directory and everything under it. A missing path is success.
    pub async fn delete_directory(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        match fs::remove_dir_all(path).await {
            Ok(()) => {
                debug!("Deleted tree {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_failure("delete directory", path, e)),
        }
    }
}
