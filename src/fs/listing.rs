use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{io_failure, FileSystem};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    /// Sockets, FIFOs, device nodes.
    Other,
}

impl EntryKind {
    fn from_file_type(file_type: std::fs::FileType) -> Self {
        if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        }
    }
}

/// One item of a directory listing. The kind comes from the entry itself;
/// symbolic links are reported as links, not as their targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
}

impl FileSystem {
    /// Reads one level of `path` without converting names.
    pub(super) async fn read_entries(&self, path: &Path) -> Result<Vec<(OsString, EntryKind)>> {
        let mut reader = fs::read_dir(path)
            .await
            .map_err(|e| io_failure("list", path, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| io_failure("list", path, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| io_failure("inspect", &entry.path(), e))?;
            entries.push((entry.file_name(), EntryKind::from_file_type(file_type)));
        }

        entries.sort();
        Ok(entries)
    }

    /// Lists one level of `path`, sorted by name. Non-UTF-8 names are
    /// converted lossily.
    pub async fn list_entries(&self, path: impl AsRef<Path>) -> Result<Vec<Entry>> {
        Ok(self
            .read_entries(path.as_ref())
            .await?
            .into_iter()
            .map(|(name, kind)| Entry {
                name: name.to_string_lossy().into_owned(),
                kind,
            })
            .collect())
    }

    async fn list_names_where(
        &self,
        path: &Path,
        keep: impl Fn(EntryKind) -> bool,
    ) -> Result<Vec<String>> {
        Ok(self
            .list_entries(path)
            .await?
            .into_iter()
            .filter(|entry| keep(entry.kind))
            .map(|entry| entry.name)
            .collect())
    }

    pub async fn list_file_names(&self, path: impl AsRef<Path>) -> Result<Vec<String>> {
        self.list_names_where(path.as_ref(), |kind| kind == EntryKind::File)
            .await
    }

    pub async fn list_directory_names(&self, path: impl AsRef<Path>) -> Result<Vec<String>> {
        self.list_names_where(path.as_ref(), |kind| kind == EntryKind::Directory)
            .await
    }

    pub async fn list_file_and_directory_names(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Vec<String>> {
        self.list_names_where(path.as_ref(), |kind| {
            matches!(kind, EntryKind::File | EntryKind::Directory)
        })
        .await
    }

    /// Same selection as [`FileSystem::list_file_and_directory_names`], each
    /// name joined onto `path`.
    pub async fn list_file_and_directory_paths(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Vec<PathBuf>> {
        let path = path.as_ref();
        Ok(self
            .read_entries(path)
            .await?
            .into_iter()
            .filter(|(_, kind)| matches!(kind, EntryKind::File | EntryKind::Directory))
            .map(|(name, _)| path.join(name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    async fn fixture(root: &Path) {
        tokio::fs::write(root.join("b.txt"), "b").await.unwrap();
        tokio::fs::write(root.join("a.txt"), "a").await.unwrap();
        tokio::fs::create_dir(root.join("sub")).await.unwrap();
        #[cfg(unix)]
        tokio::fs::symlink(root.join("a.txt"), root.join("link"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_filters_by_kind() {
        let temp_dir = tempdir().unwrap();
        fixture(temp_dir.path()).await;
        let fs = FileSystem::new();

        assert_eq!(
            fs.list_file_names(temp_dir.path()).await.unwrap(),
            vec!["a.txt", "b.txt"]
        );
        assert_eq!(
            fs.list_directory_names(temp_dir.path()).await.unwrap(),
            vec!["sub"]
        );
        assert_eq!(
            fs.list_file_and_directory_names(temp_dir.path())
                .await
                .unwrap(),
            vec!["a.txt", "b.txt", "sub"]
        );
        assert_eq!(
            fs.list_file_and_directory_paths(temp_dir.path())
                .await
                .unwrap(),
            vec![
                temp_dir.path().join("a.txt"),
                temp_dir.path().join("b.txt"),
                temp_dir.path().join("sub"),
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_entries_reports_links_as_links() {
        let temp_dir = tempdir().unwrap();
        fixture(temp_dir.path()).await;
        let fs = FileSystem::new();

        let entries = fs.list_entries(temp_dir.path()).await.unwrap();
        let link = entries.iter().find(|e| e.name == "link").unwrap();
        assert_eq!(link.kind, EntryKind::Symlink);
        assert_eq!(entries.len(), 4);
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_not_found() {
        let temp_dir = tempdir().unwrap();
        let fs = FileSystem::new();

        let err = fs
            .list_file_names(temp_dir.path().join("absent"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_empty_directory() {
        let temp_dir = tempdir().unwrap();
        let fs = FileSystem::new();

        assert!(fs.list_entries(temp_dir.path()).await.unwrap().is_empty());
    }
}
