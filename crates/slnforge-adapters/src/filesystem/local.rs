//! Local filesystem adapter using std::fs.

use std::io;
use std::path::Path;

use slnforge_core::application::ApplicationError;
use slnforge_core::application::ports::{Filesystem, WalkEntry};
use slnforge_core::error::{ForgeError, ForgeResult};
use tracing::trace;
use walkdir::WalkDir;

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> ForgeResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> ForgeResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.create_dir_all(parent)?;
        }
        trace!(path = %path.display(), bytes = content.len(), "writing file");
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn read_to_string(&self, path: &Path) -> ForgeResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn copy_file(&self, from: &Path, to: &Path) -> ForgeResult<()> {
        if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.create_dir_all(parent)?;
        }
        std::fs::copy(from, to)
            .map(|_| ())
            .map_err(|e| map_io_error(from, e, "copy file"))
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn remove_dir_all(&self, path: &Path) -> ForgeResult<()> {
        std::fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }

    fn walk(&self, root: &Path) -> ForgeResult<Vec<WalkEntry>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| ApplicationError::filesystem(root, e))?;
            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| ApplicationError::filesystem(entry.path(), e))?
                .to_path_buf();
            entries.push(if entry.file_type().is_dir() {
                WalkEntry::dir(relative)
            } else {
                WalkEntry::file(relative)
            });
        }
        Ok(entries)
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> ForgeError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let path = temp.path().join("a").join("b").join("c.txt");

        fs.write_file(&path, "hello").unwrap();

        assert!(fs.file_exists(&path));
        assert!(fs.dir_exists(&temp.path().join("a")));
        assert_eq!(fs.read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn walk_lists_parents_before_children_sorted() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        fs.write_file(&temp.path().join("b.txt"), "").unwrap();
        fs.write_file(&temp.path().join("a").join("z.txt"), "").unwrap();
        fs.write_file(&temp.path().join("a").join("y.txt"), "").unwrap();

        let walked: Vec<(String, bool)> = fs
            .walk(temp.path())
            .unwrap()
            .into_iter()
            .map(|e| (e.slashed(), e.is_dir))
            .collect();

        assert_eq!(
            walked,
            [
                ("a".to_owned(), true),
                ("a/y.txt".to_owned(), false),
                ("a/z.txt".to_owned(), false),
                ("b.txt".to_owned(), false),
            ]
        );
    }

    #[test]
    fn missing_file_reports_path() {
        let temp = TempDir::new().unwrap();
        let err = LocalFilesystem::new()
            .read_to_string(&temp.path().join("nope.txt"))
            .unwrap_err();
        assert!(err.to_string().contains("nope.txt"));
        assert!(err.to_string().contains("Failed to read file"));
    }

    #[test]
    fn copy_and_remove() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let from = temp.path().join("src.txt");
        let to = temp.path().join("out").join("dst.txt");
        fs.write_file(&from, "data").unwrap();

        fs.copy_file(&from, &to).unwrap();
        assert_eq!(fs.read_to_string(&to).unwrap(), "data");

        fs.remove_dir_all(&temp.path().join("out")).unwrap();
        assert!(!fs.dir_exists(&temp.path().join("out")));
    }
}
