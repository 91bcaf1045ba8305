//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use slnforge_core::application::ApplicationError;
use slnforge_core::application::ports::{Filesystem, WalkEntry};
use slnforge_core::error::ForgeResult;

/// In-memory filesystem for testing. Clones share the same contents.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: HashMap<PathBuf, String>,
    directories: HashSet<PathBuf>,
}

impl MemoryFilesystemInner {
    fn add_directory(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.directories.insert(current.clone());
        }
    }
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
        }
    }

    /// Seed a file (testing helper).
    pub fn with_file(self, path: impl AsRef<Path>, content: &str) -> ForgeResult<Self> {
        self.write_file(path.as_ref(), content)?;
        Ok(self)
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: impl AsRef<Path>) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path.as_ref()).cloned()
    }

    /// List all files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        let Ok(inner) = self.inner.read() else {
            return Vec::new();
        };
        let mut files: Vec<PathBuf> = inner.files.keys().cloned().collect();
        files.sort();
        files
    }

    /// Clear all contents.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.files.clear();
            inner.directories.clear();
        }
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> ForgeResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.add_directory(path);
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> ForgeResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        if inner.directories.contains(path) {
            return Err(ApplicationError::filesystem(path, "Path is a directory").into());
        }
        if let Some(parent) = path.parent() {
            inner.add_directory(parent);
        }
        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> ForgeResult<String> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| ApplicationError::filesystem(path, "File does not exist").into())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> ForgeResult<()> {
        let content = self.read_to_string(from)?;
        self.write_file(to, &content)
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path))
            .unwrap_or(false)
    }

    fn dir_exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn remove_dir_all(&self, path: &Path) -> ForgeResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner.directories.retain(|p| !p.starts_with(path));
        inner.files.retain(|p, _| !p.starts_with(path));
        Ok(())
    }

    fn walk(&self, root: &Path) -> ForgeResult<Vec<WalkEntry>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        if !inner.directories.contains(root) {
            return Err(ApplicationError::filesystem(root, "Directory does not exist").into());
        }

        // Path ordering is component-wise, so parents sort before children.
        let mut entries: BTreeMap<PathBuf, bool> = BTreeMap::new();
        for dir in &inner.directories {
            if let Ok(relative) = dir.strip_prefix(root) {
                if !relative.as_os_str().is_empty() {
                    entries.insert(relative.to_path_buf(), true);
                }
            }
        }
        for file in inner.files.keys() {
            if let Ok(relative) = file.strip_prefix(root) {
                entries.insert(relative.to_path_buf(), false);
            }
        }

        Ok(entries
            .into_iter()
            .map(|(path, is_dir)| {
                if is_dir {
                    WalkEntry::dir(path)
                } else {
                    WalkEntry::file(path)
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_contents() {
        let fs = MemoryFilesystem::new();
        let other = fs.clone();
        fs.write_file(Path::new("a/b.txt"), "x").unwrap();

        assert_eq!(other.read_file("a/b.txt").as_deref(), Some("x"));
        assert!(other.dir_exists(Path::new("a")));
    }

    #[test]
    fn walk_is_ordered_and_relative() {
        let fs = MemoryFilesystem::new()
            .with_file("t/z.txt", "")
            .unwrap()
            .with_file("t/a/b.txt", "")
            .unwrap();
        fs.create_dir_all(Path::new("t/empty")).unwrap();

        let walked: Vec<String> = fs
            .walk(Path::new("t"))
            .unwrap()
            .iter()
            .map(WalkEntry::slashed)
            .collect();
        assert_eq!(walked, ["a", "a/b.txt", "empty", "z.txt"]);
    }

    #[test]
    fn walk_of_missing_directory_fails() {
        assert!(MemoryFilesystem::new().walk(Path::new("nope")).is_err());
    }

    #[test]
    fn remove_dir_all_drops_nested_entries() {
        let fs = MemoryFilesystem::new()
            .with_file("out/x/y.txt", "")
            .unwrap()
            .with_file("keep.txt", "")
            .unwrap();

        fs.remove_dir_all(Path::new("out")).unwrap();

        assert_eq!(fs.list_files(), [PathBuf::from("keep.txt")]);
        assert!(!fs.dir_exists(Path::new("out/x")));
    }

    #[test]
    fn reading_missing_file_is_a_filesystem_error() {
        let err = MemoryFilesystem::new()
            .read_to_string(Path::new("missing.txt"))
            .unwrap_err();
        assert!(err.to_string().contains("missing.txt"));
    }
}
