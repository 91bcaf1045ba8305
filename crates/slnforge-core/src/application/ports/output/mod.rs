//! Driven (output) ports, implemented by infrastructure.

use std::path::{Path, PathBuf};

use crate::error::ForgeResult;

/// One entry found by [`Filesystem::walk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path relative to the walked root.
    pub relative_path: PathBuf,
    pub is_dir: bool,
}

impl WalkEntry {
    pub fn file(relative_path: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
            is_dir: false,
        }
    }

    pub fn dir(relative_path: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
            is_dir: true,
        }
    }

    /// 1 for direct children of the walked root.
    pub fn depth(&self) -> usize {
        self.relative_path.components().count()
    }

    /// `/`-separated relative path.
    pub fn slashed(&self) -> String {
        self.relative_path
            .iter()
            .map(|segment| segment.to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Port for filesystem operations.
///
/// Implemented by:
/// - `slnforge_adapters::filesystem::LocalFilesystem` (production)
/// - `slnforge_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> ForgeResult<()>;

    /// Write `content` to a file, creating parent directories.
    fn write_file(&self, path: &Path, content: &str) -> ForgeResult<()>;

    fn read_to_string(&self, path: &Path) -> ForgeResult<String>;

    fn copy_file(&self, from: &Path, to: &Path) -> ForgeResult<()>;

    fn file_exists(&self, path: &Path) -> bool;

    fn dir_exists(&self, path: &Path) -> bool;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> ForgeResult<()>;

    /// Every entry below `root`, parents before children, siblings sorted
    /// by name.
    fn walk(&self, root: &Path) -> ForgeResult<Vec<WalkEntry>>;
}

/// Receives progress of an executing plan.
///
/// Implemented by:
/// - `slnforge_adapters::logger::TracingLogger` (forwards to `tracing`)
/// - `slnforge_adapters::logger::RecordingLogger` (in-memory transcript)
pub trait PlanLogger: Send + Sync {
    fn trace(&self, message: &str);

    fn start_step(&self, step: &str) {
        self.trace(step);
    }

    fn start_project(&self, name: &str) {
        self.trace(&format!("Creating project {name}"));
    }

    fn trace_alteration(&self, alteration: &str) {
        self.trace(&format!("  {alteration}"));
    }

    fn end_project(&self, _name: &str) {}
}
