//! Infrastructure adapters for slnforge.
//!
//! This crate implements the ports defined in `slnforge_core::application::ports`
//! and loads the template graph from TOML. It contains all of the real I/O.

pub mod filesystem;
pub mod graph_loader;
pub mod logger;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use graph_loader::{GraphLoader, LoaderError, TemplateMetadata};
pub use logger::{PLAN_TARGET, RecordingLogger, TracingLogger};
