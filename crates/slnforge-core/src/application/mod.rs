//! Application layer for slnforge.
//!
//! This layer contains:
//! - **Plans**: ordered steps executed against a shared context
//! - **Planners**: template directory → plan steps
//! - **Services**: template library and plan builder
//! - **Ports**: traits for the filesystem and plan logging
//! - **Errors**: application-specific error types
//!
//! File formats and template resolution live in `crate::domain`; this layer
//! decides when files are read and written.

pub mod error;
pub mod plan;
pub mod planning;
pub mod ports;
pub mod services;
pub mod store;

#[cfg(test)]
mod testing;

pub use plan::{PlanContext, ProjectPlan, TemplatePlan, TemplateStep};
pub use planning::{FileSet, PlanScope, TemplatePlanner};
pub use services::{TemplateLibrary, TemplatePlanBuilder, TemplateRequest, TemplateType, TestingRequest};
pub use store::SolutionStore;

// Re-export port traits (for adapter implementation)
pub use ports::{Filesystem, PlanLogger, WalkEntry};

pub use error::ApplicationError;
