//! slnforge core: solution/project file models and the template pipeline.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          slnforge-cli (binary)          │
//! └──────────────────┬──────────────────────┘
//!                    │ builds requests, executes plans
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │           Application Layer             │
//! │  TemplatePlanBuilder, TemplatePlanner,  │
//! │  TemplatePlan + steps, SolutionStore    │
//! └──────────────────┬──────────────────────┘
//!                    │ Filesystem / PlanLogger ports
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     slnforge-adapters (infrastructure)  │
//! │  LocalFilesystem, MemoryFilesystem, ... │
//! └─────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────┐
//! │          Domain Layer (no I/O)          │
//! │  Solution, ProjectFile, TemplateGraph,  │
//! │  Substitutions                          │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use slnforge_core::prelude::*;
//! # fn run(fs: Box<dyn Filesystem>, logger: Box<dyn PlanLogger>) -> ForgeResult<()> {
//! let library = TemplateLibrary::new("templates");
//! let request = TemplateRequest::new("work", "MySolution")
//!     .with_template("baseline")
//!     .with_project(ProjectRequest::new("MyLib", "library"));
//!
//! let mut plan = TemplatePlanBuilder::new(library).build_plan(&request, fs, logger)?;
//! plan.execute()?;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod domain;
pub mod error;

pub mod prelude {
    pub use crate::application::{
        PlanLogger, SolutionStore, TemplateLibrary, TemplatePlan, TemplatePlanBuilder,
        TemplatePlanner, TemplateRequest, TemplateType,
        ports::{Filesystem, WalkEntry},
    };
    pub use crate::domain::{
        ProjectFile, ProjectRequest, Solution, Substitutions, TemplateChoices, TemplateGraph,
        TemplateSet,
    };
    pub use crate::error::{ForgeError, ForgeResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
