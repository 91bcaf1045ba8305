//! Application ports (traits) for external dependencies.
//!
//! - `Filesystem`: every read and write a plan performs
//! - `PlanLogger`: step and project progress of a running plan
//!
//! Adapters in `slnforge-adapters` implement these.

pub mod output;

pub use output::{Filesystem, PlanLogger, WalkEntry};

#[cfg(test)]
pub use output::MockFilesystem;
