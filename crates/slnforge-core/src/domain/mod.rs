//! Core domain layer for slnforge.
//!
//! Pure file models and template resolution. Nothing here performs I/O:
//! parsing takes text and rendering returns text. Reading and writing files
//! is the application layer's job, through its ports.
//!
//! - [`solution`]: `.sln` reader/writer with round-trip fidelity
//! - [`project`]: `.csproj` properties and typed items
//! - [`msbuild`]: the lossless XML tree both of the above sit on
//! - [`graph`]: template sets and choice resolution
//! - [`substitutions`]: token replacement for generated files

pub mod error;
pub mod graph;
pub mod guid;
pub mod msbuild;
pub mod project;
pub mod solution;
pub mod substitutions;

pub use error::{DomainError, ErrorCategory};
pub use graph::{
    OptionSelection, ProjectRequest, TemplateChoices, TemplateGraph, TemplateOption, TemplateSet,
};
pub use project::{
    AnyItem, AssemblyReference, CodeFile, Content, EmbeddedResource, ItemHandle, NoneItem,
    ProjectFile, ProjectItem, ProjectReference, ProjectTypes,
};
pub use solution::{
    BuildConfiguration, GlobalSection, Solution, SolutionProject, SolutionVersion,
};
pub use substitutions::{Input, Substitutions};
