//! Application services: locate templates and assemble plans from requests.

pub mod library;
pub mod plan_builder;

pub use library::{TemplateLibrary, TemplateType};
pub use plan_builder::{TemplatePlanBuilder, TemplateRequest, TestingRequest};
