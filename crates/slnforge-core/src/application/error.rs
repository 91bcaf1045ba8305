//! Application layer errors.
//!
//! These represent orchestration failures. File model and template graph
//! violations are `DomainError`s.

use std::path::PathBuf;

use thiserror::Error;

use crate::error::ErrorCategory;

#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// A step needing the solution ran before any step provided one.
    #[error("'{step}' requires an active solution")]
    NoActiveSolution { step: String },

    /// A project-scoped operation ran outside a project plan.
    #[error("'{step}' requires a current project")]
    NoActiveProject { step: String },

    #[error("{kind} template '{name}' not found")]
    TemplateNotFound { kind: &'static str, name: String },

    #[error("Template plan has already been executed")]
    PlanAlreadyExecuted,

    /// Shared state lock was poisoned.
    #[error("Filesystem store lock error")]
    StoreLockError,

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl ApplicationError {
    pub fn filesystem(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::FilesystemError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// User-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::NoActiveSolution { .. } => vec![
                "Pass a solution name so the plan creates or reads one first".into(),
            ],
            Self::NoActiveProject { .. } => vec![
                "Project templates can only be applied to a named project".into(),
            ],
            Self::TemplateNotFound { kind, .. } => vec![
                format!("Try: slnforge list {kind}"),
                "Or point --library at a different template library".into(),
            ],
            Self::StoreLockError => vec!["Try again in a moment".into()],
            _ => vec!["Check the error details above".into()],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FilesystemError { .. } | Self::PlanAlreadyExecuted | Self::StoreLockError => {
                ErrorCategory::Internal
            }
            Self::NoActiveSolution { .. }
            | Self::NoActiveProject { .. }
            | Self::ValidationFailed(_) => ErrorCategory::Validation,
            Self::TemplateNotFound { .. } => ErrorCategory::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_template_is_not_found() {
        let err = ApplicationError::TemplateNotFound {
            kind: "project",
            name: "web".into(),
        };
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(err.to_string(), "project template 'web' not found");
        assert!(err.suggestions()[0].contains("slnforge list project"));
    }
}
