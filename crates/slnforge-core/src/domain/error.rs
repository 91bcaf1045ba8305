// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (so plans can report them after the fact)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("{field} is required")]
    MissingRequiredField { field: &'static str },

    #[error("template set '{set}' is not tagged as a valid '{tag}'")]
    InvalidTag { set: String, tag: String },

    #[error("template set '{set}' has no option named '{option}'")]
    UnknownOption { set: String, option: String },

    #[error("invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("unknown solution version '{value}'")]
    UnknownSolutionVersion { value: String },

    // ========================================================================
    // Lookup Errors
    // ========================================================================
    #[error("template set '{name}' is unknown")]
    UnknownTemplateSet { name: String },

    // ========================================================================
    // Conflicts
    // ========================================================================
    #[error("project with this name ({name}) already exists in the solution")]
    DuplicateProject { name: String },

    // ========================================================================
    // Parse Errors
    // ========================================================================
    #[error("malformed solution file at line {line}: {reason}")]
    MalformedSolution { line: usize, reason: String },

    #[error("malformed project file: {reason}")]
    MalformedProjectFile { reason: String },

    #[error("'{value}' is not a valid GUID")]
    InvalidGuid { value: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingRequiredField { field } => vec![
                format!("Provide a value for {field}"),
                "Use --help for usage information".into(),
            ],
            Self::InvalidTag { set, .. } => vec![
                format!("Template set '{set}' cannot be used for this kind of project"),
                "Try: slnforge list sets".into(),
            ],
            Self::UnknownOption { set, option } => vec![
                format!("'{option}' is not declared by template set '{set}'"),
                "Check the option names in templates.toml".into(),
            ],
            Self::UnknownSolutionVersion { .. } => {
                vec!["Supported versions: VS2010, VS2012, VS2013".into()]
            }
            Self::UnknownTemplateSet { name } => vec![
                format!("No template set named '{name}' is registered"),
                "Try: slnforge list sets".into(),
            ],
            Self::DuplicateProject { name } => vec![
                format!("The solution already contains a project named '{name}'"),
                "Choose a different project name".into(),
            ],
            Self::MalformedSolution { line, .. } => vec![
                format!("Inspect line {line} of the solution file"),
                "Project lines look like: Project(\"{TYPE}\") = \"Name\", \"Path\", \"{GUID}\"".into(),
            ],
            Self::MalformedProjectFile { .. } => {
                vec!["Check that the project file is well-formed XML".into()]
            }
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingRequiredField { .. }
            | Self::InvalidTag { .. }
            | Self::UnknownOption { .. }
            | Self::InvalidPattern { .. }
            | Self::UnknownSolutionVersion { .. } => ErrorCategory::Validation,
            Self::UnknownTemplateSet { .. } => ErrorCategory::NotFound,
            Self::DuplicateProject { .. } => ErrorCategory::Conflict,
            Self::MalformedSolution { .. }
            | Self::MalformedProjectFile { .. }
            | Self::InvalidGuid { .. } => ErrorCategory::Parse,
        }
    }
}

/// Error categories for domain errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Conflict,
    Parse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_tag_names_set_and_tag() {
        let err = DomainError::InvalidTag {
            set: "Foo".into(),
            tag: "C".into(),
        };
        assert_eq!(
            err.to_string(),
            "template set 'Foo' is not tagged as a valid 'C'"
        );
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn duplicate_project_is_conflict() {
        let err = DomainError::DuplicateProject {
            name: "MyProject".into(),
        };
        assert_eq!(err.category(), ErrorCategory::Conflict);
        assert!(err.to_string().contains("MyProject"));
    }

    #[test]
    fn every_error_has_suggestions() {
        let errors = [
            DomainError::MissingRequiredField { field: "SetName" },
            DomainError::UnknownTemplateSet { name: "Foo".into() },
            DomainError::InvalidGuid { value: "nope".into() },
        ];
        for err in errors {
            assert!(!err.suggestions().is_empty(), "{err}");
        }
    }
}
