use crate::domain::value_objects::FailureKind;
use std::path::PathBuf;
use thiserror::Error;

/// Required input was empty or missing; raised before any I/O happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {field}: {message}")]
pub struct InvalidInput {
    pub field: String,
    pub message: String,
}

impl InvalidInput {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<validator::ValidationErrors> for InvalidInput {
    fn from(errors: validator::ValidationErrors) -> Self {
        match first_validation_error(&errors) {
            Some((field, message)) => Self::new(field, message),
            None => Self::new("input", errors.to_string()),
        }
    }
}

/// Alphabetically first failing field, nested fields joined with `.`
fn first_validation_error(errors: &validator::ValidationErrors) -> Option<(String, String)> {
    use validator::ValidationErrorsKind;

    let mut entries: Vec<_> = errors
        .errors()
        .iter()
        .map(|(field, kind)| (field.to_string(), kind))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    entries.into_iter().find_map(|(field, kind)| match kind {
        ValidationErrorsKind::Field(details) => {
            let message = details
                .iter()
                .find_map(|detail| detail.message.as_ref().map(|m| m.to_string()))
                .or_else(|| {
                    details
                        .first()
                        .map(|detail| format!("failed '{}' validation", detail.code))
                })
                .unwrap_or_else(|| "failed validation".to_string());
            Some((field, message))
        }
        ValidationErrorsKind::Struct(inner) => first_validation_error(inner)
            .map(|(nested, message)| (format!("{}.{}", field, nested), message)),
        ValidationErrorsKind::List(items) => items
            .values()
            .find_map(|inner| first_validation_error(inner))
            .map(|(nested, message)| (format!("{}.{}", field, nested), message)),
    })
}

/// Crate-wide error, organized by what the operator can do about it
#[derive(Error, Debug)]
pub enum AddonError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    #[error("Not found: {message}")]
    NotFound {
        message: String,
        target: Option<String>,
    },

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        path: Option<PathBuf>,
    },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        message: String,
        target: Option<String>,
    },

    #[error("Merge conflict: {message}")]
    MergeConflict {
        message: String,
        path: Option<PathBuf>,
    },

    #[error("Access denied: {message}")]
    AccessDenied {
        message: String,
        target: Option<String>,
    },

    #[error("{message}")]
    Unclassified {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("File system operation failed: {message}")]
    FileSystemError {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    SerializationError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl AddonError {
    /// Build the variant matching a semantic failure kind
    pub fn from_kind(kind: FailureKind, message: impl Into<String>, target: Option<String>) -> Self {
        let message = message.into();
        match kind {
            FailureKind::InvalidInput => Self::InvalidInput(InvalidInput::new(
                target.unwrap_or_else(|| "input".to_string()),
                message,
            )),
            FailureKind::NotFound => Self::NotFound { message, target },
            FailureKind::Conflict => Self::Conflict {
                message,
                path: target.map(PathBuf::from),
            },
            FailureKind::AuthenticationFailed => Self::AuthenticationFailed { message, target },
            FailureKind::MergeConflict => Self::MergeConflict {
                message,
                path: target.map(PathBuf::from),
            },
            FailureKind::AccessDenied => Self::AccessDenied { message, target },
            FailureKind::Unclassified => Self::Unclassified {
                message,
                source: None,
            },
        }
    }

    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput(InvalidInput::new(field, message))
    }

    pub fn not_found(message: impl Into<String>, target: Option<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            target,
        }
    }

    pub fn unclassified(message: impl Into<String>) -> Self {
        Self::Unclassified {
            message: message.into(),
            source: None,
        }
    }

    pub fn filesystem_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: Some(source),
        }
    }

    pub fn config_error(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::ConfigError {
            message: message.into(),
            path,
            source: None,
        }
    }

    pub fn config_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigError {
            message: message.into(),
            path,
            source: Some(Box::new(source)),
        }
    }

    pub fn serialization_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::SerializationError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Semantic kind used by callers to decide how to react
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidInput(_) | Self::ConfigError { .. } => FailureKind::InvalidInput,
            Self::NotFound { .. } => FailureKind::NotFound,
            Self::Conflict { .. } => FailureKind::Conflict,
            Self::AuthenticationFailed { .. } => FailureKind::AuthenticationFailed,
            Self::MergeConflict { .. } => FailureKind::MergeConflict,
            Self::AccessDenied { .. } => FailureKind::AccessDenied,
            Self::Unclassified { .. }
            | Self::FileSystemError { .. }
            | Self::SerializationError { .. } => FailureKind::Unclassified,
        }
    }
}

impl From<std::io::Error> for AddonError {
    fn from(error: std::io::Error) -> Self {
        Self::filesystem_error_with_source("File system operation failed", None, error)
    }
}

impl From<serde_json::Error> for AddonError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization_error_with_source("JSON serialization failed", error)
    }
}
