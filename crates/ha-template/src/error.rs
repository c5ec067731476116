//! Error types for template rendering

use std::time::Duration;
use thiserror::Error;

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur during template rendering
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Failed to render template
    #[error("failed to render template: {message}")]
    RenderError { message: String },

    /// Invalid template syntax
    #[error("invalid template syntax: {message}")]
    SyntaxError { message: String },

    /// Undefined variable in template
    #[error("undefined variable: {name}")]
    UndefinedVariable { name: String },

    /// Template ran out of instruction fuel (runaway loop)
    #[error("template exceeded its execution budget")]
    OutOfFuel,

    /// Rendering did not finish in time
    #[error("template rendering timed out after {0:?}")]
    Timeout(Duration),

    /// The blocking render task panicked or was cancelled
    #[error("template render task failed: {0}")]
    TaskFailed(String),
}

impl From<minijinja::Error> for TemplateError {
    fn from(err: minijinja::Error) -> Self {
        match err.kind() {
            minijinja::ErrorKind::SyntaxError => TemplateError::SyntaxError {
                message: err.to_string(),
            },
            minijinja::ErrorKind::UndefinedError => TemplateError::UndefinedVariable {
                name: err.to_string(),
            },
            minijinja::ErrorKind::OutOfFuel => TemplateError::OutOfFuel,
            _ => TemplateError::RenderError {
                message: err.to_string(),
            },
        }
    }
}

impl From<tokio::task::JoinError> for TemplateError {
    fn from(err: tokio::task::JoinError) -> Self {
        TemplateError::TaskFailed(err.to_string())
    }
}
