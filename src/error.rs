//! Domain-specific error types for frame-audit

use thiserror::Error;

/// Main error type for the frame-audit service
#[derive(Error, Debug)]
pub enum FrameAuditError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Provider error: {message}")]
    Provider { message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Generated analysis violated the output contract ({} issue(s))", errors.len())]
    Contract { errors: Vec<String> },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl FrameAuditError {
    /// Transient failures get exactly one retry at the generation step.
    /// Contract violations are permanent: the model produced well-formed JSON
    /// that fails the shape rules, and a retry is not part of that budget.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FrameAuditError::Provider { .. } | FrameAuditError::Parse { .. }
        )
    }
}

impl From<anyhow::Error> for FrameAuditError {
    fn from(err: anyhow::Error) -> Self {
        FrameAuditError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FrameAuditError {
    fn from(err: serde_json::Error) -> Self {
        FrameAuditError::Parse {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for FrameAuditError {
    fn from(err: reqwest::Error) -> Self {
        FrameAuditError::Provider {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

impl From<crate::clients::GenerateError> for FrameAuditError {
    fn from(err: crate::clients::GenerateError) -> Self {
        FrameAuditError::Provider {
            message: err.to_string(),
        }
    }
}

impl From<crate::validation::InputError> for FrameAuditError {
    fn from(err: crate::validation::InputError) -> Self {
        FrameAuditError::Validation {
            message: err.to_string(),
        }
    }
}

/// Result type alias for frame-audit operations
pub type Result<T> = std::result::Result<T, FrameAuditError>;
