//! Error types for the tiering calculator

use thiserror::Error;

/// Calculator result type
pub type Result<T> = std::result::Result<T, TieringError>;

/// Errors that can occur while sizing, costing or simulating
#[derive(Error, Debug)]
pub enum TieringError {
    /// Missing or malformed pricing catalog entry
    #[error("Configuration error for {architecture}: {message}")]
    Configuration {
        architecture: String,
        message: String,
    },

    /// Non-numeric or out-of-range workload input
    #[error("Invalid input for {field}: {reason}")]
    InputValidation { field: String, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TieringError {
    /// Create a configuration error scoped to one architecture
    pub fn configuration(architecture: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            architecture: architecture.into(),
            message: message.into(),
        }
    }

    /// Create an input validation error
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InputValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for errors the shell should answer by re-prompting
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InputValidation { .. })
    }
}
