//! Error types for roci-ordering.
//!
//! Validation and repair never fail; violations are reported as data. Errors
//! only come from the ambient layers: loading rule files, reading transcripts,
//! and parsing configuration.

use thiserror::Error;

/// Primary error type for configuration and I/O around the ordering engine.
#[derive(Error, Debug)]
pub enum OrderingError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Rule file error: {0}")]
    RuleFile(#[from] toml::de::Error),

    #[error("Invalid ordering rule #{index}: {reason}")]
    InvalidRule { index: usize, reason: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Io,
    Serialization,
    Input,
}

impl OrderingError {
    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) | Self::RuleFile(_) | Self::InvalidRule { .. } => {
                ErrorCategory::Configuration
            }
            Self::Io(_) => ErrorCategory::Io,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::InvalidArgument(_) => ErrorCategory::Input,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, OrderingError>;
