//! Error types

use thiserror::Error;

/// Raised when a numeric version component is negative or not a number
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotNumericError {
    #[error("Major version must be a non-negative number formatted as string")]
    Major(String),
    #[error("Minor version must be a non-negative number formatted as string")]
    Minor(String),
    #[error("Micro version must be a non-negative number formatted as string")]
    Micro(String),
}

impl NotNumericError {
    /// The rejected input
    pub fn value(&self) -> &str {
        match self {
            NotNumericError::Major(value) | NotNumericError::Minor(value) | NotNumericError::Micro(value) => value,
        }
    }
}

/// Error type for parsing, detection and map interchange
#[derive(Error, Debug)]
pub enum VersionError {
    #[error(transparent)]
    NotNumeric(#[from] NotNumericError),
    #[error("\"{0}\" property is required")]
    MissingProperty(&'static str),
    #[error("\"{0}\" property must be a string")]
    NullProperty(&'static str),
    #[error("Invalid version pattern: {0}")]
    Pattern(#[from] fancy_regex::Error),
    #[error("Invalid version JSON: {0}")]
    Json(#[from] serde_json::Error),
}
