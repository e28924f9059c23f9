//! Error types for SVMP estimation
//!
//! Provides a unified error type for all svmp crates.

use thiserror::Error;

/// Core error type for survey estimation
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Insufficient data for the requested operation
    #[error("Insufficient data: expected at least {expected} samples, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// A stratum is missing a constant its extrapolation type needs
    #[error("Missing stratum constant: {constant} is required for stratum '{stratum}'")]
    MissingStratumConstant { stratum: String, constant: String },

    /// Geomorphic/sampling stratum pair not present in the lookup table
    #[error("Unknown stratum: no analysis stratum for geomorph '{geo}', sampling '{sampling}'")]
    UnknownStratum { geo: String, sampling: String },

    /// A site in the sampling frame has no statistics
    #[error("Missing site: {site} ({context})")]
    MissingSite { site: String, context: String },

    /// Unit conversion flag that is not supported
    #[error("Conversion type, {0}, is not available")]
    UnsupportedConversion(String),

    /// Numerical computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// IO error (for file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON configuration error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error for size mismatch
    pub fn size_mismatch(expected: usize, actual: usize, context: &str) -> Self {
        Self::InvalidInput(format!(
            "Size mismatch in {context}: expected {expected}, got {actual}"
        ))
    }

    /// Create an error for NaN/Inf values
    pub fn non_finite(context: &str) -> Self {
        Self::Computation(format!("{context} contains NaN or infinite values"))
    }

    /// Create an error for a stratum constant that was never supplied
    pub fn missing_constant(stratum: impl Into<String>, constant: impl Into<String>) -> Self {
        Self::MissingStratumConstant {
            stratum: stratum.into(),
            constant: constant.into(),
        }
    }

    /// Whether this error reflects an upstream configuration mismatch
    /// rather than a property of the data
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingStratumConstant { .. }
                | Self::UnknownStratum { .. }
                | Self::MissingSite { .. }
                | Self::UnsupportedConversion(_)
        )
    }
}
