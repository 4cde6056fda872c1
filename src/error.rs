//! Unified error types for the crate using `thiserror`.
//!
//! All errors are fatal for the current run: nothing is retried, and the
//! caller is expected to abort inference when one surfaces.

use thiserror::Error;

/// Error type for all fallible operations in the crate.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// Invalid input data (allele outside {0, 1}, non-monotonic positions,
    /// empty panels, length mismatches)
    #[error("invalid input data: {message}")]
    InvalidData { message: String },

    /// An internal invariant was violated. This indicates an algorithm bug,
    /// not a problem with the input.
    #[error("invariant violation: {message}")]
    InvariantViolation { message: String },

    /// All likelihood segments reached zero while matching, despite the
    /// per-site normalization.
    #[error("numeric underflow in copying model at site {site}")]
    NumericUnderflow { site: usize },

    /// A query was matched against an empty set of eligible parents.
    #[error("no eligible parent ancestors for a non-empty query")]
    NoEligibleParents,

    /// Invalid configuration (rates outside [0, 1], zero block sizes)
    #[error("configuration error: {message}")]
    Config { message: String },

    /// I/O errors from data loading or table export
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for results using [`InferenceError`].
pub type Result<T> = std::result::Result<T, InferenceError>;

impl InferenceError {
    /// Create an invalid data error with a message
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create an invariant violation error
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
