//! Error types for almanac operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlmanacError {
    /// Normalization or parsing could not produce a usable instant.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A textual grammar (duration, strict datetime, recurrence rule) did not match.
    #[error("Format error: {0}")]
    Format(String),

    /// A caller-supplied unit, amount or coordinate is not acceptable.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An optional capability was requested but not provided.
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, AlmanacError>;
