//! Core error types

use thiserror::Error;

/// Errors raised by geometry and proximity operations.
///
/// Every failure is local and synchronous: the input is rejected before any
/// computation happens, so nothing here is ever worth retrying.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeoError {
    /// Malformed coordinates or a non-positive radius
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, GeoError>;
