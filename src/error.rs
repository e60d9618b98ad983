//! Error handling for the tracker
//!
//! Defines custom error types and establishes a unified Result type
//! using anyhow for context chaining and error propagation.

use thiserror::Error;

/// Core error types for tracker operations
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("store error: {0}")]
    StoreError(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Result type alias for tracker operations
pub type Result<T> = anyhow::Result<T>;
