//! Error types shared by the access path and the statistics layer.

use crate::storage::page::PageId;
use thiserror::Error;

/// Errors that can occur while reading tables or estimating over them.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("{what} {index} out of range (limit: {limit})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        limit: usize,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid cursor state: {0}")]
    State(&'static str),

    #[error("No more tuples")]
    NoSuchElement,

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Corrupt page {page_id}: {reason}")]
    CorruptPage { page_id: PageId, reason: String },

    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}

impl DbError {
    pub(crate) fn out_of_range(what: &'static str, index: usize, limit: usize) -> Self {
        DbError::OutOfRange { what, index, limit }
    }
}

/// Result type for access and statistics operations.
pub type DbResult<T> = Result<T, DbError>;
