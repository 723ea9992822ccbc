//! Error types for array store access.

use stac_common::DashboardError;
use thiserror::Error;

/// Errors that can occur while opening or slicing an array.
#[derive(Error, Debug)]
pub enum ArrayStoreError {
    /// Failed to open the store or the variable inside it.
    #[error("failed to open array {locator}{path}: {message}")]
    OpenFailed {
        locator: String,
        path: String,
        message: String,
    },

    /// Failed to read data from the array.
    #[error("failed to read array data: {0}")]
    ReadFailed(String),

    /// The slice has a different number of dimensions than the array.
    #[error("slice has {slice} dimensions but array has {array}")]
    RankMismatch { slice: usize, array: usize },

    /// A fixed index lies outside the dimension's extent.
    #[error("index {index} out of bounds for dimension {dimension} of length {length}")]
    SliceOutOfBounds {
        dimension: usize,
        index: u64,
        length: u64,
    },

    /// Element type that cannot be converted to f64.
    #[error("unsupported data type: {0}")]
    UnsupportedDataType(String),

    /// The read was cancelled before it completed.
    #[error("read cancelled")]
    Cancelled,
}

impl ArrayStoreError {
    /// Create an OpenFailed error.
    pub fn open_failed(
        locator: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::OpenFailed {
            locator: locator.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a ReadFailed error.
    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed(msg.into())
    }
}

impl From<ArrayStoreError> for DashboardError {
    fn from(err: ArrayStoreError) -> Self {
        match err {
            ArrayStoreError::Cancelled => DashboardError::Cancelled("array read".to_string()),
            other => DashboardError::ArrayStore(other.to_string()),
        }
    }
}

/// Result type for array store operations.
pub type Result<T> = std::result::Result<T, ArrayStoreError>;
