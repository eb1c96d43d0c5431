//! Error types for sheetcalc-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the public API surface
///
/// These reject a call outright. Problems inside a formula never surface
/// here; they become [`CellError`](crate::CellError) values instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid cell range format
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Address outside the current grid dimensions
    #[error("Cell {address} is outside the grid ({columns} columns x {rows} rows)")]
    OutOfBounds {
        address: String,
        columns: u32,
        rows: u32,
    },

    /// Range larger than the configured limit
    #[error("Range of {cells} cells exceeds the limit of {max}")]
    RangeTooLarge { cells: u64, max: u64 },

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
