//! Formula error types

use sheetcalc_core::CellError;
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while parsing a formula or collecting its references
///
/// Evaluation never fails with this type; evaluation problems are
/// [`CellError`] values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Malformed token sequence, mismatched parentheses or trailing input
    #[error("Parse error at '{fragment}': {message}")]
    Parse { message: String, fragment: String },

    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Malformed cell address token
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Malformed range token
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Range larger than the configured limit
    #[error("Range {range} has {cells} cells (limit {max})")]
    RangeTooLarge { range: String, cells: u64, max: u64 },
}

impl FormulaError {
    /// Create a parse error for the given fragment
    pub fn parse<M: Into<String>, F: Into<String>>(message: M, fragment: F) -> Self {
        FormulaError::Parse {
            message: message.into(),
            fragment: fragment.into(),
        }
    }

    /// The cell error this failure surfaces as
    pub fn kind(&self) -> CellError {
        match self {
            FormulaError::Parse { .. } | FormulaError::UnknownFunction(_) => CellError::ParseError,
            FormulaError::InvalidAddress(_) => CellError::InvalidAddress,
            FormulaError::InvalidRange(_) | FormulaError::RangeTooLarge { .. } => {
                CellError::InvalidRange
            }
        }
    }
}
