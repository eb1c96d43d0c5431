//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The computed value of a cell
//! - [`CellError`] - Cell-local error kinds and their display codes
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A rectangular range of cells (e.g., "A1:B10")

mod address;
mod value;

pub use address::{
    cells_in_range, format_address, parse_address, parse_range, CellAddress, CellRange,
    CellRangeIterator,
};
pub use value::{parse_number, CellError, CellValue};
