//! # sheetcalc-core
//!
//! Core data structures for the sheetcalc calculation engine.
//!
//! This crate provides the fundamental types used throughout sheetcalc:
//! - [`CellValue`] and [`CellError`] - Computed cell values and error kinds
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`SheetOptions`] - Grid dimensions, limits and display settings
//! - [`format`] - Display formatting of values
//!
//! ## Example
//!
//! ```rust
//! use sheetcalc_core::{cells_in_range, parse_range, CellValue};
//!
//! let range = parse_range("A1:B2").unwrap();
//! let names: Vec<String> = cells_in_range(range).iter().map(|a| a.to_string()).collect();
//! assert_eq!(names, ["A1", "B1", "A2", "B2"]);
//!
//! assert_eq!(CellValue::from_input("42"), CellValue::Number(42.0));
//! ```

pub mod cell;
pub mod error;
pub mod format;
pub mod options;

// Re-exports for convenience
pub use cell::{
    cells_in_range, format_address, parse_address, parse_number, parse_range, CellAddress,
    CellError, CellRange, CellValue,
};
pub use error::{Error, Result};
pub use options::SheetOptions;

/// Default upper bound on rows
pub const MAX_ROWS: u32 = 1_048_576;

/// Default upper bound on columns (A..ZZZ)
pub const MAX_COLS: u32 = 18_278;
