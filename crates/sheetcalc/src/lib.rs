//! # sheetcalc
//!
//! A spreadsheet calculation engine: a bounded grid of cells holding
//! literals or formulas, kept consistent by incremental recalculation over
//! a dependency graph.
//!
//! ## Features
//!
//! - A1-style addresses and rectangular ranges
//! - Formulas with `+ - * /`, unary minus, parentheses and functions
//!   (`SUM`, `AVERAGE`, `MAX`, `MIN`, `COUNT`, `TRIM`, `UPPER`, `LOWER`,
//!   `REMOVE_DUPLICATES`)
//! - Circular references rejected before they reach the graph
//! - Errors stored as values and propagated to dependents
//! - Grid resizing, per-cell styles and batch find/replace
//!
//! ## Example
//!
//! ```rust
//! use sheetcalc::prelude::*;
//!
//! let mut sheet = Spreadsheet::new();
//! sheet.edit_cell("A1", "2").unwrap();
//! sheet.edit_cell("B1", "=A1/3").unwrap();
//! assert_eq!(sheet.get_display_value("B1").unwrap(), "0.67");
//!
//! sheet.edit_cell("C1", "=C1").unwrap();
//! assert_eq!(sheet.get_display_value("C1").unwrap(), "#CIRCULAR");
//! ```

pub mod calculation;
pub mod grid;
pub mod prelude;
pub mod shared;

// Re-export engine types
pub use calculation::{RecalcStats, Spreadsheet};
pub use grid::{Cell, CellState, Grid};
pub use shared::SharedSpreadsheet;

// Re-export core types
pub use sheetcalc_core::{
    cells_in_range, format, format_address, parse_address, parse_range, CellAddress, CellError,
    CellRange, CellValue, Error, Result, SheetOptions, MAX_COLS, MAX_ROWS,
};

// Re-export formula types
pub use sheetcalc_formula::{
    evaluate, parse_formula, CellLookup, DependencyGraph, EvaluationContext, FormulaError,
    FormulaExpr, FormulaResult,
};
