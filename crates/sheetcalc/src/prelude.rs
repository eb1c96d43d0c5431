//! Prelude module - common imports for sheetcalc users
//!
//! ```rust
//! use sheetcalc::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellAddress,
    CellError,
    CellRange,
    CellState,
    CellValue,

    // Error types
    Error,
    Result,

    // Engine types
    RecalcStats,
    SharedSpreadsheet,
    SheetOptions,
    Spreadsheet,
};
