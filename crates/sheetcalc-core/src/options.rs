//! Engine configuration

/// Options controlling grid size, limits and display
///
/// The defaults give a 16 x 100 grid (A1:P100).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetOptions {
    /// Initial number of columns
    pub columns: u32,
    /// Initial number of rows
    pub rows: u32,
    /// Upper bound for `columns` when growing the grid
    pub max_columns: u32,
    /// Upper bound for `rows` when growing the grid
    pub max_rows: u32,
    /// Largest range (in cells) a formula may reference
    pub max_range_cells: u64,
    /// Decimal places shown for numbers
    pub display_decimals: usize,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            columns: 16,
            rows: 100,
            max_columns: crate::MAX_COLS,
            max_rows: crate::MAX_ROWS,
            max_range_cells: 1_000_000,
            display_decimals: 2,
        }
    }
}

impl SheetOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial grid dimensions
    pub fn with_dimensions(mut self, columns: u32, rows: u32) -> Self {
        self.columns = columns;
        self.rows = rows;
        self
    }

    /// Set the range size limit
    pub fn with_max_range_cells(mut self, max: u64) -> Self {
        self.max_range_cells = max;
        self
    }

    /// Set the number of displayed decimals
    pub fn with_display_decimals(mut self, decimals: usize) -> Self {
        self.display_decimals = decimals;
        self
    }

    /// Clamp dimensions into `1..=max`
    pub fn normalized(mut self) -> Self {
        self.max_columns = self.max_columns.max(1);
        self.max_rows = self.max_rows.max(1);
        self.columns = self.columns.clamp(1, self.max_columns);
        self.rows = self.rows.clamp(1, self.max_rows);
        self
    }
}
