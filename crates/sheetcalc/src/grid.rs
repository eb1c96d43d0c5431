//! Sparse cell grid
//!
//! Cells are kept in a `BTreeMap` keyed by address, so iteration is always
//! row-major. Absent cells read as empty. A cell is created on its first
//! write and never removed; clearing it resets it to empty.

use crate::{CellAddress, CellValue, Error, FormulaExpr, Result};
use sheetcalc_formula::CellLookup;
use std::collections::BTreeMap;
use tracing::warn;

/// Recalculation state of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellState {
    /// Value is current
    #[default]
    Clean,
    /// Awaiting evaluation in the current pass
    Dirty,
    /// Being evaluated
    Evaluating,
    /// Settled on an error value until the next edit
    Error,
}

/// A single cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Location
    pub address: CellAddress,
    /// Exact text last written
    pub raw_input: String,
    /// Parsed formula, if the raw input is an accepted formula
    pub formula: Option<FormulaExpr>,
    /// Last computed value
    pub cached_value: CellValue,
    /// Presentation properties (e.g. `fontWeight` -> `bold`)
    pub styles: BTreeMap<String, String>,
    /// Recalculation state
    pub state: CellState,
}

impl Cell {
    /// Create an empty cell
    pub fn new(address: CellAddress) -> Self {
        Self {
            address,
            raw_input: String::new(),
            formula: None,
            cached_value: CellValue::Empty,
            styles: BTreeMap::new(),
            state: CellState::Clean,
        }
    }

    /// Whether the cell holds an accepted formula
    pub fn is_formula(&self) -> bool {
        self.formula.is_some()
    }
}

/// The grid of cells plus its current dimensions
#[derive(Debug, Clone)]
pub struct Grid {
    cells: BTreeMap<CellAddress, Cell>,
    columns: u32,
    rows: u32,
}

impl Grid {
    /// Create an empty grid
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            cells: BTreeMap::new(),
            columns,
            rows,
        }
    }

    /// Current number of columns
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Current number of rows
    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub(crate) fn set_dimensions(&mut self, columns: u32, rows: u32) {
        self.columns = columns;
        self.rows = rows;
    }

    /// Whether the address lies within the current dimensions
    pub fn contains(&self, addr: CellAddress) -> bool {
        addr.col < self.columns && addr.row >= 1 && addr.row <= self.rows
    }

    /// Fail with [`Error::OutOfBounds`] unless the address is inside the grid
    pub fn check_bounds(&self, addr: CellAddress) -> Result<()> {
        if self.contains(addr) {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                address: addr.to_string(),
                columns: self.columns,
                rows: self.rows,
            })
        }
    }

    /// Get a cell, if it was ever written
    pub fn get(&self, addr: CellAddress) -> Option<&Cell> {
        self.cells.get(&addr)
    }

    /// Get a mutable cell, if it was ever written
    pub fn get_mut(&mut self, addr: CellAddress) -> Option<&mut Cell> {
        self.cells.get_mut(&addr)
    }

    /// Get a cell, creating it if needed
    pub fn entry(&mut self, addr: CellAddress) -> &mut Cell {
        self.cells.entry(addr).or_insert_with(|| Cell::new(addr))
    }

    /// Cached value of a cell (`Empty` if never written)
    pub fn value(&self, addr: CellAddress) -> CellValue {
        self.cells
            .get(&addr)
            .map(|cell| cell.cached_value.clone())
            .unwrap_or_default()
    }

    /// All written cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Addresses of all formula cells in row-major order
    pub fn formula_cells(&self) -> impl Iterator<Item = CellAddress> + '_ {
        self.cells
            .values()
            .filter(|cell| cell.is_formula())
            .map(|cell| cell.address)
    }

    /// Number of written cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell was ever written
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl CellLookup for Grid {
    fn get_value(&self, addr: CellAddress) -> CellValue {
        match self.cells.get(&addr) {
            Some(cell) => {
                if matches!(cell.state, CellState::Dirty | CellState::Evaluating) {
                    warn!(cell = %addr, state = ?cell.state, "read of a cell that is not settled");
                }
                cell.cached_value.clone()
            }
            None => CellValue::Empty,
        }
    }

    fn contains(&self, addr: CellAddress) -> bool {
        Grid::contains(self, addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    #[test]
    fn test_bounds() {
        let grid = Grid::new(16, 100);
        assert!(grid.contains(a("A1")));
        assert!(grid.contains(a("P100")));
        assert!(!grid.contains(a("Q1")));
        assert!(!grid.contains(a("A101")));
        assert!(matches!(
            grid.check_bounds(a("Q1")),
            Err(Error::OutOfBounds { columns: 16, rows: 100, .. })
        ));
    }

    #[test]
    fn test_entry_creates_once() {
        let mut grid = Grid::new(4, 4);
        assert!(grid.is_empty());
        grid.entry(a("B2")).raw_input = "x".to_string();
        grid.entry(a("B2"));
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.get(a("B2")).unwrap().raw_input, "x");
        assert_eq!(grid.value(a("C3")), CellValue::Empty);
    }

    #[test]
    fn test_iteration_is_row_major() {
        let mut grid = Grid::new(4, 4);
        for name in ["B2", "A2", "C1"] {
            grid.entry(a(name));
        }
        let order: Vec<String> = grid.iter().map(|c| c.address.to_string()).collect();
        assert_eq!(order, vec!["C1", "A2", "B2"]);
    }
}
