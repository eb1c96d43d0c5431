//! Spreadsheet calculation engine
//!
//! Every edit runs the same pipeline: validate the target, parse formula
//! text and collect its references, reject edits that would close a cycle,
//! commit the raw input together with the new dependency edges, then
//! re-evaluate the edited cell and everything that transitively reads it in
//! dependency order.
//!
//! # Example
//!
//! ```rust
//! use sheetcalc::Spreadsheet;
//!
//! let mut sheet = Spreadsheet::new();
//! sheet.edit_cell("A1", "5").unwrap();
//! sheet.edit_cell("A2", "10").unwrap();
//! sheet.edit_cell("A3", "=SUM(A1:A2)").unwrap();
//! assert_eq!(sheet.get_display_value("A3").unwrap(), "15");
//!
//! sheet.edit_cell("A1", "7").unwrap();
//! assert_eq!(sheet.get_display_value("A3").unwrap(), "17");
//! ```

use crate::grid::{CellState, Grid};
use crate::{
    evaluate, parse_formula, CellAddress, CellError, CellRange, CellValue, DependencyGraph, Error,
    EvaluationContext, FormulaExpr, Result, SheetOptions,
};
use sheetcalc_core::format::format_value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// Statistics from a recalculation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecalcStats {
    /// Formula cells evaluated, in evaluation order
    pub order: Vec<CellAddress>,
    /// Number of cells calculated
    pub cells_calculated: usize,
    /// Number of cells that ended on an error value
    pub errors: usize,
    /// Whether the edit was rejected as a circular reference
    pub circular: bool,
}

/// What an edit will commit
enum StagedEdit {
    /// Plain value
    Literal(CellValue),
    /// Accepted formula with its flattened references
    Formula {
        expr: FormulaExpr,
        references: BTreeSet<CellAddress>,
    },
    /// Formula that failed to parse or reference a valid range
    Invalid(CellError),
    /// Formula that would close a cycle
    Circular,
}

/// A grid of cells with incremental recalculation
#[derive(Debug, Clone)]
pub struct Spreadsheet {
    grid: Grid,
    graph: DependencyGraph,
    options: SheetOptions,
}

impl Default for Spreadsheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Spreadsheet {
    /// Create a spreadsheet with default options (A1:P100)
    pub fn new() -> Self {
        Self::with_options(SheetOptions::default())
    }

    /// Create a spreadsheet with custom options
    pub fn with_options(options: SheetOptions) -> Self {
        let options = options.normalized();
        Self {
            grid: Grid::new(options.columns, options.rows),
            graph: DependencyGraph::new(),
            options,
        }
    }

    /// Active options
    pub fn options(&self) -> &SheetOptions {
        &self.options
    }

    /// The cell grid
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The dependency graph
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Current `(columns, rows)`
    pub fn dimensions(&self) -> (u32, u32) {
        (self.grid.columns(), self.grid.rows())
    }

    // === Editing ===

    /// Write raw text into a cell and recompute everything it affects
    ///
    /// Text starting with `=` is a formula; anything else is a literal.
    /// Formula problems never fail the call; they become the cell's error
    /// value. Only a bad or out-of-bounds address is rejected.
    pub fn edit_cell(&mut self, address: &str, text: &str) -> Result<RecalcStats> {
        let addr = CellAddress::parse(address)?;
        self.edit_cell_at(addr, text)
    }

    /// Write raw text into a cell by address
    pub fn edit_cell_at(&mut self, addr: CellAddress, text: &str) -> Result<RecalcStats> {
        self.grid.check_bounds(addr)?;

        let staged = self.stage(addr, text);
        let circular = matches!(staged, StagedEdit::Circular);
        self.commit(addr, text, staged);

        let mut subset = self.graph.affected_closure(addr);
        subset.insert(addr);
        let mut stats = self.recalculate(&subset);
        stats.circular = circular;

        debug!(
            cell = %addr,
            affected = subset.len(),
            calculated = stats.cells_calculated,
            circular,
            "edited cell"
        );

        Ok(stats)
    }

    fn stage(&self, addr: CellAddress, text: &str) -> StagedEdit {
        if !text.starts_with('=') {
            return StagedEdit::Literal(CellValue::from_input(text));
        }

        let expr = match parse_formula(text) {
            Ok(expr) => expr,
            Err(e) => {
                debug!(cell = %addr, error = %e, "formula rejected");
                return StagedEdit::Invalid(e.kind());
            }
        };

        let references = match expr.referenced_cells(self.options.max_range_cells) {
            Ok(references) => references,
            Err(e) => {
                debug!(cell = %addr, error = %e, "formula rejected");
                return StagedEdit::Invalid(e.kind());
            }
        };

        if self.graph.would_create_cycle(addr, &references) {
            debug!(cell = %addr, "circular reference rejected");
            return StagedEdit::Circular;
        }

        StagedEdit::Formula { expr, references }
    }

    fn commit(&mut self, addr: CellAddress, text: &str, staged: StagedEdit) {
        let (formula, value, state) = match staged {
            StagedEdit::Formula { expr, references } => {
                self.graph.set_dependencies(addr, references);
                (Some(expr), CellValue::Empty, CellState::Dirty)
            }
            StagedEdit::Literal(value) => {
                self.graph.clear_dependencies(addr);
                (None, value, CellState::Clean)
            }
            StagedEdit::Invalid(kind) => {
                self.graph.clear_dependencies(addr);
                (None, CellValue::Error(kind), CellState::Error)
            }
            StagedEdit::Circular => {
                self.graph.clear_dependencies(addr);
                (None, CellValue::Error(CellError::Circular), CellState::Error)
            }
        };

        let cell = self.grid.entry(addr);
        cell.raw_input = text.to_string();
        cell.formula = formula;
        cell.cached_value = value;
        cell.state = state;
    }

    // === Recalculation ===

    /// Re-evaluate every formula cell in dependency order
    ///
    /// On a grid whose values are already current this changes nothing.
    pub fn recalculate_all(&mut self) -> RecalcStats {
        let subset: BTreeSet<CellAddress> = self.grid.formula_cells().collect();
        let stats = self.recalculate(&subset);
        debug!(calculated = stats.cells_calculated, errors = stats.errors, "full recalculation");
        stats
    }

    fn recalculate(&mut self, subset: &BTreeSet<CellAddress>) -> RecalcStats {
        let order = self.graph.topo_order(subset);
        let mut stats = RecalcStats::default();

        for &addr in &order {
            if let Some(cell) = self.grid.get_mut(addr) {
                if cell.is_formula() {
                    cell.state = CellState::Dirty;
                }
            }
        }

        for addr in order {
            if let Some(value) = self.evaluate_cell(addr) {
                stats.cells_calculated += 1;
                if value.is_error() {
                    stats.errors += 1;
                }
                stats.order.push(addr);
            }
        }

        stats
    }

    /// Evaluate one formula cell; `None` for non-formula cells
    fn evaluate_cell(&mut self, addr: CellAddress) -> Option<CellValue> {
        let cell = self.grid.get_mut(addr)?;
        if !cell.is_formula() {
            return None;
        }
        cell.state = CellState::Evaluating;

        let value = {
            let expr = self.grid.get(addr)?.formula.as_ref()?;
            let ctx = EvaluationContext::new(&self.grid)
                .with_current_cell(addr)
                .with_max_range_cells(self.options.max_range_cells);
            evaluate(expr, &ctx)
        };

        trace!(cell = %addr, value = ?value, "evaluated");

        let cell = self.grid.get_mut(addr)?;
        cell.state = if value.is_error() {
            CellState::Error
        } else {
            CellState::Clean
        };
        cell.cached_value = value.clone();
        Some(value)
    }

    // === Queries ===

    /// Display text of a cell
    ///
    /// Numbers are rounded to the configured decimals, errors render as
    /// their code (`#ERROR`, `#CIRCULAR`, ...), empty cells as "".
    pub fn get_display_value(&self, address: &str) -> Result<String> {
        self.get_display_value_at(CellAddress::parse(address)?)
    }

    /// Display text of a cell by address
    pub fn get_display_value_at(&self, addr: CellAddress) -> Result<String> {
        self.grid.check_bounds(addr)?;
        Ok(format_value(
            &self.grid.value(addr),
            self.options.display_decimals,
        ))
    }

    /// Exact text last written to a cell ("" if never written)
    pub fn get_raw_input(&self, address: &str) -> Result<String> {
        self.get_raw_input_at(CellAddress::parse(address)?)
    }

    /// Exact text last written to a cell by address
    pub fn get_raw_input_at(&self, addr: CellAddress) -> Result<String> {
        self.grid.check_bounds(addr)?;
        Ok(self
            .grid
            .get(addr)
            .map(|cell| cell.raw_input.clone())
            .unwrap_or_default())
    }

    /// Cached value of a cell
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        self.grid.check_bounds(addr)?;
        Ok(self.grid.value(addr))
    }

    /// Recalculation state of a cell
    pub fn cell_state(&self, address: &str) -> Result<CellState> {
        let addr = CellAddress::parse(address)?;
        self.grid.check_bounds(addr)?;
        Ok(self
            .grid
            .get(addr)
            .map(|cell| cell.state)
            .unwrap_or_default())
    }

    /// Addresses of all formula cells in row-major order
    pub fn formula_cells(&self) -> Vec<CellAddress> {
        self.grid.formula_cells().collect()
    }

    // === Find / replace ===

    /// Rewrite every cell whose raw text matches `predicate`
    ///
    /// Matches are collected in row-major order first, then each rewrite goes
    /// through [`edit_cell_at`](Self::edit_cell_at) so dependents recompute.
    /// Returns the number of cells whose text changed.
    pub fn batch_find_replace<P, T>(&mut self, predicate: P, transform: T) -> Result<usize>
    where
        P: Fn(&str) -> bool,
        T: Fn(&str) -> String,
    {
        let edits: Vec<(CellAddress, String)> = self
            .grid
            .iter()
            .filter(|cell| self.grid.contains(cell.address) && predicate(&cell.raw_input))
            .filter_map(|cell| {
                let replaced = transform(&cell.raw_input);
                (replaced != cell.raw_input).then_some((cell.address, replaced))
            })
            .collect();

        for (addr, text) in &edits {
            self.edit_cell_at(*addr, text)?;
        }

        debug!(replaced = edits.len(), "find/replace");
        Ok(edits.len())
    }

    // === Grid dimensions ===

    /// Append a column
    pub fn add_column(&mut self) -> Result<RecalcStats> {
        let (columns, rows) = self.dimensions();
        if columns >= self.options.max_columns {
            return Err(Error::other(format!(
                "column limit of {} reached",
                self.options.max_columns
            )));
        }
        self.resize(columns + 1, rows)
    }

    /// Remove the last column; at least one column always remains
    pub fn remove_column(&mut self) -> Result<RecalcStats> {
        let (columns, rows) = self.dimensions();
        if columns <= 1 {
            return Err(Error::other("cannot remove the last column"));
        }
        self.resize(columns - 1, rows)
    }

    /// Append a row
    pub fn add_row(&mut self) -> Result<RecalcStats> {
        let (columns, rows) = self.dimensions();
        if rows >= self.options.max_rows {
            return Err(Error::other(format!(
                "row limit of {} reached",
                self.options.max_rows
            )));
        }
        self.resize(columns, rows + 1)
    }

    /// Remove the last row; at least one row always remains
    pub fn remove_row(&mut self) -> Result<RecalcStats> {
        let (columns, rows) = self.dimensions();
        if rows <= 1 {
            return Err(Error::other("cannot remove the last row"));
        }
        self.resize(columns, rows - 1)
    }

    /// Bounds change what references read, so everything is recomputed
    fn resize(&mut self, columns: u32, rows: u32) -> Result<RecalcStats> {
        self.grid.set_dimensions(columns, rows);
        debug!(columns, rows, "resized grid");
        Ok(self.recalculate_all())
    }

    // === Styles ===

    /// Set a style property on a cell (`B2`) or range (`A1:C3`)
    ///
    /// Returns the number of cells styled. Values are untouched.
    pub fn apply_style(&mut self, target: &str, name: &str, value: &str) -> Result<usize> {
        let range = if target.contains(':') {
            CellRange::parse(target)?
        } else {
            CellRange::single(CellAddress::parse(target)?)
        };

        self.grid.check_bounds(range.start)?;
        self.grid.check_bounds(range.end)?;

        let cells = range.cell_count();
        if cells > self.options.max_range_cells {
            return Err(Error::RangeTooLarge {
                cells,
                max: self.options.max_range_cells,
            });
        }

        for addr in range.cells() {
            self.grid
                .entry(addr)
                .styles
                .insert(name.to_string(), value.to_string());
        }

        Ok(cells as usize)
    }

    /// Style properties of a cell
    pub fn styles(&self, address: &str) -> Result<BTreeMap<String, String>> {
        let addr = CellAddress::parse(address)?;
        self.grid.check_bounds(addr)?;
        Ok(self
            .grid
            .get(addr)
            .map(|cell| cell.styles.clone())
            .unwrap_or_default())
    }
}
