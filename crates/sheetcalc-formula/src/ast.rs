//! Formula Abstract Syntax Tree types

use crate::error::{FormulaError, FormulaResult};
use sheetcalc_core::{CellAddress, CellRange, CellValue};
use std::collections::BTreeSet;

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    /// Number or string literal
    Literal(CellValue),

    /// Single cell reference
    CellRef(CellAddress),
    /// Range reference (only meaningful as a function argument)
    RangeRef(CellRange),

    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    /// Prefix minus
    Negate(Box<FormulaExpr>),

    /// Function call (name is uppercase)
    Function {
        name: String,
        args: Vec<FormulaExpr>,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    /// Operator symbol
    pub fn symbol(&self) -> char {
        match self {
            BinaryOperator::Add => '+',
            BinaryOperator::Subtract => '-',
            BinaryOperator::Multiply => '*',
            BinaryOperator::Divide => '/',
        }
    }
}

impl FormulaExpr {
    /// Every cell this expression reads, with ranges flattened
    ///
    /// Fails with [`FormulaError::RangeTooLarge`] if any range holds more
    /// than `max_range_cells` cells.
    pub fn referenced_cells(&self, max_range_cells: u64) -> FormulaResult<BTreeSet<CellAddress>> {
        let mut refs = BTreeSet::new();
        self.collect_references(max_range_cells, &mut refs)?;
        Ok(refs)
    }

    fn collect_references(
        &self,
        max_range_cells: u64,
        refs: &mut BTreeSet<CellAddress>,
    ) -> FormulaResult<()> {
        match self {
            FormulaExpr::Literal(_) => {}
            FormulaExpr::CellRef(addr) => {
                refs.insert(*addr);
            }
            FormulaExpr::RangeRef(range) => {
                let cells = range.cell_count();
                if cells > max_range_cells {
                    return Err(FormulaError::RangeTooLarge {
                        range: range.to_string(),
                        cells,
                        max: max_range_cells,
                    });
                }
                refs.extend(range.cells());
            }
            FormulaExpr::BinaryOp { left, right, .. } => {
                left.collect_references(max_range_cells, refs)?;
                right.collect_references(max_range_cells, refs)?;
            }
            FormulaExpr::Negate(operand) => {
                operand.collect_references(max_range_cells, refs)?;
            }
            FormulaExpr::Function { args, .. } => {
                for arg in args {
                    arg.collect_references(max_range_cells, refs)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_formula;

    fn names(refs: &BTreeSet<CellAddress>) -> Vec<String> {
        refs.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_referenced_cells_flattens_ranges() {
        let ast = parse_formula("=SUM(A1:B2) + C1 * A1").unwrap();
        let refs = ast.referenced_cells(100).unwrap();
        assert_eq!(names(&refs), vec!["A1", "B1", "C1", "A2", "B2"]);
    }

    #[test]
    fn test_referenced_cells_literal_only() {
        let ast = parse_formula("=1+2").unwrap();
        assert!(ast.referenced_cells(100).unwrap().is_empty());
    }

    #[test]
    fn test_referenced_cells_range_limit() {
        let ast = parse_formula("=SUM(A1:J10)").unwrap();
        assert!(ast.referenced_cells(100).is_ok());

        let err = ast.referenced_cells(99).unwrap_err();
        assert!(matches!(err, FormulaError::RangeTooLarge { cells: 100, .. }));
        assert_eq!(err.kind(), sheetcalc_core::CellError::InvalidRange);
    }
}
