//! Formula evaluator
//!
//! Evaluates formula ASTs to produce values. Evaluation never fails: every
//! problem becomes a [`CellValue::Error`] that flows on to dependent cells.

use crate::ast::{BinaryOperator, FormulaExpr};
use crate::functions::{ArgValue, FunctionRegistry};
use sheetcalc_core::{parse_number, CellAddress, CellError, CellRange, CellValue};
use std::sync::OnceLock;
use tracing::trace;

/// Global function registry (lazily initialized)
static FUNCTION_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

pub(crate) fn get_function_registry() -> &'static FunctionRegistry {
    FUNCTION_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Source of cell values for evaluation
pub trait CellLookup {
    /// Current value of a cell (`Empty` if never written)
    fn get_value(&self, addr: CellAddress) -> CellValue;

    /// Whether the address lies inside the grid
    fn contains(&self, _addr: CellAddress) -> bool {
        true
    }
}

impl<F> CellLookup for F
where
    F: Fn(CellAddress) -> CellValue,
{
    fn get_value(&self, addr: CellAddress) -> CellValue {
        self(addr)
    }
}

/// Context for formula evaluation
pub struct EvaluationContext<'a> {
    /// Cell values, if any
    pub lookup: Option<&'a dyn CellLookup>,
    /// Cell being evaluated, recorded in trace events
    pub current_cell: Option<CellAddress>,
    /// Largest range a function may read
    pub max_range_cells: u64,
}

impl<'a> EvaluationContext<'a> {
    /// Create a new evaluation context
    pub fn new(lookup: &'a dyn CellLookup) -> Self {
        Self {
            lookup: Some(lookup),
            current_cell: None,
            max_range_cells: u64::MAX,
        }
    }

    /// Create a simple context without any cells (for testing)
    pub fn simple() -> Self {
        Self {
            lookup: None,
            current_cell: None,
            max_range_cells: u64::MAX,
        }
    }

    /// Set the cell being evaluated
    pub fn with_current_cell(mut self, addr: CellAddress) -> Self {
        self.current_cell = Some(addr);
        self
    }

    /// Set the range size limit
    pub fn with_max_range_cells(mut self, max: u64) -> Self {
        self.max_range_cells = max;
        self
    }

    /// Get a cell value; addresses outside the grid read as empty
    pub fn get_cell_value(&self, addr: CellAddress) -> CellValue {
        match self.lookup {
            Some(lookup) if lookup.contains(addr) => lookup.get_value(addr),
            _ => CellValue::Empty,
        }
    }

    /// Get the values of a range in row-major order
    pub fn get_range_values(&self, range: &CellRange) -> Result<Vec<CellValue>, CellError> {
        if range.cell_count() > self.max_range_cells {
            return Err(CellError::InvalidRange);
        }
        Ok(range.cells().map(|addr| self.get_cell_value(addr)).collect())
    }
}

/// Evaluate a formula expression
pub fn evaluate(expr: &FormulaExpr, ctx: &EvaluationContext) -> CellValue {
    match expr {
        FormulaExpr::Literal(value) => value.clone(),

        FormulaExpr::CellRef(addr) => ctx.get_cell_value(*addr),

        // A bare range has no single value
        FormulaExpr::RangeRef(_) => CellValue::Error(CellError::InvalidExpression),

        FormulaExpr::BinaryOp { op, left, right } => {
            let left = evaluate(left, ctx);
            let right = evaluate(right, ctx);
            into_value(evaluate_binary_op(*op, &left, &right))
        }

        FormulaExpr::Negate(operand) => {
            let value = evaluate(operand, ctx);
            into_value(coerce_number(&value).map(|n| -n))
        }

        FormulaExpr::Function { name, args } => evaluate_function(name, args, ctx)
            .and_then(|value| match value {
                CellValue::Number(n) => finite(n).map(CellValue::Number),
                other => Ok(other),
            })
            .unwrap_or_else(CellValue::Error),
    }
}

fn into_value(result: Result<f64, CellError>) -> CellValue {
    match result.and_then(finite) {
        Ok(n) => CellValue::Number(n),
        Err(e) => CellValue::Error(e),
    }
}

/// Overflow to infinity or NaN is a type mismatch, never a stored number
fn finite(n: f64) -> Result<f64, CellError> {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(CellError::TypeMismatch)
    }
}

/// `Err` if the value is an error
fn error_of(value: &CellValue) -> Result<(), CellError> {
    match value {
        CellValue::Error(e) => Err(*e),
        _ => Ok(()),
    }
}

/// Numeric coercion for arithmetic
///
/// Empty is 0, numeric text is its number, other text is a type mismatch.
pub fn coerce_number(value: &CellValue) -> Result<f64, CellError> {
    match value {
        CellValue::Number(n) => Ok(*n),
        CellValue::Empty => Ok(0.0),
        CellValue::Text(s) => parse_number(s).ok_or(CellError::TypeMismatch),
        CellValue::Error(e) => Err(*e),
    }
}

fn evaluate_binary_op(
    op: BinaryOperator,
    left: &CellValue,
    right: &CellValue,
) -> Result<f64, CellError> {
    // Operand errors propagate unchanged, left first
    error_of(left)?;
    error_of(right)?;

    let l = coerce_number(left)?;
    let r = coerce_number(right)?;

    match op {
        BinaryOperator::Add => Ok(l + r),
        BinaryOperator::Subtract => Ok(l - r),
        BinaryOperator::Multiply => Ok(l * r),
        BinaryOperator::Divide => {
            if r == 0.0 {
                Err(CellError::DivByZero)
            } else {
                Ok(l / r)
            }
        }
    }
}

fn evaluate_function(
    name: &str,
    args: &[FormulaExpr],
    ctx: &EvaluationContext,
) -> Result<CellValue, CellError> {
    let registry = get_function_registry();

    // The parser rejects unknown names; a hand-built AST may not
    let func = registry.get(name).ok_or(CellError::ParseError)?;

    // Check argument count
    if args.len() < func.min_args || func.max_args.map_or(false, |max| args.len() > max) {
        trace!(
            cell = ?ctx.current_cell,
            function = name,
            given = args.len(),
            "wrong number of arguments"
        );
        return Err(CellError::ArityMismatch);
    }

    // Evaluate arguments; ranges are read whole
    let mut evaluated_args = Vec::with_capacity(args.len());
    for arg in args {
        let value = match arg {
            FormulaExpr::RangeRef(range) => ArgValue::Range(ctx.get_range_values(range)?),
            other => ArgValue::Scalar(evaluate(other, ctx)),
        };
        evaluated_args.push(value);
    }

    // Call the function
    (func.implementation)(&evaluated_args, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_formula;
    use std::collections::HashMap;

    fn eval(formula: &str) -> CellValue {
        let ast = parse_formula(formula).unwrap();
        let ctx = EvaluationContext::simple();
        evaluate(&ast, &ctx)
    }

    fn eval_with(formula: &str, cells: &[(&str, CellValue)]) -> CellValue {
        let map: HashMap<CellAddress, CellValue> = cells
            .iter()
            .map(|(a, v)| (CellAddress::parse(a).unwrap(), v.clone()))
            .collect();
        let lookup = move |addr: CellAddress| map.get(&addr).cloned().unwrap_or_default();
        let ast = parse_formula(formula).unwrap();
        let ctx = EvaluationContext::new(&lookup);
        evaluate(&ast, &ctx)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("=1+2"), CellValue::Number(3.0));
        assert_eq!(eval("=10-4"), CellValue::Number(6.0));
        assert_eq!(eval("=3*4"), CellValue::Number(12.0));
        assert_eq!(eval("=10/4"), CellValue::Number(2.5));
        assert_eq!(eval("=2+3*4"), CellValue::Number(14.0));
        assert_eq!(eval("=(2+3)*4"), CellValue::Number(20.0));
        assert_eq!(eval("=-2*3"), CellValue::Number(-6.0));
        assert_eq!(eval("=--2"), CellValue::Number(2.0));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval("=1/0"), CellValue::Error(CellError::DivByZero));
        assert_eq!(
            eval_with("=5/A1", &[]),
            CellValue::Error(CellError::DivByZero)
        );
    }

    #[test]
    fn test_coercion() {
        // Numeric text and empty cells
        assert_eq!(
            eval_with("=A1+A2", &[("A1", CellValue::text("4"))]),
            CellValue::Number(4.0)
        );
        // Non-numeric text
        assert_eq!(
            eval_with("=A1+1", &[("A1", CellValue::text("abc"))]),
            CellValue::Error(CellError::TypeMismatch)
        );
        assert_eq!(eval("=\"x\"*2"), CellValue::Error(CellError::TypeMismatch));
        assert_eq!(eval("=-\"x\""), CellValue::Error(CellError::TypeMismatch));
    }

    #[test]
    fn test_error_propagation_left_first() {
        let cells = [
            ("A1", CellValue::Error(CellError::DivByZero)),
            ("A2", CellValue::Error(CellError::Circular)),
            ("A3", CellValue::text("abc")),
        ];
        assert_eq!(
            eval_with("=A1+A2", &cells),
            CellValue::Error(CellError::DivByZero)
        );
        assert_eq!(
            eval_with("=A2+A1", &cells),
            CellValue::Error(CellError::Circular)
        );
        // An error operand wins over a type mismatch on the other side
        assert_eq!(
            eval_with("=A3+A2", &cells),
            CellValue::Error(CellError::Circular)
        );
    }

    #[test]
    fn test_cell_reference_passthrough() {
        assert_eq!(
            eval_with("=A1", &[("A1", CellValue::text("hello"))]),
            CellValue::text("hello")
        );
        assert_eq!(eval_with("=B7", &[]), CellValue::Empty);
    }

    #[test]
    fn test_bare_range_is_invalid() {
        assert_eq!(
            eval("=A1:B2"),
            CellValue::Error(CellError::InvalidExpression)
        );
        assert_eq!(
            eval("=A1:B2+1"),
            CellValue::Error(CellError::InvalidExpression)
        );
    }

    #[test]
    fn test_out_of_bounds_reads_empty() {
        struct Bounded;
        impl CellLookup for Bounded {
            fn get_value(&self, _addr: CellAddress) -> CellValue {
                CellValue::Number(9.0)
            }
            fn contains(&self, addr: CellAddress) -> bool {
                addr.col < 2 && addr.row <= 2
            }
        }

        let ast = parse_formula("=A1+C1").unwrap();
        let ctx = EvaluationContext::new(&Bounded);
        assert_eq!(evaluate(&ast, &ctx), CellValue::Number(9.0));
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert_eq!(eval("=1e308*10"), CellValue::Error(CellError::TypeMismatch));
        assert_eq!(eval("=-1e308-1e308"), CellValue::Error(CellError::TypeMismatch));
        assert_eq!(eval("=1e308/1e-10"), CellValue::Error(CellError::TypeMismatch));
        assert_eq!(
            eval_with(
                "=SUM(A1:A2)",
                &[("A1", CellValue::Number(1e308)), ("A2", CellValue::Number(1e308))]
            ),
            CellValue::Error(CellError::TypeMismatch)
        );
        // Large but finite results are kept
        assert!(matches!(eval("=1e307*10"), CellValue::Number(n) if n.is_finite()));
    }

    #[test]
    fn test_arity_mismatch() {
        assert_eq!(eval("=SUM()"), CellValue::Error(CellError::ArityMismatch));
        assert_eq!(
            eval("=UPPER(\"a\", \"b\")"),
            CellValue::Error(CellError::ArityMismatch)
        );
    }

    #[test]
    fn test_range_limit_at_evaluation() {
        let ast = parse_formula("=SUM(A1:C3)").unwrap();
        let ctx = EvaluationContext::simple().with_max_range_cells(4);
        assert_eq!(
            evaluate(&ast, &ctx),
            CellValue::Error(CellError::InvalidRange)
        );
    }

    #[test]
    fn test_unknown_function_in_hand_built_ast() {
        let ast = FormulaExpr::Function {
            name: "NOPE".to_string(),
            args: vec![],
        };
        assert_eq!(
            evaluate(&ast, &EvaluationContext::simple()),
            CellValue::Error(CellError::ParseError)
        );
    }
}
