//! Aggregate functions
//!
//! Each takes one argument, normally a range. A scalar argument counts as a
//! one-cell range. The first error value in the argument wins.

use super::{ArgValue, FunctionResult};
use crate::evaluator::EvaluationContext;
use sheetcalc_core::{parse_number, CellError, CellValue};

/// Numeric reading of an aggregate input: numbers and numeric text
fn numeric(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => parse_number(s),
        _ => None,
    }
}

/// Numeric values of all arguments, failing on the first error
fn collect_numbers(args: &[ArgValue]) -> Result<Vec<f64>, CellError> {
    let mut numbers = Vec::new();
    for arg in args {
        for value in arg.values() {
            if let CellValue::Error(e) = value {
                return Err(*e);
            }
            if let Some(n) = numeric(value) {
                numbers.push(n);
            }
        }
    }
    Ok(numbers)
}

/// SUM function
pub fn fn_sum(args: &[ArgValue], _ctx: &EvaluationContext) -> FunctionResult {
    let numbers = collect_numbers(args)?;
    Ok(CellValue::Number(numbers.iter().sum()))
}

/// AVERAGE function
pub fn fn_average(args: &[ArgValue], _ctx: &EvaluationContext) -> FunctionResult {
    let numbers = collect_numbers(args)?;
    if numbers.is_empty() {
        return Err(CellError::DivByZero);
    }
    let sum: f64 = numbers.iter().sum();
    Ok(CellValue::Number(sum / numbers.len() as f64))
}

/// MAX function; empty when nothing is numeric
pub fn fn_max(args: &[ArgValue], _ctx: &EvaluationContext) -> FunctionResult {
    let numbers = collect_numbers(args)?;
    Ok(numbers
        .into_iter()
        .reduce(f64::max)
        .map_or(CellValue::Empty, CellValue::Number))
}

/// MIN function; empty when nothing is numeric
pub fn fn_min(args: &[ArgValue], _ctx: &EvaluationContext) -> FunctionResult {
    let numbers = collect_numbers(args)?;
    Ok(numbers
        .into_iter()
        .reduce(f64::min)
        .map_or(CellValue::Empty, CellValue::Number))
}

/// COUNT function
pub fn fn_count(args: &[ArgValue], _ctx: &EvaluationContext) -> FunctionResult {
    let numbers = collect_numbers(args)?;
    Ok(CellValue::Number(numbers.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(values: Vec<CellValue>) -> Vec<ArgValue> {
        vec![ArgValue::Range(values)]
    }

    fn call(f: crate::functions::FunctionImpl, args: &[ArgValue]) -> FunctionResult {
        f(args, &EvaluationContext::simple())
    }

    fn mixed() -> Vec<ArgValue> {
        range(vec![
            CellValue::Number(5.0),
            CellValue::text("10"),
            CellValue::text("abc"),
            CellValue::Empty,
            CellValue::Number(-3.0),
        ])
    }

    #[test]
    fn test_sum() {
        assert_eq!(call(fn_sum, &mixed()), Ok(CellValue::Number(12.0)));
        assert_eq!(call(fn_sum, &range(vec![])), Ok(CellValue::Number(0.0)));
        assert_eq!(
            call(fn_sum, &[ArgValue::Scalar(CellValue::Number(3.0))]),
            Ok(CellValue::Number(3.0))
        );
    }

    #[test]
    fn test_average() {
        assert_eq!(call(fn_average, &mixed()), Ok(CellValue::Number(4.0)));
        assert_eq!(
            call(fn_average, &range(vec![CellValue::Empty, CellValue::Empty])),
            Err(CellError::DivByZero)
        );
    }

    #[test]
    fn test_max_min() {
        assert_eq!(call(fn_max, &mixed()), Ok(CellValue::Number(10.0)));
        assert_eq!(call(fn_min, &mixed()), Ok(CellValue::Number(-3.0)));
        assert_eq!(
            call(fn_max, &range(vec![CellValue::Empty, CellValue::text("x")])),
            Ok(CellValue::Empty)
        );
    }

    #[test]
    fn test_count() {
        assert_eq!(call(fn_count, &mixed()), Ok(CellValue::Number(3.0)));
        assert_eq!(
            call(fn_count, &range(vec![CellValue::Empty])),
            Ok(CellValue::Number(0.0))
        );
    }

    #[test]
    fn test_first_error_wins() {
        let args = range(vec![
            CellValue::Number(1.0),
            CellValue::Error(CellError::Circular),
            CellValue::Error(CellError::DivByZero),
        ]);
        assert_eq!(call(fn_sum, &args), Err(CellError::Circular));
        assert_eq!(call(fn_count, &args), Err(CellError::Circular));
        assert_eq!(call(fn_max, &args), Err(CellError::Circular));
    }
}
