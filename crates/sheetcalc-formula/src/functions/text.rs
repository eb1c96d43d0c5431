//! Text functions

use super::{ArgValue, FunctionResult};
use crate::evaluator::EvaluationContext;
use sheetcalc_core::{CellError, CellValue};
use std::collections::HashSet;

/// Textual form of the single scalar argument
fn text_arg(args: &[ArgValue]) -> Result<String, CellError> {
    let value = args.first().ok_or(CellError::ArityMismatch)?.scalar()?;
    match value {
        CellValue::Error(e) => Err(*e),
        other => Ok(other.as_text()),
    }
}

/// TRIM(text): strip leading and trailing whitespace
pub fn fn_trim(args: &[ArgValue], _ctx: &EvaluationContext) -> FunctionResult {
    Ok(CellValue::Text(text_arg(args)?.trim().to_string()))
}

/// UPPER(text)
pub fn fn_upper(args: &[ArgValue], _ctx: &EvaluationContext) -> FunctionResult {
    Ok(CellValue::Text(text_arg(args)?.to_uppercase()))
}

/// LOWER(text)
pub fn fn_lower(args: &[ArgValue], _ctx: &EvaluationContext) -> FunctionResult {
    Ok(CellValue::Text(text_arg(args)?.to_lowercase()))
}

/// REMOVE_DUPLICATES(range)
///
/// Distinct non-empty values in first-occurrence order, joined with ", ".
pub fn fn_remove_duplicates(args: &[ArgValue], _ctx: &EvaluationContext) -> FunctionResult {
    let mut seen = HashSet::new();
    let mut distinct = Vec::new();

    for arg in args {
        for value in arg.values() {
            match value {
                CellValue::Error(e) => return Err(*e),
                CellValue::Empty => {}
                other => {
                    let text = other.as_text();
                    if seen.insert(text.clone()) {
                        distinct.push(text);
                    }
                }
            }
        }
    }

    Ok(CellValue::Text(distinct.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(value: CellValue) -> Vec<ArgValue> {
        vec![ArgValue::Scalar(value)]
    }

    fn ctx() -> EvaluationContext<'static> {
        EvaluationContext::simple()
    }

    #[test]
    fn test_case_functions() {
        assert_eq!(
            fn_upper(&scalar(CellValue::text("text")), &ctx()),
            Ok(CellValue::text("TEXT"))
        );
        assert_eq!(
            fn_lower(&scalar(CellValue::text("MiXeD")), &ctx()),
            Ok(CellValue::text("mixed"))
        );
        // Numbers use their plain textual form
        assert_eq!(
            fn_upper(&scalar(CellValue::Number(42.0)), &ctx()),
            Ok(CellValue::text("42"))
        );
        assert_eq!(
            fn_upper(&scalar(CellValue::Empty), &ctx()),
            Ok(CellValue::text(""))
        );
    }

    #[test]
    fn test_trim() {
        assert_eq!(
            fn_trim(&scalar(CellValue::text("  padded  text ")), &ctx()),
            Ok(CellValue::text("padded  text"))
        );
    }

    #[test]
    fn test_text_functions_reject_ranges() {
        let args = vec![ArgValue::Range(vec![CellValue::text("a")])];
        assert_eq!(fn_upper(&args, &ctx()), Err(CellError::TypeMismatch));
        assert_eq!(fn_trim(&args, &ctx()), Err(CellError::TypeMismatch));
    }

    #[test]
    fn test_text_functions_propagate_errors() {
        assert_eq!(
            fn_lower(&scalar(CellValue::Error(CellError::DivByZero)), &ctx()),
            Err(CellError::DivByZero)
        );
    }

    #[test]
    fn test_remove_duplicates() {
        let args = vec![ArgValue::Range(vec![
            CellValue::text("b"),
            CellValue::text("a"),
            CellValue::Empty,
            CellValue::text("b"),
            CellValue::Number(1.0),
            CellValue::text("1"),
        ])];
        assert_eq!(
            fn_remove_duplicates(&args, &ctx()),
            Ok(CellValue::text("b, a, 1"))
        );
        assert_eq!(
            fn_remove_duplicates(&[ArgValue::Range(vec![CellValue::Empty])], &ctx()),
            Ok(CellValue::text(""))
        );
    }
}
