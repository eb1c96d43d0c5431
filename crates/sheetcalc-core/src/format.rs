//! Display formatting for cell values

use crate::cell::CellValue;

/// Format a number rounded to `decimals` places, trimming trailing zeros
///
/// ```
/// use sheetcalc_core::format::format_number;
///
/// assert_eq!(format_number(15.0, 2), "15");
/// assert_eq!(format_number(1.0 / 3.0, 2), "0.33");
/// assert_eq!(format_number(-0.001, 2), "0");
/// ```
pub fn format_number(n: f64, decimals: usize) -> String {
    let mut text = format!("{:.*}", decimals, n);

    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }

    if text == "-0" {
        text.remove(0);
    }

    text
}

/// Format a cell value for display
///
/// Numbers are rounded, text is shown verbatim, empty cells are blank and
/// errors render as their fixed code.
pub fn format_value(value: &CellValue, decimals: usize) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Number(n) => format_number(*n, decimals),
        CellValue::Text(s) => s.clone(),
        CellValue::Error(e) => e.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::cell::CellError;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(15.0, 2), "15");
        assert_eq!(format_number(17.0, 2), "17");
        assert_eq!(format_number(2.5, 2), "2.5");
        assert_eq!(format_number(2.456, 2), "2.46");
        assert_eq!(format_number(-2.5, 2), "-2.5");
        assert_eq!(format_number(100.0, 2), "100");
        assert_eq!(format_number(-0.0, 2), "0");
        assert_eq!(format_number(-0.004, 2), "0");
        assert_eq!(format_number(3.7, 0), "4");
        assert_eq!(format_number(10.0, 0), "10");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&CellValue::Empty, 2), "");
        assert_eq!(format_value(&CellValue::text("abc"), 2), "abc");
        assert_eq!(format_value(&CellValue::Error(CellError::Circular), 2), "#CIRCULAR");
        assert_eq!(format_value(&CellValue::Error(CellError::ParseError), 2), "#ERROR");
    }
}
