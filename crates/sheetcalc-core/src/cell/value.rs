//! Cell value types

use std::fmt;

/// The computed value of a cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell (no value)
    Empty,

    /// Numeric value
    Number(f64),

    /// Text value
    Text(String),

    /// Error value (#ERROR, #CIRCULAR, etc.)
    Error(CellError),
}

impl CellValue {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// Classify literal (non-formula) input text
    ///
    /// Empty text is [`CellValue::Empty`], text that reads as a finite number
    /// is a [`CellValue::Number`], anything else is kept verbatim as text.
    pub fn from_input(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Empty;
        }
        match parse_number(raw) {
            Some(n) => CellValue::Number(n),
            None => CellValue::Text(raw.to_string()),
        }
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Check if the cell contains an error
    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// Get the error kind, if any
    pub fn as_error(&self) -> Option<CellError> {
        match self {
            CellValue::Error(e) => Some(*e),
            _ => None,
        }
    }

    /// Try to get the value as a number (no text coercion)
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Textual form used by text functions
    ///
    /// Integers print without a fractional part; errors print their code.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Error(e) => e.to_string(),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<CellError> for CellValue {
    fn from(e: CellError) -> Self {
        CellValue::Error(e)
    }
}

/// Parse text as a finite number, ignoring surrounding whitespace
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Cell-local error kinds
///
/// None of these is fatal; each is just another value that flows through
/// dependent formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    /// Malformed address inside a formula
    InvalidAddress,
    /// Malformed or oversized range inside a formula
    InvalidRange,
    /// Formula text could not be parsed
    ParseError,
    /// Wrong number of function arguments
    ArityMismatch,
    /// Operand or argument of the wrong kind
    TypeMismatch,
    /// Division by zero
    DivByZero,
    /// Formula would create a circular reference
    Circular,
    /// Expression not valid in its position (e.g. a bare range)
    InvalidExpression,
}

impl CellError {
    /// Get the display code for this error
    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::InvalidAddress => "#ADDR",
            CellError::InvalidRange => "#RANGE",
            CellError::ParseError => "#ERROR",
            CellError::ArityMismatch => "#ARGS",
            CellError::TypeMismatch => "#VALUE",
            CellError::DivByZero => "#DIV0",
            CellError::Circular => "#CIRCULAR",
            CellError::InvalidExpression => "#EXPR",
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_input() {
        assert_eq!(CellValue::from_input(""), CellValue::Empty);
        assert_eq!(CellValue::from_input("5"), CellValue::Number(5.0));
        assert_eq!(CellValue::from_input(" 2.5 "), CellValue::Number(2.5));
        assert_eq!(CellValue::from_input("-1e3"), CellValue::Number(-1000.0));
        assert_eq!(CellValue::from_input("text"), CellValue::text("text"));
        assert_eq!(CellValue::from_input("inf"), CellValue::text("inf"));
        assert_eq!(CellValue::from_input("NaN"), CellValue::text("NaN"));
        assert_eq!(CellValue::from_input("   "), CellValue::text("   "));
    }

    #[test]
    fn test_cell_value_conversions() {
        assert_eq!(CellValue::from(42), CellValue::Number(42.0));
        assert_eq!(CellValue::from(3.5), CellValue::Number(3.5));

        let s = CellValue::from("hello");
        assert_eq!(s.as_str(), Some("hello"));
        assert_eq!(s.as_number(), None);
    }

    #[test]
    fn test_as_text() {
        assert_eq!(CellValue::Number(15.0).as_text(), "15");
        assert_eq!(CellValue::Number(2.5).as_text(), "2.5");
        assert_eq!(CellValue::Empty.as_text(), "");
        assert_eq!(CellValue::Error(CellError::DivByZero).as_text(), "#DIV0");
    }

    #[test]
    fn test_cell_error_codes() {
        assert_eq!(CellError::ParseError.to_string(), "#ERROR");
        assert_eq!(CellError::Circular.to_string(), "#CIRCULAR");
        assert_eq!(CellError::DivByZero.to_string(), "#DIV0");
    }
}
