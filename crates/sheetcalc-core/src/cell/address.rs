//! Cell address and range types

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A cell address (e.g., "A1", "AB12")
///
/// Columns are 0-based (A=0, Z=25, AA=26, ...) and rows are 1-based, matching
/// the A1 text form. Field order gives the derived `Ord` row-major semantics:
/// every column of row 1 sorts before any cell of row 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    /// Row number (1-based)
    pub row: u32,
    /// Column index (0-based)
    pub col: u32,
}

impl CellAddress {
    /// Create a new cell address from a 0-based column and a 1-based row
    pub fn new(col: u32, row: u32) -> Self {
        Self { row, col }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// Letters are case-normalized; the remaining text must be a row number
    /// without leading zeros.
    ///
    /// # Examples
    /// ```
    /// use sheetcalc_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("b2").unwrap();
    /// assert_eq!(addr.col, 1);
    /// assert_eq!(addr.row, 2);
    /// assert_eq!(addr.to_string(), "B2");
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }

        if pos == 0 {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let col = Self::letters_to_column(&s[..pos])?;

        let row_str = &s[pos..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }
        if !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!(
                "invalid row number in '{}'",
                s
            )));
        }
        if row_str.starts_with('0') {
            return Err(Error::InvalidAddress(format!(
                "row number must start with 1-9 in '{}'",
                s
            )));
        }

        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("row number overflows in '{}'", s)))?;

        Ok(Self { row, col })
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u32) -> String {
        let mut result = String::new();
        let mut n = col as u64 + 1; // 1-based for calculation

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u64 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            let digit = (c.to_ascii_uppercase() as u64) - ('A' as u64) + 1;
            col = col
                .checked_mul(26)
                .and_then(|v| v.checked_add(digit))
                .filter(|v| *v - 1 <= u32::MAX as u64)
                .ok_or_else(|| {
                    Error::InvalidAddress(format!("column '{}' overflows", letters))
                })?;
        }

        Ok((col - 1) as u32)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        let mut result = Self::column_to_letters(self.col);
        result.push_str(&self.row.to_string());
        result
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangular range of cells (e.g., "A1:B10")
///
/// Always normalized: `start` is the top-left corner and `end` the
/// bottom-right one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Start address (top-left)
    pub start: CellAddress,
    /// End address (bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range, normalizing the corners
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        Self {
            start: CellAddress::new(start.col.min(end.col), start.row.min(end.row)),
            end: CellAddress::new(start.col.max(end.col), start.row.max(end.row)),
        }
    }

    /// Create a single-cell range
    pub fn single(addr: CellAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Parse a range from `A1:B10` notation
    ///
    /// Exactly two valid addresses separated by a colon are required.
    pub fn parse(s: &str) -> Result<Self> {
        let (first, second) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidRange(format!("missing ':' in '{}'", s)))?;

        let start = CellAddress::parse(first)
            .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))?;
        let end = CellAddress::parse(second)
            .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))?;

        Ok(Self::new(start, end))
    }

    /// Check if a cell is within this range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.col >= self.start.col
            && addr.col <= self.end.col
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> u64 {
        (self.end.row - self.start.row) as u64 + 1
    }

    /// Get the number of columns in the range
    pub fn col_count(&self) -> u64 {
        (self.end.col - self.start.col) as u64 + 1
    }

    /// Get the total number of cells in the range
    ///
    /// Saturates instead of overflowing for absurdly wide ranges.
    pub fn cell_count(&self) -> u64 {
        self.row_count().saturating_mul(self.col_count())
    }

    /// Iterate over all cell addresses in the range (row by row)
    pub fn cells(&self) -> CellRangeIterator {
        CellRangeIterator {
            range: *self,
            current_row: self.start.row,
            current_col: self.start.col,
            remaining: self.cell_count(),
        }
    }

    /// Format as `A1:B10` string
    pub fn to_a1_string(&self) -> String {
        format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Iterator over cells in a range, in row-major order
pub struct CellRangeIterator {
    range: CellRange,
    current_row: u32,
    current_col: u32,
    remaining: u64,
}

impl Iterator for CellRangeIterator {
    type Item = CellAddress;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let addr = CellAddress::new(self.current_col, self.current_row);

        // Wrap to the next row without stepping past the range edge, so the
        // last column and row of u32 are safe.
        if self.current_col == self.range.end.col {
            self.current_col = self.range.start.col;
            self.current_row = self.current_row.saturating_add(1);
        } else {
            self.current_col += 1;
        }

        Some(addr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

/// Parse A1-style text into a [`CellAddress`]
pub fn parse_address(text: &str) -> Result<CellAddress> {
    CellAddress::parse(text)
}

/// Format a [`CellAddress`] as A1-style text
pub fn format_address(addr: CellAddress) -> String {
    addr.to_a1_string()
}

/// Parse `ADDR:ADDR` text into a normalized [`CellRange`]
pub fn parse_range(text: &str) -> Result<CellRange> {
    CellRange::parse(text)
}

/// All addresses in a range, in row-major order
pub fn cells_in_range(range: CellRange) -> Vec<CellAddress> {
    range.cells().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(CellAddress::column_to_letters(0), "A");
        assert_eq!(CellAddress::column_to_letters(1), "B");
        assert_eq!(CellAddress::column_to_letters(25), "Z");
        assert_eq!(CellAddress::column_to_letters(26), "AA");
        assert_eq!(CellAddress::column_to_letters(27), "AB");
        assert_eq!(CellAddress::column_to_letters(701), "ZZ");
        assert_eq!(CellAddress::column_to_letters(702), "AAA");
        assert_eq!(CellAddress::column_to_letters(18277), "ZZZ");
    }

    #[test]
    fn test_letters_to_column() {
        assert_eq!(CellAddress::letters_to_column("A").unwrap(), 0);
        assert_eq!(CellAddress::letters_to_column("Z").unwrap(), 25);
        assert_eq!(CellAddress::letters_to_column("AA").unwrap(), 26);
        assert_eq!(CellAddress::letters_to_column("ZZ").unwrap(), 701);
        assert_eq!(CellAddress::letters_to_column("AAA").unwrap(), 702);

        // Case insensitive
        assert_eq!(CellAddress::letters_to_column("a").unwrap(), 0);
        assert_eq!(CellAddress::letters_to_column("aa").unwrap(), 26);

        // Far beyond u32
        assert!(CellAddress::letters_to_column("ZZZZZZZZZZ").is_err());
    }

    #[test]
    fn test_column_letters_at_u32_limit() {
        let letters = CellAddress::column_to_letters(u32::MAX);
        assert_eq!(CellAddress::letters_to_column(&letters).unwrap(), u32::MAX);
    }

    #[test]
    fn test_cell_address_parse() {
        let addr = CellAddress::parse("A1").unwrap();
        assert_eq!(addr, CellAddress::new(0, 1));

        let addr = CellAddress::parse("c10").unwrap();
        assert_eq!(addr.col, 2);
        assert_eq!(addr.row, 10);

        let addr = CellAddress::parse("AB123").unwrap();
        assert_eq!(addr.col, 27);
        assert_eq!(addr.row, 123);
    }

    #[test]
    fn test_cell_address_parse_errors() {
        assert!(CellAddress::parse("").is_err());
        assert!(CellAddress::parse("A").is_err());
        assert!(CellAddress::parse("1").is_err());
        assert!(CellAddress::parse("A0").is_err());
        assert!(CellAddress::parse("A01").is_err());
        assert!(CellAddress::parse("$A$1").is_err());
        assert!(CellAddress::parse("A1B").is_err());
        assert!(CellAddress::parse("A-1").is_err());
        assert!(parse_address(" A1").is_err());
        assert!(parse_address("A1 ").is_err());
        assert!(parse_address("A 1").is_err());
        assert!(CellAddress::parse("A99999999999").is_err());
        assert!(matches!(
            CellAddress::parse("A0"),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_cell_address_display() {
        assert_eq!(CellAddress::new(0, 1).to_string(), "A1");
        assert_eq!(CellAddress::new(2, 100).to_string(), "C100");
        assert_eq!(format_address(CellAddress::new(26, 7)), "AA7");
    }

    #[test]
    fn test_cell_address_ordering_is_row_major() {
        let b1 = CellAddress::parse("B1").unwrap();
        let a2 = CellAddress::parse("A2").unwrap();
        let z1 = CellAddress::parse("Z1").unwrap();
        assert!(b1 < a2);
        assert!(z1 < a2);
        assert!(CellAddress::parse("A1").unwrap() < b1);
    }

    #[test]
    fn test_cell_range_parse() {
        let range = CellRange::parse("A1:B2").unwrap();
        assert_eq!(range.start, CellAddress::new(0, 1));
        assert_eq!(range.end, CellAddress::new(1, 2));

        // Corners are normalized
        let range = parse_range("B2:A1").unwrap();
        assert_eq!(range.start, CellAddress::new(0, 1));
        assert_eq!(range.end, CellAddress::new(1, 2));

        let range = parse_range("B1:A3").unwrap();
        assert_eq!(range.to_string(), "A1:B3");

        // Single-cell range
        let range = parse_range("C3:C3").unwrap();
        assert_eq!(range.cell_count(), 1);
    }

    #[test]
    fn test_cell_range_parse_errors() {
        assert!(matches!(parse_range("A1"), Err(Error::InvalidRange(_))));
        assert!(matches!(parse_range("A1:"), Err(Error::InvalidRange(_))));
        assert!(matches!(parse_range("A1:B0"), Err(Error::InvalidRange(_))));
        assert!(matches!(parse_range("A1:B2:C3"), Err(Error::InvalidRange(_))));
        assert!(matches!(parse_range("A1 : B2"), Err(Error::InvalidRange(_))));
        assert!(matches!(parse_range(" A1:B2"), Err(Error::InvalidRange(_))));
    }

    #[test]
    fn test_cell_range_contains() {
        let range = CellRange::parse("B2:D4").unwrap();

        assert!(range.contains(&CellAddress::parse("B2").unwrap()));
        assert!(range.contains(&CellAddress::parse("D4").unwrap()));
        assert!(range.contains(&CellAddress::parse("C3").unwrap()));

        assert!(!range.contains(&CellAddress::parse("A1").unwrap()));
        assert!(!range.contains(&CellAddress::parse("B5").unwrap()));
    }

    #[test]
    fn test_cells_in_range_row_major() {
        let range = CellRange::parse("A1:B2").unwrap();
        let cells: Vec<String> = cells_in_range(range).iter().map(|a| a.to_string()).collect();
        assert_eq!(cells, vec!["A1", "B1", "A2", "B2"]);

        // Repeatable
        assert_eq!(cells_in_range(range), cells_in_range(range));
    }

    #[test]
    fn test_cells_at_u32_edge() {
        let range = CellRange::new(
            CellAddress::new(u32::MAX - 1, u32::MAX - 1),
            CellAddress::new(u32::MAX, u32::MAX),
        );
        assert_eq!(range.cells().count(), 4);
    }

    proptest! {
        #[test]
        fn prop_address_round_trip(col in 0u32..=u32::MAX, row in 1u32..=u32::MAX) {
            let addr = CellAddress::new(col, row);
            prop_assert_eq!(parse_address(&format_address(addr)).unwrap(), addr);
        }

        #[test]
        fn prop_lowercase_parses_same(col in 0u32..100_000, row in 1u32..1_000_000) {
            let text = format_address(CellAddress::new(col, row));
            prop_assert_eq!(
                parse_address(&text.to_lowercase()).unwrap(),
                parse_address(&text).unwrap()
            );
        }

        #[test]
        fn prop_range_cells_len_and_order(
            c1 in 0u32..40, c2 in 0u32..40,
            r1 in 1u32..40, r2 in 1u32..40,
        ) {
            let range = CellRange::new(CellAddress::new(c1, r1), CellAddress::new(c2, r2));
            let cells = cells_in_range(range);
            let expected = (c1.abs_diff(c2) as usize + 1) * (r1.abs_diff(r2) as usize + 1);
            prop_assert_eq!(cells.len(), expected);
            prop_assert!(cells.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(cells.iter().all(|a| range.contains(a)));
        }
    }
}
