//! Formula parser
//!
//! A recursive descent parser with proper operator precedence. Address and
//! range tokens are validated while scanning, and function names are checked
//! against the built-in registry, so every failure is reported before the
//! formula can touch the dependency graph. Nesting and tree depth are capped
//! so a pathological formula fails to parse instead of exhausting the stack.

use crate::ast::{BinaryOperator, FormulaExpr};
use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::get_function_registry;
use sheetcalc_core::{CellAddress, CellRange, CellValue};

/// Deepest nesting of parentheses, prefix operators and function calls
pub const MAX_NESTING: usize = 64;

/// Deepest expression tree accepted, counting every operator and call
pub const MAX_DEPTH: usize = 1024;

/// A parsed expression and the depth of its tree
type Parsed = (FormulaExpr, usize);

/// Parse a formula string into an AST
///
/// # Example
/// ```rust
/// use sheetcalc_formula::parse_formula;
///
/// let ast = parse_formula("=1+2").unwrap();
/// let ast = parse_formula("=SUM(A1:A10)").unwrap();
/// let ast = parse_formula("=UPPER(C1)").unwrap();
/// assert!(parse_formula("=NOPE(A1)").is_err());
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    let formula = formula.trim();

    // Formula must start with '='
    let body = formula
        .strip_prefix('=')
        .ok_or_else(|| FormulaError::parse("formula must start with '='", formula))?;

    let mut parser = FormulaParser::new(body)?;
    let (expr, _) = parser.parse_expression()?;

    // Make sure we consumed all input
    if parser.current_token != Token::Eof {
        return Err(FormulaError::parse(
            "unexpected input after expression",
            &parser.input[parser.token_start..],
        ));
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    // Literals
    Number(f64),
    String(String),

    // References and names
    Address(CellAddress),
    Range(CellRange),
    Identifier(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Comma,

    // Delimiters
    LeftParen,
    RightParen,

    // End of input
    Eof,
}

/// Formula parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    /// Byte span of the current token
    token_start: usize,
    token_end: usize,
    current_token: Token,
    /// Open parentheses, prefix operators and calls around the current token
    nesting: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> FormulaResult<Self> {
        let mut parser = Self {
            input,
            pos: 0,
            token_start: 0,
            token_end: 0,
            current_token: Token::Eof,
            nesting: 0,
        };
        parser.advance_token()?;
        Ok(parser)
    }

    // === Token scanning ===

    fn advance_token(&mut self) -> FormulaResult<()> {
        self.skip_whitespace();
        self.token_start = self.pos;
        self.current_token = self.scan_token()?;
        self.token_end = self.pos;
        Ok(())
    }

    fn scan_token(&mut self) -> FormulaResult<Token> {
        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        // Single-character tokens
        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            ',' => Some(Token::Comma),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        // String literal
        if c == '"' {
            return self.scan_string();
        }

        // Number
        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        // Function name, cell address or range
        if c.is_ascii_alphabetic() || c == '_' {
            return self.scan_word();
        }

        Err(FormulaError::parse(
            format!("unexpected character '{}'", c),
            c.to_string(),
        ))
    }

    fn scan_string(&mut self) -> FormulaResult<Token> {
        let start = self.pos;
        self.advance(); // Skip opening quote

        let mut s = String::new();
        loop {
            match self.peek_char() {
                None => {
                    return Err(FormulaError::parse(
                        "unterminated string literal",
                        &self.input[start..],
                    ))
                }
                Some('"') => {
                    // Escaped quote ("")
                    if self.peek_char_at(1) == Some('"') {
                        s.push('"');
                        self.advance();
                        self.advance();
                    } else {
                        self.advance();
                        break;
                    }
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
            }
        }

        Ok(Token::String(s))
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        // Integer part
        self.advance_while(|c| c.is_ascii_digit());

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            self.advance_while(|c| c.is_ascii_digit());
        }

        // Exponent part
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            self.advance();
            if self.peek_char().map_or(false, |c| c == '+' || c == '-') {
                self.advance();
            }
            self.advance_while(|c| c.is_ascii_digit());
        }

        let num_str = &self.input[start..self.pos];
        num_str
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Token::Number)
            .ok_or_else(|| FormulaError::parse("invalid number", num_str))
    }

    fn scan_word(&mut self) -> FormulaResult<Token> {
        let start = self.pos;
        self.advance_while(is_word_char);
        let word = &self.input[start..self.pos];

        // A word directly followed by '(' is a function call
        if self.peek_non_whitespace() == Some('(') {
            return Ok(Token::Identifier(word.to_uppercase()));
        }

        // Anything joined by ':' is a range token
        if self.peek_non_whitespace() == Some(':') {
            self.skip_whitespace();
            self.advance(); // ':'
            self.skip_whitespace();
            let end_start = self.pos;
            self.advance_while(is_word_char);

            let text = format!("{}:{}", word, &self.input[end_start..self.pos]);
            let range =
                CellRange::parse(&text).map_err(|_| FormulaError::InvalidRange(text.clone()))?;
            return Ok(Token::Range(range));
        }

        if is_address_like(word) {
            let address = CellAddress::parse(word)
                .map_err(|_| FormulaError::InvalidAddress(word.to_string()))?;
            return Ok(Token::Address(address));
        }

        Ok(Token::Identifier(word.to_uppercase()))
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn peek_non_whitespace(&self) -> Option<char> {
        self.input[self.pos..].chars().find(|c| !c.is_whitespace())
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek_char().map_or(false, &pred) {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        self.advance_while(char::is_whitespace);
    }

    /// Source text of the current token, or the whole body at end of input
    fn fragment(&self) -> &'a str {
        if self.current_token == Token::Eof {
            self.input
        } else {
            &self.input[self.token_start..self.token_end]
        }
    }

    fn unexpected(&self) -> FormulaError {
        let message = if self.current_token == Token::Eof {
            "unexpected end of formula".to_string()
        } else {
            format!("unexpected token {:?}", self.current_token)
        };
        FormulaError::parse(message, self.fragment())
    }

    fn consume(&mut self) -> FormulaResult<Token> {
        let token = std::mem::replace(&mut self.current_token, Token::Eof);
        self.advance_token()?;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if &self.current_token == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(FormulaError::parse(
                format!("expected {:?}, got {:?}", expected, self.current_token),
                self.fragment(),
            ))
        }
    }

    // === Nesting limits ===

    /// Enter a parenthesis, prefix operator or call
    fn enter(&mut self) -> FormulaResult<()> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(FormulaError::parse(
                "formula nested too deeply",
                self.fragment(),
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    /// Attach the tree depth to a node, rejecting trees that are too deep
    fn node(&self, expr: FormulaExpr, depth: usize) -> FormulaResult<Parsed> {
        if depth > MAX_DEPTH {
            return Err(FormulaError::parse("formula too complex", self.fragment()));
        }
        Ok((expr, depth))
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Addition/Subtraction: +, -
    // 2. Multiplication/Division: *, /
    // 3. Unary: -, +
    // 4. Primary: literals, references, function calls, parentheses

    fn parse_expression(&mut self) -> FormulaResult<Parsed> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> FormulaResult<Parsed> {
        let (mut left, mut depth) = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume()?;
            let (right, right_depth) = self.parse_multiplicative()?;
            let expr = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
            (left, depth) = self.node(expr, depth.max(right_depth) + 1)?;
        }

        Ok((left, depth))
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<Parsed> {
        let (mut left, mut depth) = self.parse_unary()?;

        loop {
            let op = match self.current_token {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.consume()?;
            let (right, right_depth) = self.parse_unary()?;
            let expr = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
            (left, depth) = self.node(expr, depth.max(right_depth) + 1)?;
        }

        Ok((left, depth))
    }

    fn parse_unary(&mut self) -> FormulaResult<Parsed> {
        match self.current_token {
            Token::Minus => {
                self.enter()?;
                self.consume()?;
                let (operand, depth) = self.parse_unary()?;
                self.leave();
                self.node(FormulaExpr::Negate(Box::new(operand)), depth + 1)
            }
            // Prefix plus (no-op)
            Token::Plus => {
                self.enter()?;
                self.consume()?;
                let parsed = self.parse_unary()?;
                self.leave();
                Ok(parsed)
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> FormulaResult<Parsed> {
        match self.current_token.clone() {
            Token::Number(n) => {
                self.consume()?;
                Ok((FormulaExpr::Literal(CellValue::Number(n)), 1))
            }

            Token::String(s) => {
                self.consume()?;
                Ok((FormulaExpr::Literal(CellValue::Text(s)), 1))
            }

            Token::Address(address) => {
                self.consume()?;
                Ok((FormulaExpr::CellRef(address), 1))
            }

            Token::Range(range) => {
                self.consume()?;
                Ok((FormulaExpr::RangeRef(range), 1))
            }

            Token::LeftParen => {
                self.enter()?;
                self.consume()?;
                let parsed = self.parse_expression()?;
                self.expect(&Token::RightParen)?;
                self.leave();
                Ok(parsed)
            }

            Token::Identifier(name) => {
                let fragment = self.fragment();
                self.consume()?;
                if self.current_token == Token::LeftParen {
                    self.parse_function_call(name)
                } else {
                    Err(FormulaError::parse(
                        format!("unknown name '{}'", name),
                        fragment,
                    ))
                }
            }

            _ => Err(self.unexpected()),
        }
    }

    fn parse_function_call(&mut self, name: String) -> FormulaResult<Parsed> {
        if get_function_registry().get(&name).is_none() {
            return Err(FormulaError::UnknownFunction(name));
        }

        self.enter()?;
        self.expect(&Token::LeftParen)?;

        let mut args = Vec::new();
        let mut depth = 0;

        // Parse arguments
        if self.current_token != Token::RightParen {
            loop {
                let (arg, arg_depth) = self.parse_expression()?;
                depth = depth.max(arg_depth);
                args.push(arg);

                if self.current_token != Token::Comma {
                    break;
                }
                self.consume()?;
            }
        }

        self.expect(&Token::RightParen)?;
        self.leave();

        self.node(FormulaExpr::Function { name, args }, depth + 1)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Letters followed by digits, e.g. `A1`, `zz0`
fn is_address_like(word: &str) -> bool {
    let letters = word.bytes().take_while(u8::is_ascii_alphabetic).count();
    letters > 0 && letters < word.len() && word[letters..].bytes().all(|b| b.is_ascii_digit())
}
