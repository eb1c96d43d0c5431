//! # sheetcalc-formula
//!
//! Formula parser, evaluator and dependency graph for sheetcalc.
//!
//! This crate provides:
//! - Formula parsing (text → AST)
//! - Formula evaluation (AST → value)
//! - Built-in functions (SUM, AVERAGE, MAX, MIN, COUNT, TRIM, UPPER, LOWER,
//!   REMOVE_DUPLICATES)
//! - Dependency tracking with cycle detection and topological ordering
//!
//! ## Example
//!
//! ```rust
//! use sheetcalc_core::{CellAddress, CellValue};
//! use sheetcalc_formula::{evaluate, parse_formula, EvaluationContext};
//!
//! let ast = parse_formula("=SUM(A1:A2) * 2").unwrap();
//! let lookup = |addr: CellAddress| CellValue::Number(addr.row as f64);
//! let ctx = EvaluationContext::new(&lookup);
//! assert_eq!(evaluate(&ast, &ctx), CellValue::Number(6.0));
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;

pub use ast::{BinaryOperator, FormulaExpr};
pub use dependency::DependencyGraph;
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{coerce_number, evaluate, CellLookup, EvaluationContext};
pub use functions::{ArgValue, FunctionRegistry};
pub use parser::parse_formula;
