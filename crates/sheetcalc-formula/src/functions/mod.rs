//! Built-in functions

pub mod math;
pub mod text;

use crate::evaluator::EvaluationContext;
use sheetcalc_core::{CellError, CellValue};
use std::collections::HashMap;

/// Result of a function call; `Err` becomes the cell's error value
pub type FunctionResult = Result<CellValue, CellError>;

/// Function implementation signature
pub type FunctionImpl = fn(&[ArgValue], &EvaluationContext) -> FunctionResult;

/// An evaluated function argument
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Result of a scalar expression
    Scalar(CellValue),
    /// Values of a range, row-major
    Range(Vec<CellValue>),
}

impl ArgValue {
    /// All values of the argument; a scalar is a one-element range
    pub fn values(&self) -> &[CellValue] {
        match self {
            ArgValue::Scalar(value) => std::slice::from_ref(value),
            ArgValue::Range(values) => values,
        }
    }

    /// The scalar value, or a type mismatch for ranges
    pub fn scalar(&self) -> Result<&CellValue, CellError> {
        match self {
            ArgValue::Scalar(value) => Ok(value),
            ArgValue::Range(_) => Err(CellError::TypeMismatch),
        }
    }
}

/// Function definition
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
}

/// Function registry
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionDef>,
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };

        registry.register_math_functions();
        registry.register_text_functions();

        registry
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_uppercase())
    }

    /// Register a function
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.to_uppercase(), def);
    }

    fn register_math_functions(&mut self) {
        // SUM
        self.register(FunctionDef {
            name: "SUM",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_sum,
        });

        // AVERAGE
        self.register(FunctionDef {
            name: "AVERAGE",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_average,
        });

        // MAX
        self.register(FunctionDef {
            name: "MAX",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_max,
        });

        // MIN
        self.register(FunctionDef {
            name: "MIN",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_min,
        });

        // COUNT
        self.register(FunctionDef {
            name: "COUNT",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_count,
        });
    }

    fn register_text_functions(&mut self) {
        // TRIM
        self.register(FunctionDef {
            name: "TRIM",
            min_args: 1,
            max_args: Some(1),
            implementation: text::fn_trim,
        });

        // UPPER
        self.register(FunctionDef {
            name: "UPPER",
            min_args: 1,
            max_args: Some(1),
            implementation: text::fn_upper,
        });

        // LOWER
        self.register(FunctionDef {
            name: "LOWER",
            min_args: 1,
            max_args: Some(1),
            implementation: text::fn_lower,
        });

        // REMOVE_DUPLICATES
        self.register(FunctionDef {
            name: "REMOVE_DUPLICATES",
            min_args: 1,
            max_args: Some(1),
            implementation: text::fn_remove_duplicates,
        });
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
