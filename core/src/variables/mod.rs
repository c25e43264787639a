//! Named variables and the expressions that reference them.
//!
//! Provides:
//! - Arithmetic expressions with bare-name variable references
//! - An environment of named expressions (variables may reference each other)
//! - Evaluation with circular dependency detection

pub mod types;
pub mod parser;
pub mod evaluator;


pub use types::{VariableEnv, VariableError};
pub use parser::{parse_expression, Expr, ParseError};
pub use evaluator::{evaluate, evaluate_all, evaluate_str, EvalError, EvalContext};
