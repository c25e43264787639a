//! Expression evaluator with variable resolution.

use super::parser::{parse_expression, BinaryOperator, Expr, ParseError, UnaryOperator};
use super::types::VariableEnv;
use thiserror::Error;

/// Evaluation error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Reference to a variable the environment does not bind
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
    /// A variable refers back to itself through its own expression
    #[error("Circular dependency: {}", .0.join(" → "))]
    CircularDependency(Vec<String>),
    /// Text could not be parsed (only from [`evaluate_str`])
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Evaluation context for one top-level evaluation
pub struct EvalContext<'a> {
    env: &'a VariableEnv,
    /// Variables currently being evaluated, outermost first
    eval_path: Vec<String>,
}

impl<'a> EvalContext<'a> {
    pub fn new(env: &'a VariableEnv) -> Self {
        Self {
            env,
            eval_path: Vec::new(),
        }
    }

    fn eval_variable(&mut self, name: &str) -> Result<f64, EvalError> {
        if self.eval_path.iter().any(|n| n == name) {
            let mut path = self.eval_path.clone();
            path.push(name.to_string());
            return Err(EvalError::CircularDependency(path));
        }

        let expr = self
            .env
            .get(name)
            .ok_or_else(|| EvalError::UnknownVariable(name.to_string()))?;

        self.eval_path.push(name.to_string());
        let value = self.eval_expr(expr);
        self.eval_path.pop();

        value
    }

    pub fn eval_expr(&mut self, expr: &Expr) -> Result<f64, EvalError> {
        match expr {
            Expr::Number(n) => Ok(*n),

            Expr::Variable(name) => self.eval_variable(name),

            Expr::BinaryOp { op, left, right } => {
                let l = self.eval_expr(left)?;
                let r = self.eval_expr(right)?;

                // Division by zero yields inf/NaN; points with non-finite
                // coordinates are simply not drawn.
                Ok(match op {
                    BinaryOperator::Add => l + r,
                    BinaryOperator::Sub => l - r,
                    BinaryOperator::Mul => l * r,
                    BinaryOperator::Div => l / r,
                })
            }

            Expr::UnaryOp { op, operand } => {
                let val = self.eval_expr(operand)?;
                match op {
                    UnaryOperator::Neg => Ok(-val),
                }
            }
        }
    }
}

/// Evaluate an expression against a variable environment
pub fn evaluate(expr: &Expr, env: &VariableEnv) -> Result<f64, EvalError> {
    EvalContext::new(env).eval_expr(expr)
}

/// Parse and evaluate expression text
pub fn evaluate_str(expression: &str, env: &VariableEnv) -> Result<f64, EvalError> {
    let expr = parse_expression(expression)?;
    evaluate(&expr, env)
}

/// Evaluate every variable in display order, for the variable table.
pub fn evaluate_all(env: &VariableEnv) -> Vec<(String, Result<f64, EvalError>)> {
    env.ordered()
        .into_iter()
        .map(|(name, _)| {
            let value = EvalContext::new(env).eval_variable(name);
            (name.to_string(), value)
        })
        .collect()
}
