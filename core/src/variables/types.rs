//! Core types for the variable system.

use super::parser::{is_valid_name, parse_expression, Expr, ParseError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from editing the variable environment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VariableError {
    #[error("Variable '{0}' already exists")]
    AlreadyExists(String),
    #[error("Variable '{0}' not found")]
    NotFound(String),
    #[error("'{0}' is not a valid variable name")]
    InvalidName(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Named expressions that point definitions may reference.
///
/// Lookup is by name; `order` only drives how the variable table is listed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableEnv {
    variables: HashMap<String, Expr>,
    /// User-visible ordering (insertion order, renames keep their slot)
    order: Vec<String>,
}

impl VariableEnv {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Expr> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Bind `name` to `expr`, replacing any previous binding in place.
    pub fn set(&mut self, name: &str, expr: Expr) -> Result<(), VariableError> {
        if !is_valid_name(name) {
            return Err(VariableError::InvalidName(name.to_string()));
        }
        if self.variables.insert(name.to_string(), expr).is_none() {
            self.order.push(name.to_string());
        }
        Ok(())
    }

    /// Parse `expression` and bind it to `name`.
    pub fn set_expression(&mut self, name: &str, expression: &str) -> Result<(), VariableError> {
        let expr = parse_expression(expression)?;
        self.set(name, expr)
    }

    /// Rename a variable. Expressions referencing the old name are left as they are.
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> Result<(), VariableError> {
        if old_name == new_name {
            return if self.contains(old_name) {
                Ok(())
            } else {
                Err(VariableError::NotFound(old_name.to_string()))
            };
        }
        if !is_valid_name(new_name) {
            return Err(VariableError::InvalidName(new_name.to_string()));
        }
        if self.contains(new_name) {
            return Err(VariableError::AlreadyExists(new_name.to_string()));
        }

        let expr = self
            .variables
            .remove(old_name)
            .ok_or_else(|| VariableError::NotFound(old_name.to_string()))?;
        self.variables.insert(new_name.to_string(), expr);
        if let Some(slot) = self.order.iter_mut().find(|n| n.as_str() == old_name) {
            *slot = new_name.to_string();
        }
        Ok(())
    }

    /// Remove a variable by name
    pub fn remove(&mut self, name: &str) -> Option<Expr> {
        let expr = self.variables.remove(name)?;
        self.order.retain(|n| n != name);
        Some(expr)
    }

    /// All variables in display order
    pub fn ordered(&self) -> Vec<(&str, &Expr)> {
        self.order
            .iter()
            .filter_map(|name| self.variables.get_key_value(name))
            .map(|(name, expr)| (name.as_str(), expr))
            .collect()
    }

    /// Move a variable to a new position in the display order
    pub fn reorder(&mut self, name: &str, new_index: usize) -> Result<(), VariableError> {
        if !self.contains(name) {
            return Err(VariableError::NotFound(name.to_string()));
        }

        self.order.retain(|n| n != name);
        let insert_at = new_index.min(self.order.len());
        self.order.insert(insert_at, name.to_string());
        Ok(())
    }
}
