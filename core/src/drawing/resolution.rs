//! One redraw's worth of resolved geometry.

use super::model::Drawing;
use crate::pieces::{resolve_piece, ResolvedPiece};
use crate::points::{PointId, ResolveError, Resolver};
use crate::variables::evaluator::evaluate_all;
use serde::Serialize;
use std::collections::BTreeMap;

/// Why a point is not drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointFailure {
    /// Stable code for the view layer
    pub code: &'static str,
    pub message: String,
}

impl From<&ResolveError> for PointFailure {
    fn from(err: &ResolveError) -> Self {
        let code = match err {
            ResolveError::UnresolvedReference(_) => "UNRESOLVED_REFERENCE",
            ResolveError::CyclicReference(_) => "CYCLIC_REFERENCE",
            ResolveError::Expression { .. } => "EXPRESSION_FAILED",
            ResolveError::GeometricInconsistency(_) => "NO_INTERSECTION",
        };
        Self {
            code,
            message: err.to_string(),
        }
    }
}

/// Row of the variable table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableValue {
    pub name: String,
    pub expression: String,
    pub value: Option<f64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawingResolution {
    /// Positions of every point that resolved
    pub positions: BTreeMap<PointId, [f64; 2]>,
    pub failures: BTreeMap<PointId, PointFailure>,
    pub pieces: Vec<ResolvedPiece>,
    pub variables: Vec<VariableValue>,
}

impl DrawingResolution {
    pub fn compute(drawing: &Drawing) -> Self {
        let results = Resolver::new(&drawing.points, &drawing.variables).resolve_all();

        let mut positions = BTreeMap::new();
        let mut failures = BTreeMap::new();
        for (id, result) in &results {
            match result {
                Ok(p) => {
                    positions.insert(*id, [p.x, p.y]);
                }
                Err(err) => {
                    failures.insert(*id, PointFailure::from(err));
                }
            }
        }

        let pieces = drawing
            .pieces
            .iter()
            .map(|(id, piece)| resolve_piece(id, piece, &results))
            .collect();

        let variables = evaluate_all(&drawing.variables)
            .into_iter()
            .map(|(name, value)| {
                let expression = drawing
                    .variables
                    .get(&name)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                let (value, error) = match value {
                    Ok(v) => (Some(v), None),
                    Err(e) => (None, Some(e.to_string())),
                };
                VariableValue {
                    name,
                    expression,
                    value,
                    error,
                }
            })
            .collect();

        Self {
            positions,
            failures,
            pieces,
            variables,
        }
    }

    pub fn position(&self, id: PointId) -> Option<[f64; 2]> {
        self.positions.get(&id).copied()
    }
}
