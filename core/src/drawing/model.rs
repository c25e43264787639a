use super::resolution::DrawingResolution;
use crate::geometry::Vec2;
use crate::pieces::{Piece, PieceId, PieceStore};
use crate::points::{resolve_position, Point, PointEntry, PointId, PointStore, ResolveError};
use crate::variables::{Expr, VariableEnv, VariableError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DrawingError {
    #[error("Point {0} not found")]
    PointNotFound(PointId),
    #[error("{0} not found")]
    PieceNotFound(PieceId),
    #[error(transparent)]
    Variable(#[from] VariableError),
}

/// Everything a resolution pass reads.
///
/// A `Drawing` is a plain value: cloning it yields an independent snapshot,
/// and resolving never mutates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    #[serde(default)]
    pub variables: VariableEnv,
    #[serde(default)]
    pub points: PointStore,
    #[serde(default)]
    pub pieces: PieceStore,
}

impl Drawing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_point(&mut self, name: &str, point: Point) -> PointId {
        let id = self.points.insert_named(name, point);
        debug!("Added {} ({})", id, self.points.get(id).map_or("?", Point::kind_name));
        id
    }

    pub fn update_point(&mut self, id: PointId, point: Point) -> Result<(), DrawingError> {
        self.points
            .update(id, point)
            .ok_or(DrawingError::PointNotFound(id))?;
        debug!("Updated {}", id);
        Ok(())
    }

    pub fn rename_point(&mut self, id: PointId, name: &str) -> Result<(), DrawingError> {
        if !self.points.rename(id, name) {
            return Err(DrawingError::PointNotFound(id));
        }
        debug!("Renamed {} to {:?}", id, name);
        Ok(())
    }

    /// Remove a point. Dependents and pieces keep their references.
    pub fn remove_point(&mut self, id: PointId) -> Result<PointEntry, DrawingError> {
        let entry = self.points.remove(id).ok_or(DrawingError::PointNotFound(id))?;
        let orphaned = self.points.dependents(id);
        if orphaned.is_empty() {
            debug!("Removed {}", id);
        } else {
            debug!("Removed {}; {} dependent point(s) now dangle", id, orphaned.len());
        }
        Ok(entry)
    }

    pub fn set_variable(&mut self, name: &str, expression: &str) -> Result<(), DrawingError> {
        self.variables.set_expression(name, expression)?;
        debug!("Set variable {} = {}", name, expression);
        Ok(())
    }

    pub fn rename_variable(&mut self, old_name: &str, new_name: &str) -> Result<(), DrawingError> {
        self.variables.rename(old_name, new_name)?;
        debug!("Renamed variable {} -> {}", old_name, new_name);
        Ok(())
    }

    pub fn remove_variable(&mut self, name: &str) -> Result<Expr, DrawingError> {
        let expr = self
            .variables
            .remove(name)
            .ok_or_else(|| VariableError::NotFound(name.to_string()))?;
        debug!("Removed variable {}", name);
        Ok(expr)
    }

    pub fn add_piece(&mut self, piece: Piece) -> PieceId {
        let id = self.pieces.insert(piece);
        debug!("Added {}", id);
        id
    }

    pub fn update_piece(&mut self, id: PieceId, piece: Piece) -> Result<(), DrawingError> {
        self.pieces
            .update(id, piece)
            .ok_or(DrawingError::PieceNotFound(id))?;
        debug!("Updated {}", id);
        Ok(())
    }

    pub fn remove_piece(&mut self, id: PieceId) -> Result<Piece, DrawingError> {
        let piece = self.pieces.remove(id).ok_or(DrawingError::PieceNotFound(id))?;
        debug!("Removed {}", id);
        Ok(piece)
    }

    /// Resolve one point against this snapshot.
    pub fn resolve(&self, id: PointId) -> Result<Vec2, ResolveError> {
        resolve_position(id, &self.points, &self.variables)
    }

    /// Resolve every point, piece and variable for a redraw.
    pub fn resolve_all(&self) -> DrawingResolution {
        DrawingResolution::compute(self)
    }
}
