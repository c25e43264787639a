//! Pieces: named, ordered runs of points drawn as polylines.
//!
//! A piece only stores point ids. Removing a point leaves the id in place;
//! it simply drops out of the drawn outline until it resolves again.

use crate::geometry::Vec2;
use crate::points::{PointId, ResolveError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(pub u64);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Piece{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub name: String,
    pub points: Vec<PointId>,
    /// Whether the outline returns from the last point to the first
    #[serde(default)]
    pub closed: bool,
}

impl Piece {
    pub fn new(name: &str, points: Vec<PointId>) -> Self {
        Self {
            name: name.to_string(),
            points,
            closed: false,
        }
    }

    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceStore {
    pieces: BTreeMap<PieceId, Piece>,
    next_id: u64,
}

impl Default for PieceStore {
    fn default() -> Self {
        Self {
            pieces: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl PieceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn insert(&mut self, piece: Piece) -> PieceId {
        let id = PieceId(self.next_id);
        self.next_id += 1;
        self.pieces.insert(id, piece);
        id
    }

    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    pub fn update(&mut self, id: PieceId, piece: Piece) -> Option<Piece> {
        let slot = self.pieces.get_mut(&id)?;
        Some(std::mem::replace(slot, piece))
    }

    pub fn remove(&mut self, id: PieceId) -> Option<Piece> {
        self.pieces.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PieceId, &Piece)> {
        self.pieces.iter().map(|(id, piece)| (*id, piece))
    }
}

/// A piece outline ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPiece {
    pub id: PieceId,
    pub closed: bool,
    /// Resolved vertices in piece order
    pub vertices: Vec<(PointId, [f64; 2])>,
    /// Piece points that failed to resolve and were left out
    pub missing: Vec<PointId>,
    /// Outline length over the drawn vertices (seam length)
    pub length: f64,
}

fn outline_length(vertices: &[(PointId, [f64; 2])], closed: bool) -> f64 {
    let segment = |a: &[f64; 2], b: &[f64; 2]| ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)).sqrt();

    let open: f64 = vertices
        .windows(2)
        .map(|w| segment(&w[0].1, &w[1].1))
        .sum();

    match (closed, vertices.first(), vertices.last()) {
        (true, Some(first), Some(last)) if vertices.len() > 2 => open + segment(&last.1, &first.1),
        _ => open,
    }
}

/// Lay out a piece from already-resolved positions.
pub fn resolve_piece(
    id: PieceId,
    piece: &Piece,
    positions: &BTreeMap<PointId, Result<Vec2, ResolveError>>,
) -> ResolvedPiece {
    let mut vertices = Vec::with_capacity(piece.points.len());
    let mut missing = Vec::new();

    for point in &piece.points {
        match positions.get(point) {
            Some(Ok(p)) => vertices.push((*point, [p.x, p.y])),
            _ => missing.push(*point),
        }
    }

    let length = outline_length(&vertices, piece.closed);
    ResolvedPiece {
        id,
        closed: piece.closed,
        vertices,
        missing,
        length,
    }
}
