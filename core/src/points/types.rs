//! Symbolic point definitions and the store that holds them.

use crate::variables::Expr;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Handle of a point inside its [`PointStore`].
///
/// Assigned monotonically on insertion and never reused, so a stale handle
/// can only ever miss, not alias another point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub u64);

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// How a point's position is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Point {
    Absolute {
        x: Expr,
        y: Expr,
    },
    /// `anchor + (dx, dy)`
    Relative {
        anchor: PointId,
        dx: Expr,
        dy: Expr,
    },
    /// At `distance` from `anchor` in direction `angle` (radians)
    Distance {
        anchor: PointId,
        distance: Expr,
        angle: Expr,
    },
    /// `first + fraction * (second - first)`; the fraction is not clamped
    Between {
        first: PointId,
        second: PointId,
        fraction: Expr,
    },
    CircleIntersection {
        first: PointId,
        first_radius: Expr,
        second: PointId,
        second_radius: Expr,
        prefer_first_solution: bool,
    },
}

impl Point {
    pub fn absolute(x: Expr, y: Expr) -> Self {
        Self::Absolute { x, y }
    }

    pub fn relative(anchor: PointId, dx: Expr, dy: Expr) -> Self {
        Self::Relative { anchor, dx, dy }
    }

    pub fn distance(anchor: PointId, distance: Expr, angle: Expr) -> Self {
        Self::Distance { anchor, distance, angle }
    }

    pub fn between(first: PointId, second: PointId, fraction: Expr) -> Self {
        Self::Between { first, second, fraction }
    }

    pub fn circle_intersection(
        first: PointId,
        first_radius: Expr,
        second: PointId,
        second_radius: Expr,
        prefer_first_solution: bool,
    ) -> Self {
        Self::CircleIntersection {
            first,
            first_radius,
            second,
            second_radius,
            prefer_first_solution,
        }
    }

    /// Points this definition is anchored on, in declaration order.
    pub fn references(&self) -> Vec<PointId> {
        match self {
            Self::Absolute { .. } => vec![],
            Self::Relative { anchor, .. } | Self::Distance { anchor, .. } => vec![*anchor],
            Self::Between { first, second, .. }
            | Self::CircleIntersection { first, second, .. } => vec![*first, *second],
        }
    }

    pub fn expressions(&self) -> Vec<&Expr> {
        match self {
            Self::Absolute { x, y } => vec![x, y],
            Self::Relative { dx, dy, .. } => vec![dx, dy],
            Self::Distance { distance, angle, .. } => vec![distance, angle],
            Self::Between { fraction, .. } => vec![fraction],
            Self::CircleIntersection { first_radius, second_radius, .. } => {
                vec![first_radius, second_radius]
            }
        }
    }

    /// Variable names used by this definition's own expressions.
    pub fn variables(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in self.expressions().into_iter().flat_map(Expr::variables) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Absolute { .. } => "Absolute",
            Self::Relative { .. } => "Relative",
            Self::Distance { .. } => "Distance",
            Self::Between { .. } => "Between",
            Self::CircleIntersection { .. } => "CircleIntersection",
        }
    }
}

/// A stored point: its definition plus the label shown in the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointEntry {
    pub id: PointId,
    #[serde(default)]
    pub name: String,
    pub point: Point,
}

/// Flat id → point map. Iteration follows insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointStore {
    points: BTreeMap<PointId, PointEntry>,
    next_id: u64,
}

impl Default for PointStore {
    fn default() -> Self {
        Self {
            points: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl PointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Add a point under a fresh id. Referenced ids are not checked.
    pub fn insert(&mut self, point: Point) -> PointId {
        self.insert_named("", point)
    }

    pub fn insert_named(&mut self, name: &str, point: Point) -> PointId {
        let id = PointId(self.next_id);
        self.next_id += 1;
        self.points.insert(
            id,
            PointEntry {
                id,
                name: name.to_string(),
                point,
            },
        );
        id
    }

    pub fn get(&self, id: PointId) -> Option<&Point> {
        self.points.get(&id).map(|e| &e.point)
    }

    pub fn entry(&self, id: PointId) -> Option<&PointEntry> {
        self.points.get(&id)
    }

    pub fn contains(&self, id: PointId) -> bool {
        self.points.contains_key(&id)
    }

    /// Replace a point's definition, keeping its id. Returns the old definition.
    pub fn update(&mut self, id: PointId, point: Point) -> Option<Point> {
        let entry = self.points.get_mut(&id)?;
        Some(std::mem::replace(&mut entry.point, point))
    }

    pub fn rename(&mut self, id: PointId, name: &str) -> bool {
        match self.points.get_mut(&id) {
            Some(entry) => {
                entry.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Remove a point. Points anchored on it are left dangling.
    pub fn remove(&mut self, id: PointId) -> Option<PointEntry> {
        self.points.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointEntry> {
        self.points.values()
    }

    pub fn ids(&self) -> Vec<PointId> {
        self.points.keys().copied().collect()
    }

    /// Points whose definition directly references `id`.
    pub fn dependents(&self, id: PointId) -> Vec<PointId> {
        self.iter()
            .filter(|e| e.point.references().contains(&id))
            .map(|e| e.id)
            .collect()
    }

    /// `(point, missing anchor)` pairs for every reference to a point that
    /// is no longer in the store.
    pub fn dangling_references(&self) -> Vec<(PointId, PointId)> {
        self.iter()
            .flat_map(|e| {
                e.point
                    .references()
                    .into_iter()
                    .filter(|r| !self.contains(*r))
                    .map(move |r| (e.id, r))
            })
            .collect()
    }
}
