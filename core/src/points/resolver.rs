//! Lazy resolution of symbolic points into absolute positions.

use super::types::{Point, PointId, PointStore};
use crate::geometry::{self, Vec2};
use crate::variables::{evaluate, EvalError, Expr, VariableEnv};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// The point, or a point it is anchored on, is not in the store
    #[error("Unresolved reference to {0}")]
    UnresolvedReference(PointId),

    /// The reference path loops; the last id repeats an earlier one.
    /// Shared, since every point on the loop reports the same path.
    #[error("Cyclic reference: {}", format_path(.0))]
    CyclicReference(Arc<[PointId]>),

    #[error("Expression failed in {point}: {source}")]
    Expression { point: PointId, source: EvalError },

    /// Circle intersection without a finite, unique pair of solutions
    #[error("Circles of {0} do not intersect")]
    GeometricInconsistency(PointId),
}

fn format_path(path: &[PointId]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" → ")
}

enum Step {
    Descend(PointId),
    Done(Result<Vec2, ResolveError>),
}

/// Resolver for a single snapshot of points and variables.
///
/// Results are memoized for the lifetime of the resolver, so one resolver
/// should be used per redraw and dropped afterwards.
pub struct Resolver<'a> {
    points: &'a PointStore,
    env: &'a VariableEnv,
    /// Points on the current resolution path, outermost first
    visiting: Vec<PointId>,
    on_path: HashSet<PointId>,
    memo: HashMap<PointId, Result<Vec2, ResolveError>>,
}

impl<'a> Resolver<'a> {
    pub fn new(points: &'a PointStore, env: &'a VariableEnv) -> Self {
        Self {
            points,
            env,
            visiting: Vec::new(),
            on_path: HashSet::new(),
            memo: HashMap::new(),
        }
    }

    pub fn resolve(&mut self, id: PointId) -> Result<Vec2, ResolveError> {
        if let Some(result) = self.memo.get(&id) {
            return result.clone();
        }

        // Depth-first over anchors with an explicit stack; `visiting` is the
        // current reference path, so long chains only cost heap.
        self.visiting.clear();
        self.on_path.clear();
        self.push(id);

        while let Some(&current) = self.visiting.last() {
            let points = self.points;
            let Some(point) = points.get(current) else {
                self.memo.insert(current, Err(ResolveError::UnresolvedReference(current)));
                self.pop();
                continue;
            };

            match self.next_step(current, point) {
                Step::Descend(anchor) => self.push(anchor),
                Step::Done(result) => {
                    // Every point that reached a cycle is itself unresolvable,
                    // so caching failures is as safe as caching positions.
                    self.memo.insert(current, result);
                    self.pop();
                }
            }
        }

        self.anchor(id)
    }

    fn push(&mut self, id: PointId) {
        self.visiting.push(id);
        self.on_path.insert(id);
    }

    fn pop(&mut self) {
        if let Some(id) = self.visiting.pop() {
            self.on_path.remove(&id);
        }
    }

    /// Either an anchor still to resolve, or the final result for `id`.
    fn next_step(&self, id: PointId, point: &Point) -> Step {
        for anchor in point.references() {
            match self.memo.get(&anchor) {
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Step::Done(Err(e.clone())),
                None => {}
            }

            if self.on_path.contains(&anchor) {
                let start = self.visiting.iter().position(|v| *v == anchor).unwrap_or(0);
                let mut path = self.visiting[start..].to_vec();
                path.push(anchor);
                return Step::Done(Err(ResolveError::CyclicReference(path.into())));
            }
            return Step::Descend(anchor);
        }

        Step::Done(self.compute(id, point))
    }

    /// Memoized result of an already-resolved point.
    fn anchor(&self, id: PointId) -> Result<Vec2, ResolveError> {
        self.memo
            .get(&id)
            .cloned()
            .unwrap_or(Err(ResolveError::UnresolvedReference(id)))
    }

    /// Resolve every point in the store, in display order.
    pub fn resolve_all(&mut self) -> BTreeMap<PointId, Result<Vec2, ResolveError>> {
        self.points
            .ids()
            .into_iter()
            .map(|id| (id, self.resolve(id)))
            .collect()
    }

    fn eval(&self, point: PointId, expr: &Expr) -> Result<f64, ResolveError> {
        evaluate(expr, self.env).map_err(|source| ResolveError::Expression { point, source })
    }

    /// Position of `point` once all of its anchors are memoized.
    fn compute(&self, id: PointId, point: &Point) -> Result<Vec2, ResolveError> {
        match point {
            Point::Absolute { x, y } => Ok(Vec2::new(self.eval(id, x)?, self.eval(id, y)?)),

            Point::Relative { anchor, dx, dy } => {
                let origin = self.anchor(*anchor)?;
                let offset = Vec2::new(self.eval(id, dx)?, self.eval(id, dy)?);
                Ok(origin + offset)
            }

            Point::Distance { anchor, distance, angle } => {
                let origin = self.anchor(*anchor)?;
                let d = self.eval(id, distance)?;
                let a = self.eval(id, angle)?;
                Ok(geometry::polar_offset(&origin, d, a))
            }

            Point::Between { first, second, fraction } => {
                let a = self.anchor(*first)?;
                let b = self.anchor(*second)?;
                let t = self.eval(id, fraction)?;
                Ok(geometry::lerp(&a, &b, t))
            }

            Point::CircleIntersection {
                first,
                first_radius,
                second,
                second_radius,
                prefer_first_solution,
            } => {
                let c1 = self.anchor(*first)?;
                let c2 = self.anchor(*second)?;
                let r1 = self.eval(id, first_radius)?;
                let r2 = self.eval(id, second_radius)?;

                if !(geometry::is_finite(&c1) && geometry::is_finite(&c2)) {
                    return Err(ResolveError::GeometricInconsistency(id));
                }

                let [p, q] = geometry::circle_circle_intersection(&c1, r1, &c2, r2)
                    .ok_or(ResolveError::GeometricInconsistency(id))?;
                Ok(if *prefer_first_solution { p } else { q })
            }
        }
    }
}

/// Compute the absolute position of one point, from scratch.
pub fn resolve_position(
    id: PointId,
    points: &PointStore,
    env: &VariableEnv,
) -> Result<Vec2, ResolveError> {
    Resolver::new(points, env).resolve(id)
}
