//! Points defined relative to other points and resolved on demand.

pub mod types;
pub mod resolver;

#[cfg(test)]
mod tests_resolution;
#[cfg(test)]
mod tests_store;

pub use types::{Point, PointEntry, PointId, PointStore};
pub use resolver::{resolve_position, ResolveError, Resolver};
