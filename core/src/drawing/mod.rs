//! The editor's document: variables, points and pieces as one value.

pub mod model;
pub mod resolution;


pub use model::{Drawing, DrawingError};
pub use resolution::{DrawingResolution, PointFailure, VariableValue};
