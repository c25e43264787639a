pub mod geometry;
pub mod variables;
pub mod points;
pub mod pieces;
pub mod drawing;
