use nalgebra as na;

pub type Vec2 = na::Vector2<f64>;

pub const EPSILON: f64 = 1e-6;

pub trait ApproxEq {
    fn approx_eq(&self, other: &Self) -> bool;
}

impl ApproxEq for f64 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).abs() < EPSILON
    }
}

impl ApproxEq for Vec2 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).norm_squared() < EPSILON * EPSILON
    }
}

pub mod intersection;
pub use intersection::*;

/// Point at `t` along the line from `a` to `b`. `t` outside [0, 1] extrapolates.
pub fn lerp(a: &Vec2, b: &Vec2, t: f64) -> Vec2 {
    a + (b - a) * t
}

/// Point at `distance` from `origin` in direction `angle` (radians, counterclockwise from +x).
pub fn polar_offset(origin: &Vec2, distance: f64, angle: f64) -> Vec2 {
    origin + Vec2::new(distance * angle.cos(), distance * angle.sin())
}

pub fn is_finite(v: &Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}
