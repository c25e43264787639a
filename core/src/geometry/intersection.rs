//! 2D circle intersection calculations for drafted points

use super::{Vec2, EPSILON};

/// Calculate the intersection points of two circles.
///
/// Returns `None` when the circles are separate, one contains the other,
/// or they share a center (no finite, unique solution). Otherwise returns
/// `[first, second]` where `first` lies counterclockwise of the
/// center-to-center axis as seen from `c1`. Tangent circles yield the same
/// point twice.
///
/// Uses the radical line: the chord midpoint lies at distance
/// a = (r1² - r2² + d²) / 2d from `c1`, the half chord is h = sqrt(r1² - a²).
pub fn circle_circle_intersection(c1: &Vec2, r1: f64, c2: &Vec2, r2: f64) -> Option<[Vec2; 2]> {
    if !(r1.is_finite() && r2.is_finite()) || r1 < 0.0 || r2 < 0.0 {
        return None;
    }

    let axis = c2 - c1;
    let d = axis.norm();

    if !d.is_finite() || d < EPSILON {
        return None;
    }
    if d > r1 + r2 + EPSILON || d < (r1 - r2).abs() - EPSILON {
        return None;
    }

    let u = axis / d;
    // Axis rotated +90°
    let n = Vec2::new(-u.y, u.x);

    let a = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    // Tangency can leave a tiny negative under the root
    let h = (r1 * r1 - a * a).max(0.0).sqrt();

    let base = c1 + u * a;
    Some([base + n * h, base - n * h])
}
