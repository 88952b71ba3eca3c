//! Robust 2D orientation predicate.
//!
//! The centroid engine's CCW test needs exact results even when the fast
//! floating-point determinant is too close to zero to trust (§4.1). The
//! teacher crate faces the same problem and solves it by delegating to the
//! `robust` crate's adaptive-precision `orient2d` (see
//! `geo/src/algorithm/kernels/robust.rs`), which runs a fast filter first and
//! falls back to exact arbitrary-precision arithmetic only when the filter's
//! error bound can't rule out zero. We do the same, behind a small trait so a
//! different extended-precision backend could be swapped in without touching
//! callers (§9 design note).

use crate::geometry::Point;

/// The three possible outcomes of testing the turn `p -> q -> r`.
#[cfg_attr(feature = "use-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// `p, q, r` make a counterclockwise turn (`LEFT`, +1).
    CounterClockwise,
    /// `p, q, r` make a clockwise turn (`RIGHT`, -1).
    Clockwise,
    /// `p, q, r` are collinear (`STRAIGHT`, 0).
    Collinear,
}

/// Abstraction over the extended-precision orientation test, so the backend
/// (currently the `robust` crate's adaptive-precision determinant) isn't
/// hardwired into every caller.
pub trait OrientationKernel {
    fn orient2d(p: Point, q: Point, r: Point) -> Orientation;
}

/// Default kernel: `robust::orient2d`, a fast double filter with an
/// extended-precision (>106-bit significand) fallback, per Shewchuk's
/// adaptive-precision geometric predicates.
pub struct RobustOrientation;

impl OrientationKernel for RobustOrientation {
    fn orient2d(p: Point, q: Point, r: Point) -> Orientation {
        let det = robust::orient2d(
            robust::Coord { x: p.x, y: p.y },
            robust::Coord { x: q.x, y: q.y },
            robust::Coord { x: r.x, y: r.y },
        );
        if det > 0.0 {
            Orientation::CounterClockwise
        } else if det < 0.0 {
            Orientation::Clockwise
        } else {
            Orientation::Collinear
        }
    }
}

/// Convenience free function using the default [`RobustOrientation`] kernel.
pub fn orientation_index(p: Point, q: Point, r: Point) -> Orientation {
    RobustOrientation::orient2d(p, q, r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ccw_triangle() {
        let o = orientation_index(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        );
        assert_eq!(o, Orientation::CounterClockwise);
    }

    #[test]
    fn cw_triangle() {
        let o = orientation_index(
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 0.0),
        );
        assert_eq!(o, Orientation::Clockwise);
    }

    #[test]
    fn collinear_points() {
        let o = orientation_index(
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 2.0),
        );
        assert_eq!(o, Orientation::Collinear);
    }

    #[test]
    fn near_collinear_resolves_without_panicking() {
        // A case the fast double filter alone cannot resolve confidently;
        // `robust::orient2d`'s exact fallback must still terminate cleanly.
        let o = orientation_index(
            Point::new(24.0, 0.0),
            Point::new(24.0 + 1e-15, 1e-15),
            Point::new(48.0, 0.0),
        );
        matches!(
            o,
            Orientation::Collinear | Orientation::Clockwise | Orientation::CounterClockwise
        );
    }
}
