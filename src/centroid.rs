//! Robust polygon centroid (§4.1).
//!
//! Ported from the three-sum shoelace-centroid accumulation the original
//! GeoDa/JTS-derived `Centroid` class uses (`shape/centroid.h`), rewritten
//! against owned `PolygonContents` instead of raw pointer-indexed rings, with
//! the same CCW and orientation-filter logic carried over. Follows the
//! teacher crate's [`Centroid`]-trait shape (`geo/src/algorithm/centroid.rs`)
//! but returns a fallback centroid rather than `None` for degenerate input —
//! §4.1/§7 require the engine to never fail outright.

use crate::geometry::{Point, PolygonContents};
use crate::orientation::{orientation_index, Orientation};

/// Computes the robust centroid of `poly`, following §4.1's three-tier
/// fallback: area-weighted centroid, then length-weighted midpoint, then
/// vertex mean. Always returns a point unless `poly` has zero vertices.
pub fn polygon_centroid(poly: &PolygonContents) -> Option<Point> {
    if poly.points.is_empty() {
        return None;
    }

    let mut accum = CentroidAccumulator::default();
    accum.add_shell(poly);
    for part in 1..poly.num_parts() {
        accum.add_hole(poly, part);
    }
    Some(accum.finish())
}

#[derive(Default)]
struct CentroidAccumulator {
    area_base: Point3Sum,
    cg3: Point3Sum,
    areasum2: f64,
    line_cent_sum: Point3Sum,
    total_length: f64,
    pt_cent_sum: Point3Sum,
    pt_count: usize,
    area_base_set: bool,
}

/// A running `(x, y)` sum; named for the "3-sum" accumulation in §4.1
/// (`cg3`/`areasum2` hold un-normalized sums, divided down in [`finish`]).
#[derive(Default, Clone, Copy)]
struct Point3Sum {
    x: f64,
    y: f64,
}

impl CentroidAccumulator {
    fn set_area_base(&mut self, p: Point) {
        if !self.area_base_set {
            self.area_base = Point3Sum { x: p.x, y: p.y };
            self.area_base_set = true;
        }
    }

    fn area_base_point(&self) -> Point {
        Point::new(self.area_base.x, self.area_base.y)
    }

    fn add_triangle(&mut self, p0: Point, p1: Point, p2: Point, is_positive_area: bool) {
        let sign = if is_positive_area { 1.0 } else { -1.0 };
        let a2 = (p1.x - p0.x) * (p2.y - p0.y) - (p2.x - p0.x) * (p1.y - p0.y);
        let cx = p0.x + p1.x + p2.x;
        let cy = p0.y + p1.y + p2.y;
        self.cg3.x += sign * a2 * cx;
        self.cg3.y += sign * a2 * cy;
        self.areasum2 += sign * a2;
    }

    fn add_line_segments(&mut self, pts: &[Point]) {
        if pts.len() < 2 {
            return;
        }
        let mut line_len = 0.0;
        for w in pts.windows(2) {
            let (a, b) = (w[0], w[1]);
            let seg_len = a.euclidean_distance(&b);
            if seg_len == 0.0 {
                continue;
            }
            line_len += seg_len;
            self.line_cent_sum.x += seg_len * (a.x + b.x) / 2.0;
            self.line_cent_sum.y += seg_len * (a.y + b.y) / 2.0;
        }
        self.total_length += line_len;
        if line_len == 0.0 && !pts.is_empty() {
            self.pt_count += 1;
            self.pt_cent_sum.x += pts[0].x;
            self.pt_cent_sum.y += pts[0].y;
        }
    }

    fn add_shell(&mut self, poly: &PolygonContents) {
        let ring = poly.exterior();
        if ring.is_empty() {
            return;
        }
        self.set_area_base(ring[0]);
        // Exterior ring: positive area convention is "NOT CCW" (§4.1).
        let is_positive_area = !is_ccw(ring);
        let base = self.area_base_point();
        for w in ring.windows(2) {
            self.add_triangle(base, w[0], w[1], is_positive_area);
        }
        self.add_line_segments(ring);
    }

    fn add_hole(&mut self, poly: &PolygonContents, part: usize) {
        let (s, e) = poly.ring_range(part);
        let ring = &poly.points[s..e];
        if ring.is_empty() {
            return;
        }
        // Hole: positive area convention is "IS CCW" (§4.1).
        let is_positive_area = is_ccw(ring);
        let base = self.area_base_point();
        for w in ring.windows(2) {
            self.add_triangle(base, w[0], w[1], is_positive_area);
        }
        self.add_line_segments(ring);
    }

    fn finish(&self) -> Point {
        if self.areasum2.abs() > 0.0 {
            Point::new(self.cg3.x / 3.0 / self.areasum2, self.cg3.y / 3.0 / self.areasum2)
        } else if self.total_length > 0.0 {
            Point::new(
                self.line_cent_sum.x / self.total_length,
                self.line_cent_sum.y / self.total_length,
            )
        } else if self.pt_count > 0 {
            Point::new(
                self.pt_cent_sum.x / self.pt_count as f64,
                self.pt_cent_sum.y / self.pt_count as f64,
            )
        } else {
            Point::new(0.0, 0.0)
        }
    }
}

/// CCW detection by the highest-`y`-vertex rule (§4.1). `ring` must include
/// its closing point (first == last), matching `PolygonContents` rings.
///
/// Degenerate rings (fewer than 3 distinct points, or an A-B-A
/// configuration) return `false` rather than erroring — §7's
/// `DegenerateGeometry` handling.
pub fn is_ccw(ring: &[Point]) -> bool {
    // Drop the closing duplicate point, as the original does ("nPts" is the
    // count without it).
    let n = if ring.len() > 1 && ring[0] == ring[ring.len() - 1] {
        ring.len() - 1
    } else {
        ring.len()
    };
    if n < 3 {
        return false;
    }
    let pts = &ring[..n];

    let mut hi_index = 0;
    for (i, p) in pts.iter().enumerate().skip(1) {
        if p.y > pts[hi_index].y {
            hi_index = i;
        }
    }
    let hi = pts[hi_index];

    let mut i_prev = hi_index;
    loop {
        i_prev = if i_prev == 0 { n - 1 } else { i_prev - 1 };
        if pts[i_prev] != hi || i_prev == hi_index {
            break;
        }
    }
    let mut i_next = hi_index;
    loop {
        i_next = (i_next + 1) % n;
        if pts[i_next] != hi || i_next == hi_index {
            break;
        }
    }

    let prev = pts[i_prev];
    let next = pts[i_next];

    // A-B-A / degenerate configuration: not a well-formed ring, treat as
    // non-CCW without throwing (§4.1, §7).
    if prev == hi || next == hi || prev == next {
        return false;
    }

    match orientation_index(prev, hi, next) {
        Orientation::Collinear => prev.x > next.x,
        other => other == Orientation::CounterClockwise,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(ccw: bool) -> Vec<Point> {
        let mut pts = vec![
            Point::new(0., 0.),
            Point::new(2., 0.),
            Point::new(2., 2.),
            Point::new(0., 2.),
            Point::new(0., 0.),
        ];
        if !ccw {
            pts.reverse();
        }
        pts
    }

    #[test]
    fn exact_ccw_and_cw_agree_with_is_ccw() {
        assert!(is_ccw(&square(true)));
        assert!(!is_ccw(&square(false)));
    }

    #[test]
    fn near_collinear_a_b_a_ring_is_not_ccw_and_does_not_panic() {
        let ring = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 0.0),
        ];
        assert!(!is_ccw(&ring));
    }

    #[test]
    fn square_centroid() {
        let poly = PolygonContents::new(square(true), vec![]);
        let c = polygon_centroid(&poly).unwrap();
        assert_relative_eq!(c.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(c.y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn square_with_hole_centroid_matches_weighted_average() {
        let ext = square(true);
        let hole = vec![
            Point::new(0.8, 0.8),
            Point::new(1.2, 0.8),
            Point::new(1.2, 1.2),
            Point::new(0.8, 1.2),
            Point::new(0.8, 0.8),
        ];
        let poly = PolygonContents::new(ext, vec![hole]);
        let c = polygon_centroid(&poly).unwrap();
        // Symmetric hole about the square's own centroid: centroid unchanged.
        assert_relative_eq!(c.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(c.y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_zero_area_ring_falls_back_to_length_weighted_midpoint() {
        // A flat "polygon" that is really a line segment back and forth.
        let ring = vec![
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let poly = PolygonContents::new(ring, vec![]);
        let c = polygon_centroid(&poly).unwrap();
        assert_relative_eq!(c.x, 0.5, epsilon = 1e-9);
        assert_relative_eq!(c.y, 1.0, epsilon = 1e-9);
    }
}
