//! Geometry primitives: planar points, polygon contents, and the distance
//! functions the spatial index and weights builders are measured in.
//!
//! These are deliberately narrower than a general-purpose geometry model —
//! this crate only needs a 2D coordinate pair, its optional unit-sphere
//! mapping, and an ordered polygon-ring representation (§3).

/// Mean earth radius models, mirroring the handful of conventions GIS tools
/// disagree on. We use the IUGG mean radius, matching the [`MeanEarthRadius`]
/// convention the teacher crate documents for its own haversine algorithms.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;
/// Mean earth radius in statute miles (IUGG), used when `is_mile` is set.
pub const EARTH_RADIUS_MI: f64 = 3958.7613;

/// A double-precision 2D coordinate pair.
///
/// `x`/`y` hold planar coordinates, or lon/lat degrees when the weights
/// builder is operating in arc mode (§4.2, §4.4).
#[cfg_attr(feature = "use-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// `true` if both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Planar Euclidean distance to `other`.
    pub fn euclidean_distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Maps a lon/lat degree pair onto the unit sphere: `x²+y²+z²=1` (§3).
    pub fn to_unit_sphere(&self) -> Point3 {
        let lon = self.x.to_radians();
        let lat = self.y.to_radians();
        Point3 {
            x: lat.cos() * lon.cos(),
            y: lat.cos() * lon.sin(),
            z: lat.sin(),
        }
    }
}

/// A 3D point on (or near) the unit sphere, used by the arc-mode spatial
/// index (§4.2).
#[cfg_attr(feature = "use-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    /// Euclidean ("chord") distance between two unit-sphere points. Bijective
    /// with great-circle distance, so usable for KNN correctness on the
    /// sphere (§4.2).
    pub fn chord_distance(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Inverse of [`Point::to_unit_sphere`]: recovers lon/lat degrees.
    pub fn to_lon_lat(&self) -> Point {
        let lat = self.z.asin();
        let lon = self.y.atan2(self.x);
        Point {
            x: lon.to_degrees(),
            y: lat.to_degrees(),
        }
    }
}

/// Great-circle distance in radians between two lon/lat degree points, via
/// the haversine formula.
pub fn haversine_distance_rad(a: Point, b: Point) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.x - a.x).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * h.sqrt().asin()
}

/// Converts a unit-sphere chord distance into a great-circle angle (radians).
/// The two are related by `chord = 2 sin(angle / 2)`.
pub fn chord_to_arc_rad(chord: f64) -> f64 {
    2.0 * (chord / 2.0).clamp(-1.0, 1.0).asin()
}

/// An ordered sequence of points together with a parts index, as described in
/// §3: the first part is the exterior ring, subsequent parts are holes. Each
/// ring is closed (first point equals last point).
#[cfg_attr(feature = "use-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonContents {
    /// All ring points concatenated; `parts` marks where each ring starts.
    pub points: Vec<Point>,
    /// Starting index (into `points`) of each ring. `parts[0] == 0` is the
    /// exterior ring's start; `parts[1..]` are hole starts.
    pub parts: Vec<usize>,
}

impl PolygonContents {
    /// Builds contents from an exterior ring and zero or more hole rings.
    /// Each ring must already be closed.
    pub fn new(exterior: Vec<Point>, holes: Vec<Vec<Point>>) -> Self {
        let mut points = Vec::with_capacity(exterior.len() + holes.iter().map(Vec::len).sum::<usize>());
        let mut parts = Vec::with_capacity(1 + holes.len());
        parts.push(0);
        points.extend(exterior);
        for hole in holes {
            parts.push(points.len());
            points.extend(hole);
        }
        PolygonContents { points, parts }
    }

    pub fn num_parts(&self) -> usize {
        self.parts.len()
    }

    /// Returns the half-open `[start, end)` point range for ring `part`.
    pub fn ring_range(&self, part: usize) -> (usize, usize) {
        let start = self.parts[part];
        let end = self
            .parts
            .get(part + 1)
            .copied()
            .unwrap_or(self.points.len());
        (start, end)
    }

    /// The exterior ring's point slice.
    pub fn exterior(&self) -> &[Point] {
        let (s, e) = self.ring_range(0);
        &self.points[s..e]
    }

    /// Interior ring (hole) point slices, in part order.
    pub fn interiors(&self) -> impl Iterator<Item = &[Point]> {
        (1..self.num_parts()).map(move |i| {
            let (s, e) = self.ring_range(i);
            &self.points[s..e]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unit_sphere_round_trip() {
        let p = Point::new(-73.5, 40.75);
        let p3 = p.to_unit_sphere();
        assert_relative_eq!(p3.x * p3.x + p3.y * p3.y + p3.z * p3.z, 1.0, epsilon = 1e-12);
        let back = p3.to_lon_lat();
        assert_relative_eq!(back.x, p.x, epsilon = 1e-9);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-9);
    }

    #[test]
    fn chord_distance_matches_haversine_angle() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(90.0, 0.0);
        let chord = a.to_unit_sphere().chord_distance(&b.to_unit_sphere());
        let arc = chord_to_arc_rad(chord);
        assert_relative_eq!(arc, std::f64::consts::FRAC_PI_2, epsilon = 1e-9);
        assert_relative_eq!(arc, haversine_distance_rad(a, b), epsilon = 1e-9);
    }

    #[test]
    fn polygon_contents_ring_ranges() {
        let ext = vec![
            Point::new(0., 0.),
            Point::new(2., 0.),
            Point::new(2., 2.),
            Point::new(0., 2.),
            Point::new(0., 0.),
        ];
        let hole = vec![
            Point::new(0.5, 0.5),
            Point::new(1.0, 0.5),
            Point::new(1.0, 1.0),
            Point::new(0.5, 0.5),
        ];
        let pc = PolygonContents::new(ext.clone(), vec![hole.clone()]);
        assert_eq!(pc.exterior(), ext.as_slice());
        assert_eq!(pc.interiors().collect::<Vec<_>>(), vec![hole.as_slice()]);
    }
}
