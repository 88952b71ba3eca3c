//! Bulk-loaded R-tree spatial index over planar, lon/lat, and 3D unit-sphere
//! point sets (§4.2).
//!
//! Built once per weights-construction call and never mutated afterwards —
//! the single-producer/many-readers concurrency tier of §5. Follows the
//! teacher crate's `rstar::RTree::bulk_load` + `GeomWithData` pattern (see
//! `geo/src/algorithm/dbscan.rs`, `geo/src/algorithm/outlier_detection.rs`).
//!
//! Arc-mode queries run against the 3D unit-sphere embedding rather than a
//! native lon/lat tree: chord distance on the unit sphere is bijective with
//! great-circle distance (§4.2), so it gives exact KNN/distance-band results
//! without needing a non-Euclidean R-tree split heuristic.

use log::debug;
use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::geometry::Point;

type Planar2D = GeomWithData<[f64; 2], usize>;
type Sphere3D = GeomWithData<[f64; 3], usize>;

/// Which coordinate space a [`SpatialIndex`] was built over.
#[cfg_attr(feature = "use-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordMode {
    /// Already-projected planar coordinates; Euclidean distance.
    Planar,
    /// Lon/lat degree coordinates; queries run on the unit-sphere embedding
    /// and distances are reported as great-circle radians.
    Arc,
}

/// A bulk-loaded spatial index. Points with non-finite coordinates are
/// silently excluded from the index (§7 DegenerateGeometry): such
/// observations simply never appear in anyone's neighbor set, and any query
/// issued for their own row returns empty.
pub struct SpatialIndex {
    mode: CoordMode,
    planar: Option<RTree<Planar2D>>,
    sphere: Option<RTree<Sphere3D>>,
    len: usize,
}

impl SpatialIndex {
    /// Bulk-loads an index over `points` in the given coordinate mode.
    pub fn build(points: &[Point], mode: CoordMode) -> Self {
        debug!(
            "building spatial index: {} points, mode={:?}",
            points.len(),
            mode
        );
        match mode {
            CoordMode::Planar => {
                let entries: Vec<Planar2D> = points
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.is_finite())
                    .map(|(i, p)| GeomWithData::new([p.x, p.y], i))
                    .collect();
                SpatialIndex {
                    mode,
                    planar: Some(RTree::bulk_load(entries)),
                    sphere: None,
                    len: points.len(),
                }
            }
            CoordMode::Arc => {
                let entries: Vec<Sphere3D> = points
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.is_finite())
                    .map(|(i, p)| {
                        let s = p.to_unit_sphere();
                        GeomWithData::new([s.x, s.y, s.z], i)
                    })
                    .collect();
                SpatialIndex {
                    mode,
                    planar: None,
                    sphere: Some(RTree::bulk_load(entries)),
                    len: points.len(),
                }
            }
        }
    }

    pub fn mode(&self) -> CoordMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over every indexed `(point_index, coordinates)` pair, in
    /// R-tree storage order; used by callers that want to drive the "for
    /// each observation" outer loop (`qbegin/qend` in §4.2).
    pub fn iter_indices(&self) -> Vec<usize> {
        match (&self.planar, &self.sphere) {
            (Some(t), _) => t.iter().map(|e| e.data).collect(),
            (_, Some(t)) => t.iter().map(|e| e.data).collect(),
            _ => unreachable!("SpatialIndex always has exactly one backing tree"),
        }
    }

    /// Returns the `k` nearest indexed points to `query`, including `query`
    /// itself if it is present in the index, sorted by ascending distance.
    ///
    /// Distances are planar Euclidean in [`CoordMode::Planar`], or unit-sphere
    /// chord distance in [`CoordMode::Arc`] (convert with
    /// [`crate::geometry::chord_to_arc_rad`] for an angle in radians).
    pub fn nearest(&self, query: Point, k: usize) -> Vec<(usize, f64)> {
        if k == 0 {
            return Vec::new();
        }
        match self.mode {
            CoordMode::Planar => {
                let tree = self.planar.as_ref().expect("planar tree present");
                let q = [query.x, query.y];
                tree.nearest_neighbor_iter_with_distance_2(&q)
                    .take(k)
                    .map(|(e, d2)| (e.data, d2.sqrt()))
                    .collect()
            }
            CoordMode::Arc => {
                let tree = self.sphere.as_ref().expect("sphere tree present");
                let s = query.to_unit_sphere();
                let q = [s.x, s.y, s.z];
                tree.nearest_neighbor_iter_with_distance_2(&q)
                    .take(k)
                    .map(|(e, d2)| (e.data, d2.sqrt()))
                    .collect()
            }
        }
    }

    /// All indexed points within `radius` of `query` (exact distance; any box
    /// prefilter is internal to the R-tree's own envelope pruning). Distance
    /// units match [`nearest`](Self::nearest).
    pub fn within_distance(&self, query: Point, radius: f64) -> Vec<(usize, f64)> {
        let r2 = radius * radius;
        match self.mode {
            CoordMode::Planar => {
                let tree = self.planar.as_ref().expect("planar tree present");
                let q = [query.x, query.y];
                tree.locate_within_distance(q, r2)
                    .map(|e| {
                        let d = ((e.geom()[0] - q[0]).powi(2) + (e.geom()[1] - q[1]).powi(2)).sqrt();
                        (e.data, d)
                    })
                    .collect()
            }
            CoordMode::Arc => {
                let tree = self.sphere.as_ref().expect("sphere tree present");
                let s = query.to_unit_sphere();
                let q = [s.x, s.y, s.z];
                tree.locate_within_distance(q, r2)
                    .map(|e| {
                        let g = e.geom();
                        let d = ((g[0] - q[0]).powi(2) + (g[1] - q[1]).powi(2) + (g[2] - q[2]).powi(2))
                            .sqrt();
                        (e.data, d)
                    })
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle_points(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let theta = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
                Point::new(theta.cos(), theta.sin())
            })
            .collect()
    }

    #[test]
    fn knn_on_unit_circle_finds_angular_neighbors() {
        // S2: 10 points on a unit circle, k=2, planar.
        let pts = circle_points(10);
        let idx = SpatialIndex::build(&pts, CoordMode::Planar);
        for i in 0..10 {
            let nn = idx.nearest(pts[i], 3); // includes self
            let neighbor_ids: Vec<usize> = nn.into_iter().map(|(j, _)| j).filter(|&j| j != i).collect();
            let expected_a = (i + 1) % 10;
            let expected_b = (i + 9) % 10;
            assert!(neighbor_ids.contains(&expected_a));
            assert!(neighbor_ids.contains(&expected_b));
        }
    }

    #[test]
    fn nan_points_are_excluded_from_index() {
        let pts = vec![Point::new(0.0, 0.0), Point::new(f64::NAN, 1.0), Point::new(2.0, 2.0)];
        let idx = SpatialIndex::build(&pts, CoordMode::Planar);
        let present: Vec<usize> = idx.iter_indices();
        assert_eq!(present.len(), 2);
        assert!(!present.contains(&1));
    }

    #[test]
    fn within_distance_respects_radius() {
        let pts = circle_points(10);
        let idx = SpatialIndex::build(&pts, CoordMode::Planar);
        // chord length between adjacent points on a unit circle of n=10
        let adjacent_chord = 2.0 * (std::f64::consts::PI / 10.0).sin();
        let hits = idx.within_distance(pts[0], adjacent_chord * 1.01);
        // self + two angular neighbors
        assert_eq!(hits.len(), 3);
    }
}
