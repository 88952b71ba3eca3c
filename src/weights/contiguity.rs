//! Queen and rook contiguity weights (§4.4), built by hashing vertices or
//! undirected edges across all polygons rather than pairwise ring
//! intersection — the same approach the original's `GalWeight` builder uses
//! to avoid an O(N²) boundary comparison.

use std::collections::HashMap;

use log::debug;

use crate::error::GdaError;
use crate::geometry::{Point, PolygonContents};
use crate::graph::BinaryGraph;

/// Builder parameters for queen/rook contiguity (§6 configuration
/// parameters), following the teacher crate's `KMeansParams::new(..)` +
/// chained-setter shape.
#[cfg_attr(feature = "use-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct ContiguityParams {
    order: usize,
    include_lower_order: bool,
    precision_threshold: f64,
}

impl ContiguityParams {
    /// New params for order-1 contiguity with exact vertex/edge matching.
    pub fn new() -> Self {
        ContiguityParams {
            order: 1,
            include_lower_order: false,
            precision_threshold: 0.0,
        }
    }

    /// Contiguity order (§9 Open Question 2's `order`); must be `>= 1`.
    pub fn order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Whether order-`k` neighbors include all `1..=k`-step neighbors
    /// (`true`) or exactly the `k`-step ones (`false`).
    pub fn include_lower_order(mut self, include: bool) -> Self {
        self.include_lower_order = include;
        self
    }

    /// Decimal-place snapping precision for vertex/edge matching. `<= 0`
    /// means exact match, no rounding (§9 Open Question 2).
    pub fn precision_threshold(mut self, precision_threshold: f64) -> Self {
        self.precision_threshold = precision_threshold;
        self
    }
}

impl Default for ContiguityParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Snaps a point to an integer-keyed bucket at the configured precision so
/// that near-duplicate vertices (floating point boundary rounding between
/// adjacent polygons) hash identically.
fn snap_key(p: Point, precision_threshold: f64) -> (i64, i64) {
    if precision_threshold <= 0.0 {
        (p.x.to_bits() as i64, p.y.to_bits() as i64)
    } else {
        let scale = 10f64.powf(precision_threshold);
        (
            (p.x * scale).round() as i64,
            (p.y * scale).round() as i64,
        )
    }
}

fn edge_key(a: (i64, i64), b: (i64, i64)) -> ((i64, i64), (i64, i64)) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Builds order-1 queen or rook contiguity as a symmetric [`BinaryGraph`],
/// then raises to `params.order()` if greater than 1.
fn build(polys: &[PolygonContents], params: &ContiguityParams, rook: bool) -> Result<BinaryGraph, GdaError> {
    if polys.is_empty() {
        return Err(GdaError::EmptyInput);
    }
    if params.order == 0 {
        return Err(GdaError::InvalidOrder { order: 0 });
    }

    let n = polys.len();
    let mut neighbor_sets: Vec<std::collections::HashSet<usize>> = vec![Default::default(); n];

    if rook {
        let mut edge_owners: HashMap<((i64, i64), (i64, i64)), Vec<usize>> = HashMap::new();
        for (pid, poly) in polys.iter().enumerate() {
            for part in 0..poly.num_parts() {
                let (s, e) = poly.ring_range(part);
                let ring = &poly.points[s..e];
                for w in ring.windows(2) {
                    let ka = snap_key(w[0], params.precision_threshold);
                    let kb = snap_key(w[1], params.precision_threshold);
                    if ka == kb {
                        continue;
                    }
                    edge_owners.entry(edge_key(ka, kb)).or_default().push(pid);
                }
            }
        }
        for owners in edge_owners.values() {
            for &i in owners {
                for &j in owners {
                    if i != j {
                        neighbor_sets[i].insert(j);
                    }
                }
            }
        }
    } else {
        let mut vertex_owners: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        for (pid, poly) in polys.iter().enumerate() {
            for part in 0..poly.num_parts() {
                let (s, e) = poly.ring_range(part);
                for &p in &poly.points[s..e] {
                    let key = snap_key(p, params.precision_threshold);
                    let owners = vertex_owners.entry(key).or_default();
                    if owners.last() != Some(&pid) {
                        owners.push(pid);
                    }
                }
            }
        }
        for owners in vertex_owners.values() {
            for &i in owners {
                for &j in owners {
                    if i != j {
                        neighbor_sets[i].insert(j);
                    }
                }
            }
        }
    }

    let rows: Vec<Vec<usize>> = neighbor_sets
        .into_iter()
        .map(|s| {
            let mut v: Vec<usize> = s.into_iter().collect();
            v.sort_unstable();
            v
        })
        .collect();
    let order1 = BinaryGraph::new(rows);

    let finalized = if params.order == 1 {
        order1
    } else {
        order1.higher_order(params.order, params.include_lower_order)
    };
    let stats = finalized.stats();
    debug!(
        "contiguity weights finalized: rook={rook} num_obs={n} min={min} max={max} mean={mean:.3}",
        n = finalized.num_obs(),
        min = stats.min,
        max = stats.max,
        mean = stats.mean
    );
    Ok(finalized)
}

/// Queen contiguity: polygons `i`, `j` are neighbors iff they share at least
/// one vertex (§4.4).
pub fn queen_weights(polys: &[PolygonContents], params: &ContiguityParams) -> Result<BinaryGraph, GdaError> {
    build(polys, params, false)
}

/// Rook contiguity: polygons `i`, `j` are neighbors iff they share at least
/// one edge, i.e. two consecutive vertices (§4.4).
pub fn rook_weights(polys: &[PolygonContents], params: &ContiguityParams) -> Result<BinaryGraph, GdaError> {
    build(polys, params, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A 3x3 grid of unit squares, row-major ids 0..9 (S1).
    fn grid_3x3() -> Vec<PolygonContents> {
        let mut polys = Vec::with_capacity(9);
        for row in 0..3 {
            for col in 0..3 {
                let x0 = col as f64;
                let y0 = row as f64;
                let ring = vec![
                    Point::new(x0, y0),
                    Point::new(x0 + 1.0, y0),
                    Point::new(x0 + 1.0, y0 + 1.0),
                    Point::new(x0, y0 + 1.0),
                    Point::new(x0, y0),
                ];
                polys.push(PolygonContents::new(ring, vec![]));
            }
        }
        polys
    }

    #[test]
    fn s1_queen_neighbor_counts() {
        let polys = grid_3x3();
        let g = queen_weights(&polys, &ContiguityParams::new()).unwrap();
        // corners: 0,2,6,8 -> 3 neighbors; edges: 1,3,5,7 -> 5; center 4 -> 8
        assert_eq!(g.num_neighbors(0), 3);
        assert_eq!(g.num_neighbors(2), 3);
        assert_eq!(g.num_neighbors(6), 3);
        assert_eq!(g.num_neighbors(8), 3);
        assert_eq!(g.num_neighbors(1), 5);
        assert_eq!(g.num_neighbors(3), 5);
        assert_eq!(g.num_neighbors(4), 8);
        assert!(g.is_symmetric());
    }

    #[test]
    fn s1_rook_neighbor_counts() {
        let polys = grid_3x3();
        let g = rook_weights(&polys, &ContiguityParams::new()).unwrap();
        assert_eq!(g.num_neighbors(0), 2);
        assert_eq!(g.num_neighbors(1), 3);
        assert_eq!(g.num_neighbors(4), 4);
        assert!(g.is_symmetric());
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(queen_weights(&[], &ContiguityParams::new()), Err(GdaError::EmptyInput));
    }

    #[test]
    fn second_order_queen_union_includes_first_order() {
        let polys = grid_3x3();
        let params = ContiguityParams::new().order(2).include_lower_order(true);
        let g2 = queen_weights(&polys, &params).unwrap();
        // corner 0's 1-step queen neighbors {1,3,4}; 2-step union must be a superset.
        let nbrs: std::collections::HashSet<usize> = g2.neighbors(0).iter().copied().collect();
        assert!(nbrs.is_superset(&[1usize, 3, 4].into_iter().collect()));
    }
}
