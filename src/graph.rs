//! The neighbor-graph data model (§3, §4.3): a binary (Gal-form) and a
//! weighted (Gwt-form) representation, mutually convertible, plus the
//! operations both weights construction and LISA permutation read from.
//!
//! Ported from `GalWeight`/`GwtWeight`'s row-of-neighbors shape
//! (`original_source/src/weights/GwtWeight.h`) onto owned `Vec<Vec<_>>` rows
//! instead of raw-pointer `GwtElement` arrays (§9 design note: "no
//! cross-row aliasing; all reads are by index").

use std::collections::HashSet;

/// One directed edge in a weighted neighbor row: the neighbor's index and
/// its weight.
#[cfg_attr(feature = "use-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedNeighbor {
    pub index: usize,
    pub weight: f64,
}

/// A weighted neighbor list (Gwt-form, §3): one row per observation, each an
/// ordered sequence of `(neighbor_index, weight)` pairs. Not required to be
/// symmetric.
#[cfg_attr(feature = "use-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedGraph {
    rows: Vec<Vec<WeightedNeighbor>>,
}

impl WeightedGraph {
    pub fn new(rows: Vec<Vec<WeightedNeighbor>>) -> Self {
        WeightedGraph { rows }
    }

    pub fn num_obs(&self) -> usize {
        self.rows.len()
    }

    /// Ordered neighbor indices for observation `i` (§4.3 `GetNeighbors`):
    /// insertion order, i.e. the order produced during construction (nearest
    /// query order for KNN, rising polygon-id order for contiguity).
    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.rows[i].iter().map(|n| n.index)
    }

    pub fn weighted_neighbors(&self, i: usize) -> &[WeightedNeighbor] {
        &self.rows[i]
    }

    pub fn num_neighbors(&self, i: usize) -> usize {
        self.rows[i].len()
    }

    pub fn is_isolate(&self, i: usize) -> bool {
        self.rows[i].is_empty()
    }

    /// Spatial lag at `i`: `Σ w_ij x_j`, row-standardized by the row weight
    /// sum unless `standardized` is false (§4.3). `0.0` for an isolate (§7
    /// NumericUnderflow: never divides by a zero denominator).
    pub fn spatial_lag(&self, i: usize, x: &[f64], standardized: bool) -> f64 {
        let row = &self.rows[i];
        if row.is_empty() {
            return 0.0;
        }
        let raw: f64 = row.iter().map(|n| n.weight * x[n.index]).sum();
        if !standardized {
            return raw;
        }
        let wsum: f64 = row.iter().map(|n| n.weight).sum();
        if wsum == 0.0 {
            0.0
        } else {
            raw / wsum
        }
    }

    /// Drops observations marked in `undefs` as neighbors everywhere, and
    /// empties their own rows (§4.3 `Update`).
    pub fn update_undefs(&mut self, undefs: &[bool]) {
        for (i, row) in self.rows.iter_mut().enumerate() {
            if undefs.get(i).copied().unwrap_or(false) {
                row.clear();
                continue;
            }
            row.retain(|n| !undefs.get(n.index).copied().unwrap_or(false));
        }
    }

    /// Collapses the weighted graph to binary contiguity, dropping weights
    /// (§B.2: `Gwt2Gal`-equivalent).
    pub fn to_binary(&self) -> BinaryGraph {
        BinaryGraph::new(
            self.rows
                .iter()
                .map(|row| row.iter().map(|n| n.index).collect())
                .collect(),
        )
    }

    pub fn stats(&self) -> NeighborStats {
        NeighborStats::compute(self.rows.iter().map(Vec::len))
    }

    pub fn has_isolates(&self) -> bool {
        self.rows.iter().any(Vec::is_empty)
    }
}

/// A binary neighbor list (Gal-form, §3): one row per observation, an
/// (order-preserving) set of integer neighbor indices, symmetric for
/// contiguity weights.
#[cfg_attr(feature = "use-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryGraph {
    rows: Vec<Vec<usize>>,
}

impl BinaryGraph {
    pub fn new(rows: Vec<Vec<usize>>) -> Self {
        BinaryGraph { rows }
    }

    pub fn num_obs(&self) -> usize {
        self.rows.len()
    }

    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.rows[i]
    }

    pub fn num_neighbors(&self, i: usize) -> usize {
        self.rows[i].len()
    }

    pub fn is_isolate(&self, i: usize) -> bool {
        self.rows[i].is_empty()
    }

    /// `true` iff `j ∈ N(i) ⇔ i ∈ N(j)` for every pair (§8 property 1).
    pub fn is_symmetric(&self) -> bool {
        let sets: Vec<HashSet<usize>> = self.rows.iter().map(|r| r.iter().copied().collect()).collect();
        for (i, s) in sets.iter().enumerate() {
            for &j in s {
                if j >= sets.len() || !sets[j].contains(&i) {
                    return false;
                }
            }
        }
        true
    }

    /// Row-standardized spatial lag treating each edge as weight 1 (§4.3).
    pub fn spatial_lag(&self, i: usize, x: &[f64], standardized: bool) -> f64 {
        let row = &self.rows[i];
        if row.is_empty() {
            return 0.0;
        }
        let raw: f64 = row.iter().map(|&j| x[j]).sum();
        if standardized {
            raw / row.len() as f64
        } else {
            raw
        }
    }

    pub fn update_undefs(&mut self, undefs: &[bool]) {
        for (i, row) in self.rows.iter_mut().enumerate() {
            if undefs.get(i).copied().unwrap_or(false) {
                row.clear();
                continue;
            }
            row.retain(|&j| !undefs.get(j).copied().unwrap_or(false));
        }
    }

    pub fn stats(&self) -> NeighborStats {
        NeighborStats::compute(self.rows.iter().map(Vec::len))
    }

    pub fn has_isolates(&self) -> bool {
        self.rows.iter().any(Vec::is_empty)
    }

    /// Computes order-`k` higher-order contiguity from this (order-1) graph
    /// (§4.4): `include_lower_order=true` takes the union of all reachable
    /// neighbors within `k` steps; `false` takes exactly the nodes whose
    /// shortest-path distance is `k`.
    pub fn higher_order(&self, order: usize, include_lower_order: bool) -> BinaryGraph {
        let n = self.num_obs();
        let mut rows = vec![Vec::new(); n];
        for i in 0..n {
            let mut dist = vec![None; n];
            dist[i] = Some(0usize);
            let mut frontier = vec![i];
            for step in 1..=order {
                let mut next = Vec::new();
                for &u in &frontier {
                    for &v in self.neighbors(u) {
                        if dist[v].is_none() {
                            dist[v] = Some(step);
                            next.push(v);
                        }
                    }
                }
                frontier = next;
                if frontier.is_empty() {
                    break;
                }
            }
            let mut row: Vec<usize> = (0..n)
                .filter(|&j| match dist[j] {
                    Some(d) if d > 0 => {
                        if include_lower_order {
                            d <= order
                        } else {
                            d == order
                        }
                    }
                    _ => false,
                })
                .collect();
            row.sort_unstable();
            rows[i] = row;
        }
        BinaryGraph::new(rows)
    }
}

/// A read-only view over a neighbor graph's per-row `(index, weight)` edges,
/// letting [`crate::lisa`] treat binary and weighted graphs uniformly (§4.6:
/// every LISA statistic "given a graph ... produce a LisaResult", regardless
/// of which §3 representation backs it).
pub trait Neighbors {
    fn num_obs(&self) -> usize;
    fn row(&self, i: usize) -> Vec<(usize, f64)>;
    fn num_neighbors(&self, i: usize) -> usize;
    fn is_isolate(&self, i: usize) -> bool {
        self.num_neighbors(i) == 0
    }
}

impl Neighbors for BinaryGraph {
    fn num_obs(&self) -> usize {
        BinaryGraph::num_obs(self)
    }

    fn row(&self, i: usize) -> Vec<(usize, f64)> {
        self.neighbors(i).iter().map(|&j| (j, 1.0)).collect()
    }

    fn num_neighbors(&self, i: usize) -> usize {
        BinaryGraph::num_neighbors(self, i)
    }
}

impl Neighbors for WeightedGraph {
    fn num_obs(&self) -> usize {
        WeightedGraph::num_obs(self)
    }

    fn row(&self, i: usize) -> Vec<(usize, f64)> {
        self.weighted_neighbors(i).iter().map(|n| (n.index, n.weight)).collect()
    }

    fn num_neighbors(&self, i: usize) -> usize {
        WeightedGraph::num_neighbors(self, i)
    }
}

/// Min/max/mean/median neighbor counts and sparsity (§3, §4.3
/// `GetNbrStats`). Never divides by zero: an all-isolate graph reports
/// zeroed stats rather than panicking (§3 "must not divide by zero").
#[cfg_attr(feature = "use-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborStats {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    pub median: f64,
    pub sparsity: f64,
}

impl NeighborStats {
    fn compute(counts: impl Iterator<Item = usize> + Clone) -> Self {
        let mut v: Vec<usize> = counts.collect();
        let n = v.len();
        if n == 0 {
            return NeighborStats {
                min: 0,
                max: 0,
                mean: 0.0,
                median: 0.0,
                sparsity: 0.0,
            };
        }
        v.sort_unstable();
        let min = v[0];
        let max = v[n - 1];
        let sum: usize = v.iter().sum();
        let mean = sum as f64 / n as f64;
        let median = if n % 2 == 1 {
            v[n / 2] as f64
        } else {
            (v[n / 2 - 1] + v[n / 2]) as f64 / 2.0
        };
        let sparsity = if n == 0 {
            0.0
        } else {
            sum as f64 / (n as f64 * n as f64)
        };
        NeighborStats {
            min,
            max,
            mean,
            median,
            sparsity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wn(index: usize, weight: f64) -> WeightedNeighbor {
        WeightedNeighbor { index, weight }
    }

    #[test]
    fn spatial_lag_standardized_and_raw() {
        let g = WeightedGraph::new(vec![vec![wn(1, 1.0), wn(2, 1.0)], vec![], vec![]]);
        let x = [10.0, 20.0, 30.0];
        assert_eq!(g.spatial_lag(0, &x, true), 25.0);
        assert_eq!(g.spatial_lag(0, &x, false), 50.0);
        assert_eq!(g.spatial_lag(1, &x, true), 0.0); // isolate, no div-by-zero
    }

    #[test]
    fn update_undefs_removes_edges_and_empties_row() {
        let mut g = WeightedGraph::new(vec![vec![wn(1, 1.0), wn(2, 1.0)], vec![wn(0, 1.0)], vec![wn(0, 1.0)]]);
        g.update_undefs(&[false, true, false]);
        assert_eq!(g.neighbors(0).collect::<Vec<_>>(), vec![2]);
        assert!(g.is_isolate(1));
    }

    #[test]
    fn binary_graph_symmetry_check() {
        let sym = BinaryGraph::new(vec![vec![1], vec![0]]);
        assert!(sym.is_symmetric());
        let asym = BinaryGraph::new(vec![vec![1], vec![]]);
        assert!(!asym.is_symmetric());
    }

    #[test]
    fn higher_order_union_vs_exact() {
        // path graph 0-1-2-3
        let g = BinaryGraph::new(vec![vec![1], vec![0, 2], vec![1, 3], vec![2]]);
        let order2_union = g.higher_order(2, true);
        assert_eq!(order2_union.neighbors(0), &[1, 2]);
        let order2_exact = g.higher_order(2, false);
        assert_eq!(order2_exact.neighbors(0), &[2]);
    }

    #[test]
    fn stats_on_empty_graph_do_not_divide_by_zero() {
        let g = BinaryGraph::new(vec![]);
        let s = g.stats();
        assert_eq!(s.mean, 0.0);
        assert_eq!(s.sparsity, 0.0);
    }
}
