//! Quantile LISA (§4.6): bin `x` into `k` quantiles, mark the selected
//! quantile as `1`, then delegate to Local Join Count.

use crate::error::GdaError;
use crate::graph::Neighbors;
use crate::lisa::join_count::local_join_count;
use crate::lisa::{LisaParams, LisaResult};

/// Assigns each value in `x` to a 0-indexed quantile bin in `0..k`, using
/// rank order (`bin = rank * k / n`), so that with `n` divisible by `k` each
/// bin holds exactly `n / k` observations.
fn quantile_bins(x: &[f64], k: usize) -> Vec<usize> {
    let n = x.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| x[a].partial_cmp(&x[b]).expect("non-finite value in quantile input"));
    let mut bins = vec![0usize; n];
    for (rank, &i) in order.iter().enumerate() {
        bins[i] = (rank * k / n).min(k - 1);
    }
    bins
}

/// Runs Quantile LISA on `x` over `graph` (§4.6): `quantile` is 1-indexed
/// (matching the "top quartile" framing of the quantile, i.e. `quantile=k`
/// means the highest bin), must satisfy `1 <= quantile <= k`.
pub fn quantile_lisa<G: Neighbors + Sync>(
    graph: &G,
    x: &[f64],
    undefs: &[bool],
    k: usize,
    quantile: usize,
    params: &LisaParams,
) -> Result<LisaResult, GdaError> {
    if k == 0 {
        return Err(GdaError::InvalidQuantile { quantile, k: 0 });
    }
    if quantile == 0 || quantile > k {
        return Err(GdaError::InvalidQuantile { quantile, k });
    }
    if x.is_empty() {
        return Err(GdaError::EmptyInput);
    }

    let bins = quantile_bins(x, k);
    let target_bin = quantile - 1;
    let binary: Vec<f64> = bins.iter().map(|&b| if b == target_bin { 1.0 } else { 0.0 }).collect();

    local_join_count(graph, &binary, undefs, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::BinaryGraph;

    fn grid_3x3_queen() -> BinaryGraph {
        let mut rows = vec![Vec::new(); 100];
        // A simple fully-connected-ish graph isn't required by S6 (it only
        // asserts on the binary flag count and that Join Count runs on it);
        // build a ring so no observation is isolated.
        for i in 0..100 {
            rows[i] = vec![(i + 99) % 100, (i + 1) % 100];
        }
        BinaryGraph::new(rows)
    }

    #[test]
    fn s6_top_quartile_selects_exactly_25_of_100() {
        let x: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let graph = grid_3x3_queen();
        let result = quantile_lisa(
            &graph,
            &x,
            &vec![false; 100],
            4,
            4,
            &LisaParams::new().permutations(49).seed(1),
        )
        .unwrap();
        // recompute the binary flag the same way production code does, to
        // check the count independent of join-count's own output shape.
        let bins = quantile_bins(&x, 4);
        let flagged = bins.iter().filter(|&&b| b == 3).count();
        assert_eq!(flagged, 25);
        assert_eq!(result.nn_vec.len(), 100);
    }

    #[test]
    fn quantile_out_of_range_is_rejected() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let graph = BinaryGraph::new(vec![vec![1]; 10]);
        let err = quantile_lisa(&graph, &x, &vec![false; 10], 4, 5, &LisaParams::new()).unwrap_err();
        assert_eq!(err, GdaError::InvalidQuantile { quantile: 5, k: 4 });
    }
}
