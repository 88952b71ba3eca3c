//! Local Moran's I (§4.6).

use crate::error::GdaError;
use crate::graph::Neighbors;
use crate::lisa::{category_for, lag_at, standardize, validate_inputs, LisaParams, LisaResult};
use crate::permutation::run_permutations;

/// Fixed LISA-palette cluster codes shared by Moran and Geary (§4.6).
pub const CLUSTER_NOT_SIGNIFICANT: u8 = 0;
pub const CLUSTER_HIGH_HIGH: u8 = 1;
pub const CLUSTER_LOW_LOW: u8 = 2;
pub const CLUSTER_LOW_HIGH: u8 = 3;
pub const CLUSTER_HIGH_LOW: u8 = 4;
pub const CLUSTER_UNDEFINED: u8 = 5;
pub const CLUSTER_ISOLATED: u8 = 6;

const LABELS: [&str; 7] = [
    "Not Significant",
    "High-High",
    "Low-Low",
    "Low-High",
    "High-Low",
    "Undefined",
    "Isolated",
];
const COLORS: [&str; 7] = [
    "#FFFFFF", "#FF0000", "#0000FF", "#88AAFF", "#FF8888", "#999999", "#464646",
];

fn quadrant(zi: f64, lag: f64) -> u8 {
    match (zi >= 0.0, lag >= 0.0) {
        (true, true) => CLUSTER_HIGH_HIGH,
        (false, false) => CLUSTER_LOW_LOW,
        (false, true) => CLUSTER_LOW_HIGH,
        (true, false) => CLUSTER_HIGH_LOW,
    }
}

/// Runs local Moran's I on `x` over `graph` (§4.6).
pub fn local_moran<G: Neighbors + Sync>(
    graph: &G,
    x: &[f64],
    undefs: &[bool],
    params: &LisaParams,
) -> Result<LisaResult, GdaError> {
    let n = validate_inputs(graph, x)?;
    let z = standardize(x);

    let lag_vec: Vec<f64> = (0..n).map(|i| lag_at(graph, i, &z)).collect();
    let lisa_vec: Vec<f64> = (0..n).map(|i| z[i] * lag_vec[i]).collect();
    let nn_vec: Vec<usize> = (0..n).map(|i| graph.num_neighbors(i)).collect();

    let outcomes = run_permutations(n, &nn_vec, params.permutation_params(), None, |i, draw| {
        let perm_lag: f64 = {
            let wsum = draw.len() as f64;
            if wsum == 0.0 {
                0.0
            } else {
                draw.iter().map(|&j| z[j]).sum::<f64>() / wsum
            }
        };
        let perm_stat = z[i] * perm_lag;
        perm_stat.abs() >= lisa_vec[i].abs()
    })?;

    let mut sig_local_vec = Vec::with_capacity(n);
    let mut sig_cat_vec = Vec::with_capacity(n);
    let mut cluster_vec = Vec::with_capacity(n);

    for i in 0..n {
        let undefined = undefs.get(i).copied().unwrap_or(false) || !x[i].is_finite();
        if undefined {
            sig_local_vec.push(1.0);
            sig_cat_vec.push(0);
            cluster_vec.push(CLUSTER_UNDEFINED);
            continue;
        }
        if graph.is_isolate(i) {
            sig_local_vec.push(1.0);
            sig_cat_vec.push(0);
            cluster_vec.push(CLUSTER_ISOLATED);
            continue;
        }
        let p = outcomes[i].pseudo_p;
        let cat = category_for(p);
        sig_local_vec.push(p);
        sig_cat_vec.push(cat);
        cluster_vec.push(if cat == 0 {
            CLUSTER_NOT_SIGNIFICANT
        } else {
            quadrant(z[i], lag_vec[i])
        });
    }

    Ok(LisaResult {
        is_valid: true,
        sig_local_vec,
        sig_cat_vec,
        cluster_vec,
        lag_vec,
        lisa_vec,
        nn_vec,
        labels: LABELS.to_vec(),
        colors: COLORS.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::BinaryGraph;

    #[test]
    fn s4_isolated_rows_report_category_zero_and_no_nan() {
        // Diagonal (self-only) graphs are never constructed by the weights
        // builder (contiguity/KNN/distance-band all forbid self-loops
        // outside the kernel-diagonal path), so an all-isolate graph is the
        // faithful stand-in for "every row empty" from S4.
        let graph = BinaryGraph::new(vec![vec![], vec![], vec![]]);
        let x: Vec<f64> = vec![1.0, 2.0, 3.0];
        let undefs = vec![false; 3];
        let result = local_moran(&graph, &x, &undefs, &LisaParams::new().permutations(49).seed(1)).unwrap();
        for i in 0..3 {
            assert_eq!(result.cluster_vec[i], CLUSTER_ISOLATED);
            assert_eq!(result.sig_cat_vec[i], 0);
            assert!(!result.lisa_vec[i].is_nan());
            assert!(!result.lag_vec[i].is_nan());
        }
    }

    #[test]
    fn constant_x_never_significant() {
        let graph = BinaryGraph::new(vec![vec![1, 2], vec![0, 2], vec![0, 1]]);
        let x = vec![5.0, 5.0, 5.0];
        let undefs = vec![false; 3];
        let result = local_moran(&graph, &x, &undefs, &LisaParams::new().permutations(99).seed(2)).unwrap();
        assert!(result.cluster_vec.iter().all(|&c| c == CLUSTER_NOT_SIGNIFICANT));
    }

    #[test]
    fn p_value_bounds_hold() {
        let graph = BinaryGraph::new(vec![vec![1, 2, 3], vec![0, 2], vec![0, 1, 3], vec![0, 2]]);
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let undefs = vec![false; 4];
        let params = LisaParams::new().permutations(99).seed(3);
        let result = local_moran(&graph, &x, &undefs, &params).unwrap();
        for &p in &result.sig_local_vec {
            assert!(p >= 1.0 / 100.0 && p <= 1.0);
        }
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let graph = BinaryGraph::new(vec![vec![1], vec![0]]);
        let x = vec![1.0, 2.0, 3.0];
        let undefs = vec![false; 2];
        let err = local_moran(&graph, &x, &undefs, &LisaParams::new()).unwrap_err();
        assert_eq!(err, GdaError::LengthMismatch { left: 3, right: 2 });
    }
}
