//! Local Geary's C (§4.6).

use crate::error::GdaError;
use crate::graph::Neighbors;
use crate::lisa::moran::{
    CLUSTER_HIGH_HIGH, CLUSTER_HIGH_LOW, CLUSTER_ISOLATED, CLUSTER_LOW_HIGH, CLUSTER_LOW_LOW,
    CLUSTER_NOT_SIGNIFICANT, CLUSTER_UNDEFINED,
};
use crate::lisa::{category_for, lag_at, standardize, validate_inputs, LisaParams, LisaResult};
use crate::permutation::run_permutations;

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

/// `Cᵢ = Σⱼ wᵢⱼ (zᵢ − zⱼ)²` on standardized `x` (§4.6).
fn geary_statistic<G: Neighbors>(graph: &G, z: &[f64], i: usize) -> f64 {
    graph.row(i).iter().map(|(j, w)| w * (z[i] - z[*j]).powi(2)).sum()
}

/// Runs local Geary's C on `x` over `graph` (§4.6). Unlike Moran's two-sided
/// `|Iᵢ|` rule, Geary's extreme rule is one-sided: small `Cᵢ` indicates
/// tight local similarity, so a permuted draw counts as "at least as
/// extreme" when it is `<= Cᵢ`.
pub fn local_geary<G: Neighbors + Sync>(
    graph: &G,
    x: &[f64],
    undefs: &[bool],
    params: &LisaParams,
) -> Result<LisaResult, GdaError> {
    let n = validate_inputs(graph, x)?;
    let z = standardize(x);

    let lisa_vec: Vec<f64> = (0..n).map(|i| geary_statistic(graph, &z, i)).collect();
    let lag_vec: Vec<f64> = (0..n).map(|i| lag_at(graph, i, &z)).collect();
    let nn_vec: Vec<usize> = (0..n).map(|i| graph.num_neighbors(i)).collect();

    let outcomes = run_permutations(n, &nn_vec, params.permutation_params(), None, |i, draw| {
        let k = draw.len() as f64;
        let perm_stat: f64 = if k == 0.0 {
            0.0
        } else {
            draw.iter().map(|&j| (z[i] - z[j]).powi(2)).sum::<f64>()
        };
        perm_stat <= lisa_vec[i]
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
    fn geary_is_nonnegative() {
        let graph = BinaryGraph::new(vec![vec![1, 2], vec![0, 2], vec![0, 1]]);
        let x = vec![1.0, 5.0, 9.0];
        let result = local_geary(&graph, &x, &vec![false; 3], &LisaParams::new().permutations(49).seed(4)).unwrap();
        assert!(result.lisa_vec.iter().all(|&c| c >= 0.0));
    }

    #[test]
    fn isolate_reports_isolated_cluster() {
        let graph = BinaryGraph::new(vec![vec![], vec![0]]);
        let x = vec![1.0, 2.0];
        let result = local_geary(&graph, &x, &vec![false; 2], &LisaParams::new().permutations(19).seed(5)).unwrap();
        assert_eq!(result.cluster_vec[0], CLUSTER_ISOLATED);
    }
}
