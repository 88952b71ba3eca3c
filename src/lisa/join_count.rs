//! Local Join Count (§4.6): co-location clustering of a binary variable.

use crate::error::GdaError;
use crate::graph::Neighbors;
use crate::lisa::{category_for, lag_at, validate_inputs, LisaParams, LisaResult};
use crate::permutation::run_permutations;

pub const CLUSTER_NOT_SIGNIFICANT: u8 = 0;
pub const CLUSTER_SIGNIFICANT: u8 = 1;
pub const CLUSTER_UNDEFINED: u8 = 2;
pub const CLUSTER_ISOLATED: u8 = 3;

const LABELS: [&str; 4] = ["Not Significant", "Significant", "Undefined", "Isolated"];
const COLORS: [&str; 4] = ["#FFFFFF", "#0000FF", "#999999", "#464646"];

/// Runs local Join Count on binary `x` over `graph` (§4.6): `Jᵢ = xᵢ · Σⱼ
/// wᵢⱼ xⱼ`. Significance (and thus the whole reference distribution) is
/// only meaningful when `xᵢ = 1`; observations with `xᵢ = 0` are reported as
/// category 0 without running a permutation test.
pub fn local_join_count<G: Neighbors + Sync>(
    graph: &G,
    x: &[f64],
    undefs: &[bool],
    params: &LisaParams,
) -> Result<LisaResult, GdaError> {
    let n = validate_inputs(graph, x)?;

    let lisa_vec: Vec<f64> = (0..n)
        .map(|i| {
            let lag_sum: f64 = graph.row(i).iter().map(|(j, w)| w * x[*j]).sum();
            x[i] * lag_sum
        })
        .collect();
    let lag_vec: Vec<f64> = (0..n).map(|i| lag_at(graph, i, x)).collect();
    let nn_vec: Vec<usize> = (0..n).map(|i| graph.num_neighbors(i)).collect();

    let outcomes = run_permutations(n, &nn_vec, params.permutation_params(), None, |i, draw| {
        if x[i] == 0.0 {
            return false;
        }
        let perm_stat: f64 = x[i] * draw.iter().map(|&j| x[j]).sum::<f64>();
        perm_stat >= lisa_vec[i]
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
        if x[i] == 0.0 {
            sig_local_vec.push(1.0);
            sig_cat_vec.push(0);
            cluster_vec.push(CLUSTER_NOT_SIGNIFICANT);
            continue;
        }
        let p = outcomes[i].pseudo_p;
        let cat = category_for(p);
        sig_local_vec.push(p);
        sig_cat_vec.push(cat);
        cluster_vec.push(if cat == 0 { CLUSTER_NOT_SIGNIFICANT } else { CLUSTER_SIGNIFICANT });
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
