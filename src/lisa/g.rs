//! Local Getis-Ord G and G* (§4.6).
//!
//! §9 Open Question 1: the original's `local_gstar` delegates straight to
//! `gda_localg`, sharing G's self-excluding sums — this is flagged as a
//! defect. Here G and G* are genuinely differentiated: G excludes `i` from
//! both sums, G* includes it, matching the corrected semantics the
//! specification calls for.

use crate::error::GdaError;
use crate::graph::Neighbors;
use crate::lisa::{category_for, validate_inputs, LisaParams, LisaResult};
use crate::permutation::run_permutations;

pub const CLUSTER_NOT_SIGNIFICANT: u8 = 0;
pub const CLUSTER_HIGH: u8 = 1;
pub const CLUSTER_LOW: u8 = 2;
pub const CLUSTER_UNDEFINED: u8 = 3;
pub const CLUSTER_ISOLATED: u8 = 4;

const LABELS: [&str; 5] = ["Not Significant", "High", "Low", "Undefined", "Isolated"];
const COLORS: [&str; 5] = ["#FFFFFF", "#FF0000", "#0000FF", "#999999", "#464646"];

/// `Gᵢ = Σⱼ wᵢⱼ xⱼ / Σⱼ≠ᵢ xⱼ` — self excluded from both sums (§4.6).
fn g_statistic<G: Neighbors>(graph: &G, x: &[f64], i: usize) -> f64 {
    let row = graph.row(i);
    let numer: f64 = row.iter().map(|(j, w)| w * x[*j]).sum();
    let denom: f64 = x.iter().enumerate().filter(|(j, _)| *j != i).map(|(_, v)| v).sum();
    if denom == 0.0 {
        0.0
    } else {
        numer / denom
    }
}

/// `Gᵢ* `— same as G but `i` is included in both sums (§4.6).
fn g_star_statistic<G: Neighbors>(graph: &G, x: &[f64], i: usize) -> f64 {
    let row = graph.row(i);
    let numer: f64 = x[i] + row.iter().map(|(j, w)| w * x[*j]).sum::<f64>();
    let denom: f64 = x.iter().sum::<f64>();
    if denom == 0.0 {
        0.0
    } else {
        numer / denom
    }
}

fn perm_g(draw: &[usize], x: &[f64], i: usize, include_self: bool) -> f64 {
    let numer: f64 = draw.iter().map(|&j| x[j]).sum::<f64>() + if include_self { x[i] } else { 0.0 };
    let denom: f64 = if include_self {
        x.iter().sum::<f64>()
    } else {
        x.iter().enumerate().filter(|(j, _)| *j != i).map(|(_, v)| v).sum()
    };
    if denom == 0.0 {
        0.0
    } else {
        numer / denom
    }
}

fn run<G: Neighbors + Sync>(
    graph: &G,
    x: &[f64],
    undefs: &[bool],
    params: &LisaParams,
    include_self: bool,
) -> Result<LisaResult, GdaError> {
    let n = validate_inputs(graph, x)?;
    let lisa_vec: Vec<f64> = (0..n)
        .map(|i| {
            if include_self {
                g_star_statistic(graph, x, i)
            } else {
                g_statistic(graph, x, i)
            }
        })
        .collect();
    let nn_vec: Vec<usize> = (0..n).map(|i| graph.num_neighbors(i)).collect();
    let lag_vec: Vec<f64> = (0..n).map(|i| crate::lisa::lag_at(graph, i, x)).collect();

    // Two-tailed test against an inherently one-sided statistic: run both
    // "at least as high" and "at least as low" counts from the *same* seed
    // (the permutation engine's per-observation seed is a pure function of
    // (seed, i), so both passes draw identical samples) and report whichever
    // tail the observed value actually falls into.
    let high_outcomes = run_permutations(n, &nn_vec, params.permutation_params(), None, |i, draw| {
        perm_g(draw, x, i, include_self) >= lisa_vec[i]
    })?;
    let low_outcomes = run_permutations(n, &nn_vec, params.permutation_params(), None, |i, draw| {
        perm_g(draw, x, i, include_self) <= lisa_vec[i]
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
        if graph.is_isolate(i) && !include_self {
            sig_local_vec.push(1.0);
            sig_cat_vec.push(0);
            cluster_vec.push(CLUSTER_ISOLATED);
            continue;
        }
        let (is_high, outcome) = if high_outcomes[i].r <= low_outcomes[i].r {
            (true, high_outcomes[i])
        } else {
            (false, low_outcomes[i])
        };
        let cat = category_for(outcome.pseudo_p);
        sig_local_vec.push(outcome.pseudo_p);
        sig_cat_vec.push(cat);
        cluster_vec.push(if cat == 0 {
            CLUSTER_NOT_SIGNIFICANT
        } else if is_high {
            CLUSTER_HIGH
        } else {
            CLUSTER_LOW
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

/// Local G (§4.6): self excluded from both sums.
pub fn local_g<G: Neighbors + Sync>(
    graph: &G,
    x: &[f64],
    undefs: &[bool],
    params: &LisaParams,
) -> Result<LisaResult, GdaError> {
    run(graph, x, undefs, params, false)
}

/// Local G* (§4.6): self included in both sums.
pub fn local_g_star<G: Neighbors + Sync>(
    graph: &G,
    x: &[f64],
    undefs: &[bool],
    params: &LisaParams,
) -> Result<LisaResult, GdaError> {
    run(graph, x, undefs, params, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::BinaryGraph;

    #[test]
    fn g_and_g_star_differ_on_the_same_graph() {
        let graph = BinaryGraph::new(vec![vec![1, 2], vec![0, 2], vec![0, 1]]);
        let x = vec![10.0, 1.0, 1.0];
        let g = local_g(&graph, &x, &vec![false; 3], &LisaParams::new().permutations(49).seed(1)).unwrap();
        let gs = local_g_star(&graph, &x, &vec![false; 3], &LisaParams::new().permutations(49).seed(1)).unwrap();
        assert_ne!(g.lisa_vec[0], gs.lisa_vec[0]);
    }

    #[test]
    fn g_star_never_isolates_even_with_empty_row() {
        let graph = BinaryGraph::new(vec![vec![], vec![]]);
        let x = vec![1.0, 2.0];
        let gs = local_g_star(&graph, &x, &vec![false; 2], &LisaParams::new().permutations(19).seed(1)).unwrap();
        // self is included in both sums for G*, so an empty row is not an
        // isolate in the G* sense.
        assert_ne!(gs.cluster_vec[0], CLUSTER_ISOLATED);
    }

    #[test]
    fn local_g_isolate_with_empty_row_reports_isolated() {
        let graph = BinaryGraph::new(vec![vec![], vec![]]);
        let x = vec![1.0, 2.0];
        let g = local_g(&graph, &x, &vec![false; 2], &LisaParams::new().permutations(19).seed(1)).unwrap();
        assert_eq!(g.cluster_vec[0], CLUSTER_ISOLATED);
    }
}
