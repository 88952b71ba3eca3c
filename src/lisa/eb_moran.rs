//! Empirical-Bayes Local Moran (§4.6): events/base-population rates are
//! smoothed (Assunção–Reis) before standardizing and running Local Moran,
//! so that observations with small base populations don't dominate the
//! statistic purely from crude-rate variance.

use crate::error::GdaError;
use crate::graph::Neighbors;
use crate::lisa::moran::local_moran;
use crate::lisa::{LisaParams, LisaResult};

/// Computes Assunção–Reis empirical-Bayes smoothed rates from `events` and
/// `base` (population-at-risk): the crude rate `rᵢ = eventsᵢ / baseᵢ` is
/// shrunk toward the global rate `b = Σevents / Σbase` in proportion to how
/// reliable `rᵢ` is, via the method-of-moments estimate of the between-area
/// variance `a²`. Observations with non-positive base population have an
/// undefined crude rate and are smoothed fully to the global rate.
pub fn empirical_bayes_rates(events: &[f64], base: &[f64]) -> Result<Vec<f64>, GdaError> {
    if events.len() != base.len() {
        return Err(GdaError::LengthMismatch { left: events.len(), right: base.len() });
    }
    let n = events.len();
    if n == 0 {
        return Err(GdaError::EmptyInput);
    }

    let sum_events: f64 = events.iter().sum();
    let sum_base: f64 = base.iter().sum();
    let global_rate = if sum_base > 0.0 { sum_events / sum_base } else { 0.0 };

    let rates: Vec<f64> = events
        .iter()
        .zip(base.iter())
        .map(|(&e, &p)| if p > 0.0 { e / p } else { 0.0 })
        .collect();

    let weighted_sq_dev: f64 = base
        .iter()
        .zip(rates.iter())
        .map(|(&p, &r)| p * (r - global_rate).powi(2))
        .sum();
    let crude_variance = if sum_base > 0.0 { weighted_sq_dev / sum_base } else { 0.0 };
    let mean_base = sum_base / n as f64;
    // Method-of-moments estimate of the between-area variance a²; sampling
    // noise alone can drive the raw estimate negative, so it's clipped at 0.
    let a2 = if mean_base > 0.0 { (crude_variance - global_rate / mean_base).max(0.0) } else { 0.0 };

    let smoothed = (0..n)
        .map(|i| {
            let p = base[i];
            if p <= 0.0 {
                return global_rate;
            }
            let denom = a2 + global_rate / p;
            let shrink = if denom > 0.0 { a2 / denom } else { 0.0 };
            shrink * rates[i] + (1.0 - shrink) * global_rate
        })
        .collect();

    Ok(smoothed)
}

/// Runs Local Moran's I on the empirical-Bayes-smoothed rate of `events`
/// over `base` (§4.6).
pub fn local_moran_eb<G: Neighbors + Sync>(
    graph: &G,
    events: &[f64],
    base: &[f64],
    undefs: &[bool],
    params: &LisaParams,
) -> Result<LisaResult, GdaError> {
    let smoothed = empirical_bayes_rates(events, base)?;
    local_moran(graph, &smoothed, undefs, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::BinaryGraph;

    #[test]
    fn constant_crude_rate_stays_constant_after_smoothing() {
        let events = vec![2.0, 4.0, 6.0];
        let base = vec![10.0, 20.0, 30.0];
        let smoothed = empirical_bayes_rates(&events, &base).unwrap();
        for &r in &smoothed {
            assert!((r - 0.2).abs() < 1e-9);
        }
    }

    #[test]
    fn smoothed_rates_are_bounded_by_crude_rate_and_global_rate() {
        let events = vec![0.0, 50.0, 5.0];
        let base = vec![100.0, 100.0, 100.0];
        let smoothed = empirical_bayes_rates(&events, &base).unwrap();
        let crude: Vec<f64> = events.iter().zip(base.iter()).map(|(&e, &p)| e / p).collect();
        let global_rate = events.iter().sum::<f64>() / base.iter().sum::<f64>();
        for i in 0..3 {
            let lo = crude[i].min(global_rate);
            let hi = crude[i].max(global_rate);
            assert!(smoothed[i] >= lo - 1e-9 && smoothed[i] <= hi + 1e-9);
        }
    }

    #[test]
    fn zero_base_population_falls_back_to_global_rate() {
        let events = vec![0.0, 10.0];
        let base = vec![0.0, 50.0];
        let smoothed = empirical_bayes_rates(&events, &base).unwrap();
        assert_eq!(smoothed[0], 10.0 / 50.0);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = empirical_bayes_rates(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert_eq!(err, GdaError::LengthMismatch { left: 2, right: 1 });
    }

    #[test]
    fn local_moran_eb_runs_end_to_end() {
        let graph = BinaryGraph::new(vec![vec![1, 2], vec![0, 2], vec![0, 1]]);
        let events = vec![1.0, 5.0, 9.0];
        let base = vec![50.0, 50.0, 50.0];
        let result =
            local_moran_eb(&graph, &events, &base, &vec![false; 3], &LisaParams::new().permutations(49).seed(7))
                .unwrap();
        assert_eq!(result.lisa_vec.len(), 3);
        assert!(result.sig_local_vec.iter().all(|&p| p >= 0.0 && p <= 1.0));
    }
}
