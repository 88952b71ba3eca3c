//! LISA statistics (§4.6): six variants sharing one reference-distribution
//! procedure and result shape, each module differing only in the local
//! statistic `Tᵢ`, its "as extreme as" rule, and its cluster classification.

pub mod eb_moran;
pub mod g;
pub mod geary;
pub mod join_count;
pub mod moran;
pub mod quantile;

use crate::error::GdaError;
use crate::graph::Neighbors;
use crate::permutation::{significance_category, PermutationMethod, PermutationParams, DEFAULT_CUTOFFS};

/// Builder parameters shared by every LISA entry point (§6 "significance_cutoff,
/// permutations, permutation_method, last_seed_used"), wrapping
/// [`PermutationParams`] with the one additional LISA-specific knob.
#[cfg_attr(feature = "use-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct LisaParams {
    permutation: PermutationParams,
    /// The coarse "is this significant at all" cutoff reported as the first
    /// rung of the significance ladder; the ladder itself is fixed (§4.6
    /// step 4) and doesn't otherwise depend on this value.
    significance_cutoff: f64,
}

impl LisaParams {
    pub fn new() -> Self {
        LisaParams {
            permutation: PermutationParams::new(),
            significance_cutoff: 0.05,
        }
    }

    pub fn permutations(mut self, permutations: usize) -> Self {
        self.permutation = self.permutation.permutations(permutations);
        self
    }

    pub fn method(mut self, method: PermutationMethod) -> Self {
        self.permutation = self.permutation.method(method);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.permutation = self.permutation.seed(seed);
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.permutation = self.permutation.workers(workers);
        self
    }

    pub fn significance_cutoff(mut self, cutoff: f64) -> Self {
        self.significance_cutoff = cutoff;
        self
    }

    pub(crate) fn permutation_params(&self) -> &PermutationParams {
        &self.permutation
    }

    pub fn significance_cutoff_value(&self) -> f64 {
        self.significance_cutoff
    }
}

impl Default for LisaParams {
    fn default() -> Self {
        Self::new()
    }
}

/// The per-observation, per-global-attribute result bundle (§6 `LisaResult`).
///
/// Serialize-only under `use-serde`: `labels`/`colors` are fixed `&'static
/// str` palette entries, which can't round-trip through `Deserialize`.
#[cfg_attr(feature = "use-serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LisaResult {
    pub is_valid: bool,
    /// Pseudo p-value per observation.
    pub sig_local_vec: Vec<f64>,
    /// Significance category per observation (0..=4, §4.6 step 4).
    pub sig_cat_vec: Vec<u8>,
    /// Statistic-specific cluster code per observation.
    pub cluster_vec: Vec<u8>,
    /// Spatial lag per observation.
    pub lag_vec: Vec<f64>,
    /// The local statistic value per observation.
    pub lisa_vec: Vec<f64>,
    /// Neighbor count per observation.
    pub nn_vec: Vec<usize>,
    /// Fixed palette label per cluster code.
    pub labels: Vec<&'static str>,
    /// Fixed palette color (hex) per cluster code.
    pub colors: Vec<&'static str>,
}

/// Standardizes `x` to zero mean, unit standard deviation (population SD, as
/// the original computes it). Returns all zeros if `x` is constant (so
/// downstream products are `0` rather than `NaN`).
pub(crate) fn standardize(x: &[f64]) -> Vec<f64> {
    let n = x.len() as f64;
    let mean = x.iter().sum::<f64>() / n;
    let var = x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let sd = var.sqrt();
    if sd == 0.0 {
        vec![0.0; x.len()]
    } else {
        x.iter().map(|v| (v - mean) / sd).collect()
    }
}

/// Spatial lag of `z` at `i` over `graph`'s row, optionally excluding self
/// from both the sum and the weight count (binary/weighted graphs already
/// exclude self unless kernel diagonals were requested upstream).
pub(crate) fn lag_at<G: Neighbors>(graph: &G, i: usize, z: &[f64]) -> f64 {
    let row = graph.row(i);
    if row.is_empty() {
        return 0.0;
    }
    let wsum: f64 = row.iter().map(|(_, w)| w).sum();
    let raw: f64 = row.iter().map(|(j, w)| w * z[*j]).sum();
    if wsum == 0.0 {
        0.0
    } else {
        raw / wsum
    }
}

pub(crate) fn validate_inputs<G: Neighbors>(graph: &G, x: &[f64]) -> Result<usize, GdaError> {
    let n = graph.num_obs();
    if n == 0 {
        return Err(GdaError::EmptyInput);
    }
    if x.len() != n {
        return Err(GdaError::LengthMismatch { left: x.len(), right: n });
    }
    Ok(n)
}

/// Applies the shared §4.6 steps 3-4 to a raw permutation outcome: pseudo
/// p-value and significance category. Isolated observations are reported as
/// `(1.0, 0)` by [`crate::permutation::PermutationSummary::isolate`]
/// already, so this is a thin pass-through kept for readability at call
/// sites.
pub(crate) fn category_for(pseudo_p: f64) -> u8 {
    significance_category(pseudo_p, &DEFAULT_CUTOFFS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standardize_constant_vector_is_all_zero() {
        let z = standardize(&[5.0, 5.0, 5.0]);
        assert_eq!(z, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn standardize_has_zero_mean_unit_variance() {
        let z = standardize(&[1.0, 2.0, 3.0, 4.0]);
        let mean: f64 = z.iter().sum::<f64>() / z.len() as f64;
        assert!(mean.abs() < 1e-9);
    }
}
