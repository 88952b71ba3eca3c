//! Conditional-permutation reference-distribution engine (§4.5), shared by
//! every LISA statistic in [`crate::lisa`].
//!
//! The one invariant every mode must honor (§5, §9 design note, §8 property
//! 5): the mapping `observation_index -> permutation stream` is a pure
//! function of `(seed, N, observation_index)`, never of thread scheduling or
//! worker count. We get this by deriving each observation's own RNG seed
//! with a fixed bit-mixing step rather than advancing one shared stream
//! across a shard — a worker pool (rayon, behind the `multithreading`
//! feature, matching the teacher crate's own optional-rayon convention) can
//! then process observations in any order without changing the result.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::GdaError;

/// How the permutation engine supplies each trial's random neighbor sample
/// (§4.5, §6 `permutation_method`).
#[cfg_attr(feature = "use-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermutationMethod {
    /// Each trial independently resamples a fresh random neighbor set. The
    /// baseline mode.
    Complete,
    /// A shared table of `P` full permutations of `0..N` is materialized
    /// once; each observation's trial draws its random neighbors by reading
    /// (and filtering) a row of that table instead of resampling from
    /// scratch.
    Lookup,
}

/// Builder parameters for the permutation engine (§6 configuration
/// parameters), following the teacher crate's `KMeansParams` pattern.
#[cfg_attr(feature = "use-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct PermutationParams {
    permutations: usize,
    method: PermutationMethod,
    seed: u64,
    workers: usize,
}

impl PermutationParams {
    /// 999 permutations, `"complete"` method, seed 0, single-threaded.
    pub fn new() -> Self {
        PermutationParams {
            permutations: 999,
            method: PermutationMethod::Complete,
            seed: 0,
            workers: 1,
        }
    }

    pub fn permutations(mut self, permutations: usize) -> Self {
        self.permutations = permutations;
        self
    }

    pub fn method(mut self, method: PermutationMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets `last_seed_used` (§6): the deterministic PRNG seed driving every
    /// observation's reference distribution.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn permutation_count(&self) -> usize {
        self.permutations
    }
}

impl Default for PermutationParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Cooperative cancellation flag checked at each permutation boundary (§5).
/// Cloning shares the same underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of running one observation's reference distribution: how many of
/// the permutations actually run (`p_used`, which may be less than the
/// nominal count if cancelled) were at least as extreme as the true
/// statistic (`r`), and the resulting pseudo p-value.
#[cfg_attr(feature = "use-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PermutationSummary {
    pub r: u32,
    pub p_used: usize,
    pub pseudo_p: f64,
}

impl PermutationSummary {
    /// Isolated observations (no neighbors) never run a reference
    /// distribution; downstream LISA code maps this to category 0 / cluster
    /// "isolated" directly rather than reading `pseudo_p` (§8 property 8).
    fn isolate() -> Self {
        PermutationSummary { r: 0, p_used: 0, pseudo_p: 1.0 }
    }
}

/// `pᵢ = (R+1)/(P+1)` (§4.5 step 3, §8 property 6: always in `[1/(P+1), 1]`).
pub fn pseudo_p_value(r: u32, p_used: usize) -> f64 {
    (r as f64 + 1.0) / (p_used as f64 + 1.0)
}

/// Significance category: the largest `k` such that `p <= cutoffs[k-1]`,
/// `0` if none (§4.6 step 4).
pub fn significance_category(p: f64, cutoffs: &[f64; 4]) -> u8 {
    let mut cat = 0u8;
    for (i, &c) in cutoffs.iter().enumerate() {
        if p <= c {
            cat = (i + 1) as u8;
        }
    }
    cat
}

/// The fixed significance ladder from §4.6 step 4.
pub const DEFAULT_CUTOFFS: [f64; 4] = [0.05, 0.01, 0.001, 0.0001];

/// Splits a 64-bit seed and an observation index into a well-mixed 64-bit
/// seed (SplitMix64 finalizer), so that per-observation streams are a pure
/// function of `(seed, observation_index)` with no correlation between
/// nearby indices.
fn observation_seed(seed: u64, index: usize) -> u64 {
    let mut z = seed.wrapping_add((index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Samples `k` distinct indices from `0..n`, excluding `exclude`, without
/// replacement (§4.5: "uniform sample without replacement ... conditional
/// permutation").
fn sample_excluding(rng: &mut StdRng, n: usize, exclude: usize, k: usize) -> Vec<usize> {
    debug_assert!(n > 0 && exclude < n && k < n);
    rand::seq::index::sample(rng, n - 1, k)
        .into_iter()
        .map(|i| if i < exclude { i } else { i + 1 })
        .collect()
}

/// Materializes the `Lookup`-mode shared permutation table: `permutations`
/// independent full shuffles of `0..n`, drawn from a single stream seeded by
/// `seed` (distinct from any per-observation seed).
fn build_lookup_table(n: usize, permutations: usize, seed: u64) -> Vec<Vec<usize>> {
    let mut rng = StdRng::seed_from_u64(seed ^ 0x4C4F_4F4B_5550_5442); // "LOOKUPTB" mixed in
    let base: Vec<usize> = (0..n).collect();
    (0..permutations)
        .map(|_| {
            let mut perm = base.clone();
            perm.shuffle(&mut rng);
            perm
        })
        .collect()
}

/// Runs the reference-distribution procedure for every observation (§4.5,
/// §4.6 steps 1-3). `neighbor_counts[i]` is `kᵢ`; `is_at_least_as_extreme`
/// computes the statistic-specific "as extreme as Tᵢ" test for a random
/// neighbor-index sample. Isolated observations (`kᵢ == 0`) are not sampled.
///
/// Dispatches across `params.workers()` threads via rayon when the
/// `multithreading` feature is enabled and `workers > 1`; otherwise runs
/// sequentially. Either way, results are bit-identical (§8 property 5).
pub fn run_permutations<F>(
    n: usize,
    neighbor_counts: &[usize],
    params: &PermutationParams,
    cancel: Option<&CancellationToken>,
    is_at_least_as_extreme: F,
) -> Result<Vec<PermutationSummary>, GdaError>
where
    F: Fn(usize, &[usize]) -> bool + Sync,
{
    if n == 0 {
        return Err(GdaError::EmptyInput);
    }
    if neighbor_counts.len() != n {
        return Err(GdaError::LengthMismatch { left: neighbor_counts.len(), right: n });
    }

    debug!(
        "permutation engine: n={n} permutations={} method={:?} workers={}",
        params.permutations, params.method, params.workers
    );

    let lookup_table = match params.method {
        PermutationMethod::Lookup => Some(build_lookup_table(n, params.permutations, params.seed)),
        PermutationMethod::Complete => None,
    };

    let process = |i: usize| -> PermutationSummary {
        let k = neighbor_counts[i];
        if k == 0 || k >= n {
            return PermutationSummary::isolate();
        }
        if let Some(cancel) = cancel {
            if cancel.is_cancelled() {
                return PermutationSummary { r: 0, p_used: 0, pseudo_p: 1.0 };
            }
        }
        let mut r = 0u32;
        let mut p_used = 0usize;
        match &lookup_table {
            Some(table) => {
                for row in table {
                    if let Some(cancel) = cancel {
                        if cancel.is_cancelled() {
                            break;
                        }
                    }
                    let draw: Vec<usize> = row.iter().copied().filter(|&x| x != i).take(k).collect();
                    if draw.len() == k && is_at_least_as_extreme(i, &draw) {
                        r += 1;
                    }
                    p_used += 1;
                }
            }
            None => {
                let mut rng = StdRng::seed_from_u64(observation_seed(params.seed, i));
                for _ in 0..params.permutations {
                    if let Some(cancel) = cancel {
                        if cancel.is_cancelled() {
                            break;
                        }
                    }
                    let draw = sample_excluding(&mut rng, n, i, k);
                    if is_at_least_as_extreme(i, &draw) {
                        r += 1;
                    }
                    p_used += 1;
                }
            }
        }
        PermutationSummary { r, p_used, pseudo_p: pseudo_p_value(r, p_used) }
    };

    #[cfg(feature = "multithreading")]
    {
        if params.workers > 1 {
            use rayon::prelude::*;
            return Ok((0..n)
                .into_par_iter()
                .map(process)
                .collect());
        }
    }

    Ok((0..n).map(process).collect())
}
