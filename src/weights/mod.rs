//! Spatial weights construction (§4.4): contiguity, KNN, distance-band, and
//! kernel variants, plus threshold estimators and the GWT export format.

pub mod contiguity;
pub mod distance_band;
pub mod gwt;
pub mod kernel;
pub mod knn;
pub mod threshold;

use crate::graph::{BinaryGraph, NeighborStats, WeightedGraph};

/// What kind of weights a [`WeightsResult`] describes (§6).
#[cfg_attr(feature = "use-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightKind {
    Queen,
    Rook,
    Knn,
    DistanceBand,
    KernelKnn,
    Kernel,
}

/// The collaborator-facing summary of a constructed weights graph (§6
/// `WeightsResult`): `is_valid` lets a host binding layer flatten a
/// `Result` into a plain struct without the core needing to know about
/// that layer.
#[cfg_attr(feature = "use-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct WeightsResult {
    pub is_valid: bool,
    pub weight_type: WeightKind,
    pub is_symmetric: bool,
    pub max_nbrs: usize,
    pub min_nbrs: usize,
    pub mean_nbrs: f64,
    pub median_nbrs: f64,
    pub num_obs: usize,
    pub sparsity: f64,
}

impl WeightsResult {
    pub fn from_binary(kind: WeightKind, graph: &BinaryGraph) -> Self {
        let stats = graph.stats();
        Self::from_stats(kind, graph.is_symmetric(), graph.num_obs(), stats)
    }

    pub fn from_weighted(kind: WeightKind, graph: &WeightedGraph, is_symmetric: bool) -> Self {
        let stats = graph.stats();
        Self::from_stats(kind, is_symmetric, graph.num_obs(), stats)
    }

    fn from_stats(kind: WeightKind, is_symmetric: bool, num_obs: usize, stats: NeighborStats) -> Self {
        WeightsResult {
            is_valid: num_obs > 0,
            weight_type: kind,
            is_symmetric,
            max_nbrs: stats.max,
            min_nbrs: stats.min,
            mean_nbrs: stats.mean,
            median_nbrs: stats.median,
            num_obs,
            sparsity: stats.sparsity,
        }
    }
}
