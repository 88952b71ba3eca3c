//! Distance-band and kernel-bandwidth weights (§4.4): every point within a
//! fixed radius is a neighbor, with the same inverse-distance/kernel
//! post-processing pipeline as KNN.

use crate::error::GdaError;
use crate::geometry::Point;
use crate::graph::{WeightedGraph, WeightedNeighbor};
use crate::index::{CoordMode, SpatialIndex};
use crate::weights::kernel::Kernel;
use crate::weights::knn::{physical_distance_from_index, physical_to_index_distance};

/// Builder parameters for distance-band (and kernel-bandwidth) weights.
#[cfg_attr(feature = "use-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct DistanceBandParams {
    dist_thres: f64,
    power: f64,
    is_inverse: bool,
    is_arc: bool,
    is_mile: bool,
    kernel: Option<Kernel>,
    use_kernel_diagonals: bool,
    /// Kernel bandwidth, independent of `dist_thres` (§4.4 "Kernel-bandwidth
    /// weights"). Defaults to `dist_thres` when unset.
    bandwidth: Option<f64>,
}

impl DistanceBandParams {
    pub fn new(dist_thres: f64) -> Self {
        DistanceBandParams {
            dist_thres,
            power: 1.0,
            is_inverse: false,
            is_arc: false,
            is_mile: false,
            kernel: None,
            use_kernel_diagonals: false,
            bandwidth: None,
        }
    }

    pub fn power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    pub fn is_inverse(mut self, is_inverse: bool) -> Self {
        self.is_inverse = is_inverse;
        self
    }

    pub fn is_arc(mut self, is_arc: bool) -> Self {
        self.is_arc = is_arc;
        self
    }

    pub fn is_mile(mut self, is_mile: bool) -> Self {
        self.is_mile = is_mile;
        self
    }

    pub fn kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = Some(kernel);
        self
    }

    pub fn use_kernel_diagonals(mut self, use_diagonals: bool) -> Self {
        self.use_kernel_diagonals = use_diagonals;
        self
    }

    /// Sets a kernel bandwidth independent of the inclusion threshold
    /// (kernel-bandwidth weights variant, §4.4).
    pub fn bandwidth(mut self, bandwidth: f64) -> Self {
        self.bandwidth = Some(bandwidth);
        self
    }
}

/// Builds distance-band weights over `points` (§4.4). Self is excluded
/// unless `use_kernel_diagonals` is set alongside a kernel.
pub fn distance_band_weights(points: &[Point], params: &DistanceBandParams) -> Result<WeightedGraph, GdaError> {
    let n = points.len();
    if n == 0 {
        return Err(GdaError::EmptyInput);
    }
    if !params.dist_thres.is_finite() || params.dist_thres <= 0.0 {
        return Err(GdaError::InvalidThreshold { value: params.dist_thres });
    }

    let mode = if params.is_arc { CoordMode::Arc } else { CoordMode::Planar };
    let index = SpatialIndex::build(points, mode);
    let index_radius = physical_to_index_distance(params.dist_thres, params.is_arc, params.is_mile);
    let bandwidth = params.bandwidth.unwrap_or(params.dist_thres);

    let mut rows = Vec::with_capacity(n);
    for (i, &p) in points.iter().enumerate() {
        if !p.is_finite() {
            rows.push(Vec::new());
            continue;
        }
        let hits = index.within_distance(p, index_radius);
        let mut out: Vec<WeightedNeighbor> = Vec::with_capacity(hits.len());
        for (j, d) in hits {
            if j == i {
                continue;
            }
            let phys = physical_distance_from_index(d, params.is_arc, params.is_mile);
            let mut w = phys;
            if params.is_inverse {
                w = w.powf(params.power);
            }
            if let Some(kernel) = params.kernel {
                if bandwidth > 0.0 {
                    w /= bandwidth;
                }
                w = kernel.apply(w);
            }
            out.push(WeightedNeighbor { index: j, weight: w });
        }
        out.sort_by_key(|e| e.index);
        if let Some(kernel) = params.kernel {
            let diag = if params.use_kernel_diagonals { kernel.apply(0.0) } else { 1.0 };
            out.push(WeightedNeighbor { index: i, weight: diag });
        }
        rows.push(out);
    }

    Ok(WeightedGraph::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::threshold::find_max_1nn_dist;

    fn circle_points(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let theta = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
                Point::new(theta.cos(), theta.sin())
            })
            .collect()
    }

    #[test]
    fn property3_inclusion_matches_distance() {
        let pts = circle_points(10);
        let th = 0.8;
        let g = distance_band_weights(&pts, &DistanceBandParams::new(th)).unwrap();
        for i in 0..10 {
            for j in g.neighbors(i) {
                assert!(pts[i].euclidean_distance(&pts[j]) <= th + 1e-9);
            }
            for j in 0..10 {
                if j == i || g.neighbors(i).any(|x| x == j) {
                    continue;
                }
                assert!(pts[i].euclidean_distance(&pts[j]) > th);
            }
        }
    }

    #[test]
    fn s3_threshold_equal_to_max_1nn_leaves_no_isolates() {
        let pts = circle_points(10);
        let th = find_max_1nn_dist(&pts, false, false).unwrap();
        let g = distance_band_weights(&pts, &DistanceBandParams::new(th)).unwrap();
        assert!(!g.has_isolates());
        let mean = g.stats().mean;
        assert!(mean >= 2.0);
    }

    #[test]
    fn invalid_threshold_rejected() {
        let pts = circle_points(5);
        assert_eq!(
            distance_band_weights(&pts, &DistanceBandParams::new(0.0)),
            Err(GdaError::InvalidThreshold { value: 0.0 })
        );
        assert_eq!(
            distance_band_weights(&pts, &DistanceBandParams::new(-1.0)),
            Err(GdaError::InvalidThreshold { value: -1.0 })
        );
    }
}
