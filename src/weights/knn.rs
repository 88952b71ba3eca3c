//! K-nearest-neighbor weights (§4.4), built over a bulk-loaded spatial index.

use crate::error::GdaError;
use crate::geometry::{chord_to_arc_rad, Point, EARTH_RADIUS_KM, EARTH_RADIUS_MI};
use crate::graph::{WeightedGraph, WeightedNeighbor};
use crate::index::{CoordMode, SpatialIndex};
use crate::weights::kernel::Kernel;

/// Builder parameters for KNN weights (§6 configuration parameters).
#[cfg_attr(feature = "use-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct KnnParams {
    k: usize,
    power: f64,
    is_inverse: bool,
    is_arc: bool,
    is_mile: bool,
    kernel: Option<Kernel>,
    adaptive_bandwidth: bool,
    use_kernel_diagonals: bool,
    bandwidth: Option<f64>,
}

impl KnnParams {
    /// New params for `k` neighbors with no inverse-distance or kernel
    /// post-processing.
    pub fn new(k: usize) -> Self {
        KnnParams {
            k,
            power: 1.0,
            is_inverse: false,
            is_arc: false,
            is_mile: false,
            kernel: None,
            adaptive_bandwidth: false,
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

    pub fn adaptive_bandwidth(mut self, adaptive: bool) -> Self {
        self.adaptive_bandwidth = adaptive;
        self
    }

    pub fn use_kernel_diagonals(mut self, use_diagonals: bool) -> Self {
        self.use_kernel_diagonals = use_diagonals;
        self
    }

    /// Overrides the default global bandwidth (max KNN distance seen across
    /// all rows) with a user-supplied value.
    pub fn bandwidth(mut self, bandwidth: f64) -> Self {
        self.bandwidth = Some(bandwidth);
        self
    }

    fn radius(&self) -> f64 {
        if self.is_mile {
            EARTH_RADIUS_MI
        } else {
            EARTH_RADIUS_KM
        }
    }
}

/// Converts a raw index distance (planar Euclidean, or unit-sphere chord) to
/// the physical distance the row should report.
fn physical_distance(raw: f64, params: &KnnParams) -> f64 {
    if params.is_arc {
        chord_to_arc_rad(raw) * params.radius()
    } else {
        raw
    }
}

/// Converts a physical distance (planar units, or km/mi) into the chord
/// distance the index is queried in, for arc mode. Shared with
/// [`crate::weights::distance_band`], which faces the same unit conversion
/// for its threshold.
pub(crate) fn physical_to_index_distance(physical: f64, is_arc: bool, is_mile: bool) -> f64 {
    if is_arc {
        let radius = if is_mile { EARTH_RADIUS_MI } else { EARTH_RADIUS_KM };
        let angle = physical / radius;
        2.0 * (angle / 2.0).sin()
    } else {
        physical
    }
}

pub(crate) fn physical_distance_from_index(raw: f64, is_arc: bool, is_mile: bool) -> f64 {
    if is_arc {
        let radius = if is_mile { EARTH_RADIUS_MI } else { EARTH_RADIUS_KM };
        chord_to_arc_rad(raw) * radius
    } else {
        raw
    }
}

/// Builds KNN weights over `points` (§4.4).
pub fn knn_weights(points: &[Point], params: &KnnParams) -> Result<WeightedGraph, GdaError> {
    let n = points.len();
    if n == 0 {
        return Err(GdaError::EmptyInput);
    }
    if params.k == 0 || params.k > n.saturating_sub(1) {
        return Err(GdaError::InvalidK { k: params.k, n });
    }

    let mode = if params.is_arc { CoordMode::Arc } else { CoordMode::Planar };
    let index = SpatialIndex::build(points, mode);

    // Pass 1: raw (i, neighbor, distance) edges, excluding self by index.
    let mut raw_rows: Vec<Vec<(usize, f64)>> = Vec::with_capacity(n);
    let mut global_max = 0.0f64;
    for (i, &p) in points.iter().enumerate() {
        if !p.is_finite() {
            raw_rows.push(Vec::new());
            continue;
        }
        let hits = index.nearest(p, params.k + 1);
        let mut row: Vec<(usize, f64)> = Vec::new();
        for (j, d) in hits {
            if j == i {
                continue;
            }
            let phys = physical_distance(d, params);
            row.push((j, phys));
            if row.len() == params.k {
                break;
            }
        }
        for &(_, d) in &row {
            if d > global_max {
                global_max = d;
            }
        }
        raw_rows.push(row);
    }

    let bandwidth = params.bandwidth.unwrap_or(global_max);

    // Pass 2: apply inverse-distance, normalization, kernel, diagonal policy.
    let mut rows = Vec::with_capacity(n);
    for row in raw_rows {
        let row_max = row.iter().map(|(_, d)| *d).fold(0.0f64, f64::max);
        let mut out: Vec<WeightedNeighbor> = Vec::with_capacity(row.len() + 1);
        for (j, d) in &row {
            let mut w = *d;
            if params.is_inverse {
                w = w.powf(params.power);
            }
            if let Some(kernel) = params.kernel {
                if params.adaptive_bandwidth {
                    if row_max > 0.0 {
                        w /= row_max;
                    }
                } else if bandwidth > 0.0 {
                    w /= bandwidth;
                }
                w = kernel.apply(w);
            }
            out.push(WeightedNeighbor { index: *j, weight: w });
        }
        if let Some(kernel) = params.kernel {
            let diag = if params.use_kernel_diagonals {
                kernel.apply(0.0)
            } else {
                1.0
            };
            // placeholder; self index filled below once we know i
            out.push(WeightedNeighbor { index: usize::MAX, weight: diag });
        }
        rows.push(out);
    }
    for (i, row) in rows.iter_mut().enumerate() {
        for edge in row.iter_mut() {
            if edge.index == usize::MAX {
                edge.index = i;
            }
        }
    }

    Ok(WeightedGraph::new(rows))
}
