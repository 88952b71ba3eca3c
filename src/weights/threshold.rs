//! Threshold estimators for distance-band weights (§4.4), plus the
//! supplemented mean/median pairwise-distance estimators from
//! `SpatialIndAlgs.cpp` (§B).

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::GdaError;
use crate::geometry::Point;
use crate::index::{CoordMode, SpatialIndex};
use crate::weights::knn::physical_distance_from_index;

/// Bulk-builds an index and returns the maximum nearest-neighbor distance
/// over all points — the smallest threshold guaranteed to leave no isolates
/// (§4.4 `find_max_1nn_dist`).
pub fn find_max_1nn_dist(points: &[Point], is_arc: bool, is_mile: bool) -> Result<f64, GdaError> {
    if points.is_empty() {
        return Err(GdaError::EmptyInput);
    }
    let mode = if is_arc { CoordMode::Arc } else { CoordMode::Planar };
    let index = SpatialIndex::build(points, mode);
    let mut max_d = 0.0f64;
    for (i, &p) in points.iter().enumerate() {
        if !p.is_finite() {
            continue;
        }
        if let Some((_, d)) = index
            .nearest(p, 2)
            .into_iter()
            .find(|(j, _)| *j != i)
        {
            let phys = physical_distance_from_index(d, is_arc, is_mile);
            if phys > max_d {
                max_d = phys;
            }
        }
    }
    Ok(max_d)
}

/// Monte-Carlo estimate of the average neighbor count at threshold `th`:
/// samples `trials` query points and box-queries each with radius `th`,
/// counting exact (non-self) neighbors (§4.4 `est_avg_num_neigh_thresh`).
pub fn est_avg_num_neigh_thresh(
    points: &[Point],
    th: f64,
    trials: usize,
    is_arc: bool,
    seed: u64,
) -> Result<f64, GdaError> {
    if points.is_empty() {
        return Err(GdaError::EmptyInput);
    }
    if !th.is_finite() || th <= 0.0 {
        return Err(GdaError::InvalidThreshold { value: th });
    }
    let mode = if is_arc { CoordMode::Arc } else { CoordMode::Planar };
    let index = SpatialIndex::build(points, mode);
    let index_radius = crate::weights::knn::physical_to_index_distance(th, is_arc, false);

    let mut rng = StdRng::seed_from_u64(seed);
    let n = points.len();
    let trials = trials.min(n).max(1);
    let mut total = 0usize;
    for _ in 0..trials {
        let i = rng.random_range(0..n);
        let count = index.within_distance(points[i], index_radius).len().saturating_sub(1);
        total += count;
    }
    Ok(total as f64 / trials as f64)
}

/// Binary search for a distance threshold yielding an average neighbor count
/// close to `avg_n`, bounded to `[0, bbox_diagonal]` and at most 20
/// iterations (§4.4 `est_thresh_for_avg_num_neigh`).
pub fn est_thresh_for_avg_num_neigh(
    points: &[Point],
    avg_n: f64,
    trials: usize,
    is_arc: bool,
    seed: u64,
) -> Result<f64, GdaError> {
    if points.is_empty() {
        return Err(GdaError::EmptyInput);
    }
    let (mut lo, mut hi) = (0.0f64, bounding_box_diagonal(points));
    if hi <= 0.0 {
        return Ok(0.0);
    }
    let mut best = hi;
    let mut last_estimate = f64::NAN;
    for iter in 0..20 {
        let mid = (lo + hi) / 2.0;
        let estimate = est_avg_num_neigh_thresh(points, mid, trials, is_arc, seed ^ iter as u64)?;
        debug!("threshold search iter={iter} mid={mid} estimate={estimate}");
        if (estimate - avg_n).abs() < 1e-6 {
            best = mid;
            break;
        }
        if last_estimate.is_finite() && (estimate - last_estimate).abs() < 1e-9 {
            best = mid;
            break;
        }
        if estimate < avg_n {
            lo = mid;
        } else {
            hi = mid;
        }
        best = mid;
        last_estimate = estimate;
    }
    Ok(best)
}

/// Monte-Carlo estimate of the mean pairwise distance (§B): samples `trials`
/// random pairs and averages their distance.
pub fn est_mean_distance(points: &[Point], trials: usize, is_arc: bool, seed: u64) -> Result<f64, GdaError> {
    let samples = sample_pairwise_distances(points, trials, is_arc, seed)?;
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Monte-Carlo estimate of the median pairwise distance (§B).
pub fn est_median_distance(points: &[Point], trials: usize, is_arc: bool, seed: u64) -> Result<f64, GdaError> {
    let mut samples = sample_pairwise_distances(points, trials, is_arc, seed)?;
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = samples.len() / 2;
    if samples.len() % 2 == 1 {
        Ok(samples[mid])
    } else {
        Ok((samples[mid - 1] + samples[mid]) / 2.0)
    }
}

fn sample_pairwise_distances(points: &[Point], trials: usize, is_arc: bool, seed: u64) -> Result<Vec<f64>, GdaError> {
    let n = points.len();
    if n < 2 {
        return Err(GdaError::EmptyInput);
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let trials = trials.max(1);
    let mut out = Vec::with_capacity(trials);
    for _ in 0..trials {
        let i = rng.random_range(0..n);
        let mut j = rng.random_range(0..n);
        while j == i {
            j = rng.random_range(0..n);
        }
        let d = if is_arc {
            crate::geometry::haversine_distance_rad(points[i], points[j])
        } else {
            points[i].euclidean_distance(&points[j])
        };
        out.push(d);
    }
    Ok(out)
}

fn bounding_box_diagonal(points: &[Point]) -> f64 {
    let finite: Vec<&Point> = points.iter().filter(|p| p.is_finite()).collect();
    if finite.is_empty() {
        return 0.0;
    }
    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in finite {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    ((max_x - min_x).powi(2) + (max_y - min_y).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle_points(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let theta = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
                Point::new(theta.cos(), theta.sin())
            })
            .collect()
    }

    #[test]
    fn max_1nn_dist_is_positive_and_finite() {
        let pts = circle_points(10);
        let d = find_max_1nn_dist(&pts, false, false).unwrap();
        assert!(d.is_finite() && d > 0.0);
    }

    #[test]
    fn avg_neigh_thresh_monotonic_in_threshold() {
        let pts = circle_points(20);
        let small = est_avg_num_neigh_thresh(&pts, 0.3, 20, false, 7).unwrap();
        let large = est_avg_num_neigh_thresh(&pts, 1.5, 20, false, 7).unwrap();
        assert!(large >= small);
    }

    #[test]
    fn mean_and_median_distance_are_reasonable_for_unit_circle() {
        let pts = circle_points(20);
        let mean = est_mean_distance(&pts, 200, false, 1).unwrap();
        let median = est_median_distance(&pts, 200, false, 1).unwrap();
        assert!(mean > 0.0 && mean < 2.0);
        assert!(median > 0.0 && median < 2.0);
    }

    #[test]
    fn empty_input_rejected() {
        assert_eq!(find_max_1nn_dist(&[], false, false), Err(GdaError::EmptyInput));
    }
}
