//! `geolisa` builds spatial-weights graphs and runs local indicators of
//! spatial association (LISA) with conditional-permutation inference.
//!
//! # Types
//!
//! - **[`Point`](geometry::Point)**, **[`Point3`](geometry::Point3)**: plane
//!   and unit-sphere coordinates.
//! - **[`PolygonContents`](geometry::PolygonContents)**: a flat
//!   points-and-part-offsets polygon representation.
//! - **[`BinaryGraph`](graph::BinaryGraph)**, **[`WeightedGraph`](graph::WeightedGraph)**:
//!   neighbor-list graphs, unified behind the [`Neighbors`](graph::Neighbors)
//!   trait so LISA code is generic over which weights backed a given call.
//!
//! # Weights
//!
//! - **[`queen_weights`](weights::contiguity::queen_weights)**,
//!   **[`rook_weights`](weights::contiguity::rook_weights)**: polygon
//!   contiguity.
//! - **[`knn_weights`](weights::knn::knn_weights)**: k-nearest-neighbor
//!   weights, optionally inverse-distance and kernel weighted.
//! - **[`distance_band_weights`](weights::distance_band::distance_band_weights)**:
//!   fixed-radius weights, including the kernel-bandwidth variant.
//! - **[`Kernel`](weights::kernel::Kernel)**: the five kernel functions
//!   (triangular, uniform, epanechnikov, quartic, gaussian).
//! - **[`find_max_1nn_dist`](weights::threshold::find_max_1nn_dist)** and the
//!   other threshold estimators for picking a distance-band radius.
//! - **[`write_gwt`](weights::gwt::write_gwt)**: the GWT weights export
//!   format.
//!
//! # LISA statistics
//!
//! - **[`local_moran`](lisa::moran::local_moran)**
//! - **[`local_moran_eb`](lisa::eb_moran::local_moran_eb)**: empirical-Bayes
//!   rate-smoothed Local Moran.
//! - **[`local_g`](lisa::g::local_g)**, **[`local_g_star`](lisa::g::local_g_star)**
//! - **[`local_geary`](lisa::geary::local_geary)**
//! - **[`local_join_count`](lisa::join_count::local_join_count)**
//! - **[`quantile_lisa`](lisa::quantile::quantile_lisa)**
//!
//! Every statistic shares [`LisaParams`](lisa::LisaParams) and
//! [`LisaResult`](lisa::LisaResult), and draws its reference distribution
//! through [`run_permutations`](permutation::run_permutations).
//!
//! # Non-goals
//!
//! This crate has no notion of a map or weights *registry*: callers own
//! their point/polygon data and the [`BinaryGraph`](graph::BinaryGraph) or
//! [`WeightedGraph`](graph::WeightedGraph) they built from it, and pass both
//! back in on every call. Looking up a previously built weights graph by a
//! string id is a collaborator's job, not this crate's.

pub mod centroid;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod index;
pub mod lisa;
pub mod orientation;
pub mod permutation;
pub mod weights;

pub use error::GdaError;
pub use geometry::{Point, Point3, PolygonContents};
pub use graph::{BinaryGraph, NeighborStats, Neighbors, WeightedGraph, WeightedNeighbor};
pub use index::{CoordMode, SpatialIndex};
pub use lisa::{LisaParams, LisaResult};
pub use orientation::{Orientation, OrientationKernel, RobustOrientation};
pub use permutation::{CancellationToken, PermutationMethod, PermutationParams, PermutationSummary};
pub use weights::{WeightKind, WeightsResult};
