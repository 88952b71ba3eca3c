//! Error types for the in-core portion of the §7 failure taxonomy.
//!
//! Lookup failures against an external map/weight registry are a collaborator
//! concern and are not modeled here (see the crate-level docs). Everything
//! that can go wrong purely from the arguments and geometry passed into this
//! crate is represented by [`GdaError`].

use std::fmt;

/// Errors raised while constructing spatial weights or running LISA
/// statistics.
///
/// The core never panics or aborts on bad input; every fallible public
/// function returns `Result<_, GdaError>` instead.
#[derive(Debug, Clone, PartialEq)]
pub enum GdaError {
    /// `k` (KNN neighbor count) was zero, or exceeded the number of points.
    InvalidK {
        /// The requested neighbor count.
        k: usize,
        /// The number of points available.
        n: usize,
    },

    /// A distance threshold or bandwidth was zero, negative, or non-finite.
    InvalidThreshold {
        /// The offending value.
        value: f64,
    },

    /// An unrecognized kernel name was supplied.
    UnknownKernel {
        /// The string that failed to match a known kernel.
        name: String,
    },

    /// The input point or value vector was empty (`N = 0`).
    EmptyInput,

    /// Two input vectors that must have matching length did not.
    LengthMismatch {
        /// Length of the first vector.
        left: usize,
        /// Length of the second vector.
        right: usize,
    },

    /// A coordinate was `NaN` or infinite.
    NonFiniteCoordinate,

    /// The contiguity order was zero (orders are 1-based).
    InvalidOrder {
        /// The requested order.
        order: usize,
    },

    /// The requested quantile bin index was outside `0..k`.
    InvalidQuantile {
        /// The requested quantile bin.
        quantile: usize,
        /// The number of bins.
        k: usize,
    },

    /// Writing a weights export (e.g. GWT) to its sink failed.
    WriteFailure {
        /// The underlying I/O error, rendered to a string since `GdaError`
        /// must stay `Clone + PartialEq`.
        message: String,
    },
}

impl fmt::Display for GdaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GdaError::InvalidK { k, n } => {
                write!(f, "invalid k={k}: must be > 0 and <= {n} (number of points)")
            }
            GdaError::InvalidThreshold { value } => {
                write!(f, "invalid threshold/bandwidth {value}: must be finite and > 0")
            }
            GdaError::UnknownKernel { name } => {
                write!(f, "unknown kernel \"{name}\"")
            }
            GdaError::EmptyInput => write!(f, "input is empty (N = 0)"),
            GdaError::LengthMismatch { left, right } => {
                write!(f, "length mismatch: {left} vs {right}")
            }
            GdaError::NonFiniteCoordinate => write!(f, "coordinate is NaN or infinite"),
            GdaError::InvalidOrder { order } => {
                write!(f, "invalid contiguity order {order}: must be >= 1")
            }
            GdaError::InvalidQuantile { quantile, k } => {
                write!(f, "invalid quantile {quantile}: must be in 0..{k}")
            }
            GdaError::WriteFailure { message } => write!(f, "write failed: {message}"),
        }
    }
}

impl std::error::Error for GdaError {}
