//! Kernel weight functions (Anselin & Rey 2010, Table 5.4), shared by KNN and
//! distance-band weights (§4.4).

use crate::error::GdaError;

/// A kernel shape applied to a normalized distance `w ∈ [0, 1]`.
#[cfg_attr(feature = "use-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    Triangular,
    Uniform,
    Epanechnikov,
    Quartic,
    Gaussian,
}

impl Kernel {
    /// Parses a kernel name as accepted in builder calls (§6); the empty
    /// string means "no kernel" and is handled by the caller, not here.
    pub fn parse(name: &str) -> Result<Self, GdaError> {
        match name {
            "triangular" => Ok(Kernel::Triangular),
            "uniform" => Ok(Kernel::Uniform),
            "epanechnikov" => Ok(Kernel::Epanechnikov),
            "quartic" => Ok(Kernel::Quartic),
            "gaussian" => Ok(Kernel::Gaussian),
            other => Err(GdaError::UnknownKernel { name: other.to_string() }),
        }
    }

    /// Applies the kernel to a normalized distance `w` (§4.4 step 3).
    pub fn apply(&self, w: f64) -> f64 {
        match self {
            Kernel::Triangular => 1.0 - w,
            Kernel::Uniform => 0.5,
            Kernel::Epanechnikov => 0.75 * (1.0 - w * w),
            Kernel::Quartic => {
                let t = 1.0 - w * w;
                (15.0 / 16.0) * t * t
            }
            Kernel::Gaussian => (2.0 * std::f64::consts::PI).powf(-0.5) * (-(w * w) / 2.0).exp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn uniform_is_always_one_half() {
        assert_eq!(Kernel::Uniform.apply(0.0), 0.5);
        assert_eq!(Kernel::Uniform.apply(0.9), 0.5);
    }

    #[test]
    fn gaussian_at_zero_matches_closed_form() {
        // S5: gaussian kernel at distance 0 ≈ (2π)^(-1/2).
        assert_relative_eq!(Kernel::Gaussian.apply(0.0), 0.398_942_280_4, epsilon = 1e-9);
    }

    #[test]
    fn all_kernels_finite_and_nonnegative_on_unit_interval() {
        let kernels = [
            Kernel::Triangular,
            Kernel::Uniform,
            Kernel::Epanechnikov,
            Kernel::Quartic,
            Kernel::Gaussian,
        ];
        for k in kernels {
            for i in 0..=10 {
                let w = i as f64 / 10.0;
                let v = k.apply(w);
                assert!(v.is_finite());
                assert!(v >= 0.0);
            }
        }
    }

    #[test]
    fn unknown_kernel_name_is_rejected() {
        assert!(matches!(Kernel::parse("banana"), Err(GdaError::UnknownKernel { .. })));
    }
}
