//! Deformation parameters and configuration.
//!
//! This module provides the [`DeformationParams`] struct for configuring the
//! smoothing kernel and the mesh relaxation passes of the engine.

use crate::errors::{SegmentationError, SegmentationResult};
use crate::float_types::Real;

/// Parameters for one segmentation run.
///
/// Use the builder methods to adjust individual values.
///
/// ```
/// use activevol::DeformationParams;
///
/// let params = DeformationParams::default()
///     .with_gauss(1, 1.8)
///     .with_speed(0.25)
///     .with_max_iterations(64);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DeformationParams {
    /// Half-width of the cubic Gaussian kernel, in voxels.
    pub gauss_radius: usize,
    /// Kernel sigma over offsets normalized to `[-1, 1]`.
    pub gauss_sigma: f32,
    /// Displacement along the vertex normal per relaxation pass, in voxels.
    pub speed: Real,
    /// Weight of the pull toward the one-ring centroid in full relaxation.
    pub smoothing_lambda: Real,
    /// A pass whose largest vertex displacement is below this has converged.
    pub convergence_epsilon: Real,
    /// Hard cap on the number of relaxation passes.
    pub max_iterations: usize,
}

impl Default for DeformationParams {
    fn default() -> Self {
        Self {
            gauss_radius: 2,
            gauss_sigma: 1.8,
            speed: 0.5,
            smoothing_lambda: 0.1,
            convergence_epsilon: 1e-3,
            max_iterations: 256,
        }
    }
}

impl DeformationParams {
    /// Set the Gaussian kernel radius and sigma.
    #[must_use]
    pub const fn with_gauss(mut self, radius: usize, sigma: f32) -> Self {
        self.gauss_radius = radius;
        self.gauss_sigma = sigma;
        self
    }

    /// Set the inflation speed.
    #[must_use]
    pub const fn with_speed(mut self, speed: Real) -> Self {
        self.speed = speed;
        self
    }

    /// Set the Laplacian pull weight.
    #[must_use]
    pub const fn with_smoothing_lambda(mut self, lambda: Real) -> Self {
        self.smoothing_lambda = lambda;
        self
    }

    /// Set the convergence threshold on per-vertex displacement.
    #[must_use]
    pub const fn with_convergence_epsilon(mut self, epsilon: Real) -> Self {
        self.convergence_epsilon = epsilon;
        self
    }

    /// Set the maximum number of relaxation passes.
    #[must_use]
    pub const fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Reject values that would divide by zero or never terminate.
    pub fn validate(&self) -> SegmentationResult<()> {
        if self.gauss_radius == 0 {
            return Err(SegmentationError::invalid_parameter(
                "gauss_radius must be at least 1",
            ));
        }
        if !(self.gauss_sigma.is_finite() && self.gauss_sigma > 0.0) {
            return Err(SegmentationError::invalid_parameter(format!(
                "gauss_sigma must be positive and finite, got {}",
                self.gauss_sigma
            )));
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(SegmentationError::invalid_parameter(format!(
                "speed must be positive and finite, got {}",
                self.speed
            )));
        }
        if !(self.smoothing_lambda.is_finite() && (0.0..=1.0).contains(&self.smoothing_lambda)) {
            return Err(SegmentationError::invalid_parameter(format!(
                "smoothing_lambda must lie in [0, 1], got {}",
                self.smoothing_lambda
            )));
        }
        if !(self.convergence_epsilon.is_finite() && self.convergence_epsilon > 0.0) {
            return Err(SegmentationError::invalid_parameter(format!(
                "convergence_epsilon must be positive and finite, got {}",
                self.convergence_epsilon
            )));
        }
        if self.max_iterations == 0 {
            return Err(SegmentationError::invalid_parameter(
                "max_iterations must be at least 1",
            ));
        }
        Ok(())
    }
}
