//! Segmentation errors

use thiserror::Error;

/// Result type alias for segmentation operations.
pub type SegmentationResult<T> = Result<T, SegmentationError>;

/// Which side of the valid `(1, 8192)` range a volume axis fell on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionBound {
    /// An axis is `>= 8192`
    TooLarge,
    /// An axis is `<= 1`
    TooSmall,
}

/// All the possible failures of the segmentation pipeline.
///
/// The step function of [`crate::engine::DeformationEngine`] never returns one of
/// these: everything here is raised either while building the engine or by the
/// collaborators around it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SegmentationError {
    /// (InvalidDimensions) A volume axis is outside `(1, 8192)`
    #[error("(InvalidDimensions) volume {x}x{y}x{z} is {bound:?}, every axis must lie in (1, 8192)")]
    InvalidDimensions {
        x: usize,
        y: usize,
        z: usize,
        bound: DimensionBound,
    },

    /// (VolumeLengthMismatch) The sample count does not match the dimensions
    #[error("(VolumeLengthMismatch) expected {expected} samples, got {actual}")]
    VolumeLengthMismatch { expected: usize, actual: usize },

    /// (InvalidParameter) A numeric parameter is zero, negative or not finite
    #[error("(InvalidParameter) {0}")]
    InvalidParameter(String),

    /// (NoSamples) A histogram pass sampled zero voxels
    #[error("(NoSamples) no voxels were sampled for the {0} histogram")]
    NoSamples(&'static str),

    /// (MeshGenerationFailed) The seed mesh provider could not build a mesh
    #[error("(MeshGenerationFailed) {0}")]
    MeshGenerationFailed(String),

    /// (MeshImportFailed) The seed mesh could not be turned into a render mesh
    #[error("(MeshImportFailed) {0}")]
    MeshImportFailed(String),

    #[cfg(feature = "image-io")]
    /// Error bubbled up from the `image` crate while dumping a slice.
    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),
}

impl SegmentationError {
    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(details: impl Into<String>) -> Self {
        Self::InvalidParameter(details.into())
    }

    /// Create a mesh generation error.
    #[must_use]
    pub fn mesh_generation(details: impl Into<String>) -> Self {
        Self::MeshGenerationFailed(details.into())
    }

    /// Create a mesh import error.
    #[must_use]
    pub fn mesh_import(details: impl Into<String>) -> Self {
        Self::MeshImportFailed(details.into())
    }

    /// Negative status code of the classic `run` entry point.
    pub const fn status_code(&self) -> i32 {
        match self {
            SegmentationError::InvalidDimensions { bound: DimensionBound::TooLarge, .. } => -1,
            SegmentationError::InvalidDimensions { bound: DimensionBound::TooSmall, .. } => -2,
            SegmentationError::MeshGenerationFailed(_) => -3,
            SegmentationError::MeshImportFailed(_) => -4,
            _ => -5,
        }
    }
}
