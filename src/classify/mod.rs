//! Histogram based intensity classification of the smoothed volume.
//!
//! Two results feed the relaxation passes:
//!
//! - **ColorKoefs**: a weight per intensity that is zero at the first histogram valley
//!   (`index_min_color`) and grows with the distance from it.
//! - **ColorProbability**: first the normalized full-volume histogram, then overwritten
//!   by a smoothstep between two bounds found in a histogram of thin bands just inside
//!   the detected left/right tissue boundaries. Despite the name it is a
//!   classification weight, not a probability.

pub mod boundary;
pub mod curve;
pub mod histogram;

pub use boundary::{BoundaryScan, RowBoundary, scan_boundaries, strip_width};
pub use curve::{black_bounds, smooth_curve, smoothstep_curve};
pub use histogram::{Histogram, color_koefs, index_min_color};

use crate::errors::{SegmentationError, SegmentationResult};
use crate::float_types::INTENSITY_LEVELS;
use crate::volume::VolumeDims;
use tracing::{debug, warn};

/// Summary of one classification run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub index_min_color: usize,
    pub ind_black_left: usize,
    pub ind_black_right: usize,
    /// Background level of the boundary scan, `None` when it fell back to the
    /// full-volume histogram.
    pub black: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct IntensityClassifier {
    histogram: Histogram,
    color_probability: [f32; INTENSITY_LEVELS],
    color_koefs: [f32; INTENSITY_LEVELS],
    classification: Option<Classification>,
}

impl Default for IntensityClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntensityClassifier {
    pub const fn new() -> Self {
        IntensityClassifier {
            histogram: Histogram::new(),
            color_probability: [0.0; INTENSITY_LEVELS],
            color_koefs: [0.0; INTENSITY_LEVELS],
            classification: None,
        }
    }

    /// Histogram of the most recent pass.
    pub const fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    pub const fn color_probability(&self) -> &[f32; INTENSITY_LEVELS] {
        &self.color_probability
    }

    pub const fn color_koefs(&self) -> &[f32; INTENSITY_LEVELS] {
        &self.color_koefs
    }

    pub const fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    /// Run the full-volume pass and then the boundary pass over `smoothed`.
    ///
    /// If the boundary bands contain no voxels (no row of the central window has
    /// enough contrast), the full-volume probabilities are smoothed instead.
    pub fn classify(
        &mut self,
        smoothed: &[f32],
        dims: VolumeDims,
    ) -> SegmentationResult<Classification> {
        let full_histogram = Histogram::from_samples(smoothed.iter().copied());
        let full = full_histogram.probabilities("full volume")?;
        self.histogram = full_histogram.clone();
        let index_min = index_min_color(&full);
        self.color_probability = full;
        self.color_koefs = color_koefs(index_min);
        debug!("Histogram valley at intensity {}", index_min);

        let (curve, black) = match self.boundary_probabilities(smoothed, dims) {
            Ok((prob, black)) => (smooth_curve(&prob), Some(black)),
            Err(SegmentationError::NoSamples(pass)) => {
                warn!(
                    "No voxels in the {} histogram, classifying from the full volume",
                    pass
                );
                self.histogram = full_histogram;
                (smooth_curve(&full), None)
            },
            Err(e) => return Err(e),
        };

        let (left, right) = black_bounds(&curve);
        self.color_probability = smoothstep_curve(left, right);
        debug!("Classification curve rises over [{}, {}]", left, right);

        let classification = Classification {
            index_min_color: index_min,
            ind_black_left: left,
            ind_black_right: right,
            black,
        };
        self.classification = Some(classification);
        Ok(classification)
    }

    fn boundary_probabilities(
        &mut self,
        smoothed: &[f32],
        dims: VolumeDims,
    ) -> SegmentationResult<([f32; INTENSITY_LEVELS], f32)> {
        let scan =
            scan_boundaries(smoothed, dims).ok_or(SegmentationError::NoSamples("border strip"))?;
        debug!(
            "Background level {:.1}, boundaries found in {} rows",
            scan.black,
            scan.rows.len()
        );
        self.histogram = scan.band_histogram(smoothed, dims);
        let prob = self.histogram.probabilities("boundary band")?;
        Ok((prob, scan.black))
    }
}
