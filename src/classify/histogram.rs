//! 256-bin intensity histograms and the per-intensity weights derived from them.

use crate::errors::{SegmentationError, SegmentationResult};
use crate::float_types::INTENSITY_LEVELS;

/// Only the darkest quarter of the intensity range is searched for the valley.
const MIN_COLOR_SEARCH_BINS: usize = 64;

/// Exponent of the distance term in [`color_koefs`].
const KOEF_EXPONENT: f32 = 0.3;

/// Counts of samples per intensity level.
///
/// `counts` always sums to `total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: [u64; INTENSITY_LEVELS],
    total: u64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    pub const fn new() -> Self {
        Histogram {
            counts: [0; INTENSITY_LEVELS],
            total: 0,
        }
    }

    pub fn from_samples(samples: impl IntoIterator<Item = f32>) -> Self {
        let mut histogram = Self::new();
        samples.into_iter().for_each(|v| histogram.add(v));
        histogram
    }

    /// Bin of a sample: floored, then clamped to `[0, 255]`. NaN lands in bin 0.
    #[inline]
    pub fn bin(value: f32) -> usize {
        (value.floor().max(0.0) as usize).min(INTENSITY_LEVELS - 1)
    }

    #[inline]
    pub fn add(&mut self, value: f32) {
        self.counts[Self::bin(value)] += 1;
        self.total += 1;
    }

    pub const fn counts(&self) -> &[u64; INTENSITY_LEVELS] {
        &self.counts
    }

    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Per-bin `count / total`. A pass that sampled nothing is reported as
    /// [`SegmentationError::NoSamples`] rather than a curve of NaN.
    pub fn probabilities(&self, pass: &'static str) -> SegmentationResult<[f32; INTENSITY_LEVELS]> {
        if self.total == 0 {
            return Err(SegmentationError::NoSamples(pass));
        }
        let total = self.total as f64;
        let mut prob = [0.0; INTENSITY_LEVELS];
        prob.iter_mut()
            .zip(&self.counts)
            .for_each(|(p, &c)| *p = (c as f64 / total) as f32);
        Ok(prob)
    }
}

/// First strict local minimum of `prob` among the lowest 64 bins, or 0.
pub fn index_min_color(prob: &[f32; INTENSITY_LEVELS]) -> usize {
    (1..MIN_COLOR_SEARCH_BINS)
        .find(|&i| prob[i] < prob[i - 1] && prob[i] < prob[i + 1])
        .unwrap_or(0)
}

/// `1 − 1/(1 + |i − index_min|^0.3)`: zero at the valley, growing toward 1 away from it.
pub fn color_koefs(index_min: usize) -> [f32; INTENSITY_LEVELS] {
    let mut koefs = [0.0; INTENSITY_LEVELS];
    for (i, k) in koefs.iter_mut().enumerate() {
        let dist = i.abs_diff(index_min) as f32;
        *k = 1.0 - 1.0 / (1.0 + dist.powf(KOEF_EXPONENT));
    }
    koefs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binning_floors_and_clamps() {
        assert_eq!(Histogram::bin(-3.0), 0);
        assert_eq!(Histogram::bin(0.99), 0);
        assert_eq!(Histogram::bin(12.7), 12);
        assert_eq!(Histogram::bin(255.5), 255);
        assert_eq!(Histogram::bin(9000.0), 255);
        assert_eq!(Histogram::bin(f32::NAN), 0);
    }

    #[test]
    fn test_counts_sum_to_total() {
        let histogram = Histogram::from_samples((0..1000).map(|i| (i as f32) * 0.37 - 20.0));
        assert_eq!(histogram.total(), 1000);
        assert_eq!(histogram.counts().iter().sum::<u64>(), 1000);
    }

    #[test]
    fn test_empty_histogram_has_no_samples() {
        assert!(matches!(
            Histogram::new().probabilities("boundary band"),
            Err(SegmentationError::NoSamples("boundary band"))
        ));
    }

    #[test]
    fn test_index_min_color_finds_first_valley() {
        let mut prob = [0.0; INTENSITY_LEVELS];
        prob[10] = 0.5;
        prob[11] = 0.1;
        prob[12] = 0.2;
        prob[30] = 0.3;
        prob[31] = 0.05;
        prob[32] = 0.3;
        assert_eq!(index_min_color(&prob), 11);
    }

    #[test]
    fn test_index_min_color_defaults_to_zero() {
        // flat runs are not strict minima
        let mut prob = [0.0; INTENSITY_LEVELS];
        prob[10] = 0.5;
        prob[40] = 0.5;
        assert_eq!(index_min_color(&prob), 0);

        // valleys past the first 64 bins are ignored
        let mut prob = [1.0; INTENSITY_LEVELS];
        prob[100] = 0.0;
        assert_eq!(index_min_color(&prob), 0);
    }

    #[test]
    fn test_color_koefs_zero_at_valley() {
        let koefs = color_koefs(40);
        assert_eq!(koefs[40], 0.0);
        assert!(koefs.iter().all(|&k| (0.0..1.0).contains(&k)));
        assert!(koefs[41] > 0.0);
        assert_eq!(koefs[39], koefs[41]);
    }
}
