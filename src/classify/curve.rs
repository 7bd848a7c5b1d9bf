//! Smoothing of probability curves and the smoothstep classification curve.

use crate::float_types::INTENSITY_LEVELS;

/// Radius of the 1D kernel used on boundary probability curves.
pub const CURVE_RADIUS: usize = 12;
/// Sigma of the 1D kernel used on boundary probability curves.
pub const CURVE_SIGMA: f32 = 2.6;

/// Both black bounds are widened by this many bins.
const BOUND_PADDING: usize = 2;

/// Convolve `curve` with a normalized 1D Gaussian (radius 12, sigma 2.6).
/// Indices that fall off either end are clamped to the first or last bin.
pub fn smooth_curve(curve: &[f32; INTENSITY_LEVELS]) -> [f32; INTENSITY_LEVELS] {
    let r = CURVE_RADIUS as isize;
    let denom = 2.0 * CURVE_SIGMA * CURVE_SIGMA;
    let weights: Vec<f32> = (-r..=r)
        .map(|d| (-((d * d) as f32) / denom).exp())
        .collect();
    let norm: f32 = weights.iter().sum();

    let last = INTENSITY_LEVELS as isize - 1;
    let mut out = [0.0; INTENSITY_LEVELS];
    for (i, o) in out.iter_mut().enumerate() {
        let acc: f32 = (-r..=r)
            .zip(&weights)
            .map(|(d, w)| w * curve[(i as isize + d).clamp(0, last) as usize])
            .sum();
        *o = acc / norm;
    }
    out
}

/// Locate `(indBlackL, indBlackR)` on a smoothed curve.
///
/// `indBlackL` is the first bin of the lower half reaching a third of the curve's
/// maximum, `indBlackR` the first bin after it where the curve stops falling.
/// Both are widened by 2 and `indBlackR > indBlackL` always holds.
pub fn black_bounds(curve: &[f32; INTENSITY_LEVELS]) -> (usize, usize) {
    let max = curve.iter().copied().fold(0.0f32, f32::max);
    let third = max / 3.0;
    let last = INTENSITY_LEVELS - 1;

    let left = (0..INTENSITY_LEVELS / 2)
        .find(|&i| max > 0.0 && curve[i] >= third)
        .unwrap_or(0);
    let right = (left + 1..last)
        .find(|&i| curve[i] < curve[i - 1] && curve[i] <= curve[i + 1])
        .unwrap_or(last);

    let left = left.saturating_sub(BOUND_PADDING);
    let right = (right + BOUND_PADDING).min(last);
    if right <= left {
        (left, left + 1)
    } else {
        (left, right)
    }
}

/// Smoothstep from 0 at `left` to 1 at `right`, evaluated at every intensity.
pub fn smoothstep_curve(left: usize, right: usize) -> [f32; INTENSITY_LEVELS] {
    let span = right.saturating_sub(left).max(1) as f32;
    let mut out = [0.0; INTENSITY_LEVELS];
    for (i, o) in out.iter_mut().enumerate() {
        let t = ((i as f32 - left as f32) / span).clamp(0.0, 1.0);
        *o = t * t * (3.0 - 2.0 * t);
    }
    out
}
