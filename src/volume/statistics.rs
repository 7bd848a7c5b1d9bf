//! Local uniformity and gradient statistics of the smoothed volume.
//!
//! Filled one Z-band at a time once smoothing is complete, so every neighbour
//! read here is already final.

use super::VolumeDims;
use std::ops::Range;

/// Variance scale of the uniformity map: a 3×3×3 neighbourhood whose variance
/// equals this value has uniformity 0.5.
pub const UNIFORMITY_SCALE: f32 = 64.0;

/// Write gradient magnitude and local uniformity for every voxel whose Z lies in
/// `z_range`. Neighbour indices are clamped at the volume border.
pub fn fill_band(
    smoothed: &[f32],
    dims: VolumeDims,
    z_range: Range<usize>,
    uniformity: &mut [f32],
    gradient: &mut [f32],
) {
    let z_range = z_range.start.min(dims.nz)..z_range.end.min(dims.nz);
    let at = |x: usize, y: usize, z: usize| smoothed[dims.linearize([x, y, z])];

    for z in z_range {
        let (z_lo, z_hi) = (z.saturating_sub(1), (z + 1).min(dims.nz - 1));
        for y in 0..dims.ny {
            let (y_lo, y_hi) = (y.saturating_sub(1), (y + 1).min(dims.ny - 1));
            for x in 0..dims.nx {
                let (x_lo, x_hi) = (x.saturating_sub(1), (x + 1).min(dims.nx - 1));
                let idx = dims.linearize([x, y, z]);

                // central differences, one-sided at the border
                let gx = (at(x_hi, y, z) - at(x_lo, y, z)) / (x_hi - x_lo) as f32;
                let gy = (at(x, y_hi, z) - at(x, y_lo, z)) / (y_hi - y_lo) as f32;
                let gz = (at(x, y, z_hi) - at(x, y, z_lo)) / (z_hi - z_lo) as f32;
                gradient[idx] = (gx * gx + gy * gy + gz * gz).sqrt();

                let mut sum = 0.0f32;
                let mut sum_sq = 0.0f32;
                let mut count = 0.0f32;
                for nz in z_lo..=z_hi {
                    for ny in y_lo..=y_hi {
                        for nx in x_lo..=x_hi {
                            let v = at(nx, ny, nz);
                            sum += v;
                            sum_sq += v * v;
                            count += 1.0;
                        }
                    }
                }
                let mean = sum / count;
                let variance = (sum_sq / count - mean * mean).max(0.0);
                uniformity[idx] = 1.0 / (1.0 + variance / UNIFORMITY_SCALE);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_volume_is_uniform_without_gradient() {
        let dims = VolumeDims::new(5, 5, 5).unwrap();
        let smoothed = vec![42.0; dims.len()];
        let mut uniformity = vec![0.0; dims.len()];
        let mut gradient = vec![1.0; dims.len()];

        fill_band(&smoothed, dims, 0..5, &mut uniformity, &mut gradient);

        assert!(uniformity.iter().all(|&u| u == 1.0));
        assert!(gradient.iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_ramp_gradient_and_band_limits() {
        let dims = VolumeDims::new(6, 4, 6).unwrap();
        let smoothed: Vec<f32> = (0..dims.len())
            .map(|i| dims.delinearize(i)[0] as f32 * 3.0)
            .collect();
        let mut uniformity = vec![0.0; dims.len()];
        let mut gradient = vec![0.0; dims.len()];

        fill_band(&smoothed, dims, 2..4, &mut uniformity, &mut gradient);

        let inside = dims.linearize([2, 1, 2]);
        assert_relative_eq!(gradient[inside], 3.0, epsilon = 1e-5);
        assert!(uniformity[inside] > 0.0 && uniformity[inside] < 1.0);

        // planes outside the band stay untouched
        let outside = dims.linearize([2, 1, 4]);
        assert_eq!(gradient[outside], 0.0);
        assert_eq!(uniformity[outside], 0.0);
    }
}
