//! Debug export of derived volume buffers as images.

use crate::errors::{SegmentationError, SegmentationResult};
use crate::volume::{BufferKind, Intensity, VolumeBuffers};
use image::codecs::bmp::BmpEncoder;
use image::{Rgb, RgbImage};
use std::io::Write;

impl<T: Intensity> VolumeBuffers<'_, T> {
    /// Render plane `z` of a derived buffer as a grey RGB image, one pixel per voxel.
    /// Values are clamped into `[0, 255]`; uniformity is scaled up from `[0, 1]`.
    pub fn slice_image(&self, kind: BufferKind, z: usize) -> SegmentationResult<RgbImage> {
        let dims = self.dims();
        if z >= dims.nz {
            return Err(SegmentationError::invalid_parameter(format!(
                "slice {z} is outside 0..{}",
                dims.nz
            )));
        }

        let scale = match kind {
            BufferKind::Uniformity => 255.0,
            BufferKind::Smoothed | BufferKind::Gradient => 1.0,
        };
        let plane = &self.buffer(kind)[dims.plane_range(&(z..z + 1))];

        Ok(RgbImage::from_fn(dims.nx as u32, dims.ny as u32, |x, y| {
            let v = plane[x as usize + y as usize * dims.nx] * scale;
            let grey = v.clamp(0.0, 255.0) as u8;
            Rgb([grey, grey, grey])
        }))
    }

    /// Write plane `z` of a derived buffer as a 24-bit BMP.
    pub fn write_slice_bmp<W: Write>(
        &self,
        kind: BufferKind,
        z: usize,
        writer: &mut W,
    ) -> SegmentationResult<()> {
        let img = self.slice_image(kind, z)?;
        img.write_with_encoder(BmpEncoder::new(writer))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::VolumeDims;

    fn buffers(source: &[u8]) -> VolumeBuffers<'_, u8> {
        let dims = VolumeDims::new(5, 3, 2).unwrap();
        let mut volume = VolumeBuffers::create(dims, source).unwrap();
        for (i, v) in volume.smoothed.iter_mut().enumerate() {
            *v = i as f32 * 20.0 - 100.0;
        }
        volume
    }

    #[test]
    fn test_slice_values_are_clamped() {
        let source = [0u8; 30];
        let volume = buffers(&source);
        let img = volume.slice_image(BufferKind::Smoothed, 0).unwrap();
        assert_eq!((img.width(), img.height()), (5, 3));
        // -100 clamps to 0, 180 passes, 1100 clamps to 255
        assert_eq!(img.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(img.get_pixel(4, 2), &Rgb([180, 180, 180]));
        let img = volume.slice_image(BufferKind::Smoothed, 1).unwrap();
        assert_eq!(img.get_pixel(4, 2), &Rgb([255, 255, 255]));

        assert!(volume.slice_image(BufferKind::Gradient, 2).is_err());
    }

    #[test]
    fn test_bmp_header() {
        let source = [0u8; 30];
        let volume = buffers(&source);
        let mut bytes = Vec::new();
        volume
            .write_slice_bmp(BufferKind::Smoothed, 1, &mut bytes)
            .unwrap();

        assert_eq!(&bytes[0..2], b"BM");
        let u32_at = |o: usize| u32::from_le_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]]);
        assert_eq!(u32_at(14), 40);
        assert_eq!(u16::from_le_bytes([bytes[28], bytes[29]]), 24);
        // rows of 5 pixels are padded from 15 to 16 bytes
        assert_eq!(bytes.len(), 14 + 40 + 16 * 3);
        assert_eq!(u32_at(2) as usize, bytes.len());
    }
}
