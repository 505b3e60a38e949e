//! Image loading for texture data

use std::path::Path;

use image::ImageError;

use crate::assets::{AssetError, AssetResult};
use crate::foundation::math::Vec3;

/// Decoded RGBA8 image ready for GPU upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Raw RGBA pixel data, row-major, first row at the top of the image
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Channel count of the source file before expansion to RGBA
    pub source_channels: u8,
}

impl ImageData {
    /// Load and decode an image file, expanding it to RGBA8
    pub fn from_file(path: impl AsRef<Path>) -> AssetResult<Self> {
        let path = path.as_ref();
        log::debug!("Loading image {}", path.display());

        let img = image::open(path).map_err(|source| match source {
            ImageError::IoError(source) => AssetError::Io { path: path.to_path_buf(), source },
            source => AssetError::ImageDecode { path: path.to_path_buf(), source },
        })?;
        let source_channels = img.color().channel_count();
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        log::info!("Loaded image {}x{} ({} channels) from {}", width, height, source_channels, path.display());
        Ok(Self { data: rgba.into_raw(), width, height, source_channels })
    }

    /// Single-color image
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let data = color.repeat((width * height) as usize);
        Self { data, width, height, source_channels: 4 }
    }

    /// Mean color in `[0, 1]` over every pixel, alpha ignored
    ///
    /// Grey sources were expanded to RGBA on load, so the single channel is
    /// replicated into all three components. An empty image averages to black.
    pub fn average_color(&self) -> Vec3 {
        let pixel_count = self.data.len() / 4;
        if pixel_count == 0 {
            return Vec3::zeros();
        }
        let mut sum = [0_u64; 3];
        for pixel in self.data.chunks_exact(4) {
            for (total, channel) in sum.iter_mut().zip(pixel) {
                *total += u64::from(*channel);
            }
        }
        let scale = 1.0 / (255.0 * pixel_count as f64);
        Vec3::new(
            (sum[0] as f64 * scale) as f32,
            (sum[1] as f64 * scale) as f32,
            (sum[2] as f64 * scale) as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solid_image() {
        let img = ImageData::solid(4, 2, [255, 0, 0, 255]);
        assert_eq!(img.width, 4);
        assert_eq!(img.height, 2);
        assert_eq!(img.data.len(), 4 * 2 * 4);
        assert_eq!(&img.data[0..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_average_color_of_mixed_pixels() {
        let img = ImageData {
            data: vec![255, 0, 0, 255, 0, 0, 255, 0],
            width: 2,
            height: 1,
            source_channels: 4,
        };
        let average = img.average_color();
        assert_relative_eq!(average.x, 0.5, epsilon = 1e-6);
        assert_relative_eq!(average.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(average.z, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_average_of_empty_image_is_black() {
        let img = ImageData::solid(0, 0, [255, 255, 255, 255]);
        assert_eq!(img.average_color(), Vec3::zeros());
    }

    #[test]
    fn test_grey_png_replicates_channel() {
        let path = std::env::temp_dir().join(format!("gl_engine_grey_{}.png", std::process::id()));
        let grey = image::GrayImage::from_pixel(3, 3, image::Luma([51]));
        grey.save(&path).expect("write test png");

        let img = ImageData::from_file(&path).expect("load test png");
        let _ = std::fs::remove_file(&path);

        assert_eq!(img.source_channels, 1);
        let average = img.average_color();
        assert_relative_eq!(average.x, 0.2, epsilon = 1e-6);
        assert_relative_eq!(average.y, 0.2, epsilon = 1e-6);
        assert_relative_eq!(average.z, 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = ImageData::from_file("definitely/not/here.png");
        assert!(matches!(result, Err(AssetError::Io { .. })));
    }
}
