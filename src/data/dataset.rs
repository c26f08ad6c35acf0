//! Face image dataset loading and preprocessing
//!
//! Reads cropped face photographs from a directory, applies a fixed crop
//! and an antialiased resize, and stacks everything into one in-memory
//! array with pixel intensities scaled to [0, 1].

use anyhow::{bail, Context, Result};
use image::imageops::FilterType;
use ndarray::{Array4, ArrayView4};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Fixed rectangular crop applied to every source image before resizing.
///
/// The defaults match the CelebA-style face crop: the full 178px width
/// with 20px trimmed from the top so the 178x178 square centers the face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBox {
    /// Left edge of the crop, in pixels
    pub left: u32,
    /// Top edge of the crop, in pixels
    pub top: u32,
    /// Crop width, in pixels
    pub width: u32,
    /// Crop height, in pixels
    pub height: u32,
}

impl Default for CropBox {
    fn default() -> Self {
        Self {
            left: 0,
            top: 20,
            width: 178,
            height: 178,
        }
    }
}

/// In-memory dataset of preprocessed face images.
///
/// Images are stored as a single array of shape
/// (num_images, size, size, 3) with values in [0, 1].
pub struct FaceDataset {
    images: Array4<f32>,
}

impl FaceDataset {
    /// Load up to `max_images` images from a directory.
    ///
    /// Files are taken in sorted filename order so the selection is
    /// deterministic across platforms. Each file is cropped to `crop`,
    /// resized to `size`x`size` with a Lanczos filter and converted to
    /// RGB. Any file that cannot be decoded aborts the whole load.
    pub fn load_dir(dir: &Path, crop: CropBox, size: u32, max_images: usize) -> Result<Self> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("failed to read image directory {}", dir.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();

        files.sort();
        files.truncate(max_images);

        if files.is_empty() {
            bail!("no image files found in {}", dir.display());
        }

        info!("Loading {} images from {}", files.len(), dir.display());

        let side = size as usize;
        let mut data = Vec::with_capacity(files.len() * side * side * 3);

        for path in &files {
            let img = image::open(path)
                .with_context(|| format!("failed to decode image {}", path.display()))?;
            let img = img
                .crop_imm(crop.left, crop.top, crop.width, crop.height)
                .resize_exact(size, size, FilterType::Lanczos3)
                .to_rgb8();

            data.extend(img.into_raw().into_iter().map(|v| v as f32 / 255.0));
        }

        let images = Array4::from_shape_vec((files.len(), side, side, 3), data)?;
        Ok(Self { images })
    }

    /// Build a dataset directly from a preprocessed array.
    ///
    /// Expects shape (num_images, size, size, 3) with values in [0, 1].
    pub fn from_array(images: Array4<f32>) -> Self {
        Self { images }
    }

    /// Number of images in the dataset
    pub fn len(&self) -> usize {
        self.images.shape()[0]
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Image side length in pixels
    pub fn image_size(&self) -> usize {
        self.images.shape()[1]
    }

    /// View of the underlying (N, H, W, 3) array
    pub fn images(&self) -> ArrayView4<'_, f32> {
        self.images.view()
    }

    /// Consume the dataset, returning the underlying array
    pub fn into_images(self) -> Array4<f32> {
        self.images
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use std::fs;

    fn write_test_image(path: &Path, width: u32, height: u32, seed: u8) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([seed, (x % 256) as u8, (y % 256) as u8])
        });
        img.save(path).unwrap();
    }

    #[test]
    fn test_load_dir_shape_and_range() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..3 {
            write_test_image(&dir.path().join(format!("face_{i}.png")), 200, 220, i as u8);
        }

        let dataset =
            FaceDataset::load_dir(dir.path(), CropBox::default(), 128, 10_000).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.images().shape(), &[3, 128, 128, 3]);
        assert_eq!(dataset.image_size(), 128);
        for &v in dataset.images().iter() {
            assert!((0.0..=1.0).contains(&v), "pixel value {v} out of range");
        }
    }

    #[test]
    fn test_load_dir_truncates_to_max_images() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            write_test_image(&dir.path().join(format!("face_{i}.png")), 200, 220, i as u8);
        }

        let dataset = FaceDataset::load_dir(dir.path(), CropBox::default(), 128, 2).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_load_dir_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        // Written out of order; loading must pick the lexicographically
        // first file regardless of creation order.
        write_test_image(&dir.path().join("b.png"), 200, 220, 200);
        write_test_image(&dir.path().join("a.png"), 200, 220, 10);

        let dataset = FaceDataset::load_dir(dir.path(), CropBox::default(), 128, 1).unwrap();
        assert_eq!(dataset.len(), 1);
        // Image "a" has a red channel of 10/255 everywhere.
        let first_red = dataset.images()[[0, 0, 0, 0]];
        assert!((first_red - 10.0 / 255.0).abs() < 0.05);
    }

    #[test]
    fn test_load_dir_undecodable_file_aborts() {
        let dir = tempfile::tempdir().unwrap();
        write_test_image(&dir.path().join("a.png"), 200, 220, 1);
        fs::write(dir.path().join("b.png"), b"this is not an image").unwrap();

        let result = FaceDataset::load_dir(dir.path(), CropBox::default(), 128, 10_000);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_dir_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = FaceDataset::load_dir(dir.path(), CropBox::default(), 128, 10_000);
        assert!(result.is_err());
    }
}
