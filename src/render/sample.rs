//! Sample image rendering
//!
//! Converts generator output tensors into 8-bit RGB images and tiles
//! dataset images into preview grids.

use anyhow::{bail, Context, Result};
use image::{GenericImage, RgbImage};
use ndarray::ArrayView4;
use std::path::Path;
use tch::Tensor;

/// File name for the `idx`-th saved preview frame.
///
/// The zero-padded index keeps lexicographic and numeric order in
/// agreement, so frame order never depends on directory-listing order.
pub fn frame_filename(idx: usize) -> String {
    format!("generated_{idx:04}.png")
}

/// Parse the frame index out of a file name produced by
/// [`frame_filename`]. Returns `None` for any other file.
pub fn frame_index(name: &str) -> Option<usize> {
    name.strip_prefix("generated_")?
        .strip_suffix(".png")?
        .parse()
        .ok()
}

/// Convert a generator output tensor to an 8-bit RGB image.
///
/// Accepts shape (1, 3, H, W) or (3, H, W) with values in [-1, 1]
/// (tanh output); values are mapped linearly onto [0, 255].
pub fn tensor_to_image(sample: &Tensor) -> Result<RgbImage> {
    let t = if sample.size().len() == 4 {
        sample.squeeze_dim(0)
    } else {
        sample.shallow_clone()
    };

    let dims = t.size();
    if dims.len() != 3 || dims[0] != 3 {
        bail!("expected a (3, H, W) image tensor, got {:?}", sample.size());
    }
    let (height, width) = (dims[1], dims[2]);

    // (3, H, W) -> (H, W, 3) row-major
    let data: Vec<f32> = t
        .permute([1, 2, 0])
        .contiguous()
        .flatten(0, -1)
        .try_into()?;

    let bytes: Vec<u8> = data
        .iter()
        .map(|&v| (((v + 1.0) / 2.0).clamp(0.0, 1.0) * 255.0) as u8)
        .collect();

    RgbImage::from_raw(width as u32, height as u32, bytes)
        .context("image buffer size mismatch")
}

/// Render a generator output tensor to a PNG file.
pub fn save_sample(sample: &Tensor, path: &Path) -> Result<()> {
    let img = tensor_to_image(sample)?;
    img.save(path)
        .with_context(|| format!("failed to save sample to {}", path.display()))?;
    Ok(())
}

/// Tile the first `rows * cols` dataset images into one preview grid.
///
/// Dataset images are (N, H, W, 3) with values in [0, 1]. Missing
/// cells (when the dataset is smaller than the grid) stay black.
pub fn preview_grid(images: ArrayView4<'_, f32>, rows: u32, cols: u32) -> RgbImage {
    let (n, h, w, _) = images.dim();
    let mut grid = RgbImage::new(cols * w as u32, rows * h as u32);

    for cell in 0..(rows * cols) as usize {
        if cell >= n {
            break;
        }
        let mut tile = RgbImage::new(w as u32, h as u32);
        for y in 0..h {
            for x in 0..w {
                let px = image::Rgb([
                    (images[[cell, y, x, 0]].clamp(0.0, 1.0) * 255.0) as u8,
                    (images[[cell, y, x, 1]].clamp(0.0, 1.0) * 255.0) as u8,
                    (images[[cell, y, x, 2]].clamp(0.0, 1.0) * 255.0) as u8,
                ]);
                tile.put_pixel(x as u32, y as u32, px);
            }
        }
        let col = (cell as u32) % cols;
        let row = (cell as u32) / cols;
        // Tile dimensions always fit the grid, so copy_from cannot fail.
        let _ = grid.copy_from(&tile, col * w as u32, row * h as u32);
    }

    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;
    use tch::Device;

    #[test]
    fn test_frame_filename_roundtrip() {
        assert_eq!(frame_filename(0), "generated_0000.png");
        assert_eq!(frame_filename(39), "generated_0039.png");
        assert_eq!(frame_index("generated_0039.png"), Some(39));
        assert_eq!(frame_index("generated_12345.png"), Some(12345));
        assert_eq!(frame_index("notes.txt"), None);
        assert_eq!(frame_index("generated_abc.png"), None);
    }

    #[test]
    fn test_frame_filenames_sort_numerically() {
        let mut names: Vec<String> = [3, 0, 11, 7].iter().map(|&i| frame_filename(i)).collect();
        names.sort();
        let indices: Vec<usize> = names.iter().filter_map(|n| frame_index(n)).collect();
        assert_eq!(indices, vec![0, 3, 7, 11]);
    }

    #[test]
    fn test_tensor_to_image_range_mapping() {
        // -1 maps to 0, +1 maps to 255.
        let low = Tensor::full([1, 3, 4, 4], -1.0, (tch::Kind::Float, Device::Cpu));
        let high = Tensor::full([3, 4, 4], 1.0, (tch::Kind::Float, Device::Cpu));

        let img_low = tensor_to_image(&low).unwrap();
        let img_high = tensor_to_image(&high).unwrap();

        assert_eq!(img_low.dimensions(), (4, 4));
        assert_eq!(img_low.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(img_high.get_pixel(3, 3).0, [255, 255, 255]);
    }

    #[test]
    fn test_tensor_to_image_rejects_bad_shape() {
        let t = Tensor::zeros([2, 4, 4], (tch::Kind::Float, Device::Cpu));
        assert!(tensor_to_image(&t).is_err());
    }

    #[test]
    fn test_save_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(frame_filename(0));
        let t = Tensor::zeros([1, 3, 8, 8], (tch::Kind::Float, Device::Cpu));

        save_sample(&t, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_preview_grid_dimensions() {
        let images = Array4::<f32>::from_elem((5, 8, 8, 3), 0.5);
        let grid = preview_grid(images.view(), 2, 3);
        assert_eq!(grid.dimensions(), (24, 16));

        // First cell is filled, last (empty) cell stays black.
        assert_eq!(grid.get_pixel(0, 0).0, [127, 127, 127]);
        assert_eq!(grid.get_pixel(23, 15).0, [0, 0, 0]);
    }
}
