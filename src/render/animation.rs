//! Animated preview assembly
//!
//! Collects the numbered preview frames saved during training, orders
//! them by their embedded frame index and encodes them into an animated
//! GIF.

use anyhow::{bail, Context, Result};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

use super::sample::frame_index;

/// List the preview frames in `dir`, sorted by embedded frame index.
///
/// Files that do not match the `generated_NNNN.png` pattern are
/// ignored, so stray files cannot scramble the animation.
pub fn collect_frames(dir: &Path) -> Result<Vec<(usize, PathBuf)>> {
    let mut frames: Vec<(usize, PathBuf)> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read sample directory {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let path = entry.path();
            let idx = path.file_name()?.to_str().and_then(frame_index)?;
            Some((idx, path))
        })
        .collect();

    frames.sort_by_key(|(idx, _)| *idx);
    Ok(frames)
}

/// Encode every preview frame in `sample_dir` into an animated GIF at
/// `out_path`. Returns the number of frames written.
pub fn assemble_gif(sample_dir: &Path, out_path: &Path, frame_delay_ms: u32) -> Result<usize> {
    let frames = collect_frames(sample_dir)?;
    if frames.is_empty() {
        bail!("no preview frames found in {}", sample_dir.display());
    }

    let file = File::create(out_path)
        .with_context(|| format!("failed to create {}", out_path.display()))?;
    let mut encoder = GifEncoder::new(file);
    encoder.set_repeat(Repeat::Infinite)?;

    let delay = Delay::from_numer_denom_ms(frame_delay_ms, 1);
    for (_, path) in &frames {
        let img = image::open(path)
            .with_context(|| format!("failed to decode frame {}", path.display()))?
            .to_rgba8();
        encoder.encode_frame(Frame::from_parts(img, 0, 0, delay))?;
    }

    info!(
        "Wrote {} frames to animation {}",
        frames.len(),
        out_path.display()
    );
    Ok(frames.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::sample::frame_filename;
    use image::RgbImage;

    fn write_frame(dir: &Path, idx: usize, shade: u8) {
        let img = RgbImage::from_pixel(4, 4, image::Rgb([shade, shade, shade]));
        img.save(dir.join(frame_filename(idx))).unwrap();
    }

    #[test]
    fn test_collect_frames_sorted_by_index() {
        let dir = tempfile::tempdir().unwrap();
        write_frame(dir.path(), 2, 20);
        write_frame(dir.path(), 0, 0);
        write_frame(dir.path(), 11, 110);
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let frames = collect_frames(dir.path()).unwrap();
        let indices: Vec<usize> = frames.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 2, 11]);
    }

    #[test]
    fn test_assemble_gif() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..3 {
            write_frame(dir.path(), i, (i * 50) as u8);
        }

        let out = dir.path().join("visual.gif");
        let count = assemble_gif(dir.path(), &out, 200).unwrap();

        assert_eq!(count, 3);
        assert!(out.exists());
        assert!(std::fs::metadata(&out).unwrap().len() > 0);
    }

    #[test]
    fn test_assemble_gif_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("visual.gif");
        assert!(assemble_gif(dir.path(), &out, 200).is_err());
    }
}
