//! Sequential batch cursor over the face dataset
//!
//! GAN training here consumes real images in dataset order through a
//! wrap-around cursor: once the cursor would run past the last full
//! batch it resets to index 0. When the dataset size is not a multiple
//! of the batch size the trailing images are under-sampled; this
//! mirrors the reference training procedure.

use anyhow::{bail, Result};
use ndarray::{s, Array4, ArrayView4};

/// Wrap-around batch reader over a fixed dataset.
pub struct BatchCursor {
    /// Full dataset of shape (num_images, size, size, 3)
    data: Array4<f32>,
    /// Number of images per batch
    batch_size: usize,
    /// Start index of the next batch
    cursor: usize,
}

impl BatchCursor {
    /// Create a new cursor.
    ///
    /// Fails if the dataset holds fewer images than one batch.
    pub fn new(data: Array4<f32>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            bail!("batch size must be > 0");
        }
        let num_images = data.shape()[0];
        if num_images < batch_size {
            bail!(
                "dataset has {} images but the batch size is {}",
                num_images,
                batch_size
            );
        }
        Ok(Self {
            data,
            batch_size,
            cursor: 0,
        })
    }

    /// Total number of images
    pub fn num_images(&self) -> usize {
        self.data.shape()[0]
    }

    /// Batch size
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Start index of the next batch
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Return the next batch of shape (batch_size, size, size, 3) and
    /// advance the cursor, wrapping to 0 once the next read would run
    /// past the dataset bound.
    pub fn next_batch(&mut self) -> ArrayView4<'_, f32> {
        let start = self.cursor;

        self.cursor += self.batch_size;
        if self.cursor > self.num_images() - self.batch_size {
            self.cursor = 0;
        }

        self.data
            .slice(s![start..start + self.batch_size, .., .., ..])
    }

    /// Reset the cursor to the start of the dataset
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> Array4<f32> {
        // Tag each image with its index so batches can be identified.
        let mut data = Array4::<f32>::zeros((n, 4, 4, 3));
        for i in 0..n {
            data.slice_mut(s![i, .., .., ..]).fill(i as f32);
        }
        data
    }

    #[test]
    fn test_wraparound_exact_multiple() {
        let mut cursor = BatchCursor::new(dataset(40), 20).unwrap();

        // A 40-image dataset with batch 20 wraps twice per full pass.
        let b0 = cursor.next_batch()[[0, 0, 0, 0]];
        assert_eq!(b0, 0.0);
        let b1 = cursor.next_batch()[[0, 0, 0, 0]];
        assert_eq!(b1, 20.0);
        assert_eq!(cursor.position(), 0);

        let b2 = cursor.next_batch()[[0, 0, 0, 0]];
        assert_eq!(b2, 0.0);
        let b3 = cursor.next_batch()[[0, 0, 0, 0]];
        assert_eq!(b3, 20.0);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_trailing_images_undersampled() {
        // 50 images, batch 20: after reading [0, 20) and [20, 40) the
        // cursor sits at 40 > 50 - 20, so it wraps and images 40..50
        // are skipped for this pass.
        let mut cursor = BatchCursor::new(dataset(50), 20).unwrap();

        assert_eq!(cursor.next_batch()[[0, 0, 0, 0]], 0.0);
        assert_eq!(cursor.next_batch()[[0, 0, 0, 0]], 20.0);
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.next_batch()[[0, 0, 0, 0]], 0.0);
    }

    #[test]
    fn test_never_reads_past_bound() {
        let mut cursor = BatchCursor::new(dataset(45), 20).unwrap();
        for _ in 0..100 {
            let start = cursor.position();
            assert!(start + cursor.batch_size() <= cursor.num_images());
            let batch = cursor.next_batch();
            assert_eq!(batch.shape(), &[20, 4, 4, 3]);
        }
    }

    #[test]
    fn test_dataset_smaller_than_batch() {
        assert!(BatchCursor::new(dataset(10), 20).is_err());
    }

    #[test]
    fn test_zero_batch_size() {
        assert!(BatchCursor::new(dataset(10), 0).is_err());
    }

    #[test]
    fn test_reset() {
        let mut cursor = BatchCursor::new(dataset(40), 20).unwrap();
        cursor.next_batch();
        cursor.reset();
        assert_eq!(cursor.position(), 0);
    }
}
