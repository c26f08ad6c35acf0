//! Data loading and batching
//!
//! This module handles:
//! - Loading and preprocessing face images from a directory
//! - Sequential batch iteration with a wrap-around cursor

pub mod dataset;
pub mod loader;

pub use dataset::{CropBox, FaceDataset};
pub use loader::BatchCursor;
