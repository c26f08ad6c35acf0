//! # DCGAN for Face Image Synthesis
//!
//! This crate provides a modular implementation of a Deep Convolutional
//! Generative Adversarial Network (DCGAN) that learns to synthesize
//! 128x128 RGB face images from a directory of cropped photographs.
//!
//! ## Modules
//!
//! - `data`: Image dataset loading, preprocessing and batch iteration
//! - `model`: DCGAN architecture (Generator and Discriminator)
//! - `training`: Training loop, losses and metrics
//! - `render`: Sample rendering, loss plots and the animated preview
//! - `utils`: Configuration and checkpointing

pub mod data;
pub mod model;
pub mod render;
pub mod training;
pub mod utils;

pub use data::{BatchCursor, CropBox, FaceDataset};
pub use model::{Discriminator, FaceGan, Generator};
pub use render::{assemble_gif, render_loss_curves, save_sample};
pub use training::{Trainer, TrainerConfig, TrainingMetrics};
pub use utils::{load_checkpoint, save_checkpoint, Config};
