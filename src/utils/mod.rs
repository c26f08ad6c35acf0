//! Configuration and checkpointing

pub mod checkpoint;
pub mod config;

pub use checkpoint::{load_checkpoint, load_checkpoint_meta, save_checkpoint, CheckpointMeta};
pub use config::Config;
