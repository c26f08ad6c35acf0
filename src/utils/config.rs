//! Configuration management
//!
//! Unified configuration for the whole training pipeline. All the
//! constants of the reference procedure (paths, batch size, horizon,
//! latent dimension, learning rate, clip value) are explicit fields so
//! tests can run without touching the filesystem defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::CropBox;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data configuration
    pub data: DataConfig,
    /// Model configuration
    pub model: ModelConfig,
    /// Training configuration
    pub training: TrainingSection,
}

/// Data-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory of face photographs
    pub image_dir: String,
    /// Maximum number of images to load
    pub max_images: usize,
    /// Fixed crop applied before resizing
    pub crop: CropBox,
    /// Target image side length
    pub image_size: u32,
    /// Real/synthetic images per batch side
    pub batch_size: usize,
}

/// Model-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Latent dimension size
    pub latent_dim: i64,
    /// Discriminator dropout rate
    pub dropout: f64,
}

/// Training-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSection {
    /// Total number of training steps
    pub steps: usize,
    /// RMSprop learning rate for both networks
    pub learning_rate: f64,
    /// Gradient value clip
    pub clip_value: f64,
    /// Upper bound of the uniform label noise
    pub label_noise: f64,
    /// Checkpoint frequency in steps
    pub checkpoint_every: usize,
    /// Checkpoint directory
    pub checkpoint_dir: String,
    /// Directory for numbered preview frames
    pub sample_dir: String,
    /// Output path of the assembled animation
    pub animation_path: String,
    /// Output path of the loss-curve chart
    pub loss_plot_path: String,
    /// Per-frame delay of the animation, in milliseconds
    pub frame_delay_ms: u32,
    /// Device: "cpu" or "cuda"
    pub device: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                image_dir: "data/faces".to_string(),
                max_images: 10_000,
                crop: CropBox::default(),
                image_size: 128,
                batch_size: 20,
            },
            model: ModelConfig {
                latent_dim: 32,
                dropout: 0.5,
            },
            training: TrainingSection {
                steps: 2000,
                learning_rate: 3e-4,
                clip_value: 1.0,
                label_noise: 0.05,
                checkpoint_every: 50,
                checkpoint_dir: "checkpoints".to_string(),
                sample_dir: "results".to_string(),
                animation_path: "visual.gif".to_string(),
                loss_plot_path: "losses.png".to_string(),
                frame_delay_ms: 200,
                device: "cpu".to_string(),
            },
        }
    }
}

impl Config {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_toml(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_toml(&self, path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn from_json(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_json(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from either format based on the file extension, writing a
    /// default file first if none exists.
    pub fn load_or_init(path: &str) -> anyhow::Result<Self> {
        if Path::new(path).exists() {
            if path.ends_with(".toml") {
                Self::from_toml(path)
            } else {
                Self::from_json(path)
            }
        } else {
            let config = Config::default();
            if path.ends_with(".toml") {
                config.save_toml(path)?;
            } else {
                config.save_json(path)?;
            }
            Ok(config)
        }
    }

    /// Get device from configuration
    pub fn get_device(&self) -> tch::Device {
        match self.training.device.to_lowercase().as_str() {
            "cuda" | "gpu" => {
                if tch::Cuda::is_available() {
                    tch::Device::Cuda(0)
                } else {
                    tracing::warn!("CUDA requested but not available, falling back to CPU");
                    tch::Device::Cpu
                }
            }
            _ => tch::Device::Cpu,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.data.batch_size == 0 {
            anyhow::bail!("Batch size must be > 0");
        }
        if self.data.image_size < 16 || self.data.image_size % 8 != 0 {
            anyhow::bail!("Image size must be a multiple of 8 and at least 16");
        }
        if self.data.crop.width == 0 || self.data.crop.height == 0 {
            anyhow::bail!("Crop box must be non-empty");
        }
        if self.model.latent_dim <= 0 {
            anyhow::bail!("Latent dimension must be > 0");
        }
        if !(0.0..1.0).contains(&self.training.label_noise) {
            anyhow::bail!("Label noise must be in [0, 1)");
        }
        if self.training.steps == 0 {
            anyhow::bail!("Number of steps must be > 0");
        }
        if self.training.checkpoint_every == 0 {
            anyhow::bail!("Checkpoint frequency must be > 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.model.latent_dim, 32);
        assert_eq!(config.data.batch_size, 20);
        assert_eq!(config.training.steps, 2000);
        assert_eq!(config.training.checkpoint_every, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let loaded: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(config.data.image_dir, loaded.data.image_dir);
        assert_eq!(config.data.crop, loaded.data.crop);
        assert_eq!(config.model.latent_dim, loaded.model.latent_dim);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();

        let config = Config::default();
        config.save_toml(path).unwrap();
        let loaded = Config::from_toml(path).unwrap();

        assert_eq!(config.training.steps, loaded.training.steps);
        assert_eq!(config.training.animation_path, loaded.training.animation_path);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.data.batch_size = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.model.latent_dim = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.training.steps = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.data.image_size = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_init_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let path = path.to_str().unwrap();

        let config = Config::load_or_init(path).unwrap();
        assert!(Path::new(path).exists());
        assert_eq!(config.training.steps, 2000);
    }
}
