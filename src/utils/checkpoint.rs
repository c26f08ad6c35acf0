//! Checkpoint save/load utilities
//!
//! A checkpoint is a fixed directory holding the current weight files
//! for both networks plus metadata and the loss history. It is
//! overwritten on every save, so the directory always reflects the
//! latest training state.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::model::FaceGan;
use crate::training::TrainingMetrics;

/// Generator weight file name inside a checkpoint directory
pub const GENERATOR_WEIGHTS: &str = "generator.pt";
/// Discriminator weight file name inside a checkpoint directory
pub const DISCRIMINATOR_WEIGHTS: &str = "discriminator.pt";
/// Metadata file name inside a checkpoint directory
pub const META_FILE: &str = "meta.json";
/// Metrics file name inside a checkpoint directory
pub const METRICS_FILE: &str = "metrics.csv";

/// Checkpoint metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMeta {
    /// Number of completed training steps
    pub step: usize,
    /// Discriminator loss at checkpoint
    pub disc_loss: f64,
    /// Adversarial loss at checkpoint
    pub adv_loss: f64,
    /// Timestamp of checkpoint
    pub timestamp: String,
    /// Latent dimension of the saved generator
    pub latent_dim: i64,
    /// Image side length of the saved model
    pub image_size: i64,
}

/// Save a complete checkpoint (weights + metadata + metrics) into `dir`.
pub fn save_checkpoint(
    model: &FaceGan,
    metrics: &TrainingMetrics,
    step: usize,
    dir: &str,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)?;

    let gen_path = format!("{dir}/{GENERATOR_WEIGHTS}");
    let disc_path = format!("{dir}/{DISCRIMINATOR_WEIGHTS}");
    model.save(&gen_path, &disc_path)?;

    let meta = CheckpointMeta {
        step,
        disc_loss: metrics.latest_disc_loss().unwrap_or(0.0),
        adv_loss: metrics.latest_adv_loss().unwrap_or(0.0),
        timestamp: chrono::Utc::now().to_rfc3339(),
        latent_dim: model.latent_dim(),
        image_size: model.image_size(),
    };

    let meta_json = serde_json::to_string_pretty(&meta)?;
    std::fs::write(format!("{dir}/{META_FILE}"), meta_json)?;

    metrics.save_csv(&format!("{dir}/{METRICS_FILE}"))?;

    tracing::debug!("Saved checkpoint to {dir} at step {step}");
    Ok(())
}

/// Load checkpoint metadata
pub fn load_checkpoint_meta(dir: &str) -> anyhow::Result<CheckpointMeta> {
    let content = std::fs::read_to_string(format!("{dir}/{META_FILE}"))?;
    let meta: CheckpointMeta = serde_json::from_str(&content)?;
    Ok(meta)
}

/// Load a complete checkpoint from `dir` into `model`.
///
/// # Returns
///
/// Tuple of (completed steps, metrics)
pub fn load_checkpoint(model: &mut FaceGan, dir: &str) -> anyhow::Result<(usize, TrainingMetrics)> {
    let gen_path = format!("{dir}/{GENERATOR_WEIGHTS}");
    let disc_path = format!("{dir}/{DISCRIMINATOR_WEIGHTS}");
    model.load(&gen_path, &disc_path)?;

    let meta = load_checkpoint_meta(dir)?;

    let metrics_path = format!("{dir}/{METRICS_FILE}");
    let metrics = if Path::new(&metrics_path).exists() {
        TrainingMetrics::load_csv(&metrics_path)?
    } else {
        // No history survived; keep later CSV rows numbered from the
        // checkpoint's step anyway.
        TrainingMetrics::with_start_step(meta.step)
    };

    tracing::info!("Loaded checkpoint from {dir} (step {})", meta.step);
    Ok((meta.step, metrics))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_meta_serialization() {
        let meta = CheckpointMeta {
            step: 150,
            disc_loss: 0.5,
            adv_loss: 1.2,
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            latent_dim: 32,
            image_size: 128,
        };

        let json = serde_json::to_string(&meta).unwrap();
        let loaded: CheckpointMeta = serde_json::from_str(&json).unwrap();

        assert_eq!(meta.step, loaded.step);
        assert_eq!(meta.latent_dim, loaded.latent_dim);
    }

    #[test]
    fn test_load_checkpoint_meta_missing_dir() {
        assert!(load_checkpoint_meta("/nonexistent/checkpoint").is_err());
    }
}
