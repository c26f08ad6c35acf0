//! Adversarial training loop
//!
//! Alternates one discriminator step on a combined synthetic+real batch
//! with one generator step through the discriminator's judgment, for a
//! fixed number of iterations. Every `checkpoint_every` steps the model
//! weights are persisted and a preview image is rendered from a fixed
//! latent vector.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::ArrayView4;
use tch::{Device, Tensor};
use tracing::{info, warn};

use crate::data::BatchCursor;
use crate::model::FaceGan;
use crate::render::{frame_filename, save_sample};
use crate::utils::checkpoint::save_checkpoint;

use super::losses::{adversarial_loss, discriminator_loss, smoothed_labels};
use super::metrics::TrainingMetrics;

/// Training configuration
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Total number of training steps
    pub steps: usize,
    /// Images per batch (per side: the discriminator sees 2x this)
    pub batch_size: usize,
    /// Latent vector dimension
    pub latent_dim: i64,
    /// RMSprop learning rate for both networks
    pub learning_rate: f64,
    /// Gradient value clip applied before every optimizer step
    pub clip_value: f64,
    /// Upper bound of the uniform label noise
    pub label_noise: f64,
    /// Persist weights and a preview frame every N steps
    pub checkpoint_every: usize,
    /// Directory for weight checkpoints
    pub checkpoint_dir: String,
    /// Directory for numbered preview frames
    pub sample_dir: String,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            steps: 2000,
            batch_size: 20,
            latent_dim: 32,
            learning_rate: 3e-4,
            clip_value: 1.0,
            label_noise: 0.05,
            checkpoint_every: 50,
            checkpoint_dir: "checkpoints".to_string(),
            sample_dir: "results".to_string(),
        }
    }
}

/// GAN trainer
pub struct Trainer {
    config: TrainerConfig,
    device: Device,
    metrics: TrainingMetrics,
    images_saved: usize,
}

impl Trainer {
    /// Create a new trainer
    pub fn new(config: TrainerConfig, device: Device) -> Self {
        Self::with_metrics(config, device, TrainingMetrics::new())
    }

    /// Create a trainer that continues a previous run's loss history.
    /// Checkpoints written after resuming then carry the full history
    /// instead of restarting the CSV at step 1.
    pub fn with_metrics(config: TrainerConfig, device: Device, metrics: TrainingMetrics) -> Self {
        Self {
            config,
            device,
            metrics,
            images_saved: 0,
        }
    }

    /// Run the training loop from `start_step` to the configured horizon.
    ///
    /// Each step:
    /// 1. generates a batch of synthetic images,
    /// 2. takes the next real batch from the wrap-around cursor,
    /// 3. trains the discriminator on the combined batch with noisy
    ///    labels (synthetic = 1, real = 0),
    /// 4. trains the generator through the discriminator against an
    ///    all-zero target.
    ///
    /// Every `checkpoint_every` steps the weights are saved and a
    /// preview frame is rendered from a fixed latent vector. The loop
    /// always runs to the horizon; there is no early stopping.
    pub fn train(
        &mut self,
        model: &mut FaceGan,
        cursor: &mut BatchCursor,
        start_step: usize,
    ) -> Result<&TrainingMetrics> {
        let mut gen_opt = model.gen_optimizer(self.config.learning_rate)?;
        let mut disc_opt = model.disc_optimizer(self.config.learning_rate)?;

        let batch = self.config.batch_size as i64;
        let latent_dim = self.config.latent_dim;

        std::fs::create_dir_all(&self.config.checkpoint_dir)?;
        std::fs::create_dir_all(&self.config.sample_dir)?;

        // Fixed preview latent, drawn once and reused for every saved
        // frame so the animation shows one face evolving.
        let preview_latent =
            Tensor::randn([1, latent_dim], (tch::Kind::Float, self.device)) * 0.5;

        self.images_saved = start_step / self.config.checkpoint_every;

        info!(
            "Starting training: steps {}..{}, batch size {}, latent dim {}",
            start_step, self.config.steps, self.config.batch_size, latent_dim
        );

        let pb = ProgressBar::new(self.config.steps as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("##-"),
        );
        pb.set_position(start_step as u64);

        for step in start_step..self.config.steps {
            let step_start = Instant::now();

            // ========== Train Discriminator ==========
            let noise = Tensor::randn([batch, latent_dim], (tch::Kind::Float, self.device));
            let fake = model.generator.forward_t(&noise, true);

            // Real images stay in [0, 1] while generated ones are in
            // [-1, 1]; the reference procedure feeds both ranges to the
            // discriminator unchanged.
            let real = batch_to_tensor(cursor.next_batch(), self.device);
            let combined = Tensor::cat(&[fake.detach(), real], 0);

            let labels = smoothed_labels(batch, batch, self.config.label_noise, self.device);
            let logits = model.discriminator.forward_t(&combined, true);
            let d_loss = discriminator_loss(&logits, &labels);

            disc_opt.zero_grad();
            d_loss.backward();
            disc_opt.clip_grad_value(self.config.clip_value);
            disc_opt.step();

            // ========== Train Generator ==========
            let noise = Tensor::randn([batch, latent_dim], (tch::Kind::Float, self.device));
            let fake = model.generator.forward_t(&noise, true);
            let fake_logits = model.discriminator.forward_t(&fake, true);
            let a_loss = adversarial_loss(&fake_logits);

            gen_opt.zero_grad();
            a_loss.backward();
            gen_opt.clip_grad_value(self.config.clip_value);
            gen_opt.step();

            let d_loss = d_loss.double_value(&[]);
            let a_loss = a_loss.double_value(&[]);
            self.metrics.record_step(d_loss, a_loss);

            pb.set_message(format!("D: {d_loss:.4}, A: {a_loss:.4}"));
            pb.inc(1);

            // Checkpoint + preview frame every Nth step
            if (step + 1) % self.config.checkpoint_every == 0 {
                if let Err(e) =
                    save_checkpoint(model, &self.metrics, step + 1, &self.config.checkpoint_dir)
                {
                    warn!("Failed to save checkpoint: {e}");
                }

                info!(
                    "{}/{}: disc_loss: {:.4}, adv_loss: {:.4}  ({:.1} sec)",
                    step + 1,
                    self.config.steps,
                    d_loss,
                    a_loss,
                    step_start.elapsed().as_secs_f64()
                );

                let sample = model.generator.generate(&preview_latent);
                let frame_path =
                    Path::new(&self.config.sample_dir).join(frame_filename(self.images_saved));
                if let Err(e) = save_sample(&sample, &frame_path) {
                    warn!("Failed to save preview frame: {e}");
                } else {
                    self.images_saved += 1;
                }
            }
        }

        pb.finish_with_message("done");

        let metrics_path = format!("{}/training_metrics.csv", self.config.checkpoint_dir);
        if let Err(e) = self.metrics.save_csv(&metrics_path) {
            warn!("Failed to save metrics: {e}");
        }

        Ok(&self.metrics)
    }

    /// Number of preview frames written so far
    pub fn images_saved(&self) -> usize {
        self.images_saved
    }

    /// Training metrics
    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    /// Configuration
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }
}

/// Convert an (N, H, W, 3) host batch to an (N, 3, H, W) device tensor.
fn batch_to_tensor(batch: ArrayView4<'_, f32>, device: Device) -> Tensor {
    let (n, h, w, c) = batch.dim();
    let data: Vec<f32> = batch.iter().copied().collect();

    Tensor::from_slice(&data)
        .view([n as i64, h as i64, w as i64, c as i64])
        .permute([0, 3, 1, 2])
        .to_device(device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    #[test]
    fn test_trainer_config_default() {
        let config = TrainerConfig::default();
        assert_eq!(config.steps, 2000);
        assert_eq!(config.batch_size, 20);
        assert_eq!(config.latent_dim, 32);
        assert_eq!(config.checkpoint_every, 50);
    }

    #[test]
    fn test_frames_per_run() {
        // 2000 steps with a checkpoint every 50 yields exactly 40 frames.
        let config = TrainerConfig::default();
        let frames = (1..=config.steps)
            .filter(|step| step % config.checkpoint_every == 0)
            .count();
        assert_eq!(frames, 40);
    }

    #[test]
    fn test_batch_to_tensor_layout() {
        let mut batch = Array4::<f32>::zeros((2, 4, 4, 3));
        batch[[1, 2, 3, 1]] = 0.5;

        let tensor = batch_to_tensor(batch.view(), Device::Cpu);
        assert_eq!(tensor.size(), vec![2, 3, 4, 4]);
        let v = tensor.double_value(&[1, 1, 2, 3]);
        assert!((v - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_single_training_step() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrainerConfig {
            steps: 1,
            batch_size: 2,
            checkpoint_every: 50,
            checkpoint_dir: dir.path().join("ckpt").to_string_lossy().to_string(),
            sample_dir: dir.path().join("frames").to_string_lossy().to_string(),
            ..Default::default()
        };

        let mut model = FaceGan::with_defaults(32, 128, Device::Cpu);
        let data = Array4::<f32>::from_elem((2, 128, 128, 3), 0.5);
        let mut cursor = BatchCursor::new(data, 2).unwrap();

        let mut trainer = Trainer::new(config, Device::Cpu);
        let metrics = trainer.train(&mut model, &mut cursor, 0).unwrap();

        assert_eq!(metrics.num_steps(), 1);
        assert!(metrics.latest_disc_loss().unwrap().is_finite());
        assert!(metrics.latest_adv_loss().unwrap().is_finite());
    }

    #[test]
    fn test_checkpoint_and_preview_frames_written() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt_dir = dir.path().join("ckpt");
        let frame_dir = dir.path().join("frames");
        let config = TrainerConfig {
            steps: 2,
            batch_size: 2,
            checkpoint_every: 1,
            checkpoint_dir: ckpt_dir.to_string_lossy().to_string(),
            sample_dir: frame_dir.to_string_lossy().to_string(),
            ..Default::default()
        };

        let mut model = FaceGan::with_defaults(32, 128, Device::Cpu);
        let data = Array4::<f32>::from_elem((2, 128, 128, 3), 0.5);
        let mut cursor = BatchCursor::new(data, 2).unwrap();

        let mut trainer = Trainer::new(config, Device::Cpu);
        trainer.train(&mut model, &mut cursor, 0).unwrap();

        assert_eq!(trainer.images_saved(), 2);
        assert!(frame_dir.join(frame_filename(0)).exists());
        assert!(frame_dir.join(frame_filename(1)).exists());
        assert!(ckpt_dir.join("generator.pt").exists());
        assert!(ckpt_dir.join("discriminator.pt").exists());
        assert!(ckpt_dir.join("metrics.csv").exists());
    }

    #[test]
    fn test_resumed_history_carries_into_checkpoints() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt_dir = dir.path().join("ckpt");
        let config = TrainerConfig {
            steps: 3,
            batch_size: 2,
            checkpoint_every: 3,
            checkpoint_dir: ckpt_dir.to_string_lossy().to_string(),
            sample_dir: dir.path().join("frames").to_string_lossy().to_string(),
            ..Default::default()
        };

        let mut model = FaceGan::with_defaults(32, 128, Device::Cpu);
        let data = Array4::<f32>::from_elem((2, 128, 128, 3), 0.5);
        let mut cursor = BatchCursor::new(data, 2).unwrap();

        let mut history = TrainingMetrics::new();
        history.record_step(0.8, 1.5);
        history.record_step(0.7, 1.4);

        let mut trainer = Trainer::with_metrics(config, Device::Cpu, history);
        let metrics = trainer.train(&mut model, &mut cursor, 2).unwrap();

        // The prior two steps plus the one just trained.
        assert_eq!(metrics.num_steps(), 3);

        let saved =
            TrainingMetrics::load_csv(ckpt_dir.join("metrics.csv").to_str().unwrap()).unwrap();
        assert_eq!(saved.num_steps(), 3);
        assert_eq!(saved.disc_losses[0], 0.8);
    }
}
