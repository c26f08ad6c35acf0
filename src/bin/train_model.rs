//! Standalone binary for training the face GAN
//!
//! Usage:
//!   cargo run --bin train_model -- --data data/faces --steps 2000

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use face_dcgan::{
    data::{BatchCursor, CropBox, FaceDataset},
    model::FaceGan,
    render::{assemble_gif, save_loss_plot},
    training::{Trainer, TrainerConfig, TrainingMetrics},
    utils::load_checkpoint,
};

/// Train the face GAN on a directory of photographs
#[derive(Parser)]
#[command(name = "train_model")]
#[command(about = "Train a DCGAN on cropped face photographs")]
struct Args {
    /// Directory of face photographs
    #[arg(short, long)]
    data: String,

    /// Number of training steps
    #[arg(short, long, default_value = "2000")]
    steps: usize,

    /// Images per batch side (the discriminator sees twice this)
    #[arg(short, long, default_value = "20")]
    batch_size: usize,

    /// Maximum number of images to load
    #[arg(long, default_value = "10000")]
    max_images: usize,

    /// Latent dimension size
    #[arg(long, default_value = "32")]
    latent_dim: i64,

    /// RMSprop learning rate for both networks
    #[arg(long, default_value = "0.0003")]
    learning_rate: f64,

    /// Gradient value clip
    #[arg(long, default_value = "1.0")]
    clip_value: f64,

    /// Upper bound of the uniform label noise
    #[arg(long, default_value = "0.05")]
    label_noise: f64,

    /// Checkpoint directory
    #[arg(long, default_value = "checkpoints")]
    checkpoint_dir: String,

    /// Directory for numbered preview frames
    #[arg(long, default_value = "results")]
    sample_dir: String,

    /// Output path of the assembled animation
    #[arg(long, default_value = "visual.gif")]
    animation: String,

    /// Output path of the loss-curve chart
    #[arg(long, default_value = "losses.png")]
    loss_plot: String,

    /// Save checkpoint and preview frame every N steps
    #[arg(long, default_value = "50")]
    checkpoint_every: usize,

    /// Resume from a checkpoint directory
    #[arg(long)]
    resume: Option<String>,

    /// Use GPU if available
    #[arg(long)]
    gpu: bool,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let device = if args.gpu && tch::Cuda::is_available() {
        info!("Using CUDA GPU");
        tch::Device::Cuda(0)
    } else {
        info!("Using CPU");
        tch::Device::Cpu
    };

    info!("Loading images from {}", args.data);
    let dataset = FaceDataset::load_dir(
        Path::new(&args.data),
        CropBox::default(),
        128,
        args.max_images,
    )?;
    info!("Loaded {} images", dataset.len());

    if dataset.len() < args.batch_size {
        anyhow::bail!(
            "Not enough images ({}) for batch size ({}). \
             Use a larger dataset or reduce batch_size.",
            dataset.len(),
            args.batch_size
        );
    }

    let mut cursor = BatchCursor::new(dataset.into_images(), args.batch_size)?;

    let mut model = FaceGan::with_defaults(args.latent_dim, 128, device);
    info!("Created GAN: latent_dim={}, image_size=128", args.latent_dim);

    let (start_step, history) = if let Some(checkpoint_dir) = &args.resume {
        info!("Resuming from checkpoint: {checkpoint_dir}");
        let (step, metrics) = load_checkpoint(&mut model, checkpoint_dir)?;
        info!(
            "Resumed from step {} (disc_loss: {:.4}, adv_loss: {:.4})",
            step,
            metrics.latest_disc_loss().unwrap_or(0.0),
            metrics.latest_adv_loss().unwrap_or(0.0)
        );
        (step, metrics)
    } else {
        (0, TrainingMetrics::new())
    };

    let trainer_config = TrainerConfig {
        steps: args.steps,
        batch_size: args.batch_size,
        latent_dim: args.latent_dim,
        learning_rate: args.learning_rate,
        clip_value: args.clip_value,
        label_noise: args.label_noise,
        checkpoint_every: args.checkpoint_every,
        checkpoint_dir: args.checkpoint_dir.clone(),
        sample_dir: args.sample_dir.clone(),
    };

    let mut trainer = Trainer::with_metrics(trainer_config, device, history);

    info!("Starting training for {} steps", args.steps);
    info!("  Learning rate: {}", args.learning_rate);
    info!("  Gradient clip: {}", args.clip_value);
    info!("  Label noise: {}", args.label_noise);

    let metrics = trainer.train(&mut model, &mut cursor, start_step)?;

    info!("Training complete!");
    info!(
        "Final metrics: disc_loss={:.4}, adv_loss={:.4}",
        metrics.latest_disc_loss().unwrap_or(0.0),
        metrics.latest_adv_loss().unwrap_or(0.0)
    );

    save_loss_plot(metrics, Path::new(&args.loss_plot), 1200, 800)?;
    info!("Saved loss plot to {}", args.loss_plot);

    let frames = assemble_gif(
        Path::new(&args.sample_dir),
        Path::new(&args.animation),
        200,
    )?;
    std::fs::remove_dir_all(&args.sample_dir)?;
    info!(
        "Assembled {} frames into {} and removed {}",
        frames, args.animation, args.sample_dir
    );

    Ok(())
}
