//! DCGAN for Face Image Synthesis
//!
//! Main entry point providing a CLI interface for:
//! - Training the GAN on a directory of face photographs
//! - Generating samples from a trained checkpoint
//! - Assembling saved preview frames into an animation
//! - Rendering a preview grid of the training data

use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use face_dcgan::{
    data::{BatchCursor, FaceDataset},
    model::FaceGan,
    render::{assemble_gif, frame_filename, preview_grid, save_loss_plot, save_sample},
    training::{Trainer, TrainerConfig, TrainingMetrics},
    utils::{load_checkpoint, Config},
};

/// DCGAN for synthesizing face images
#[derive(Parser)]
#[command(name = "face_dcgan")]
#[command(version = "0.1.0")]
#[command(about = "Train a DCGAN to synthesize 128x128 face images")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the GAN and produce the loss plot and animated preview
    Train {
        /// Directory of face photographs (overrides the config)
        #[arg(short, long)]
        data: Option<String>,

        /// Number of training steps (overrides the config)
        #[arg(short, long)]
        steps: Option<usize>,

        /// Resume from a checkpoint directory
        #[arg(long)]
        resume: Option<String>,
    },

    /// Generate sample images from a trained checkpoint
    Generate {
        /// Checkpoint directory holding the weight files
        #[arg(short, long)]
        model: String,

        /// Number of images to generate
        #[arg(short, long, default_value = "16")]
        num_samples: i64,

        /// Output directory for the generated PNGs
        #[arg(short, long, default_value = "generated")]
        output: String,
    },

    /// Assemble saved preview frames into an animated GIF
    Animate {
        /// Directory of numbered preview frames
        #[arg(short, long)]
        frames: Option<String>,

        /// Output GIF path
        #[arg(short, long)]
        output: Option<String>,

        /// Keep the frame directory instead of deleting it
        #[arg(long)]
        keep_frames: bool,
    },

    /// Save a grid preview of the training images
    Preview {
        /// Directory of face photographs (overrides the config)
        #[arg(short, long)]
        data: Option<String>,

        /// Output PNG path
        #[arg(short, long, default_value = "dataset_preview.png")]
        output: String,

        /// Grid rows
        #[arg(long, default_value = "6")]
        rows: u32,

        /// Grid columns
        #[arg(long, default_value = "6")]
        cols: u32,
    },

    /// Initialize a default configuration file
    Init {
        /// Output configuration file path
        #[arg(short, long, default_value = "config.json")]
        output: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbosity.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Train {
            data,
            steps,
            resume,
        } => train(&cli.config, data, steps, resume),
        Commands::Generate {
            model,
            num_samples,
            output,
        } => generate(&cli.config, &model, num_samples, &output),
        Commands::Animate {
            frames,
            output,
            keep_frames,
        } => animate(&cli.config, frames, output, keep_frames),
        Commands::Preview {
            data,
            output,
            rows,
            cols,
        } => preview(&cli.config, data, &output, rows, cols),
        Commands::Init { output } => init_config(&output),
    }
}

fn load_config(config_path: &str) -> Result<Config> {
    let config = if Path::new(config_path).exists() {
        Config::from_json(config_path)?
    } else {
        info!("Config file not found, using defaults");
        Config::default()
    };
    config.validate()?;
    Ok(config)
}

/// Full training pipeline: load images, train, plot losses, assemble
/// the animation and remove the frame directory.
fn train(
    config_path: &str,
    data: Option<String>,
    steps: Option<usize>,
    resume: Option<String>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(dir) = data {
        config.data.image_dir = dir;
    }
    if let Some(steps) = steps {
        config.training.steps = steps;
    }

    let device = config.get_device();
    info!("Using device: {:?}", device);

    let dataset = FaceDataset::load_dir(
        Path::new(&config.data.image_dir),
        config.data.crop,
        config.data.image_size,
        config.data.max_images,
    )?;
    info!("Loaded {} images", dataset.len());

    let mut cursor = BatchCursor::new(dataset.into_images(), config.data.batch_size)?;

    let mut model = FaceGan::with_defaults(
        config.model.latent_dim,
        config.data.image_size as i64,
        device,
    );

    let (start_step, history) = if let Some(checkpoint_dir) = resume {
        let (step, metrics) = load_checkpoint(&mut model, &checkpoint_dir)?;
        info!("Resumed from step {step}");
        (step, metrics)
    } else {
        (0, TrainingMetrics::new())
    };

    let trainer_config = TrainerConfig {
        steps: config.training.steps,
        batch_size: config.data.batch_size,
        latent_dim: config.model.latent_dim,
        learning_rate: config.training.learning_rate,
        clip_value: config.training.clip_value,
        label_noise: config.training.label_noise,
        checkpoint_every: config.training.checkpoint_every,
        checkpoint_dir: config.training.checkpoint_dir.clone(),
        sample_dir: config.training.sample_dir.clone(),
    };

    let mut trainer = Trainer::with_metrics(trainer_config, device, history);
    let metrics = trainer.train(&mut model, &mut cursor, start_step)?;

    info!(
        "Training complete. Final disc_loss: {:.4}, adv_loss: {:.4}",
        metrics.latest_disc_loss().unwrap_or(0.0),
        metrics.latest_adv_loss().unwrap_or(0.0)
    );

    save_loss_plot(
        metrics,
        Path::new(&config.training.loss_plot_path),
        1200,
        800,
    )?;
    info!("Saved loss plot to {}", config.training.loss_plot_path);

    let frames = assemble_gif(
        Path::new(&config.training.sample_dir),
        Path::new(&config.training.animation_path),
        config.training.frame_delay_ms,
    )?;
    std::fs::remove_dir_all(&config.training.sample_dir)?;
    info!(
        "Assembled {frames} frames into {} and removed {}",
        config.training.animation_path, config.training.sample_dir
    );

    Ok(())
}

/// Generate sample images from a trained checkpoint
fn generate(config_path: &str, checkpoint_dir: &str, num_samples: i64, output: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let device = config.get_device();

    let mut model = FaceGan::with_defaults(
        config.model.latent_dim,
        config.data.image_size as i64,
        device,
    );
    load_checkpoint(&mut model, checkpoint_dir)?;
    info!("Loaded model from {checkpoint_dir}");

    std::fs::create_dir_all(output)?;
    for i in 0..num_samples {
        let sample = model.generate(1);
        save_sample(&sample, &Path::new(output).join(frame_filename(i as usize)))?;
    }

    info!("Saved {num_samples} generated images to {output}");
    Ok(())
}

/// Assemble an animation from an existing frame directory
fn animate(
    config_path: &str,
    frames: Option<String>,
    output: Option<String>,
    keep_frames: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let frame_dir = frames.unwrap_or_else(|| config.training.sample_dir.clone());
    let out_path = output.unwrap_or_else(|| config.training.animation_path.clone());

    let count = assemble_gif(
        Path::new(&frame_dir),
        Path::new(&out_path),
        config.training.frame_delay_ms,
    )?;

    if !keep_frames {
        std::fs::remove_dir_all(&frame_dir)?;
    }

    info!("Assembled {count} frames into {out_path}");
    Ok(())
}

/// Save a grid preview of the training images
fn preview(
    config_path: &str,
    data: Option<String>,
    output: &str,
    rows: u32,
    cols: u32,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(dir) = data {
        config.data.image_dir = dir;
    }

    let dataset = FaceDataset::load_dir(
        Path::new(&config.data.image_dir),
        config.data.crop,
        config.data.image_size,
        (rows * cols) as usize,
    )?;

    let grid = preview_grid(dataset.images(), rows, cols);
    grid.save(output)?;
    info!("Saved {rows}x{cols} dataset preview to {output}");
    Ok(())
}

/// Initialize a default configuration file
fn init_config(output: &str) -> Result<()> {
    let config = Config::default();

    if output.ends_with(".toml") {
        config.save_toml(output)?;
    } else {
        config.save_json(output)?;
    }

    info!("Created default configuration at {output}");
    Ok(())
}
