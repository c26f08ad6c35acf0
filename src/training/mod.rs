//! Training loop, losses and metrics

pub mod losses;
pub mod metrics;
pub mod trainer;

pub use losses::{adversarial_loss, discriminator_loss, smoothed_labels};
pub use metrics::TrainingMetrics;
pub use trainer::{Trainer, TrainerConfig};
