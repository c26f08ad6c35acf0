//! Training metrics for monitoring GAN progress

use anyhow::Result;

/// Per-step loss history collected during training
#[derive(Debug, Clone, Default)]
pub struct TrainingMetrics {
    /// Discriminator losses per step
    pub disc_losses: Vec<f64>,
    /// Adversarial (generator) losses per step
    pub adv_losses: Vec<f64>,
    /// Steps completed before the first recorded entry, so a history
    /// resumed without its CSV still numbers rows globally
    start_step: usize,
}

impl TrainingMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty metrics whose first recorded entry will be
    /// numbered `start_step + 1`
    pub fn with_start_step(start_step: usize) -> Self {
        Self {
            start_step,
            ..Default::default()
        }
    }

    /// Step number of the first recorded entry, minus one
    pub fn start_step(&self) -> usize {
        self.start_step
    }

    /// Record the losses of one training step
    pub fn record_step(&mut self, disc_loss: f64, adv_loss: f64) {
        self.disc_losses.push(disc_loss);
        self.adv_losses.push(adv_loss);
    }

    /// Number of recorded steps
    pub fn num_steps(&self) -> usize {
        self.disc_losses.len()
    }

    /// Latest discriminator loss
    pub fn latest_disc_loss(&self) -> Option<f64> {
        self.disc_losses.last().copied()
    }

    /// Latest adversarial loss
    pub fn latest_adv_loss(&self) -> Option<f64> {
        self.adv_losses.last().copied()
    }

    /// Moving average of the discriminator loss
    pub fn disc_loss_ma(&self, window: usize) -> f64 {
        moving_average(&self.disc_losses, window)
    }

    /// Moving average of the adversarial loss
    pub fn adv_loss_ma(&self, window: usize) -> f64 {
        moving_average(&self.adv_losses, window)
    }

    /// Save metrics to a CSV file
    pub fn save_csv(&self, path: &str) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;

        writer.write_record(["step", "disc_loss", "adv_loss"])?;

        for i in 0..self.num_steps() {
            writer.write_record([
                (self.start_step + i + 1).to_string(),
                self.disc_losses[i].to_string(),
                self.adv_losses[i].to_string(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Load metrics from a CSV file
    pub fn load_csv(path: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut metrics = Self::new();

        for result in reader.records() {
            let record = result?;
            if metrics.disc_losses.is_empty() {
                let first: usize = parse_field(&record, 0)?;
                metrics.start_step = first.saturating_sub(1);
            }
            metrics.disc_losses.push(parse_field(&record, 1)?);
            metrics.adv_losses.push(parse_field(&record, 2)?);
        }

        Ok(metrics)
    }
}

/// Parse one column of a metrics row, erroring on short rows
fn parse_field<T: std::str::FromStr>(record: &csv::StringRecord, idx: usize) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = record
        .get(idx)
        .ok_or_else(|| anyhow::anyhow!("metrics row has no column {idx}: {record:?}"))?;
    Ok(raw.parse()?)
}

/// Average of the last `window` values
fn moving_average(values: &[f64], window: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let n = window.min(values.len());
    let sum: f64 = values.iter().rev().take(n).sum();
    sum / n as f64
}
