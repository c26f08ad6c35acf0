//! GAN wrapper combining Generator and Discriminator
//!
//! Each network owns a separate variable store, so an optimizer built
//! for one store can only ever update that network's parameters. The
//! adversarial step therefore trains the generator against the
//! discriminator's judgment without touching discriminator weights.

use anyhow::Result;
use tch::{nn, nn::OptimizerConfig, nn::VarStore, Device, Tensor};

use super::discriminator::{Discriminator, DiscriminatorConfig};
use super::generator::{Generator, GeneratorConfig};

/// Complete face GAN
pub struct FaceGan {
    /// Generator network
    pub generator: Generator,
    /// Discriminator network
    pub discriminator: Discriminator,
    /// Variable store for generator
    pub gen_vs: VarStore,
    /// Variable store for discriminator
    pub disc_vs: VarStore,
    /// Device (CPU/GPU)
    pub device: Device,
}

impl FaceGan {
    /// Create a new GAN
    pub fn new(
        gen_config: GeneratorConfig,
        disc_config: DiscriminatorConfig,
        device: Device,
    ) -> Self {
        let gen_vs = VarStore::new(device);
        let disc_vs = VarStore::new(device);

        let generator = Generator::new(&gen_vs.root(), gen_config);
        let discriminator = Discriminator::new(&disc_vs.root(), disc_config);

        Self {
            generator,
            discriminator,
            gen_vs,
            disc_vs,
            device,
        }
    }

    /// Create a GAN with default layer widths for the given dimensions
    pub fn with_defaults(latent_dim: i64, image_size: i64, device: Device) -> Self {
        let gen_config = GeneratorConfig {
            latent_dim,
            image_size,
        };
        let disc_config = DiscriminatorConfig {
            image_size,
            ..Default::default()
        };
        Self::new(gen_config, disc_config, device)
    }

    /// Generator optimizer: RMSprop over the generator store only
    pub fn gen_optimizer(&self, lr: f64) -> Result<nn::Optimizer> {
        Ok(Self::rms_prop().build(&self.gen_vs, lr)?)
    }

    /// Discriminator optimizer: RMSprop over the discriminator store only
    pub fn disc_optimizer(&self, lr: f64) -> Result<nn::Optimizer> {
        Ok(Self::rms_prop().build(&self.disc_vs, lr)?)
    }

    fn rms_prop() -> nn::RmsProp {
        nn::RmsProp {
            alpha: 0.99,
            eps: 1e-8,
            wd: 0.0,
            momentum: 0.0,
            centered: false,
        }
    }

    /// Generate images from freshly sampled latents
    pub fn generate(&self, num_samples: i64) -> Tensor {
        self.generator.generate_random(num_samples, self.device)
    }

    /// Generate images from specific latent vectors
    pub fn generate_from(&self, noise: &Tensor) -> Tensor {
        self.generator.generate(noise)
    }

    /// Probability of each image being real
    pub fn discriminate(&self, images: &Tensor) -> Tensor {
        self.discriminator.classify(images)
    }

    /// Save both weight files
    pub fn save(&self, gen_path: &str, disc_path: &str) -> Result<()> {
        self.gen_vs.save(gen_path)?;
        self.disc_vs.save(disc_path)?;
        Ok(())
    }

    /// Load both weight files
    pub fn load(&mut self, gen_path: &str, disc_path: &str) -> Result<()> {
        self.gen_vs.load(gen_path)?;
        self.disc_vs.load(disc_path)?;
        Ok(())
    }

    /// Latent dimension
    pub fn latent_dim(&self) -> i64 {
        self.generator.config().latent_dim
    }

    /// Image side length
    pub fn image_size(&self) -> i64 {
        self.generator.config().image_size
    }

    /// Interpolate between two points in latent space
    ///
    /// Useful for visualizing smooth transitions between generated
    /// faces.
    ///
    /// # Arguments
    ///
    /// * `z1` - First latent vector, shape (latent_dim,)
    /// * `z2` - Second latent vector, shape (latent_dim,)
    /// * `steps` - Number of interpolation steps, clamped to at least 1
    ///
    /// # Returns
    ///
    /// Tensor of shape (steps, 3, image_size, image_size)
    pub fn interpolate(&self, z1: &Tensor, z2: &Tensor, steps: i64) -> Tensor {
        let steps = steps.max(1);
        let mut samples = Vec::new();

        for i in 0..steps {
            let alpha = if steps > 1 {
                i as f64 / (steps - 1) as f64
            } else {
                0.0
            };
            let z = z1 * (1.0 - alpha) + z2 * alpha;
            let sample = self.generator.generate(&z.unsqueeze(0));
            samples.push(sample.squeeze_dim(0));
        }

        Tensor::stack(&samples, 0)
    }
}
