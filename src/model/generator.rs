//! Generator network
//!
//! The Generator transforms random latent vectors into synthetic face
//! images. A dense projection seeds a coarse feature map which three
//! stride-2 transposed convolutions upsample to full resolution.

use tch::{nn, nn::Module, nn::ModuleT, Device, Tensor};

/// Channel width of the seed feature map produced by the dense projection
const SEED_CHANNELS: i64 = 128;
/// Channel width after the same-resolution convolution
const STEM_CHANNELS: i64 = 256;
/// Channel widths of the three upsampling stages
const UP_CHANNELS: [i64; 3] = [512, 256, 256];

/// Generator network configuration
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Size of the latent vector
    pub latent_dim: i64,
    /// Output image side length; must be a multiple of 8
    pub image_size: i64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            latent_dim: 32,
            image_size: 128,
        }
    }
}

/// Generator network
///
/// Architecture:
/// 1. Dense projection from latent space to a 16x16 seed feature map
/// 2. One same-resolution convolution
/// 3. Three stride-2 transposed convolutions (16 -> 32 -> 64 -> 128)
/// 4. Final convolution down to 3 channels with tanh activation
///
/// Every intermediate layer uses a LeakyReLU activation. Output values
/// are in [-1, 1].
#[derive(Debug)]
pub struct Generator {
    config: GeneratorConfig,
    /// Dense projection into the seed feature map
    fc: nn::Linear,
    /// Same-resolution stem convolution
    stem: nn::Conv2D,
    /// Upsampling transposed convolutions
    up1: nn::ConvTranspose2D,
    up2: nn::ConvTranspose2D,
    up3: nn::ConvTranspose2D,
    /// Final projection to RGB
    to_rgb: nn::Conv2D,
}

impl Generator {
    /// Create a new Generator network
    pub fn new(vs: &nn::Path, config: GeneratorConfig) -> Self {
        let seed_side = config.image_size / 8;
        let seed_size = SEED_CHANNELS * seed_side * seed_side;

        let fc = nn::linear(vs / "fc", config.latent_dim, seed_size, Default::default());

        // 'same' padding for the kernel-5 stem
        let stem_config = nn::ConvConfig {
            padding: 2,
            ..Default::default()
        };
        let stem = nn::conv2d(vs / "stem", SEED_CHANNELS, STEM_CHANNELS, 5, stem_config);

        // kernel 4, stride 2, padding 1 doubles the spatial resolution
        let up_config = nn::ConvTransposeConfig {
            stride: 2,
            padding: 1,
            ..Default::default()
        };
        let up1 = nn::conv_transpose2d(vs / "up1", STEM_CHANNELS, UP_CHANNELS[0], 4, up_config);
        let up2 = nn::conv_transpose2d(vs / "up2", UP_CHANNELS[0], UP_CHANNELS[1], 4, up_config);
        let up3 = nn::conv_transpose2d(vs / "up3", UP_CHANNELS[1], UP_CHANNELS[2], 4, up_config);

        // 'same' padding for the kernel-7 output convolution
        let rgb_config = nn::ConvConfig {
            padding: 3,
            ..Default::default()
        };
        let to_rgb = nn::conv2d(vs / "to_rgb", UP_CHANNELS[2], 3, 7, rgb_config);

        Self {
            config,
            fc,
            stem,
            up1,
            up2,
            up3,
            to_rgb,
        }
    }

    /// Generate images from latent vectors
    ///
    /// # Arguments
    ///
    /// * `noise` - Tensor of shape (batch_size, latent_dim)
    /// * `train` - Whether in training mode
    ///
    /// # Returns
    ///
    /// Tensor of shape (batch_size, 3, image_size, image_size), values
    /// in [-1, 1].
    ///
    /// # Panics
    ///
    /// Panics if `noise` does not have shape (N, latent_dim); shape
    /// mismatches are programming errors, not recoverable states.
    pub fn forward_t(&self, noise: &Tensor, _train: bool) -> Tensor {
        let dims = noise.size();
        assert!(
            dims.len() == 2 && dims[1] == self.config.latent_dim,
            "generator expects latent input of shape (N, {}), got {:?}",
            self.config.latent_dim,
            dims
        );
        let batch_size = dims[0];
        let seed_side = self.config.image_size / 8;

        // Project and reshape: (batch, latent) -> (batch, channels, h, w)
        let x = self.fc.forward(noise).leaky_relu();
        let x = x.view([batch_size, SEED_CHANNELS, seed_side, seed_side]);

        let x = self.stem.forward(&x).leaky_relu();

        let x = self.up1.forward(&x).leaky_relu();
        let x = self.up2.forward(&x).leaky_relu();
        let x = self.up3.forward(&x).leaky_relu();

        self.to_rgb.forward(&x).tanh()
    }

    /// Generate images (inference mode)
    pub fn generate(&self, noise: &Tensor) -> Tensor {
        self.forward_t(noise, false)
    }

    /// Generate images from freshly sampled standard-normal latents
    pub fn generate_random(&self, num_samples: i64, device: Device) -> Tensor {
        let noise = Tensor::randn(
            [num_samples, self.config.latent_dim],
            (tch::Kind::Float, device),
        );
        self.generate(&noise)
    }

    /// Get configuration
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

impl ModuleT for Generator {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        Generator::forward_t(self, xs, train)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::nn::VarStore;

    #[test]
    fn test_generator_output_shape() {
        let vs = VarStore::new(Device::Cpu);
        let gen = Generator::new(&vs.root(), GeneratorConfig::default());

        let noise = Tensor::randn([2, 32], (tch::Kind::Float, Device::Cpu));
        let output = gen.generate(&noise);

        assert_eq!(output.size(), vec![2, 3, 128, 128]);
    }

    #[test]
    fn test_generator_output_range() {
        let vs = VarStore::new(Device::Cpu);
        let gen = Generator::new(&vs.root(), GeneratorConfig::default());

        let noise = Tensor::randn([1, 32], (tch::Kind::Float, Device::Cpu));
        let output = gen.generate(&noise);

        let min: f64 = output.min().double_value(&[]);
        let max: f64 = output.max().double_value(&[]);
        assert!(min >= -1.0 && max <= 1.0);
    }

    #[test]
    #[should_panic(expected = "generator expects latent input")]
    fn test_generator_rejects_wrong_latent_dim() {
        let vs = VarStore::new(Device::Cpu);
        let gen = Generator::new(&vs.root(), GeneratorConfig::default());

        let noise = Tensor::randn([2, 64], (tch::Kind::Float, Device::Cpu));
        let _ = gen.generate(&noise);
    }
}
