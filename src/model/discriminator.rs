//! Discriminator network
//!
//! The Discriminator classifies images as real or generated. Four
//! stride-2 convolutions at a fixed channel width downsample the input
//! before a dropout-regularized dense layer produces a single logit.

use tch::{nn, nn::Module, nn::ModuleT, Tensor};

/// Discriminator network configuration
#[derive(Debug, Clone)]
pub struct DiscriminatorConfig {
    /// Input image side length
    pub image_size: i64,
    /// Channel width used by all four convolutions
    pub channels: i64,
    /// Dropout rate applied before the final dense layer
    pub dropout: f64,
}

impl Default for DiscriminatorConfig {
    fn default() -> Self {
        Self {
            image_size: 128,
            channels: 512,
            dropout: 0.5,
        }
    }
}

/// Spatial side length after four valid-padding, stride-2, kernel-4
/// convolutions.
fn downsampled_side(mut side: i64) -> i64 {
    for _ in 0..4 {
        side = (side - 4) / 2 + 1;
    }
    side
}

/// Discriminator network
///
/// Architecture:
/// 1. Four stride-2 convolutions (valid padding) with LeakyReLU
/// 2. Flatten, dropout, and a dense layer producing one logit
#[derive(Debug)]
pub struct Discriminator {
    config: DiscriminatorConfig,
    conv1: nn::Conv2D,
    conv2: nn::Conv2D,
    conv3: nn::Conv2D,
    conv4: nn::Conv2D,
    /// Final classification layer
    fc: nn::Linear,
}

impl Discriminator {
    /// Create a new Discriminator network
    pub fn new(vs: &nn::Path, config: DiscriminatorConfig) -> Self {
        let width = config.channels;

        // kernel 4, stride 2, no padding: 128 -> 63 -> 30 -> 14 -> 6
        let conv_config = nn::ConvConfig {
            stride: 2,
            ..Default::default()
        };

        let conv1 = nn::conv2d(vs / "conv1", 3, width, 4, conv_config);
        let conv2 = nn::conv2d(vs / "conv2", width, width, 4, conv_config);
        let conv3 = nn::conv2d(vs / "conv3", width, width, 4, conv_config);
        let conv4 = nn::conv2d(vs / "conv4", width, width, 4, conv_config);

        let side = downsampled_side(config.image_size);
        let flat_size = width * side * side;

        let fc = nn::linear(vs / "fc", flat_size, 1, Default::default());

        Self {
            config,
            conv1,
            conv2,
            conv3,
            conv4,
            fc,
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    ///
    /// * `input` - Tensor of shape (batch_size, 3, image_size, image_size)
    /// * `train` - Whether in training mode (enables dropout)
    ///
    /// # Returns
    ///
    /// Tensor of shape (batch_size, 1) with logits (no sigmoid).
    ///
    /// # Panics
    ///
    /// Panics if `input` does not have the expected image shape.
    pub fn forward_t(&self, input: &Tensor, train: bool) -> Tensor {
        let dims = input.size();
        assert!(
            dims.len() == 4
                && dims[1] == 3
                && dims[2] == self.config.image_size
                && dims[3] == self.config.image_size,
            "discriminator expects input of shape (N, 3, {}, {}), got {:?}",
            self.config.image_size,
            self.config.image_size,
            dims
        );
        let batch_size = dims[0];

        let x = self.conv1.forward(input).leaky_relu();
        let x = self.conv2.forward(&x).leaky_relu();
        let x = self.conv3.forward(&x).leaky_relu();
        let x = self.conv4.forward(&x).leaky_relu();

        let x = x.view([batch_size, -1]);
        let x = x.dropout(self.config.dropout, train);

        self.fc.forward(&x)
    }

    /// Classify images (inference mode)
    ///
    /// Returns the probability of each image being real (after sigmoid).
    pub fn classify(&self, input: &Tensor) -> Tensor {
        self.forward_t(input, false).sigmoid()
    }

    /// Get configuration
    pub fn config(&self) -> &DiscriminatorConfig {
        &self.config
    }
}

impl ModuleT for Discriminator {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        Discriminator::forward_t(self, xs, train)
    }
}
