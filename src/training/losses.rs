//! Loss functions for GAN training
//!
//! Binary cross entropy against logits, with the label convention of
//! the reference training procedure: synthetic images are labeled 1
//! and real images 0. The adversarial step consequently trains the
//! generator toward an all-zero ("real") target.

use tch::{Device, Tensor};

/// Build labels for a combined synthetic+real discriminator batch.
///
/// The first `num_fake` entries are 1 (synthetic), the following
/// `num_real` entries are 0 (real). Small uniform noise in
/// [0, `noise`) is added to every label as a smoothing regularizer.
pub fn smoothed_labels(num_fake: i64, num_real: i64, noise: f64, device: Device) -> Tensor {
    let ones = Tensor::ones([num_fake, 1], (tch::Kind::Float, device));
    let zeros = Tensor::zeros([num_real, 1], (tch::Kind::Float, device));
    let labels = Tensor::cat(&[ones, zeros], 0);

    let jitter = Tensor::rand([num_fake + num_real, 1], (tch::Kind::Float, device)) * noise;
    labels + jitter
}

/// Discriminator loss: BCE of the combined-batch logits against the
/// (noisy) labels.
///
/// # Arguments
///
/// * `logits` - Discriminator output on the combined batch, shape (N, 1)
/// * `labels` - Target labels, shape (N, 1)
///
/// # Returns
///
/// Scalar loss tensor
pub fn discriminator_loss(logits: &Tensor, labels: &Tensor) -> Tensor {
    logits.binary_cross_entropy_with_logits::<Tensor>(
        labels,
        None,
        None,
        tch::Reduction::Mean,
    )
}

/// Adversarial (generator) loss: BCE of the discriminator's logits on
/// generated images against an all-zero target, i.e. the generator is
/// rewarded when synthetic images are judged "real".
///
/// # Arguments
///
/// * `fake_logits` - Discriminator output on generated images, shape (N, 1)
///
/// # Returns
///
/// Scalar loss tensor
pub fn adversarial_loss(fake_logits: &Tensor) -> Tensor {
    let targets = Tensor::zeros_like(fake_logits);
    fake_logits.binary_cross_entropy_with_logits::<Tensor>(
        &targets,
        None,
        None,
        tch::Reduction::Mean,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothed_labels_layout() {
        let labels = smoothed_labels(3, 2, 0.05, Device::Cpu);
        assert_eq!(labels.size(), vec![5, 1]);

        let values: Vec<f64> = labels.flatten(0, -1).try_into().unwrap();
        for &v in &values[..3] {
            assert!((1.0..1.05).contains(&v), "fake label {v} out of range");
        }
        for &v in &values[3..] {
            assert!((0.0..0.05).contains(&v), "real label {v} out of range");
        }
    }

    #[test]
    fn test_smoothed_labels_no_noise() {
        let labels = smoothed_labels(2, 2, 0.0, Device::Cpu);
        let values: Vec<f64> = labels.flatten(0, -1).try_into().unwrap();
        assert_eq!(values, vec![1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_discriminator_loss_scalar() {
        let logits = Tensor::randn([4, 1], (tch::Kind::Float, Device::Cpu));
        let labels = smoothed_labels(2, 2, 0.05, Device::Cpu);
        let loss = discriminator_loss(&logits, &labels);

        assert_eq!(loss.size(), Vec::<i64>::new());
        assert!(loss.double_value(&[]) > 0.0);
    }

    #[test]
    fn test_adversarial_loss_scalar() {
        let fake_logits = Tensor::randn([4, 1], (tch::Kind::Float, Device::Cpu));
        let loss = adversarial_loss(&fake_logits);

        assert_eq!(loss.size(), Vec::<i64>::new());
        assert!(loss.double_value(&[]) > 0.0);
    }

    #[test]
    fn test_adversarial_loss_rewards_fooling() {
        // Strongly negative logits mean the discriminator is fooled
        // (judges fakes as "real" under the 0=real convention).
        let fooled = Tensor::full([4, 1], -10.0, (tch::Kind::Float, Device::Cpu));
        let caught = Tensor::full([4, 1], 10.0, (tch::Kind::Float, Device::Cpu));

        let fooled_loss = adversarial_loss(&fooled).double_value(&[]);
        let caught_loss = adversarial_loss(&caught).double_value(&[]);
        assert!(fooled_loss < caught_loss);
    }
}
