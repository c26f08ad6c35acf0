//! DCGAN architecture
//!
//! - `generator`: latent vector -> 128x128x3 image
//! - `discriminator`: image -> real/fake logit
//! - `gan`: wrapper owning both networks and their variable stores

pub mod discriminator;
pub mod gan;
pub mod generator;

pub use discriminator::{Discriminator, DiscriminatorConfig};
pub use gan::FaceGan;
pub use generator::{Generator, GeneratorConfig};
