//! Rendering and post-processing
//!
//! - `sample`: generator output -> 8-bit PNG, dataset preview grids
//! - `plot`: loss-curve charts rendered into an image
//! - `animation`: assembling saved frames into an animated GIF

pub mod animation;
pub mod plot;
pub mod sample;

pub use animation::{assemble_gif, collect_frames};
pub use plot::{render_loss_curves, save_loss_plot};
pub use sample::{frame_filename, frame_index, preview_grid, save_sample, tensor_to_image};
