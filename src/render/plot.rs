//! Loss-curve plotting
//!
//! Renders the discriminator and adversarial loss histories as two
//! stacked panels of a single chart image, one curve per panel.

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use std::path::Path;

use crate::training::TrainingMetrics;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const BORDER: Rgb<u8> = Rgb([160, 160, 160]);
const DISC_COLOR: Rgb<u8> = Rgb([200, 60, 40]);
const ADV_COLOR: Rgb<u8> = Rgb([40, 90, 200]);
const MARGIN: u32 = 20;

/// Render both loss curves into a chart image of the given size.
///
/// The top panel shows the discriminator loss, the bottom panel the
/// adversarial loss.
pub fn render_loss_curves(metrics: &TrainingMetrics, width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);

    let panel_height = height / 2;
    draw_panel(&mut img, 0, panel_height, &metrics.disc_losses, DISC_COLOR);
    draw_panel(
        &mut img,
        panel_height,
        height - panel_height,
        &metrics.adv_losses,
        ADV_COLOR,
    );

    img
}

/// Render and save the chart as a PNG.
pub fn save_loss_plot(
    metrics: &TrainingMetrics,
    path: &Path,
    width: u32,
    height: u32,
) -> Result<()> {
    let img = render_loss_curves(metrics, width, height);
    img.save(path)
        .with_context(|| format!("failed to save loss plot to {}", path.display()))?;
    Ok(())
}

fn draw_panel(img: &mut RgbImage, top: u32, height: u32, values: &[f64], color: Rgb<u8>) {
    let width = img.width();

    // Panel border
    for x in 0..width {
        img.put_pixel(x, top, BORDER);
        img.put_pixel(x, top + height - 1, BORDER);
    }
    for y in top..top + height {
        img.put_pixel(0, y, BORDER);
        img.put_pixel(width - 1, y, BORDER);
    }

    if values.is_empty() || width <= 2 * MARGIN || height <= 2 * MARGIN {
        return;
    }

    let min = values.iter().cloned().fold(f64::MAX, f64::min);
    let max = values.iter().cloned().fold(f64::MIN, f64::max);
    let range = if (max - min).abs() < f64::EPSILON {
        1.0
    } else {
        max - min
    };

    let plot_width = (width - 2 * MARGIN) as f64;
    let plot_height = (height - 2 * MARGIN) as f64;
    let to_point = |i: usize, v: f64| -> (i64, i64) {
        let x = if values.len() > 1 {
            MARGIN as f64 + i as f64 / (values.len() - 1) as f64 * plot_width
        } else {
            MARGIN as f64 + plot_width / 2.0
        };
        let y = (top + MARGIN) as f64 + (1.0 - (v - min) / range) * plot_height;
        (x as i64, y as i64)
    };

    let mut prev = to_point(0, values[0]);
    for (i, &v) in values.iter().enumerate().skip(1) {
        let next = to_point(i, v);
        draw_line(img, prev, next, color);
        prev = next;
    }
    if values.len() == 1 {
        draw_line(img, prev, prev, color);
    }
}

/// Straight line between two points, stepped along the longer axis.
fn draw_line(img: &mut RgbImage, (x0, y0): (i64, i64), (x1, y1): (i64, i64), color: Rgb<u8>) {
    let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);
    for i in 0..=steps {
        let x = x0 + (x1 - x0) * i / steps;
        let y = y0 + (y1 - y0) * i / steps;
        if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}
