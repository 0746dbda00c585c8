// src/preprocessing.rs

use crate::types::TensorLayout;
use anyhow::{ensure, Result};

/// Placement of the source image inside the square model input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub src_width: usize,
    pub src_height: usize,
}

impl Letterbox {
    pub fn new(src_width: usize, src_height: usize, dst_width: usize, dst_height: usize) -> Self {
        let scale =
            (dst_width as f32 / src_width as f32).min(dst_height as f32 / src_height as f32);
        let pad_x = (dst_width as f32 - src_width as f32 * scale) / 2.0;
        let pad_y = (dst_height as f32 - src_height as f32 * scale) / 2.0;
        Self {
            scale,
            pad_x,
            pad_y,
            src_width,
            src_height,
        }
    }

    /// Model input pixel → normalized source-frame coordinate.
    pub fn to_normalized(&self, x_px: f32, y_px: f32) -> (f32, f32) {
        (
            (x_px - self.pad_x) / (self.scale * self.src_width as f32),
            (y_px - self.pad_y) / (self.scale * self.src_height as f32),
        )
    }
}

/// Letterbox an RGB image into the model input and scale pixels to [0, 1].
pub fn preprocess(
    src: &[u8],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
    layout: TensorLayout,
) -> Result<(Vec<f32>, Letterbox)> {
    ensure!(
        src_width > 0 && src_height > 0 && src.len() == src_width * src_height * 3,
        "Frame buffer of {} bytes does not match {}x{} RGB",
        src.len(),
        src_width,
        src_height
    );

    let letterbox = Letterbox::new(src_width, src_height, dst_width, dst_height);
    let inner_w = ((src_width as f32 * letterbox.scale).round() as usize).clamp(1, dst_width);
    let inner_h = ((src_height as f32 * letterbox.scale).round() as usize).clamp(1, dst_height);
    let resized = resize_bilinear(src, src_width, src_height, inner_w, inner_h);

    let offset_x = (dst_width - inner_w) / 2;
    let offset_y = (dst_height - inner_h) / 2;

    let mut output = vec![0.0f32; 3 * dst_height * dst_width];
    for y in 0..inner_h {
        for x in 0..inner_w {
            let (dy, dx) = (y + offset_y, x + offset_x);
            for c in 0..3 {
                let pixel = resized[(y * inner_w + x) * 3 + c] as f32 / 255.0;
                let idx = match layout {
                    TensorLayout::Nhwc => (dy * dst_width + dx) * 3 + c,
                    TensorLayout::Nchw => c * dst_height * dst_width + dy * dst_width + dx,
                };
                output[idx] = pixel;
            }
        }
    }

    Ok((output, letterbox))
}

/// Bilinear image resize
fn resize_bilinear(src: &[u8], src_w: usize, src_h: usize, dst_w: usize, dst_h: usize) -> Vec<u8> {
    let mut dst = vec![0u8; dst_h * dst_w * 3];

    let x_ratio = src_w as f32 / dst_w as f32;
    let y_ratio = src_h as f32 / dst_h as f32;

    for dy in 0..dst_h {
        for dx in 0..dst_w {
            let sx = dx as f32 * x_ratio;
            let sy = dy as f32 * y_ratio;

            let sx0 = (sx.floor() as usize).min(src_w - 1);
            let sy0 = (sy.floor() as usize).min(src_h - 1);
            let sx1 = (sx0 + 1).min(src_w - 1);
            let sy1 = (sy0 + 1).min(src_h - 1);

            let fx = sx - sx0 as f32;
            let fy = sy - sy0 as f32;

            for c in 0..3 {
                let p00 = src[(sy0 * src_w + sx0) * 3 + c] as f32;
                let p10 = src[(sy0 * src_w + sx1) * 3 + c] as f32;
                let p01 = src[(sy1 * src_w + sx0) * 3 + c] as f32;
                let p11 = src[(sy1 * src_w + sx1) * 3 + c] as f32;

                let val = p00 * (1.0 - fx) * (1.0 - fy)
                    + p10 * fx * (1.0 - fy)
                    + p01 * (1.0 - fx) * fy
                    + p11 * fx * fy;

                dst[(dy * dst_w + dx) * 3 + c] = val.round() as u8;
            }
        }
    }

    dst
}
