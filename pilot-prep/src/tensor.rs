// SPDX-License-Identifier: MIT
//! # Tensor Normalization and Layout
//!
//! The last preprocessing step: rewrite a tightly packed BGRA buffer as RGB
//! floats in `[0, 1]`, in whichever axis layout the model was exported with.
//! Alpha is dropped; channels are divided by 255.

use crate::cpu::PrepError;
use crate::plan::Size;

/// Axis ordering of the flattened input tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Layout {
    /// Batch, height, width, channels. TensorFlow-lineage exports.
    #[clap(name = "nhwc")]
    Nhwc,
    /// Batch, channels, height, width. PyTorch-lineage exports.
    #[clap(name = "nchw")]
    Nchw,
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Nhwc
    }
}

/// Geometry and layout of the model's input tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputSpec {
    pub size: Size,
    pub layout: Layout,
}

impl InputSpec {
    pub fn new(size: Size, layout: Layout) -> Self {
        Self { size, layout }
    }

    pub fn square(side: u32, layout: Layout) -> Self {
        Self::new(Size::square(side), layout)
    }

    /// Number of `f32` elements in one input tensor (batch of 1).
    pub fn element_count(&self) -> usize {
        (self.size.w as usize) * (self.size.h as usize) * 3
    }

    /// ONNX-style shape for a batch of one.
    pub fn shape(&self) -> [i64; 4] {
        let (w, h) = (self.size.w as i64, self.size.h as i64);
        match self.layout {
            Layout::Nhwc => [1, h, w, 3],
            Layout::Nchw => [1, 3, h, w],
        }
    }
}

/// Normalize a tightly packed BGRA buffer into `dst` as RGB floats.
///
/// `src` must hold `size.w * size.h * 4` bytes (the output of
/// [`crate::cpu::scale_bgra`]); `dst` must hold `spec.element_count()`
/// floats for `spec = InputSpec { size, layout }`.
pub fn normalize_bgra(
    src: &[u8],
    size: Size,
    layout: Layout,
    dst: &mut [f32],
) -> Result<(), PrepError> {
    let (w, h) = (size.w as usize, size.h as usize);
    let needed = w * h * 4;
    if src.len() < needed {
        return Err(PrepError::FrameTooShort {
            expected: needed,
            got: src.len(),
        });
    }
    if dst.len() < w * h * 3 {
        return Err(PrepError::BufferTooSmall);
    }

    const INV: f32 = 1.0 / 255.0;
    match layout {
        Layout::Nhwc => {
            for (px, out) in src[..needed].chunks_exact(4).zip(dst.chunks_exact_mut(3)) {
                out[0] = px[2] as f32 * INV; // R
                out[1] = px[1] as f32 * INV; // G
                out[2] = px[0] as f32 * INV; // B
            }
        }
        Layout::Nchw => {
            let plane = w * h;
            for (i, px) in src[..needed].chunks_exact(4).enumerate() {
                dst[i] = px[2] as f32 * INV;
                dst[plane + i] = px[1] as f32 * INV;
                dst[2 * plane + i] = px[0] as f32 * INV;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_follow_layout() {
        let spec = InputSpec::square(128, Layout::Nhwc);
        assert_eq!(spec.shape(), [1, 128, 128, 3]);
        assert_eq!(spec.element_count(), 128 * 128 * 3);

        let spec = InputSpec::new(Size { w: 64, h: 32 }, Layout::Nchw);
        assert_eq!(spec.shape(), [1, 3, 32, 64]);
        assert_eq!(spec.element_count(), 64 * 32 * 3);
    }

    #[test]
    fn nhwc_reorders_bgra_to_rgb() {
        // One pixel: B=0, G=128, R=255, A=7 (alpha must be dropped).
        let src = [0u8, 128, 255, 7];
        let mut dst = [0f32; 3];
        normalize_bgra(&src, Size { w: 1, h: 1 }, Layout::Nhwc, &mut dst).unwrap();
        assert_eq!(dst[0], 1.0);
        assert!((dst[1] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(dst[2], 0.0);
    }

    #[test]
    fn nchw_writes_planar_channels() {
        // Two pixels with distinct channels.
        let src = [
            10u8, 20, 30, 255, // px0: B=10 G=20 R=30
            40, 50, 60, 255, // px1: B=40 G=50 R=60
        ];
        let mut dst = [0f32; 6];
        normalize_bgra(&src, Size { w: 2, h: 1 }, Layout::Nchw, &mut dst).unwrap();
        let r: Vec<u8> = dst[0..2].iter().map(|v| (v * 255.0).round() as u8).collect();
        let g: Vec<u8> = dst[2..4].iter().map(|v| (v * 255.0).round() as u8).collect();
        let b: Vec<u8> = dst[4..6].iter().map(|v| (v * 255.0).round() as u8).collect();
        assert_eq!(r, [30, 60]);
        assert_eq!(g, [20, 50]);
        assert_eq!(b, [10, 40]);
    }

    #[test]
    fn undersized_buffers_are_rejected() {
        let src = [0u8; 4];
        let mut dst = [0f32; 2];
        let err = normalize_bgra(&src, Size { w: 1, h: 1 }, Layout::Nhwc, &mut dst).unwrap_err();
        assert!(matches!(err, PrepError::BufferTooSmall));

        let src = [0u8; 3];
        let mut dst = [0f32; 3];
        let err = normalize_bgra(&src, Size { w: 1, h: 1 }, Layout::Nhwc, &mut dst).unwrap_err();
        assert!(matches!(err, PrepError::FrameTooShort { .. }));
    }
}
