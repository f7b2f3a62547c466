// SPDX-License-Identifier: MIT
//! # Scaling Plans and Model-Input Presets
//!
//! Computes the output geometry for a frame before any pixels move. A
//! [`ScalePlan`] is built once per source size and then executed for every
//! frame by [`crate::cpu::scale_bgra`].
//!
//! ## Design
//!
//! Three concepts drive the computation:
//! 1. **ScaleTarget**: the size constraint (clamp the longest side, or force
//!    exact dimensions as action models require)
//! 2. **AspectMode**: what to do when the source aspect ratio disagrees with
//!    the target (preserve, distort, or pad)
//! 3. **ScalePlan**: the resolved output size plus an optional destination
//!    ROI when padding is in play
//!
//! Downscaling never upscales in `Preserve` mode, and computed dimensions are
//! clamped to at least 1 px.

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    /// Square helper; model inputs are almost always square.
    pub fn square(side: u32) -> Self {
        Self { w: side, h: side }
    }
}

/// Defines how aspect ratio differences are handled during scaling.
#[derive(Clone, Copy, Debug)]
pub enum AspectMode {
    /// Keep the source aspect ratio; output fits entirely within the target.
    Preserve,
    /// Stretch or squeeze to exactly the target dimensions. This is what the
    /// model path uses: fixed-size inputs, aspect be damned.
    Distort,
    /// Letterbox to exact target dimensions, filling the margins with the
    /// given BGRA color.
    Pad { bg_bgra: [u8; 4] },
}

/// Defines the target size constraint for scaling operations.
#[derive(Clone, Copy, Debug)]
pub enum ScaleTarget {
    /// Clamp the longest side to a maximum value, derive the other side
    /// proportionally. Useful for preview and probe output.
    MaxLongSide(u32),
    /// Force output to exact dimensions. The mode for model input.
    Exact(Size),
}

/// Complete scaling plan computed from input parameters.
/// Contains everything needed to perform the actual scaling operation.
#[derive(Clone, Copy, Debug)]
pub struct ScalePlan {
    /// Original input dimensions
    pub input: Size,
    /// Target size constraint used for planning
    pub target: ScaleTarget,
    /// Aspect ratio handling strategy
    pub aspect: AspectMode,
    /// Final computed output dimensions
    pub out: Size,
    /// If padding is used, the sub-rectangle where scaled content lands.
    /// Format: (x, y, width, height) in output coordinate space.
    pub dst_roi: Option<(u32, u32, u32, u32)>,
}

/// Compute a complete scaling plan from input parameters.
///
/// Resolves output dimensions and ROI placement for every combination of
/// target and aspect mode. O(1), a handful of float operations.
pub fn build_plan(input: Size, target: ScaleTarget, aspect: AspectMode) -> ScalePlan {
    let (out, dst_roi) = match (target, aspect) {
        (ScaleTarget::MaxLongSide(max_side), AspectMode::Preserve) => {
            let (w, h) = fit_preserve(input, max_side);
            (Size { w, h }, None)
        }
        (ScaleTarget::MaxLongSide(max_side), AspectMode::Distort) => {
            (Size::square(max_side), None)
        }
        (ScaleTarget::MaxLongSide(max_side), AspectMode::Pad { .. }) => {
            let out = Size::square(max_side);
            let (rw, rh) = fit_preserve(input, max_side);
            let roi = ((out.w - rw) / 2, (out.h - rh) / 2, rw, rh);
            (out, Some(roi))
        }
        (ScaleTarget::Exact(out), AspectMode::Distort) => (out, None),
        (ScaleTarget::Exact(out), AspectMode::Preserve) => {
            let (rw, rh) = fit_within(input, out);
            (Size { w: rw, h: rh }, None)
        }
        (ScaleTarget::Exact(out), AspectMode::Pad { .. }) => {
            let (rw, rh) = fit_within(input, out);
            let roi = ((out.w - rw) / 2, (out.h - rh) / 2, rw, rh);
            (out, Some(roi))
        }
    };
    ScalePlan {
        input,
        target,
        aspect,
        out,
        dst_roi,
    }
}

/// Fit within a max longest-side constraint, preserving aspect ratio.
/// Never upscales; returns the original dimensions when already small enough.
fn fit_preserve(input: Size, max_long: u32) -> (u32, u32) {
    let (w, h) = (input.w as f64, input.h as f64);
    let long = w.max(h);
    let s = (max_long as f64 / long).min(1.0);
    (
        ((w * s).round() as u32).max(1),
        ((h * s).round() as u32).max(1),
    )
}

/// Fit entirely within a bounding box, preserving aspect ratio.
fn fit_within(input: Size, box_: Size) -> (u32, u32) {
    let (w, h) = (input.w as f64, input.h as f64);
    let (bw, bh) = (box_.w as f64, box_.h as f64);
    let s = (bw / w).min(bh / h).min(1.0);
    (
        ((w * s).round() as u32).max(1),
        ((h * s).round() as u32).max(1),
    )
}

/// Square model-input presets.
///
/// Pre-trained vision-policy models take a fixed square input; these cover
/// the common sizes. `s128` matches the network this project ships around
/// and is the default everywhere.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum InputPreset {
    /// 64x64, tiny models
    #[clap(name = "s64")]
    S64_Square,
    /// 128x128, the default
    #[clap(name = "s128")]
    S128_Square,
    /// 224x224, ImageNet-lineage backbones
    #[clap(name = "s224")]
    S224_Square,
    /// 299x299, Inception-lineage backbones
    #[clap(name = "s299")]
    S299_Square,
}

impl Default for InputPreset {
    fn default() -> Self {
        InputPreset::S128_Square
    }
}

impl InputPreset {
    /// Side length of the square input.
    pub fn side(self) -> u32 {
        match self {
            InputPreset::S64_Square => 64,
            InputPreset::S128_Square => 128,
            InputPreset::S224_Square => 224,
            InputPreset::S299_Square => 299,
        }
    }

    /// Convert to the corresponding ScaleTarget for plan computation.
    pub fn to_target(self) -> ScaleTarget {
        ScaleTarget::Exact(Size::square(self.side()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserve_clamps_longest_side() {
        let plan = build_plan(
            Size { w: 1920, h: 1080 },
            ScaleTarget::MaxLongSide(640),
            AspectMode::Preserve,
        );
        assert_eq!(plan.out, Size { w: 640, h: 360 });
        assert!(plan.dst_roi.is_none());
    }

    #[test]
    fn preserve_never_upscales() {
        let plan = build_plan(
            Size { w: 320, h: 200 },
            ScaleTarget::MaxLongSide(640),
            AspectMode::Preserve,
        );
        assert_eq!(plan.out, Size { w: 320, h: 200 });
    }

    #[test]
    fn exact_distort_forces_dimensions() {
        let plan = build_plan(
            Size { w: 1920, h: 1080 },
            InputPreset::S128_Square.to_target(),
            AspectMode::Distort,
        );
        assert_eq!(plan.out, Size::square(128));
        assert!(plan.dst_roi.is_none());
    }

    #[test]
    fn exact_pad_centers_roi() {
        let plan = build_plan(
            Size { w: 1920, h: 1080 },
            ScaleTarget::Exact(Size::square(128)),
            AspectMode::Pad {
                bg_bgra: [0, 0, 0, 255],
            },
        );
        assert_eq!(plan.out, Size::square(128));
        let (x, y, w, h) = plan.dst_roi.expect("pad plans carry a roi");
        assert_eq!((w, h), (128, 72));
        assert_eq!(x, 0);
        assert_eq!(y, (128 - 72) / 2);
    }

    #[test]
    fn degenerate_input_clamps_to_one_pixel() {
        let plan = build_plan(
            Size { w: 10000, h: 1 },
            ScaleTarget::MaxLongSide(100),
            AspectMode::Preserve,
        );
        assert_eq!(plan.out.h, 1);
        assert_eq!(plan.out.w, 100);
    }

    #[test]
    fn preset_sides() {
        assert_eq!(InputPreset::S128_Square.side(), 128);
        assert_eq!(InputPreset::default(), InputPreset::S128_Square);
        match InputPreset::S224_Square.to_target() {
            ScaleTarget::Exact(s) => assert_eq!(s, Size::square(224)),
            other => panic!("unexpected target {:?}", other),
        }
    }
}
