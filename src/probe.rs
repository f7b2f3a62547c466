//! # Capture Probe
//!
//! One-shot diagnostic: grab a frame, push it through the exact
//! preprocessing path the model policy uses, and save the result as a PNG.
//! Handy for checking what the network actually sees before letting it
//! drive.

use anyhow::{Context, Result};
use fast_image_resize::Resizer;
use pilot_prep::cpu::{scale_bgra, Staging};
use pilot_prep::plan::{build_plan, AspectMode, ScaleTarget};
use pilot_prep::tensor::InputSpec;

use crate::capture::Frame;

/// Render the model's view of a frame: scaled to the input geometry with
/// the same distortion the tensor path applies, converted to RGB.
pub fn model_view_image(frame: &Frame, spec: InputSpec) -> Result<image::RgbImage> {
    let plan = build_plan(frame.size(), ScaleTarget::Exact(spec.size), AspectMode::Distort);
    let mut scaled = vec![0u8; (plan.out.w * plan.out.h * 4) as usize];
    let mut resizer = Resizer::new();
    let mut staging = Staging::with_capacity(frame.expected_len());
    scale_bgra(
        &mut resizer,
        &frame.data,
        frame.size(),
        Some(frame.stride),
        &plan,
        &mut scaled,
        Some(&mut staging),
    )?;

    // BGRA to RGB for the encoder; same channel order the tensor path
    // feeds the model.
    let mut rgb = Vec::with_capacity((plan.out.w * plan.out.h * 3) as usize);
    for px in scaled.chunks_exact(4) {
        rgb.extend_from_slice(&[px[2], px[1], px[0]]);
    }

    image::RgbImage::from_raw(plan.out.w, plan.out.h, rgb)
        .context("probe buffer does not match output dimensions")
}

/// Capture a single frame from the primary display and write the model's
/// view of it as a PNG.
#[cfg(feature = "screen-capture")]
pub async fn save_model_view(output: &std::path::Path, spec: InputSpec) -> Result<()> {
    use crate::capture::{FrameSource, ScrapSource};

    let mut source = ScrapSource::new()?;
    source.initialize().await?;
    let frame = source.capture_frame().await?;
    source.shutdown().await?;

    let img = model_view_image(&frame, spec)?;
    img.save(output)
        .with_context(|| format!("writing probe image to {}", output.display()))?;

    tracing::info!(
        path = %output.display(),
        w = img.width(),
        h = img.height(),
        "probe frame saved"
    );
    Ok(())
}
