// SPDX-License-Identifier: MIT
// CPU scaler built on fast_image_resize (SIMD-accelerated).
// BGRA8 in, BGRA8 out, written directly into a caller-provided buffer.

use fast_image_resize as fir;
use fir::images::{TypedCroppedImageMut, TypedImage, TypedImageRef};
use fir::pixels::U8x4;
use fir::{ResizeOptions, Resizer};

use crate::plan::{AspectMode, ScalePlan, Size};

/// Errors from the preprocessing execute phase.
#[derive(Debug)]
pub enum PrepError {
    /// Destination buffer smaller than the plan's output requires.
    BufferTooSmall,
    /// Source slice shorter than `stride * height`.
    FrameTooShort { expected: usize, got: usize },
    /// Source rows are strided but no staging scratch was supplied.
    StrideMismatchAndNoStaging,
    Fir(fir::ResizeError),
    ImageBuf(fir::ImageBufferError),
    Crop(fir::CropBoxError),
}

impl From<fir::ResizeError> for PrepError {
    fn from(e: fir::ResizeError) -> Self {
        Self::Fir(e)
    }
}
impl From<fir::ImageBufferError> for PrepError {
    fn from(e: fir::ImageBufferError) -> Self {
        Self::ImageBuf(e)
    }
}
impl From<fir::CropBoxError> for PrepError {
    fn from(e: fir::CropBoxError) -> Self {
        Self::Crop(e)
    }
}

impl std::fmt::Display for PrepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrepError::BufferTooSmall => write!(f, "Output buffer too small"),
            PrepError::FrameTooShort { expected, got } => {
                write!(f, "Frame data too short: expected {expected} bytes, got {got}")
            }
            PrepError::StrideMismatchAndNoStaging => {
                write!(f, "Stride mismatch but no staging buffer provided")
            }
            PrepError::Fir(e) => write!(f, "Fast image resize error: {e}"),
            PrepError::ImageBuf(e) => write!(f, "Image buffer error: {e}"),
            PrepError::Crop(e) => write!(f, "Crop error: {e}"),
        }
    }
}

impl std::error::Error for PrepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PrepError::Fir(e) => Some(e),
            PrepError::ImageBuf(e) => Some(e),
            PrepError::Crop(e) => Some(e),
            _ => None,
        }
    }
}

/// Pre-allocated scratch used to compact strided capture rows into tightly
/// packed ones. Screen capturers pad rows on some platforms (macOS in
/// particular), and `fast_image_resize` wants tight buffers.
pub struct Staging {
    buf: Vec<u8>,
}

impl Staging {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
        }
    }

    fn ensure_len(&mut self, len: usize) {
        if self.buf.len() < len {
            self.buf.resize(len, 0);
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}

/// Execute a [`ScalePlan`] over one BGRA frame.
///
/// `src_stride_bytes` is the byte length of one source row; when it differs
/// from `width * 4` the rows are compacted through `staging` first. `dst`
/// must hold at least `plan.out.w * plan.out.h * 4` bytes and is written as
/// tightly packed BGRA.
pub fn scale_bgra(
    resizer: &mut Resizer,
    src_bgra: &[u8],
    src: Size,
    src_stride_bytes: Option<usize>,
    plan: &ScalePlan,
    dst: &mut [u8],
    mut staging: Option<&mut Staging>,
) -> Result<(), PrepError> {
    let dst_len = (plan.out.w as usize) * (plan.out.h as usize) * 4;
    if dst.len() < dst_len {
        return Err(PrepError::BufferTooSmall);
    }

    let tight_row = (src.w as usize) * 4;
    let pitch = src_stride_bytes.unwrap_or(tight_row);
    let needed = pitch * (src.h as usize);
    if src_bgra.len() < needed {
        return Err(PrepError::FrameTooShort {
            expected: needed,
            got: src_bgra.len(),
        });
    }

    // Source view, compacting strided rows only when we have to.
    let src_view: TypedImageRef<U8x4> = if pitch == tight_row {
        TypedImageRef::<U8x4>::from_buffer(src.w, src.h, &src_bgra[..needed])?
    } else {
        let st = staging
            .as_deref_mut()
            .ok_or(PrepError::StrideMismatchAndNoStaging)?;
        st.ensure_len(tight_row * (src.h as usize));
        compact_rows(src_bgra, pitch, st.buf.as_mut_slice(), tight_row, src.h as usize);
        TypedImageRef::<U8x4>::from_buffer(src.w, src.h, st.as_slice())?
    };

    // Letterbox fill must happen before the typed destination view exists.
    if let AspectMode::Pad { bg_bgra } = plan.aspect {
        fill_bgra(&mut dst[..dst_len], bg_bgra);
    }
    let mut dst_image = TypedImage::<U8x4>::from_buffer(plan.out.w, plan.out.h, dst)?;

    let opts = ResizeOptions::new().use_alpha(false);

    match plan.dst_roi {
        Some((x, y, w, h)) => {
            let mut roi = TypedCroppedImageMut::from_ref(&mut dst_image, x, y, w, h)?;
            resizer.resize_typed::<U8x4>(&src_view, &mut roi, &opts)?;
        }
        None => {
            resizer.resize_typed::<U8x4>(&src_view, &mut dst_image, &opts)?;
        }
    }

    Ok(())
}

#[inline]
fn fill_bgra(dst: &mut [u8], bg: [u8; 4]) {
    for px in dst.chunks_exact_mut(4) {
        px.copy_from_slice(&bg);
    }
}

#[inline]
fn compact_rows(src: &[u8], src_pitch: usize, dst: &mut [u8], row_bytes: usize, rows: usize) {
    for r in 0..rows {
        let s = &src[r * src_pitch..r * src_pitch + row_bytes];
        let d = &mut dst[r * row_bytes..(r + 1) * row_bytes];
        d.copy_from_slice(s);
    }
}
