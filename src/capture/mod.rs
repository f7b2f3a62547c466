//! # Screen Capture
//!
//! Frame acquisition for the model-driven pilot. The random pilot never
//! captures; the model pilot grabs one frame per tick and hands it to the
//! preprocessing path.
//!
//! ## Architecture
//!
//! - [`Frame`]: an owned BGRA bitmap with explicit stride
//! - [`FrameSource`]: pluggable async acquisition seam
//! - [`ScrapSource`]: the scrap-backed primary-display source
//!   (feature `screen-capture`)
//!
//! Sources hand out `Arc`-backed buffers so a frame can be logged, probed,
//! or preprocessed without further copies.

use std::sync::Arc;

use async_trait::async_trait;
use pilot_prep::plan::Size;

use crate::error::PilotResult;

#[cfg(feature = "screen-capture")]
mod scrap_source;
#[cfg(feature = "screen-capture")]
pub use scrap_source::ScrapSource;

/// One captured BGRA frame.
///
/// `stride` is the byte length of a row as the platform delivered it; some
/// platforms pad rows past `width * 4`, which the preprocessing staging path
/// compacts.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    pub stride: usize,
}

impl Frame {
    pub fn size(&self) -> Size {
        Size {
            w: self.width,
            h: self.height,
        }
    }

    /// Bytes the buffer must hold for `stride * height` rows.
    pub fn expected_len(&self) -> usize {
        self.stride * self.height as usize
    }
}

/// Abstract interface for frame sources.
/// Enables pluggable capture backends for different platforms and tests.
#[async_trait]
pub trait FrameSource: Send {
    /// Capture the next frame from the source.
    async fn capture_frame(&mut self) -> PilotResult<Frame>;
    /// Get the native resolution of the capture source.
    fn input_size(&self) -> Size;
    /// Initialize the capture source.
    async fn initialize(&mut self) -> PilotResult<()> {
        Ok(())
    }
    /// Shut down the capture source.
    async fn shutdown(&mut self) -> PilotResult<()> {
        Ok(())
    }
}

/// Returns true if XDG_SESSION_TYPE indicates 'wayland'.
///
/// Wayland's security model blocks direct framebuffer access, so the scrap
/// backend cannot work there; callers use this to fail with a clear message
/// instead of handing garbage frames to the model.
#[cfg(target_os = "linux")]
pub fn is_wayland_session() -> bool {
    std::env::var("XDG_SESSION_TYPE")
        .map(|v| v.eq_ignore_ascii_case("wayland"))
        .unwrap_or(false)
}
