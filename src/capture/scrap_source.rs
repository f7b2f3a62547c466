// Scrap-backed capture source.
//
// Wraps scrap's Capturer for the primary display. scrap reports frames as
// BGRA and signals "no frame ready yet" with WouldBlock, which we absorb
// with a short nap up to a bounded deadline, the same pacing the capture
// loop in this family of tools has always used.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pilot_prep::plan::Size;
use scrap::{Capturer, Display};

use crate::capture::{Frame, FrameSource};
use crate::error::{PilotError, PilotResult};

/// How long a single capture may keep returning WouldBlock before we call
/// the tick lost. Compositors occasionally stall for a frame or two; well
/// under the loop interval so a stall never runs ticks together.
const FRAME_DEADLINE: Duration = Duration::from_millis(150);
const WOULD_BLOCK_NAP: Duration = Duration::from_millis(2);

/// Primary-display capture via the scrap library.
pub struct ScrapSource {
    capturer: Capturer,
    width: u32,
    height: u32,
}

impl ScrapSource {
    /// Create a source for the primary display.
    ///
    /// Fails under Wayland, where direct framebuffer access is blocked by
    /// the compositor's security model.
    pub fn new() -> PilotResult<Self> {
        #[cfg(target_os = "linux")]
        if crate::capture::is_wayland_session() {
            return Err(PilotError::capture_init(
                "scrap",
                "Wayland session detected; direct screen capture requires X11",
            )
            .with_recovery_suggestion("log into an X11 session or run the random pilot"));
        }

        let display = Display::primary().map_err(|e| {
            PilotError::capture_init("scrap", format!("no primary display: {}", e))
        })?;
        let width = display.width() as u32;
        let height = display.height() as u32;
        let capturer = Capturer::new(display).map_err(|e| {
            PilotError::capture_init("scrap", format!("cannot create capturer: {}", e))
        })?;

        Ok(Self {
            capturer,
            width,
            height,
        })
    }
}

#[async_trait]
impl FrameSource for ScrapSource {
    fn input_size(&self) -> Size {
        Size {
            w: self.width,
            h: self.height,
        }
    }

    async fn capture_frame(&mut self) -> PilotResult<Frame> {
        let deadline = Instant::now() + FRAME_DEADLINE;
        loop {
            match self.capturer.frame() {
                Ok(frame) => {
                    let data = frame.to_vec();
                    let height = self.height as usize;
                    if height == 0 || data.len() % height != 0 {
                        return Err(PilotError::frame_capture(format!(
                            "frame length {} does not divide into {} rows",
                            data.len(),
                            height
                        )));
                    }
                    let stride = data.len() / height;
                    if stride < self.width as usize * 4 {
                        return Err(PilotError::frame_capture(format!(
                            "row stride {} shorter than {} pixels of BGRA",
                            stride, self.width
                        )));
                    }
                    return Ok(Frame {
                        data: Arc::new(data),
                        width: self.width,
                        height: self.height,
                        stride,
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if Instant::now() >= deadline {
                        return Err(PilotError::timeout(
                            "capture_frame",
                            FRAME_DEADLINE.as_millis() as u64,
                        ));
                    }
                    tokio::time::sleep(WOULD_BLOCK_NAP).await;
                }
                Err(e) => {
                    return Err(PilotError::frame_capture(format!("scrap frame error: {}", e)))
                }
            }
        }
    }
}
