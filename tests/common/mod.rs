//! Common test utilities for the pilot library tests.
//!
//! Mock frame sources, scripted policies, and a recording actuator so the
//! session loop can be exercised without a display, a model, or a focused
//! game window.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use game_pilot::action::Action;
use game_pilot::capture::{Frame, FrameSource};
use game_pilot::error::{PilotError, PilotResult};
use game_pilot::input::KeyActuator;
use game_pilot::policy::Policy;
use pilot_prep::plan::Size;

/// Build a solid-color BGRA frame with tight rows.
pub fn solid_frame(size: Size, bgra: [u8; 4]) -> Frame {
    let mut data = vec![0u8; (size.w * size.h * 4) as usize];
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&bgra);
    }
    Frame {
        data: Arc::new(data),
        width: size.w,
        height: size.h,
        stride: size.w as usize * 4,
    }
}

/// Build a solid-color BGRA frame whose rows carry `pad` extra bytes, the
/// strided shape some capture backends deliver.
pub fn strided_frame(size: Size, bgra: [u8; 4], pad: usize) -> Frame {
    let stride = size.w as usize * 4 + pad;
    let mut data = vec![0u8; stride * size.h as usize];
    for row in data.chunks_exact_mut(stride) {
        for px in row[..size.w as usize * 4].chunks_exact_mut(4) {
            px.copy_from_slice(&bgra);
        }
    }
    Frame {
        data: Arc::new(data),
        width: size.w,
        height: size.h,
        stride,
    }
}

/// How the mock source should misbehave.
#[derive(Clone, Copy, Default)]
pub struct MockFailures {
    /// Return a transient timeout on every Nth capture.
    pub transient_every: Option<u64>,
    /// Return a fatal error on the Nth capture.
    pub fatal_at: Option<u64>,
}

/// Frame source that fabricates frames instead of touching a display.
///
/// Each frame's first byte is the capture counter, so policies can assert
/// that a specific frame reached them.
pub struct MockFrameSource {
    size: Size,
    counter: u64,
    failures: MockFailures,
}

impl MockFrameSource {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            counter: 0,
            failures: MockFailures::default(),
        }
    }

    pub fn with_failures(size: Size, failures: MockFailures) -> Self {
        Self {
            size,
            counter: 0,
            failures,
        }
    }
}

#[async_trait]
impl FrameSource for MockFrameSource {
    fn input_size(&self) -> Size {
        self.size
    }

    async fn capture_frame(&mut self) -> PilotResult<Frame> {
        self.counter += 1;
        if let Some(n) = self.failures.fatal_at {
            if self.counter == n {
                return Err(PilotError::capture_init("mock", "display went away"));
            }
        }
        if let Some(n) = self.failures.transient_every {
            if self.counter % n == 0 {
                return Err(PilotError::timeout("capture_frame", 1));
            }
        }
        let mut frame = solid_frame(self.size, [0, 0, 0, 255]);
        Arc::get_mut(&mut frame.data).unwrap()[0] = (self.counter % 256) as u8;
        Ok(frame)
    }
}

/// Policy that replays a fixed decision script, wrapping at the end.
pub struct ScriptedPolicy {
    script: Vec<Option<Action>>,
    cursor: usize,
}

impl ScriptedPolicy {
    pub fn new(script: Vec<Option<Action>>) -> Self {
        Self { script, cursor: 0 }
    }
}

impl Policy for ScriptedPolicy {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn decide(&mut self, _frame: Option<&Frame>) -> PilotResult<Option<Action>> {
        let decision = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        Ok(decision)
    }
}

/// Policy that requires a frame and derives its action from the frame's
/// first byte, proving the capture-to-decision data flow.
pub struct FirstBytePolicy;

impl Policy for FirstBytePolicy {
    fn name(&self) -> &'static str {
        "first-byte"
    }

    fn wants_frames(&self) -> bool {
        true
    }

    fn decide(&mut self, frame: Option<&Frame>) -> PilotResult<Option<Action>> {
        let frame = frame.ok_or_else(|| {
            PilotError::state("running", "decide", "expected a frame and got none")
        })?;
        Ok(Action::from_index(frame.data[0] as usize % 4))
    }
}

/// Actuator that records every press into a shared vector.
pub struct RecordingActuator {
    log: Arc<Mutex<Vec<Action>>>,
}

impl RecordingActuator {
    /// Returns the actuator and a handle to its press log.
    pub fn new() -> (Self, Arc<Mutex<Vec<Action>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (Self { log: log.clone() }, log)
    }
}

impl KeyActuator for RecordingActuator {
    fn press(&mut self, action: Action) -> PilotResult<()> {
        self.log.lock().unwrap().push(action);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
