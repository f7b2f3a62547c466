//! # Policies
//!
//! A policy turns the current tick into a decision. Two implementations
//! exist, one per pilot variant:
//!
//! - [`RandomPolicy`]: uniform choice over the four actions, no perception
//! - [`ModelPolicy`]: screen frame in, forward pass, arg-max out
//!   (feature `inference`)
//!
//! `decide` returns `Ok(None)` for "press nothing this tick", which is what
//! an arg-max index outside the action set resolves to.

use pilot_prep::plan::Size;

use crate::action::Action;
use crate::capture::Frame;
use crate::error::PilotResult;

#[cfg(feature = "inference")]
pub mod infer;
#[cfg(feature = "inference")]
mod model;
mod random;

#[cfg(feature = "inference")]
pub use model::ModelPolicy;
pub use random::RandomPolicy;

/// Abstract decision seam between the session loop and the two variants.
pub trait Policy: Send {
    /// Policy name for logs and status lines.
    fn name(&self) -> &'static str;

    /// Whether the session must capture a frame before each decision.
    fn wants_frames(&self) -> bool {
        false
    }

    /// Called once before the loop starts, with the native size of the
    /// attached frame source (if any). Lets perception-based policies size
    /// their buffers up front instead of on the hot path.
    fn initialize(&mut self, _input_size: Size) -> PilotResult<()> {
        Ok(())
    }

    /// Decide the action for this tick. `frame` is `Some` exactly when
    /// `wants_frames` returned true and capture succeeded.
    fn decide(&mut self, frame: Option<&Frame>) -> PilotResult<Option<Action>>;
}
