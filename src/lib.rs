//! # Game Pilot Library
//!
//! A small desktop autopilot that drives a game window with synthetic WASD
//! key presses. Two brains are available: a perception-free random policy,
//! and a model policy that captures the screen, preprocesses the frame, and
//! lets a pre-trained ONNX network pick the key.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `action`: the four-action vocabulary and its WASD mapping
//! - `capture`: platform screen capture behind the `FrameSource` seam
//! - `policy`: decision logic (random and model variants)
//! - `input`: synthetic key presses behind the `KeyActuator` seam
//! - `session`: the background loop, builder, and shutdown plumbing
//! - `config`: configuration management and validation
//!
//! ## Features
//!
//! - **Prompt stop**: the loop's sleep races a shutdown channel
//! - **Dry runs**: a counting actuator stands in for real key presses
//! - **Frozen model**: one forward pass per tick, never a learning step
//! - **Feature-gated backends**: `screen-capture` (scrap), `inference`
//!   (ONNX Runtime), `input-sim` (enigo)
//!
//! ## Example
//!
//! ```rust,no_run
//! use game_pilot::config::PilotMode;
//! use game_pilot::{run_pilot, InputSpec, Layout, PilotOptions};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let options = PilotOptions {
//!     mode: PilotMode::Random,
//!     interval: std::time::Duration::from_millis(200),
//!     steps: Some(50),
//!     model: None,
//!     spec: InputSpec::square(128, Layout::Nhwc),
//!     dry_run: true,
//! };
//!
//! let report = run_pilot(options).await?;
//! println!("pressed {} keys", report.total_presses());
//! # Ok(())
//! # }
//! ```

// External crate imports
use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::time::Duration;

// Internal module imports
pub mod action;
pub mod capture;
pub mod config;
pub mod error;
pub mod input;
pub mod policy;
pub mod probe;
pub mod session;

/// Re-export error types for convenience
pub use error::{
    HasRecoverySuggestion, HasSeverity, PilotError, PilotResult, Recoverable, Retryable,
};

/// Re-export the types callers wire together most often
pub use action::Action;
pub use config::PilotMode;
pub use pilot_prep::plan::InputPreset;
pub use pilot_prep::tensor::{InputSpec, Layout};
pub use session::{PilotSession, SessionEvent, SessionReport, DEFAULT_INTERVAL};

#[cfg(target_os = "linux")]
pub use capture::is_wayland_session;

/// Options for one pilot run.
///
/// This is the resolved form of [`config::PilotConfig`]: durations instead
/// of raw milliseconds, an [`InputSpec`] instead of preset and layout.
#[derive(Debug, Clone)]
pub struct PilotOptions {
    /// Decision mode: random presses or model-driven presses.
    pub mode: PilotMode,

    /// Fixed pause between ticks.
    pub interval: Duration,

    /// Stop after this many completed ticks; `None` runs until shutdown.
    pub steps: Option<u64>,

    /// ONNX model path. Required in model mode, ignored otherwise.
    pub model: Option<PathBuf>,

    /// Geometry and layout of the model's input tensor.
    pub spec: InputSpec,

    /// Count key presses instead of emitting them.
    pub dry_run: bool,
}

/// Build a [`PilotSession`] from options, wiring the policy, actuator, and
/// (in model mode) the screen capture source.
///
/// `events` is the optional status channel the GUI apps hang their log on.
pub fn build_session(
    options: &PilotOptions,
    events: Option<tokio::sync::mpsc::UnboundedSender<SessionEvent>>,
) -> Result<PilotSession> {
    let mut builder = PilotSession::builder().with_interval(options.interval);
    if let Some(limit) = options.steps {
        builder = builder.with_step_limit(limit);
    }
    if let Some(tx) = events {
        builder = builder.with_events(tx);
    }

    builder = attach_actuator(builder, options.dry_run)?;
    builder = attach_policy(builder, options)?;
    builder.build()
}

/// Run a complete pilot session to its step limit or shutdown.
pub async fn run_pilot(options: PilotOptions) -> Result<SessionReport> {
    build_session(&options, None)?.run().await
}

/// Pick the actuator: counting for dry runs, enigo otherwise.
fn attach_actuator(
    builder: session::PilotSessionBuilder,
    dry_run: bool,
) -> Result<session::PilotSessionBuilder> {
    if dry_run {
        return Ok(builder.with_actuator(input::NullActuator::new()));
    }

    #[cfg(feature = "input-sim")]
    return Ok(builder.with_actuator(input::EnigoActuator::new()?));

    #[cfg(not(feature = "input-sim"))]
    Err(anyhow!(
        "Key simulation not available - enable with: cargo run --features input-sim (or pass --dry-run)"
    ))
}

/// Pick the policy for the configured mode.
fn attach_policy(
    builder: session::PilotSessionBuilder,
    options: &PilotOptions,
) -> Result<session::PilotSessionBuilder> {
    match options.mode {
        PilotMode::Random => Ok(builder.with_policy(policy::RandomPolicy::new())),
        PilotMode::Model => attach_model_policy(builder, options),
    }
}

/// Model mode needs both the inference runtime and a capture backend.
#[cfg(all(feature = "inference", feature = "screen-capture"))]
fn attach_model_policy(
    builder: session::PilotSessionBuilder,
    options: &PilotOptions,
) -> Result<session::PilotSessionBuilder> {
    let path = options
        .model
        .as_deref()
        .ok_or_else(|| anyhow!("Model mode requires a model path"))?;
    let policy = policy::ModelPolicy::load(path, options.spec)?;
    let source = capture::ScrapSource::new()?;
    Ok(builder.with_policy(policy).with_frame_source(source))
}

#[cfg(not(all(feature = "inference", feature = "screen-capture")))]
fn attach_model_policy(
    _builder: session::PilotSessionBuilder,
    _options: &PilotOptions,
) -> Result<session::PilotSessionBuilder> {
    Err(anyhow!(
        "Model mode not available - enable with: cargo run --features inference,screen-capture"
    ))
}
