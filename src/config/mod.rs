//! # Configuration Module
//!
//! Configuration structures and validation shared by the CLI and the two
//! desktop apps. The pattern: a plain struct with defaults, a `validate`
//! that returns a human-readable message, and a converter into the library's
//! option type.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Default | Description |
//! |-----------|------|---------|-------------|
//! | `mode` | `PilotMode` | random | Decision mode |
//! | `interval_ms` | `u64` | 200 | Tick interval in milliseconds |
//! | `steps` | `Option<u64>` | none | Stop after N ticks (headless runs) |
//! | `model` | `Option<PathBuf>` | none | ONNX model path (model mode) |
//! | `preset` | `InputPreset` | s128 | Model input geometry |
//! | `layout` | `Layout` | nhwc | Input tensor axis order |
//! | `dry_run` | `bool` | false | Count presses instead of emitting them |

use std::path::PathBuf;
use std::time::Duration;

use pilot_prep::plan::InputPreset;
use pilot_prep::tensor::{InputSpec, Layout};

use crate::PilotOptions;

/// Which brain drives the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PilotMode {
    /// Uniform random action each tick, no perception.
    Random,
    /// Screen capture, forward pass, arg-max.
    Model,
}

/// Configuration for a pilot run.
#[derive(Debug, Clone)]
pub struct PilotConfig {
    /// Decision mode.
    pub mode: PilotMode,

    /// Tick interval in milliseconds. The original paced itself at 200 ms
    /// to mimic human gameplay speed.
    pub interval_ms: u64,

    /// Stop after this many completed ticks. `None` runs until stopped.
    pub steps: Option<u64>,

    /// Path to the ONNX action model. Required in model mode.
    pub model: Option<PathBuf>,

    /// Model input geometry preset.
    pub preset: InputPreset,

    /// Input tensor axis layout.
    pub layout: Layout,

    /// Count key presses without emitting them.
    pub dry_run: bool,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            mode: PilotMode::Random,
            interval_ms: 200,
            steps: None,
            model: None,
            preset: InputPreset::default(),
            layout: Layout::default(),
            dry_run: false,
        }
    }
}

impl PilotConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.interval_ms == 0 {
            return Err("Interval must be greater than 0 ms".to_string());
        }
        if self.steps == Some(0) {
            return Err("Step limit must be greater than 0 when set".to_string());
        }
        if self.mode == PilotMode::Model && self.model.is_none() {
            return Err("Model mode requires a model path".to_string());
        }
        Ok(())
    }

    /// The model input spec implied by preset and layout.
    pub fn input_spec(&self) -> InputSpec {
        InputSpec::square(self.preset.side(), self.layout)
    }

    /// Convert to PilotOptions for use with the library.
    pub fn to_pilot_options(&self) -> PilotOptions {
        PilotOptions {
            mode: self.mode,
            interval: Duration::from_millis(self.interval_ms),
            steps: self.steps,
            model: self.model.clone(),
            spec: self.input_spec(),
            dry_run: self.dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PilotConfig::default();
        assert_eq!(config.mode, PilotMode::Random);
        assert_eq!(config.interval_ms, 200);
        assert_eq!(config.steps, None);
        assert!(!config.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = PilotConfig::default();

        config.interval_ms = 0;
        assert!(config.validate().is_err());
        config.interval_ms = 200; // Reset

        config.steps = Some(0);
        assert!(config.validate().is_err());
        config.steps = Some(10); // Reset

        // Model mode without a path fails
        config.mode = PilotMode::Model;
        assert!(config.validate().is_err());
        config.model = Some(PathBuf::from("policy.onnx"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_options_conversion() {
        let config = PilotConfig {
            interval_ms: 150,
            steps: Some(20),
            ..PilotConfig::default()
        };
        let options = config.to_pilot_options();
        assert_eq!(options.interval, Duration::from_millis(150));
        assert_eq!(options.steps, Some(20));
        assert_eq!(options.spec.size.w, 128);
    }
}
