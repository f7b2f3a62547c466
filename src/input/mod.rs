//! # Input Simulation
//!
//! Synthetic key presses for the four directional actions. An actuator
//! presses and then releases the mapped key, nothing else; only `w`, `a`,
//! `s`, `d` are ever emitted.
//!
//! [`NullActuator`] exists for dry runs and tests: it counts instead of
//! typing, so a session can be exercised without touching whatever window
//! currently has focus.

use crate::action::Action;
use crate::error::PilotResult;

#[cfg(feature = "input-sim")]
mod enigo_actuator;
#[cfg(feature = "input-sim")]
pub use enigo_actuator::EnigoActuator;

/// Abstract interface for synthetic key presses.
pub trait KeyActuator: Send {
    /// Press and release the key mapped to `action`.
    fn press(&mut self, action: Action) -> PilotResult<()>;

    /// Backend name for logs and status lines.
    fn name(&self) -> &'static str;
}

/// Actuator that counts presses instead of emitting them.
#[derive(Debug, Default)]
pub struct NullActuator {
    presses: [u64; 4],
}

impl NullActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Presses recorded per action, in model-output order.
    pub fn presses(&self) -> [u64; 4] {
        self.presses
    }

    pub fn total(&self) -> u64 {
        self.presses.iter().sum()
    }
}

impl KeyActuator for NullActuator {
    fn press(&mut self, action: Action) -> PilotResult<()> {
        self.presses[action.index()] += 1;
        tracing::debug!(key = %action, "dry-run key press");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_actuator_counts_per_action() {
        let mut actuator = NullActuator::new();
        actuator.press(Action::Up).unwrap();
        actuator.press(Action::Up).unwrap();
        actuator.press(Action::Right).unwrap();
        assert_eq!(actuator.presses(), [2, 0, 0, 1]);
        assert_eq!(actuator.total(), 3);
        assert_eq!(actuator.name(), "null");
    }
}
