// Enigo-backed key actuator.
//
// Press then release, mirroring a human tap; Direction::Click would collapse
// the pair but games sometimes drop synthetic clicks that carry no release
// event of their own.

use enigo::{Direction, Enigo, Key, Keyboard, Settings};

use crate::action::Action;
use crate::error::{PilotError, PilotResult};
use crate::input::KeyActuator;

/// Synthetic keyboard input via the enigo crate.
pub struct EnigoActuator {
    enigo: Enigo,
}

impl EnigoActuator {
    pub fn new() -> PilotResult<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| {
            PilotError::actuator_init("enigo", e.to_string())
                .with_recovery_suggestion("on Linux this needs an X11 session with libxdo")
        })?;
        Ok(Self { enigo })
    }
}

impl KeyActuator for EnigoActuator {
    fn press(&mut self, action: Action) -> PilotResult<()> {
        let key = Key::Unicode(action.key_char());
        self.enigo
            .key(key, Direction::Press)
            .map_err(|e| PilotError::actuation(action.label(), e.to_string()))?;
        self.enigo
            .key(key, Direction::Release)
            .map_err(|e| PilotError::actuation(action.label(), e.to_string()))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "enigo"
    }
}
