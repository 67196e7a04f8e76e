//! Line-change dispatch for the digital buttons.

use crate::input::{EdgeKind, InputEvent, LineId, LineLevel, LogicalKey, StrafeMode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Logical outcome bound to a hardware line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    /// Forward the line's edges as press/release of this key.
    Key(LogicalKey),
    /// Flip strafe mode on the falling transition; emits no event.
    StrafeToggle,
}

/// One entry of the static binding table. A line may carry several bindings;
/// all of them fire on each level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonBinding {
    pub line: LineId,
    pub action: ButtonAction,
}

impl ButtonBinding {
    pub fn key(line: u8, key: LogicalKey) -> Self {
        Self {
            line: LineId(line),
            action: ButtonAction::Key(key),
        }
    }

    pub fn strafe_toggle(line: u8) -> Self {
        Self {
            line: LineId(line),
            action: ButtonAction::StrafeToggle,
        }
    }
}

/// Maps a line level-change notification to zero or more input events.
#[derive(Debug)]
pub struct ButtonDispatcher {
    bindings: Vec<ButtonBinding>,
    strafe: StrafeMode,
}

impl ButtonDispatcher {
    pub fn new(bindings: Vec<ButtonBinding>, strafe: StrafeMode) -> Self {
        info!("Button dispatcher configured with {} bindings", bindings.len());
        Self { bindings, strafe }
    }

    /// Handles the settled level of a line after a change notification.
    ///
    /// Buttons are active-low: `Low` maps to `Pressed`, `High` to `Released`.
    /// The strafe toggle acts on the falling transition only, which also
    /// serves as its debounce.
    pub fn on_line_change(&self, line: LineId, level: LineLevel) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let mut matched = false;

        for binding in self.bindings.iter().filter(|b| b.line == line) {
            matched = true;
            match binding.action {
                ButtonAction::StrafeToggle => {
                    if level == LineLevel::Low {
                        let engaged = self.strafe.toggle();
                        info!(
                            "Strafe mode {}",
                            if engaged { "engaged" } else { "released" }
                        );
                    }
                }
                ButtonAction::Key(key) => {
                    let kind = match level {
                        LineLevel::Low => EdgeKind::Pressed,
                        LineLevel::High => EdgeKind::Released,
                    };
                    events.push(InputEvent { kind, key });
                }
            }
        }

        // The table is static and registration only covers bound lines, so
        // this indicates a wiring mismatch rather than a runtime fault.
        if !matched {
            debug!("Level change on unbound line {}", line);
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> (ButtonDispatcher, StrafeMode) {
        let strafe = StrafeMode::new();
        let bindings = vec![
            ButtonBinding::key(17, LogicalKey::Fire),
            ButtonBinding::key(17, LogicalKey::MenuEnter),
            ButtonBinding::key(27, LogicalKey::Use),
            ButtonBinding::strafe_toggle(22),
        ];
        (ButtonDispatcher::new(bindings, strafe.clone()), strafe)
    }

    #[test]
    fn active_low_press_and_release() {
        let (dispatcher, _) = dispatcher();
        assert_eq!(
            dispatcher.on_line_change(LineId(27), LineLevel::Low),
            vec![InputEvent::pressed(LogicalKey::Use)]
        );
        assert_eq!(
            dispatcher.on_line_change(LineId(27), LineLevel::High),
            vec![InputEvent::released(LogicalKey::Use)]
        );
    }

    #[test]
    fn shared_line_fires_every_binding() {
        let (dispatcher, _) = dispatcher();
        assert_eq!(
            dispatcher.on_line_change(LineId(17), LineLevel::Low),
            vec![
                InputEvent::pressed(LogicalKey::Fire),
                InputEvent::pressed(LogicalKey::MenuEnter),
            ]
        );
    }

    #[test]
    fn toggle_acts_on_falling_edge_only() {
        let (dispatcher, strafe) = dispatcher();
        assert!(dispatcher
            .on_line_change(LineId(22), LineLevel::High)
            .is_empty());
        assert!(!strafe.engaged());

        // A full release-then-press pair flips the mode exactly once.
        assert!(dispatcher
            .on_line_change(LineId(22), LineLevel::Low)
            .is_empty());
        assert!(strafe.engaged());
        assert!(dispatcher
            .on_line_change(LineId(22), LineLevel::High)
            .is_empty());
        assert!(strafe.engaged());
    }

    #[test]
    fn unbound_line_is_a_no_op() {
        let (dispatcher, strafe) = dispatcher();
        assert!(dispatcher
            .on_line_change(LineId(5), LineLevel::Low)
            .is_empty());
        assert!(!strafe.engaged());
    }
}
