//! Hysteresis translation of analog joystick samples into edge events.

use crate::input::{AxisKind, InputEvent, LogicalKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Rest value of a centered 12-bit joystick axis.
pub const AXIS_CENTER: u16 = 2048;
/// Default half-width of the deadzone around the center.
pub const AXIS_THRESHOLD: u16 = 1500;
/// Default hysteresis applied to the boundary on the latched side.
pub const AXIS_TOLERANCE: u16 = 200;

/// Configuration errors for an axis.
#[derive(Debug, Error)]
pub enum AxisConfigError {
    #[error("Tolerance {tolerance} must be smaller than threshold {threshold}")]
    ToleranceTooWide { threshold: u16, tolerance: u16 },
}

/// Deadzone geometry of one axis.
///
/// The deadzone spans `[center - threshold, center + threshold]`. While a
/// direction is latched, `tolerance` shrinks the boundary on that side only,
/// so a reading has to travel back past the narrowed boundary to release.
/// The opposite side keeps its full width.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AxisConfig {
    pub center: u16,
    pub threshold: u16,
    pub tolerance: u16,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            center: AXIS_CENTER,
            threshold: AXIS_THRESHOLD,
            tolerance: AXIS_TOLERANCE,
        }
    }
}

impl AxisConfig {
    pub fn new(center: u16, threshold: u16, tolerance: u16) -> Result<Self, AxisConfigError> {
        let config = Self {
            center,
            threshold,
            tolerance,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects geometry where the narrowed release boundary would cross the
    /// entry boundary of the opposite side.
    pub fn validate(&self) -> Result<(), AxisConfigError> {
        if self.tolerance >= self.threshold {
            return Err(AxisConfigError::ToleranceTooWide {
                threshold: self.threshold,
                tolerance: self.tolerance,
            });
        }
        Ok(())
    }

    fn lower_bound(&self, negative_active: bool) -> i32 {
        let base = i32::from(self.center) - i32::from(self.threshold);
        if negative_active {
            base + i32::from(self.tolerance)
        } else {
            base
        }
    }

    fn upper_bound(&self, positive_active: bool) -> i32 {
        let base = i32::from(self.center) + i32::from(self.threshold);
        if positive_active {
            base - i32::from(self.tolerance)
        } else {
            base
        }
    }
}

/// Key resolution table for one axis.
///
/// `negative` covers travel below the deadzone (left/up), `positive` travel
/// above it (right/down). When the strafe pair is present it replaces the
/// base pair while strafe mode is engaged; the vertical axis carries none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisKeymap {
    pub negative: LogicalKey,
    pub positive: LogicalKey,
    #[serde(default)]
    pub strafe_negative: Option<LogicalKey>,
    #[serde(default)]
    pub strafe_positive: Option<LogicalKey>,
}

impl AxisKeymap {
    pub fn horizontal() -> Self {
        Self {
            negative: LogicalKey::MoveLeft,
            positive: LogicalKey::MoveRight,
            strafe_negative: Some(LogicalKey::StrafeLeft),
            strafe_positive: Some(LogicalKey::StrafeRight),
        }
    }

    pub fn vertical() -> Self {
        Self {
            negative: LogicalKey::MoveUp,
            positive: LogicalKey::MoveDown,
            strafe_negative: None,
            strafe_positive: None,
        }
    }

    fn resolve(&self, strafe: bool) -> (LogicalKey, LogicalKey) {
        if strafe {
            (
                self.strafe_negative.unwrap_or(self.negative),
                self.strafe_positive.unwrap_or(self.positive),
            )
        } else {
            (self.negative, self.positive)
        }
    }
}

/// Latch state of one axis. The two flags are mutually exclusive.
#[derive(Debug, Clone, Copy, Default)]
struct AxisState {
    negative_active: bool,
    positive_active: bool,
}

/// Converts raw samples of one axis into press/release edges.
#[derive(Debug)]
pub struct AxisTranslator {
    axis: AxisKind,
    config: AxisConfig,
    keymap: AxisKeymap,
    state: AxisState,
}

impl AxisTranslator {
    pub fn new(axis: AxisKind, config: AxisConfig, keymap: AxisKeymap) -> Self {
        Self {
            axis,
            config,
            keymap,
            state: AxisState::default(),
        }
    }

    pub fn axis(&self) -> AxisKind {
        self.axis
    }

    /// Feeds one raw sample, returning the edge events it produces (at most
    /// two: entering one extreme while the other was latched).
    ///
    /// Keys are resolved at emit time, so a strafe-mode change between press
    /// and release makes the release carry the remapped key.
    pub fn feed(&mut self, raw: u16, strafe: bool) -> Vec<InputEvent> {
        let value = i32::from(raw);
        let lower = self.config.lower_bound(self.state.negative_active);
        let upper = self.config.upper_bound(self.state.positive_active);
        let (negative_key, positive_key) = self.keymap.resolve(strafe);

        let mut events = Vec::new();

        if value >= lower && value <= upper {
            if self.state.negative_active {
                self.state.negative_active = false;
                events.push(InputEvent::released(negative_key));
            }
            if self.state.positive_active {
                self.state.positive_active = false;
                events.push(InputEvent::released(positive_key));
            }
        } else if value < lower {
            if !self.state.negative_active {
                self.state.negative_active = true;
                events.push(InputEvent::pressed(negative_key));
            }
            if self.state.positive_active {
                self.state.positive_active = false;
                events.push(InputEvent::released(positive_key));
            }
        } else {
            if !self.state.positive_active {
                self.state.positive_active = true;
                events.push(InputEvent::pressed(positive_key));
            }
            if self.state.negative_active {
                self.state.negative_active = false;
                events.push(InputEvent::released(negative_key));
            }
        }

        if !events.is_empty() {
            debug!(
                "Axis {:?} sample {} -> {} event(s) (bounds [{}, {}])",
                self.axis,
                raw,
                events.len(),
                lower,
                upper
            );
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::EdgeKind;
    use rstest::rstest;

    fn horizontal(config: AxisConfig) -> AxisTranslator {
        AxisTranslator::new(AxisKind::Horizontal, config, AxisKeymap::horizontal())
    }

    fn vertical(config: AxisConfig) -> AxisTranslator {
        AxisTranslator::new(AxisKind::Vertical, config, AxisKeymap::vertical())
    }

    fn narrow() -> AxisConfig {
        AxisConfig::new(2048, 600, 200).unwrap()
    }

    #[test]
    fn rejects_tolerance_wider_than_threshold() {
        assert!(AxisConfig::new(2048, 200, 200).is_err());
        assert!(AxisConfig::new(2048, 200, 600).is_err());
        assert!(AxisConfig::new(2048, 600, 200).is_ok());
    }

    #[test]
    fn center_press_release_cycle() {
        // Deadzone [1448, 2648]; 1300 crosses the lower bound.
        let mut axis = horizontal(narrow());
        let mut events = Vec::new();
        for raw in [2048, 1300, 1300, 2048] {
            events.extend(axis.feed(raw, false));
        }
        assert_eq!(
            events,
            vec![
                InputEvent::pressed(LogicalKey::MoveLeft),
                InputEvent::released(LogicalKey::MoveLeft),
            ]
        );
    }

    #[test]
    fn repeated_sample_is_idempotent() {
        let mut axis = horizontal(narrow());
        assert_eq!(axis.feed(1300, false).len(), 1);
        for _ in 0..100 {
            assert!(axis.feed(1300, false).is_empty());
        }
    }

    #[test]
    fn monotonic_sweep_presses_once() {
        let mut axis = horizontal(narrow());
        let mut events = Vec::new();
        let mut press_sample = None;
        for raw in (1247..=2048).rev() {
            let emitted = axis.feed(raw, false);
            if !emitted.is_empty() && press_sample.is_none() {
                press_sample = Some(raw);
            }
            events.extend(emitted);
        }
        assert_eq!(events, vec![InputEvent::pressed(LogicalKey::MoveLeft)]);
        // First sample strictly below center - threshold.
        assert_eq!(press_sample, Some(1447));
    }

    #[test]
    fn chatter_in_hysteresis_band_is_suppressed() {
        let mut axis = horizontal(narrow());
        assert_eq!(axis.feed(1300, false).len(), 1);
        // While latched the release bound sits at 1648; oscillation between
        // the original bound and the narrowed one must stay silent.
        for _ in 0..50 {
            assert!(axis.feed(1449, false).is_empty());
            assert!(axis.feed(1647, false).is_empty());
        }
    }

    #[test]
    fn release_requires_crossing_narrowed_bound() {
        let mut axis = horizontal(narrow());
        axis.feed(1300, false);
        assert!(axis.feed(1647, false).is_empty());
        let events = axis.feed(1649, false);
        assert_eq!(events, vec![InputEvent::released(LogicalKey::MoveLeft)]);
    }

    #[test]
    fn snap_through_swaps_directions_in_one_sample() {
        let mut axis = horizontal(narrow());
        axis.feed(1300, false);
        let events = axis.feed(3000, false);
        assert_eq!(
            events,
            vec![
                InputEvent::pressed(LogicalKey::MoveRight),
                InputEvent::released(LogicalKey::MoveLeft),
            ]
        );
    }

    #[test]
    fn strafe_mode_remaps_horizontal_keys() {
        let sweep = [2048u16, 1300, 2048, 3000, 2048];

        let mut plain = horizontal(narrow());
        let plain_events: Vec<_> = sweep.iter().flat_map(|&raw| plain.feed(raw, false)).collect();

        let mut strafing = horizontal(narrow());
        let strafe_events: Vec<_> = sweep.iter().flat_map(|&raw| strafing.feed(raw, true)).collect();

        let expected = |left: LogicalKey, right: LogicalKey| {
            vec![
                InputEvent::pressed(left),
                InputEvent::released(left),
                InputEvent::pressed(right),
                InputEvent::released(right),
            ]
        };
        assert_eq!(
            plain_events,
            expected(LogicalKey::MoveLeft, LogicalKey::MoveRight)
        );
        assert_eq!(
            strafe_events,
            expected(LogicalKey::StrafeLeft, LogicalKey::StrafeRight)
        );
    }

    #[test]
    fn vertical_axis_ignores_strafe_mode() {
        let mut axis = vertical(narrow());
        let events = axis.feed(1300, true);
        assert_eq!(events, vec![InputEvent::pressed(LogicalKey::MoveUp)]);
    }

    #[rstest]
    #[case(1447, Some(EdgeKind::Pressed), LogicalKey::MoveLeft)]
    #[case(1448, None, LogicalKey::MoveLeft)]
    #[case(2048, None, LogicalKey::MoveLeft)]
    #[case(2648, None, LogicalKey::MoveRight)]
    #[case(2649, Some(EdgeKind::Pressed), LogicalKey::MoveRight)]
    fn zone_boundaries_are_inclusive(
        #[case] raw: u16,
        #[case] expected: Option<EdgeKind>,
        #[case] key: LogicalKey,
    ) {
        let mut axis = horizontal(narrow());
        let events = axis.feed(raw, false);
        match expected {
            Some(kind) => assert_eq!(events, vec![InputEvent { kind, key }]),
            None => assert!(events.is_empty()),
        }
    }
}
