//! Input subsystem for joystick and button handling
//!
//! Translates raw hardware signals into discrete edge events:
//!
//! 1. [`axis`] - Hysteresis translation of analog joystick samples
//! 2. [`buttons`] - Line-change dispatch for the digital buttons
//! 3. [`sampler`] - Periodic joystick sampling task
//! 4. [`consumer`] - Button line-change consumer task
//! 5. [`system`] - Unified API and lifecycle management
//!
//! # Architecture
//!
//! ```text
//! ADC ──► Sampler ──► AxisTranslator ──┐
//!         (50 ms)     (hysteresis)     ├──► engine event queue
//! GPIO ──► line queue ──► Consumer ────┘
//!          (interrupt)    (dispatch)
//! ```
//!
//! Both tasks post to the same event queue. The only state they share is the
//! strafe-mode flag, written by the button path and read by the axis path.

pub mod axis;
pub mod buttons;
pub mod consumer;
pub mod sampler;
pub mod source;
pub mod system;

// Re-exports for easier access
pub use axis::{AxisConfig, AxisKeymap, AxisTranslator};
pub use buttons::{ButtonAction, ButtonBinding, ButtonDispatcher};
pub use consumer::ConsumerHandle;
pub use sampler::{SamplerHandle, SamplerSettings};
pub use source::{AxisSource, LevelSource, SourceError};
pub use system::{InputError, InputSystemHandle};

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Engine-agnostic key codes carried by the emitted events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalKey {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    StrafeLeft,
    StrafeRight,
    Fire,
    Use,
    MenuEnter,
    Escape,
    Pause,
    Map,
    WeaponToggle,
    Speed,
}

/// Edge direction of an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Pressed,
    Released,
}

/// Discrete event posted to the engine event queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub kind: EdgeKind,
    pub key: LogicalKey,
}

impl InputEvent {
    pub fn pressed(key: LogicalKey) -> Self {
        Self {
            kind: EdgeKind::Pressed,
            key,
        }
    }

    pub fn released(key: LogicalKey) -> Self {
        Self {
            kind: EdgeKind::Released,
            key,
        }
    }
}

/// Joystick axis identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisKind {
    Horizontal,
    Vertical,
}

/// Identifier of a digital input line (BCM pin number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub u8);

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Electrical level of a digital line. Buttons are active-low: a pulled-up
/// line reading `Low` means the button is physically pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineLevel {
    High,
    Low,
}

/// Shared strafe-mode flag.
///
/// Written only by the button consumer task, read by the joystick sampler.
/// Relaxed ordering is sufficient: the sampler tolerates a stale read for one
/// sampling interval.
#[derive(Debug, Clone, Default)]
pub struct StrafeMode(Arc<AtomicBool>);

impl StrafeMode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of the flag.
    pub fn engaged(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Flips the flag, returning the new state.
    pub fn toggle(&self) -> bool {
        let engaged = !self.0.fetch_xor(true, Ordering::Relaxed);
        debug!("Strafe mode toggled: {}", engaged);
        engaged
    }
}
