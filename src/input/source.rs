//! Hardware collaborator traits consumed by the input tasks.
//!
//! The sampler and consumer tasks are written against these seams so the
//! concrete backend (see [`crate::hw`]) stays swappable and the tasks stay
//! testable without hardware attached.

use crate::input::{AxisKind, LineId, LineLevel};
use thiserror::Error;

/// Read failures reported by a hardware backend.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Axis read failed: {0}")]
    AxisRead(String),

    #[error("Level read failed: {0}")]
    LevelRead(String),
}

/// Source of raw analog samples, one 12-bit value (0-4095) per axis.
pub trait AxisSource: Send {
    fn read_axis(&mut self, axis: AxisKind) -> Result<u16, SourceError>;
}

/// Source of the current electrical level of a digital line.
///
/// The consumer task re-reads the level here at consumption time instead of
/// trusting the edge polarity that raised the interrupt; a line that bounced
/// since the interrupt fired is reported at its settled level.
pub trait LevelSource: Send {
    fn read_level(&mut self, line: LineId) -> Result<LineLevel, SourceError>;
}
