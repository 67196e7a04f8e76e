//! Pulled-up GPIO button lines with interrupt-driven change notification.

use crate::hw::HwError;
use crate::input::buttons::ButtonBinding;
use crate::input::source::{LevelSource, SourceError};
use crate::input::{LineId, LineLevel};
use rppal::gpio::{Gpio, InputPin, Level, Trigger};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Owns the claimed button pins. After [`watch`](Self::watch) every level
/// change pushes the line id into the bounded notification queue; the struct
/// then serves as the consumer's [`LevelSource`] for settled re-reads.
pub struct ButtonLines {
    pins: HashMap<u8, InputPin>,
}

impl ButtonLines {
    /// Claims every line named in the binding table as a pulled-up input.
    /// Lines carrying several bindings are claimed once.
    pub fn claim(bindings: &[ButtonBinding]) -> Result<Self, HwError> {
        let gpio = Gpio::new()?;
        let mut pins = HashMap::new();

        for binding in bindings {
            let line = binding.line.0;
            if pins.contains_key(&line) {
                continue;
            }
            let pin = gpio.get(line)?.into_input_pullup();
            info!("Claimed GPIO {} as pulled-up button line", line);
            pins.insert(line, pin);
        }

        Ok(Self { pins })
    }

    /// Registers an interrupt on both edges of every claimed line. The
    /// callback runs outside the consumer task and must not block: it hands
    /// the line id to the queue and returns, dropping the notification when
    /// the queue is full.
    pub fn watch(&mut self, line_tx: mpsc::Sender<LineId>) -> Result<(), HwError> {
        for (&line, pin) in self.pins.iter_mut() {
            let tx = line_tx.clone();
            pin.set_async_interrupt(Trigger::Both, None, move |_event| {
                if tx.try_send(LineId(line)).is_err() {
                    warn!("Line notification queue full, dropping change on GPIO {}", line);
                }
            })?;
        }
        info!("Watching {} button lines", self.pins.len());
        Ok(())
    }
}

impl LevelSource for ButtonLines {
    fn read_level(&mut self, line: LineId) -> Result<LineLevel, SourceError> {
        let pin = self
            .pins
            .get(&line.0)
            .ok_or_else(|| SourceError::LevelRead(format!("no claimed pin for line {}", line)))?;
        Ok(match pin.read() {
            Level::Low => LineLevel::Low,
            Level::High => LineLevel::High,
        })
    }
}
