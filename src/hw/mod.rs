//! Raspberry Pi hardware backends for the input collaborator traits.
//!
//! The joystick hangs off an MCP3208 SPI ADC; the buttons are pulled-up GPIO
//! lines whose interrupts feed the bounded line notification queue.

pub mod lines;
pub mod mcp3208;

pub use lines::ButtonLines;
pub use mcp3208::Mcp3208;

use thiserror::Error;

/// Hardware bring-up errors
#[derive(Debug, Error)]
pub enum HwError {
    #[error("GPIO error: {0}")]
    Gpio(#[from] rppal::gpio::Error),

    #[error("SPI error: {0}")]
    Spi(#[from] rppal::spi::Error),

    #[error("ADC channel {0} out of range (MCP3208 has channels 0-7)")]
    BadChannel(u8),
}
