//! MCP3208 12-bit SPI ADC backend for the joystick axes.

use crate::hw::HwError;
use crate::input::source::{AxisSource, SourceError};
use crate::input::AxisKind;
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use tracing::{debug, info};

const SPI_CLOCK_HZ: u32 = 1_000_000;
const ADC_CHANNELS: u8 = 8;

/// MCP3208 reader with one configured channel per joystick axis.
pub struct Mcp3208 {
    spi: Spi,
    horizontal_channel: u8,
    vertical_channel: u8,
}

impl Mcp3208 {
    /// Opens SPI0/CE0 and binds the two axis channels.
    pub fn open(horizontal_channel: u8, vertical_channel: u8) -> Result<Self, HwError> {
        for channel in [horizontal_channel, vertical_channel] {
            if channel >= ADC_CHANNELS {
                return Err(HwError::BadChannel(channel));
            }
        }

        info!(
            "Opening MCP3208 on SPI0/CE0 (horizontal: channel {}, vertical: channel {})",
            horizontal_channel, vertical_channel
        );
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, SPI_CLOCK_HZ, Mode::Mode0)?;

        Ok(Self {
            spi,
            horizontal_channel,
            vertical_channel,
        })
    }

    // Single-ended conversion: start bit, single/diff flag and channel are
    // clocked out over three bytes, the 12-bit result comes back in the low
    // nibble of the second byte plus the third.
    fn read_channel(&mut self, channel: u8) -> Result<u16, rppal::spi::Error> {
        let tx = [0x06 | (channel >> 2), (channel & 0x03) << 6, 0x00];
        let mut rx = [0u8; 3];
        self.spi.transfer(&mut rx, &tx)?;

        let value = (u16::from(rx[1] & 0x0F) << 8) | u16::from(rx[2]);
        debug!("ADC channel {} read {}", channel, value);
        Ok(value)
    }
}

impl AxisSource for Mcp3208 {
    fn read_axis(&mut self, axis: AxisKind) -> Result<u16, SourceError> {
        let channel = match axis {
            AxisKind::Horizontal => self.horizontal_channel,
            AxisKind::Vertical => self.vertical_channel,
        };
        self.read_channel(channel)
            .map_err(|e| SourceError::AxisRead(format!("channel {}: {}", channel, e)))
    }
}
