//! # Hardware Abstraction Layer for the RFM95
//!
//! The driver only needs five primitives from the platform: a full-duplex SPI
//! transfer, a plain SPI write, a plain SPI read, driving one of two GPIO
//! output lines, and a millisecond delay. Chip-select is a GPIO line under
//! software control so a transaction can span several SPI calls (address byte
//! first, payload afterwards) without the bus releasing the chip in between.
//!
//! Implementations:
//!
//! - [`raspberry_pi::RaspberryPiHal`] (feature `raspberry-pi`) on top of `rppal`
//! - [`sim::SimulatedChip`], a register-level model of the chip used by the
//!   test suite and by `rfm95-cli --simulate`

use thiserror::Error;

/// Errors that can occur during HAL operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HalError {
    #[error("SPI communication error")]
    Spi,

    #[error("GPIO operation error on {0:?} line")]
    Gpio(Line),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// GPIO output lines wired to the radio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
    /// NSS, active low
    ChipSelect,
    /// NRESET, active low
    Reset,
}

/// Hardware Abstraction Layer trait for RFM95 radio control
pub trait Hal {
    /// Clock out `tx` while capturing the same number of bytes into `rx`
    fn spi_transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), HalError>;

    /// Clock out `data`, discarding whatever the chip sends back
    fn spi_write(&mut self, data: &[u8]) -> Result<(), HalError>;

    /// Clock in `buf.len()` bytes while sending filler bytes
    fn spi_read(&mut self, buf: &mut [u8]) -> Result<(), HalError>;

    /// Drive a GPIO output line high (`true`) or low (`false`)
    fn gpio_write(&mut self, line: Line, high: bool) -> Result<(), HalError>;

    /// Block for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

// Platform implementations
#[cfg(feature = "raspberry-pi")]
pub mod raspberry_pi;

pub mod sim;

#[cfg(feature = "raspberry-pi")]
pub use raspberry_pi::{GpioPins, RaspberryPiHal, RaspberryPiHalBuilder, RpiHalError};
pub use sim::{ChipOp, InboundPacket, SimulatedChip};
