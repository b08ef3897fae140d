//! # Raspberry Pi HAL Implementation
//!
//! Hardware abstraction layer implementation for Raspberry Pi boards,
//! providing SPI communication and GPIO control for RFM95 radio modules.
//!
//! ## Hardware Setup
//!
//! SPI must be enabled in `/boot/config.txt` (`dtparam=spi=on`). The module's
//! NSS line is driven as a plain GPIO so that a register transaction can span
//! several SPI calls; the controller's own CE0 line is left unconnected.
//!
//! ```text
//! Pi Pin │ BCM GPIO │ RFM95 Pin │ Function
//! ───────┼──────────┼───────────┼─────────────
//! 19     │ GPIO 10  │ MOSI      │ SPI data out
//! 21     │ GPIO 9   │ MISO      │ SPI data in
//! 23     │ GPIO 11  │ SCK       │ SPI clock
//! 11     │ GPIO 17  │ NSS       │ Chip select (output)
//! 38     │ GPIO 20  │ RESET     │ Reset (output)
//! ```
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use rfm95_rs::radio::hal::raspberry_pi::RaspberryPiHalBuilder;
//! use rfm95_rs::radio::Rfm95Driver;
//!
//! let hal = RaspberryPiHalBuilder::new()
//!     .spi_bus(0)
//!     .cs_pin(17)
//!     .reset_pin(20)
//!     .build()?;
//! let mut driver = Rfm95Driver::new(hal);
//! driver.initialize()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::constants::{DEFAULT_CS_PIN, DEFAULT_RESET_PIN, DEFAULT_SPI_SPEED_HZ, MAX_SPI_SPEED_HZ};
use crate::radio::hal::{Hal, HalError, Line};
use rppal::gpio::{Gpio, OutputPin};
use rppal::spi::{BitOrder, Bus, Error as SpiError, Mode, SlaveSelect, Spi};
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Errors specific to Raspberry Pi HAL implementation
#[derive(Error, Debug)]
pub enum RpiHalError {
    /// SPI bus initialization failed
    #[error("SPI initialization failed: {0}")]
    SpiInit(#[from] SpiError),
    /// GPIO initialization failed
    #[error("GPIO initialization failed: {0}")]
    GpioInit(#[from] rppal::gpio::Error),
    /// Invalid configuration parameter
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// GPIO pin configuration for RFM95 connections (BCM numbering)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpioPins {
    /// NSS (output, active low)
    pub cs: u8,
    /// RESET (output, active low)
    pub reset: u8,
}

impl Default for GpioPins {
    fn default() -> Self {
        Self {
            cs: DEFAULT_CS_PIN,       // GPIO 17 (Pin 11)
            reset: DEFAULT_RESET_PIN, // GPIO 20 (Pin 38)
        }
    }
}

/// Raspberry Pi HAL implementation for the RFM95
///
/// SPI runs in mode 0 (CPOL 0 / CPHA 0), MSB first, at the configured clock.
pub struct RaspberryPiHal {
    spi: Spi,
    cs_pin: OutputPin,
    reset_pin: OutputPin,
    pin_config: GpioPins,
}

impl RaspberryPiHal {
    /// Open the SPI controller and claim the chip-select and reset lines.
    ///
    /// Chip-select starts deasserted (high) and reset released (high).
    pub fn new(spi_bus: u8, spi_speed: u32, gpio_pins: &GpioPins) -> Result<Self, RpiHalError> {
        let bus = match spi_bus {
            0 => Bus::Spi0,
            1 => Bus::Spi1,
            _ => {
                return Err(RpiHalError::InvalidConfig(format!(
                    "Invalid SPI bus {spi_bus}, only 0 and 1 are supported"
                )))
            }
        };

        let spi = Spi::new(bus, SlaveSelect::Ss0, spi_speed, Mode::Mode0)?;
        spi.set_bit_order(BitOrder::MsbFirst)?;

        let gpio = Gpio::new()?;
        let mut cs_pin = gpio.get(gpio_pins.cs)?.into_output();
        cs_pin.set_high();
        let mut reset_pin = gpio.get(gpio_pins.reset)?.into_output();
        reset_pin.set_high();

        log::info!("Raspberry Pi HAL initialized:");
        log::info!("  SPI: bus {} at {} Hz", spi_bus, spi_speed);
        log::info!("  NSS: GPIO {}", gpio_pins.cs);
        log::info!("  RESET: GPIO {}", gpio_pins.reset);

        Ok(Self {
            spi,
            cs_pin,
            reset_pin,
            pin_config: gpio_pins.clone(),
        })
    }

    pub fn pins(&self) -> &GpioPins {
        &self.pin_config
    }
}

impl Hal for RaspberryPiHal {
    fn spi_transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), HalError> {
        self.spi.transfer(rx, tx).map_err(|e| {
            log::error!("SPI transfer failed: {e}");
            HalError::Spi
        })?;
        Ok(())
    }

    fn spi_write(&mut self, data: &[u8]) -> Result<(), HalError> {
        self.spi.write(data).map_err(|e| {
            log::error!("SPI write failed: {e}");
            HalError::Spi
        })?;
        Ok(())
    }

    fn spi_read(&mut self, buf: &mut [u8]) -> Result<(), HalError> {
        self.spi.read(buf).map_err(|e| {
            log::error!("SPI read failed: {e}");
            HalError::Spi
        })?;
        Ok(())
    }

    fn gpio_write(&mut self, line: Line, high: bool) -> Result<(), HalError> {
        let pin = match line {
            Line::ChipSelect => &mut self.cs_pin,
            Line::Reset => &mut self.reset_pin,
        };
        if high {
            pin.set_high();
        } else {
            pin.set_low();
        }
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}

/// Builder for Raspberry Pi HAL configuration
///
/// ```rust,no_run
/// use rfm95_rs::radio::hal::raspberry_pi::RaspberryPiHalBuilder;
///
/// let hal = RaspberryPiHalBuilder::new()
///     .spi_bus(0)
///     .spi_speed(1_000_000)
///     .cs_pin(17)
///     .reset_pin(20)
///     .build()?;
/// # Ok::<(), rfm95_rs::radio::hal::RpiHalError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RaspberryPiHalBuilder {
    spi_bus: u8,
    spi_speed: u32,
    gpio_pins: GpioPins,
}

impl Default for RaspberryPiHalBuilder {
    fn default() -> Self {
        Self {
            spi_bus: 0,
            spi_speed: DEFAULT_SPI_SPEED_HZ,
            gpio_pins: GpioPins::default(),
        }
    }
}

impl RaspberryPiHalBuilder {
    /// Create a new HAL builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the SPI bus number (0 or 1)
    pub fn spi_bus(mut self, bus: u8) -> Self {
        self.spi_bus = bus;
        self
    }

    /// Set the SPI clock speed in Hz (max 10 MHz for the RFM95)
    pub fn spi_speed(mut self, speed: u32) -> Self {
        self.spi_speed = speed;
        self
    }

    /// Set the chip-select GPIO number
    pub fn cs_pin(mut self, pin: u8) -> Self {
        self.gpio_pins.cs = pin;
        self
    }

    /// Set the reset GPIO number
    pub fn reset_pin(mut self, pin: u8) -> Self {
        self.gpio_pins.reset = pin;
        self
    }

    /// Check the configuration without touching the hardware
    pub fn validate(&self) -> Result<(), RpiHalError> {
        if self.spi_bus > 1 {
            return Err(RpiHalError::InvalidConfig(format!(
                "Invalid SPI bus {}, only 0 and 1 supported",
                self.spi_bus
            )));
        }

        if self.spi_speed == 0 || self.spi_speed > MAX_SPI_SPEED_HZ {
            return Err(RpiHalError::InvalidConfig(format!(
                "Invalid SPI speed {} Hz, must be 1-{}",
                self.spi_speed, MAX_SPI_SPEED_HZ
            )));
        }

        if self.gpio_pins.cs == self.gpio_pins.reset {
            return Err(RpiHalError::InvalidConfig(format!(
                "Chip-select and reset share GPIO {}",
                self.gpio_pins.cs
            )));
        }

        Ok(())
    }

    /// Build the HAL instance with current configuration
    pub fn build(self) -> Result<RaspberryPiHal, RpiHalError> {
        self.validate()?;
        RaspberryPiHal::new(self.spi_bus, self.spi_speed, &self.gpio_pins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpio_pins_default() {
        let pins = GpioPins::default();
        assert_eq!(pins.cs, 17);
        assert_eq!(pins.reset, 20);
    }

    #[test]
    fn test_hal_builder() {
        let builder = RaspberryPiHalBuilder::new()
            .spi_bus(1)
            .spi_speed(8_000_000)
            .cs_pin(8)
            .reset_pin(25);

        assert_eq!(builder.spi_bus, 1);
        assert_eq!(builder.spi_speed, 8_000_000);
        assert_eq!(builder.gpio_pins, GpioPins { cs: 8, reset: 25 });
        assert!(builder.validate().is_ok());
    }

    #[test]
    fn test_invalid_builder_settings() {
        assert!(RaspberryPiHalBuilder::new().spi_speed(0).validate().is_err());
        assert!(RaspberryPiHalBuilder::new()
            .spi_speed(16_000_000)
            .validate()
            .is_err());
        assert!(RaspberryPiHalBuilder::new().spi_bus(2).validate().is_err());
        assert!(RaspberryPiHalBuilder::new()
            .cs_pin(5)
            .reset_pin(5)
            .validate()
            .is_err());
    }
}
