//! # Radio Configuration
//!
//! Wiring and radio settings for a node, loaded from JSON. Every field has a
//! default, so a config file only lists what differs from the reference
//! wiring:
//!
//! ```json
//! {
//!   "frequency_hz": 868100000,
//!   "tx_power_dbm": 14,
//!   "tx_timeout_polls": 5000
//! }
//! ```
//!
//! Modem parameters (bandwidth, spreading factor, coding rate) are not part of
//! the configuration; they are fixed by [`crate::radio::modem::TELEMETRY_MODEM`].

use crate::constants::*;
use crate::error::Rfm95Error;
use crate::radio::registers::POLL_INTERVAL_MS;
use crate::radio::{PollPolicy, DEFAULT_FREQUENCY_HZ};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioConfig {
    /// SPI controller (0 or 1)
    pub spi_bus: u8,
    /// SPI clock in Hz
    pub spi_speed_hz: u32,
    /// BCM GPIO for chip-select
    pub cs_pin: u8,
    /// BCM GPIO for reset
    pub reset_pin: u8,
    /// Carrier frequency in Hz
    pub frequency_hz: u64,
    /// Output power in dBm (clamped to 2..=17 by the driver)
    pub tx_power_dbm: i8,
    /// Delay between IRQ polls while waiting for TX_DONE
    pub poll_interval_ms: u32,
    /// Give up on TX_DONE after this many polls; absent means wait forever
    pub tx_timeout_polls: Option<u32>,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            spi_bus: DEFAULT_SPI_BUS,
            spi_speed_hz: DEFAULT_SPI_SPEED_HZ,
            cs_pin: DEFAULT_CS_PIN,
            reset_pin: DEFAULT_RESET_PIN,
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            tx_power_dbm: DEFAULT_TX_POWER_DBM,
            poll_interval_ms: POLL_INTERVAL_MS,
            tx_timeout_polls: None,
        }
    }
}

impl RadioConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, Rfm95Error> {
        let config: RadioConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Rfm95Error> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| Rfm95Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::debug!("Loaded radio config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, Rfm95Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), Rfm95Error> {
        if self.spi_bus > 1 {
            return Err(Rfm95Error::InvalidConfig(format!(
                "Invalid SPI bus {}, only 0 and 1 supported",
                self.spi_bus
            )));
        }

        if self.spi_speed_hz == 0 || self.spi_speed_hz > MAX_SPI_SPEED_HZ {
            return Err(Rfm95Error::InvalidConfig(format!(
                "Invalid SPI speed {} Hz, must be 1-{}",
                self.spi_speed_hz, MAX_SPI_SPEED_HZ
            )));
        }

        if self.cs_pin == self.reset_pin {
            return Err(Rfm95Error::InvalidConfig(format!(
                "Chip-select and reset share GPIO {}",
                self.cs_pin
            )));
        }

        if self.poll_interval_ms == 0 {
            return Err(Rfm95Error::InvalidConfig(
                "poll_interval_ms must be at least 1".to_string(),
            ));
        }

        if self.tx_timeout_polls == Some(0) {
            return Err(Rfm95Error::InvalidConfig(
                "tx_timeout_polls must be at least 1 when set".to_string(),
            ));
        }

        Ok(())
    }

    /// Transmit wait policy described by this config
    pub fn poll_policy(&self) -> PollPolicy {
        match self.tx_timeout_polls {
            Some(max) => PollPolicy::bounded(self.poll_interval_ms, max),
            None => PollPolicy::unbounded(self.poll_interval_ms),
        }
    }
}
