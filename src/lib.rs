//! # rfm95-rs - A Rust Crate for RFM95 LoRa Telemetry Radios
//!
//! The rfm95-rs crate drives a HopeRF RFM95 (Semtech SX1276) LoRa transceiver
//! over SPI and uses it to send short telemetry packets from sensor nodes.
//!
//! ## Features
//!
//! - Register-level driver: reset and version check, operating modes, carrier
//!   frequency and output power
//! - Blocking transmit with a configurable completion wait (unbounded by
//!   default, optionally bounded or cancellable)
//! - Non-blocking receive probe that tells "no packet" and "CRC error" apart
//! - RSSI and SNR of the last received packet
//! - Raspberry Pi HAL (`raspberry-pi` feature) and a register-level chip
//!   simulator for tests
//! - JSON radio configuration and the telemetry payload format used by the
//!   weather-station nodes
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! rfm95-rs = "0.1.0"
//! ```
//!
//! ```rust
//! use rfm95_rs::radio::hal::SimulatedChip;
//! use rfm95_rs::radio::Rfm95Driver;
//! use rfm95_rs::TelemetryReading;
//!
//! let chip = SimulatedChip::new();
//! let mut driver = Rfm95Driver::new(chip.clone());
//! driver.initialize()?;
//! driver.set_tx_power(17)?;
//!
//! let payload = TelemetryReading::new(23.5, 101, 48.0).to_payload()?;
//! driver.transmit(&payload)?;
//! assert_eq!(chip.transmitted(), vec![payload]);
//! # Ok::<(), rfm95_rs::Rfm95Error>(())
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod radio;
pub mod telemetry;

pub use crate::config::RadioConfig;
pub use crate::error::Rfm95Error;
pub use crate::logging::{
    init_logger, init_logger_with_default, log_debug, log_error, log_info, log_warn,
};
pub use crate::telemetry::{average_temperature, TelemetryError, TelemetryReading};

// Core driver types
pub use radio::{
    CancelToken, DriverError, IrqFlags, Mode, PollPolicy, Rfm95Driver, RxOutcome, SignalQuality,
};
