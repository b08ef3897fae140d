//! Application Defaults
//!
//! Wiring and timing defaults for a telemetry node built around the RFM95.
//! Chip-level constants live in [`crate::radio::registers`].

/// SPI controller the module is attached to
pub const DEFAULT_SPI_BUS: u8 = 0;

/// SPI clock (1 MHz, well inside the chip's 10 MHz limit)
pub const DEFAULT_SPI_SPEED_HZ: u32 = 1_000_000;

/// Highest SPI clock the RFM95 accepts
pub const MAX_SPI_SPEED_HZ: u32 = 10_000_000;

/// BCM GPIO driving NSS
pub const DEFAULT_CS_PIN: u8 = 17;

/// BCM GPIO driving NRESET
pub const DEFAULT_RESET_PIN: u8 = 20;

/// Output power used by telemetry nodes
pub const DEFAULT_TX_POWER_DBM: i8 = 17;

/// Delay between two telemetry transmissions
pub const DEFAULT_BEACON_INTERVAL_MS: u64 = 2000;

/// Delay between two receive probes in `rfm95-cli receive`
pub const DEFAULT_RX_POLL_INTERVAL_MS: u64 = 10;

/// Humidity readings are capped at this value
pub const MAX_HUMIDITY_PCT: f32 = 100.0;
