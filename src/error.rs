//! # Crate Error Handling
//!
//! This module defines the Rfm95Error enum, which collects the errors that can
//! surface from the driver, the configuration layer and the telemetry payload
//! code into one type for applications such as `rfm95-cli`.

use crate::radio::hal::HalError;
use crate::radio::DriverError;
use crate::telemetry::TelemetryError;
use std::path::PathBuf;
use thiserror::Error;

/// Represents the different error types that can occur in the rfm95-rs crate.
#[derive(Debug, Error)]
pub enum Rfm95Error {
    /// Indicates a failure of a radio driver operation.
    #[error("Radio error: {0}")]
    Driver(#[from] DriverError),

    /// Indicates a HAL failure outside of a driver call.
    #[error("HAL error: {0}")]
    Hal(#[from] HalError),

    /// Indicates the Raspberry Pi peripherals could not be set up.
    #[cfg(feature = "raspberry-pi")]
    #[error("Raspberry Pi HAL error: {0}")]
    RaspberryPi(#[from] crate::radio::hal::RpiHalError),

    /// Indicates a configuration file could not be read.
    #[error("Cannot read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Indicates a configuration file is not valid JSON for `RadioConfig`.
    #[error("Error parsing config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Indicates a configuration value out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Indicates a telemetry payload could not be built or parsed.
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),

    /// Indicates an invalid hexadecimal string was provided.
    #[error("Invalid hexadecimal string")]
    InvalidHexString,

    /// Indicates a feature needed for the request was not compiled in.
    #[error("Feature `{0}` is not enabled in this build")]
    FeatureDisabled(&'static str),
}

impl From<hex::FromHexError> for Rfm95Error {
    fn from(_: hex::FromHexError) -> Self {
        Rfm95Error::InvalidHexString
    }
}
