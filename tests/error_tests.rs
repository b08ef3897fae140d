//! Unit tests for the error enums and their `Display` implementations.

use rfm95_rs::error::Rfm95Error;
use rfm95_rs::radio::hal::{HalError, Line};
use rfm95_rs::radio::DriverError;
use rfm95_rs::TelemetryError;
use std::error::Error;

/// Tests that HAL errors are correctly formatted.
#[test]
fn test_hal_error() {
    assert_eq!(HalError::Spi.to_string(), "SPI communication error");
    assert_eq!(
        HalError::Gpio(Line::Reset).to_string(),
        "GPIO operation error on Reset line"
    );
}

/// Tests that driver errors are correctly formatted.
#[test]
fn test_driver_errors() {
    assert_eq!(
        DriverError::VersionMismatch {
            expected: 0x12,
            found: 0xFF
        }
        .to_string(),
        "Unexpected chip version 0xFF (expected 0x12)"
    );
    assert_eq!(
        DriverError::PayloadTooLarge { len: 300, max: 255 }.to_string(),
        "Payload of 300 bytes exceeds the 255-byte packet limit"
    );
    assert_eq!(
        DriverError::TxTimeout { attempts: 10 }.to_string(),
        "Transmission not completed after 10 polls"
    );
    assert_eq!(DriverError::Cancelled.to_string(), "Operation cancelled");
    assert_eq!(
        DriverError::from(HalError::Spi).to_string(),
        "HAL error: SPI communication error"
    );
}

/// Tests that crate errors wrap their sources.
#[test]
fn test_crate_error_wrapping() {
    let err = Rfm95Error::from(DriverError::Cancelled);
    assert_eq!(err.to_string(), "Radio error: Operation cancelled");
    assert!(err.source().is_some());

    let err = Rfm95Error::from(TelemetryError::NonFinite("umidade"));
    assert_eq!(
        err.to_string(),
        "Telemetry error: Telemetry field `umidade` is not a finite number"
    );

    assert_eq!(
        Rfm95Error::FeatureDisabled("raspberry-pi").to_string(),
        "Feature `raspberry-pi` is not enabled in this build"
    );
}

/// Tests that the `InvalidHexString` variant is correctly formatted.
#[test]
fn test_invalid_hex_string_error() {
    let err = Rfm95Error::InvalidHexString;
    assert_eq!(err.to_string(), "Invalid hexadecimal string");
}
