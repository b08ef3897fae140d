//! Unit tests for the logging functionality in the `rfm95-rs` crate.

use rfm95_rs::logging::{init_logger_with_default, log_debug, log_error, log_info, log_warn};
use rfm95_rs::radio::hal::SimulatedChip;
use rfm95_rs::radio::Rfm95Driver;

/// Tests that the logging helpers work as expected after initialization.
#[test]
fn test_logging() {
    init_logger_with_default("trace");
    log_error("This is an error message");
    log_warn("This is a warning message");
    log_info("This is an info message");
    log_debug("This is a debug message");
}

/// Tests that a second initialization is ignored.
#[test]
fn test_init_logger_twice() {
    init_logger_with_default("info");
    init_logger_with_default("debug");
}

/// Driver logging at trace level must not disturb register traffic.
#[test]
fn test_driver_with_trace_logging() {
    init_logger_with_default("trace");
    let chip = SimulatedChip::new();
    let mut driver = Rfm95Driver::new(chip.clone());
    driver.initialize().unwrap();
    driver.transmit(b"trace").unwrap();
    assert_eq!(chip.transmitted(), vec![b"trace".to_vec()]);
}
