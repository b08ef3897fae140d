//! # RFM95 Operating Modes and LoRa Modem Policy
//!
//! This module defines the operating modes the driver moves the chip through and
//! the LoRa modem parameters it programs during initialisation.
//!
//! ## Modes
//!
//! The RFM95 is always kept on its LoRa register page, so every value written to
//! `REG_OPMODE` carries the long-range flag (bit 7) next to the mode bits:
//!
//! ```text
//! Sleep              0x80
//! Standby            0x81
//! Transmit           0x83
//! ReceiveContinuous  0x85
//! ```
//!
//! ## Modem Parameters
//!
//! Telemetry links use one fixed profile: 125 kHz bandwidth, coding rate 4/5,
//! explicit header, spreading factor 7, payload CRC on and an 8-symbol preamble.
//! The profile is a constant of the crate ([`TELEMETRY_MODEM`]) rather than a
//! runtime setting, so both ends of a link always agree.

use crate::radio::registers::*;

/// Operating modes of the RFM95 used by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Sleep mode - lowest power, FIFO not accessible
    Sleep,
    /// Standby mode - crystal oscillator running, FIFO accessible
    Standby,
    /// Transmit the packet in the FIFO, then fall back to standby
    Transmit,
    /// Receive packets until told otherwise
    ReceiveContinuous,
}

impl Mode {
    /// Mode bits without the long-range flag
    pub const fn bits(self) -> u8 {
        match self {
            Mode::Sleep => MODE_SLEEP,
            Mode::Standby => MODE_STDBY,
            Mode::Transmit => MODE_TX,
            Mode::ReceiveContinuous => MODE_RX_CONTINUOUS,
        }
    }

    /// Full `REG_OPMODE` value
    pub const fn opmode(self) -> u8 {
        MODE_LONG_RANGE | self.bits()
    }
}

/// Signal bandwidth (`REG_MODEM_CONFIG_1` bits 7-4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bandwidth {
    Bw7_8k   = 0x00, // 7.8 kHz
    Bw10_4k  = 0x10, // 10.4 kHz
    Bw15_6k  = 0x20, // 15.6 kHz
    Bw20_8k  = 0x30, // 20.8 kHz
    Bw31_25k = 0x40, // 31.25 kHz
    Bw41_7k  = 0x50, // 41.7 kHz
    Bw62_5k  = 0x60, // 62.5 kHz
    Bw125k   = 0x70, // 125 kHz
    Bw250k   = 0x80, // 250 kHz
    Bw500k   = 0x90, // 500 kHz
}

/// Error coding rate (`REG_MODEM_CONFIG_1` bits 3-1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodingRate {
    Cr4_5 = 0x02,
    Cr4_6 = 0x04,
    Cr4_7 = 0x06,
    Cr4_8 = 0x08,
}

/// Header mode (`REG_MODEM_CONFIG_1` bit 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMode {
    /// Length, coding rate and CRC presence are sent in the header
    Explicit = 0x00,
    /// Both ends agree on the packet format beforehand
    Implicit = 0x01,
}

/// Spreading factor (`REG_MODEM_CONFIG_2` bits 7-4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SpreadingFactor {
    Sf6  = 0x60,
    Sf7  = 0x70,
    Sf8  = 0x80,
    Sf9  = 0x90,
    Sf10 = 0xA0,
    Sf11 = 0xB0,
    Sf12 = 0xC0,
}

/// Payload CRC enable (`REG_MODEM_CONFIG_2` bit 2)
pub const RX_PAYLOAD_CRC_ON: u8 = 0x04;

/// LoRa modem parameter set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModemSettings {
    pub bandwidth: Bandwidth,
    pub coding_rate: CodingRate,
    pub header: HeaderMode,
    pub spreading_factor: SpreadingFactor,
    pub crc_on: bool,
    /// Preamble length in symbols
    pub preamble_len: u16,
}

impl ModemSettings {
    /// Value for `REG_MODEM_CONFIG_1`
    pub const fn modem_config_1(&self) -> u8 {
        self.bandwidth as u8 | self.coding_rate as u8 | self.header as u8
    }

    /// Value for `REG_MODEM_CONFIG_2`
    pub const fn modem_config_2(&self) -> u8 {
        let crc = if self.crc_on { RX_PAYLOAD_CRC_ON } else { 0 };
        self.spreading_factor as u8 | crc
    }

    /// Values for `REG_PREAMBLE_MSB` and `REG_PREAMBLE_LSB`
    pub const fn preamble(&self) -> [u8; 2] {
        self.preamble_len.to_be_bytes()
    }
}

/// Modem profile programmed by `Rfm95Driver::initialize`
pub const TELEMETRY_MODEM: ModemSettings = ModemSettings {
    bandwidth: Bandwidth::Bw125k,
    coding_rate: CodingRate::Cr4_5,
    header: HeaderMode::Explicit,
    spreading_factor: SpreadingFactor::Sf7,
    crc_on: true,
    preamble_len: 8,
};
