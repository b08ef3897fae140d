//! # RFM95 Register Definitions and Constants
//!
//! Register addresses and bit patterns for the HopeRF RFM95 (Semtech SX1276 die)
//! operating in LoRa mode. Only the LoRa register page is described; the FSK/OOK
//! page that shares the same addresses is never selected by this driver.
//!
//! ## Register Map
//!
//! - 0x00: FIFO access (burst read/write, auto-incrementing pointer)
//! - 0x01-0x0C: Operating mode, carrier frequency, PA and LNA
//! - 0x0D-0x1A: FIFO pointers, IRQ flags, received packet status
//! - 0x1D-0x26: Modem configuration, preamble and payload length
//! - 0x42: Silicon revision

// =============================================================================
// RFM95 Register Addresses (LoRa page)
// =============================================================================

/// FIFO read/write access register
pub const REG_FIFO: u8 = 0x00;

/// Operating mode and LoRa/FSK selection
pub const REG_OPMODE: u8 = 0x01;

/// RF carrier frequency (MSB)
pub const REG_FRF_MSB: u8 = 0x06;

/// RF carrier frequency (MID)
pub const REG_FRF_MID: u8 = 0x07;

/// RF carrier frequency (LSB)
pub const REG_FRF_LSB: u8 = 0x08;

/// PA selection and output power control
pub const REG_PA_CONFIG: u8 = 0x09;

/// LNA gain and boost settings
pub const REG_LNA: u8 = 0x0C;

/// SPI interface address pointer in FIFO data buffer
pub const REG_FIFO_ADDR_PTR: u8 = 0x0D;

/// Write base address in FIFO data buffer for the TX modulator
pub const REG_FIFO_TX_BASE_ADDR: u8 = 0x0E;

/// Read base address in FIFO data buffer for the RX demodulator
pub const REG_FIFO_RX_BASE_ADDR: u8 = 0x0F;

/// Start address of the last packet received
pub const REG_FIFO_RX_CURRENT_ADDR: u8 = 0x10;

/// IRQ mask
pub const REG_IRQ_FLAGS_MASK: u8 = 0x11;

/// IRQ flags (write 1 to clear)
pub const REG_IRQ_FLAGS: u8 = 0x12;

/// Number of payload bytes of the last packet received
pub const REG_RX_NB_BYTES: u8 = 0x13;

/// Estimation of SNR on the last packet received (two's complement, 0.25 dB steps)
pub const REG_PKT_SNR_VALUE: u8 = 0x19;

/// RSSI of the last packet received
pub const REG_PKT_RSSI_VALUE: u8 = 0x1A;

/// Bandwidth, coding rate and header mode
pub const REG_MODEM_CONFIG_1: u8 = 0x1D;

/// Spreading factor and payload CRC
pub const REG_MODEM_CONFIG_2: u8 = 0x1E;

/// Preamble length (MSB)
pub const REG_PREAMBLE_MSB: u8 = 0x20;

/// Preamble length (LSB)
pub const REG_PREAMBLE_LSB: u8 = 0x21;

/// Payload length in bytes (explicit header: TX only)
pub const REG_PAYLOAD_LENGTH: u8 = 0x22;

/// Low data rate optimize, AGC auto
pub const REG_MODEM_CONFIG_3: u8 = 0x26;

/// Mapping of pins DIO0 to DIO3
pub const REG_DIO_MAPPING_1: u8 = 0x40;

/// Mapping of pins DIO4 and DIO5
pub const REG_DIO_MAPPING_2: u8 = 0x41;

/// Silicon revision (read-only)
pub const REG_VERSION: u8 = 0x42;

/// PA high-power DAC setting
pub const REG_PA_DAC: u8 = 0x4D;

// =============================================================================
// Transport framing
// =============================================================================

/// Bit 7 of the first byte of a frame selects a write access
pub const SPI_WRITE_BIT: u8 = 0x80;

/// Mask keeping the 7-bit register address
pub const SPI_ADDRESS_MASK: u8 = 0x7F;

/// Filler byte clocked out while the chip answers a read
pub const SPI_FILLER: u8 = 0x00;

/// Default SPI communication speed
pub const SPI_SPEED: u32 = 1_000_000; // 1 MHz

// =============================================================================
// Operating Mode Constants
// =============================================================================

/// LoRa long-range mode flag, always combined with the mode bits
pub const MODE_LONG_RANGE: u8 = 0x80;
pub const MODE_SLEEP: u8 = 0x00;
pub const MODE_STDBY: u8 = 0x01;
pub const MODE_TX: u8 = 0x03;
pub const MODE_RX_CONTINUOUS: u8 = 0x05;
/// Single reception; not driven by this crate
pub const MODE_RX_SINGLE: u8 = 0x06;
/// Channel activity detection; not driven by this crate
pub const MODE_CAD: u8 = 0x07;

// =============================================================================
// Chip identification and PA / LNA
// =============================================================================

/// Expected value of `REG_VERSION` for the SX1276 die used on the RFM95
pub const EXPECTED_VERSION: u8 = 0x12;

/// PA_BOOST output selection in `REG_PA_CONFIG`
pub const PA_BOOST: u8 = 0x80;

/// Lowest output power reachable on PA_BOOST without the +20 dBm DAC
pub const PA_MIN_DBM: i8 = 2;

/// Highest output power reachable on PA_BOOST without the +20 dBm DAC
pub const PA_MAX_DBM: i8 = 17;

/// LNA boost for the high-frequency port (150% LNA current)
pub const LNA_BOOST_HF: u8 = 0x03;

// =============================================================================
// Frequency synthesis
// =============================================================================

/// Crystal oscillator frequency of the module
pub const FXOSC_HZ: u64 = 32_000_000;

/// FRF is expressed in units of FXOSC / 2^19
pub const FRF_SHIFT: u32 = 19;

// =============================================================================
// Signal quality
// =============================================================================

/// Offset subtracted from `REG_PKT_RSSI_VALUE` on the high-frequency port
pub const RSSI_OFFSET_HF: i16 = 157;

// =============================================================================
// Buffer limits
// =============================================================================

/// Size of the on-chip packet buffer in bytes
pub const FIFO_SIZE: usize = 256;

/// Longest payload the 8-bit payload length register can describe
pub const MAX_PAYLOAD_LEN: usize = 255;

// =============================================================================
// Timing
// =============================================================================

/// Settling delay after every register write
pub const WRITE_SETTLE_MS: u32 = 1;

/// Reset pulse width and post-reset wait
pub const RESET_PULSE_MS: u32 = 10;

/// Default delay between two IRQ polls
pub const POLL_INTERVAL_MS: u32 = 1;
