//! # RFM95 Radio Driver
//!
//! High-level driver for the HopeRF RFM95 (Semtech SX1276) LoRa transceiver.
//! The driver owns the HAL, remembers the operating mode it last wrote and the
//! carrier frequency and output power it last applied, and exposes the
//! transmit and receive data paths used by telemetry nodes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────┐
//! │        Application Layer        │
//! ├─────────────────────────────────┤
//! │     Rfm95Driver (this file)     │
//! ├─────────────────────────────────┤
//! │       RegisterTransport         │
//! ├─────────────────────────────────┤
//! │    Platform-specific HAL impl   │
//! └─────────────────────────────────┘
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use rfm95_rs::radio::hal::SimulatedChip;
//! use rfm95_rs::radio::{Rfm95Driver, RxOutcome};
//!
//! let mut driver = Rfm95Driver::new(SimulatedChip::new());
//! driver.initialize()?;
//! driver.set_tx_power(14)?;
//! driver.transmit(b"{\"temperatura\":21.5}\r\n")?;
//!
//! let mut buf = [0u8; 64];
//! if let RxOutcome::Received(len) = driver.receive_packet(&mut buf)? {
//!     println!("{} bytes, RSSI {} dBm", len, driver.rssi_dbm()?);
//! }
//! # Ok::<(), rfm95_rs::radio::DriverError>(())
//! ```

use crate::radio::frequency::{clamp_tx_power, frf_bytes, frf_from_hz, pa_config_for_dbm};
use crate::radio::hal::{Hal, HalError};
use crate::radio::irq::IrqFlags;
use crate::radio::modem::{Mode, TELEMETRY_MODEM};
use crate::radio::poll::{PollPolicy, PollStop};
use crate::radio::registers::*;
use crate::radio::transport::RegisterTransport;
use thiserror::Error;

/// Carrier frequency applied by `initialize` unless configured otherwise
pub const DEFAULT_FREQUENCY_HZ: u64 = 915_000_000;

/// Errors that can occur during radio driver operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// Hardware abstraction layer error (SPI, GPIO)
    #[error("HAL error: {0}")]
    Hal(HalError),
    /// The chip did not identify as an RFM95
    #[error("Unexpected chip version 0x{found:02X} (expected 0x{expected:02X})")]
    VersionMismatch { expected: u8, found: u8 },
    /// Payload does not fit in a single packet
    #[error("Payload of {len} bytes exceeds the {max}-byte packet limit")]
    PayloadTooLarge { len: usize, max: usize },
    /// TX_DONE was not raised within the bounded number of polls
    #[error("Transmission not completed after {attempts} polls")]
    TxTimeout { attempts: u32 },
    /// Wait aborted through the cancel token
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<HalError> for DriverError {
    fn from(err: HalError) -> Self {
        DriverError::Hal(err)
    }
}

impl From<PollStop> for DriverError {
    fn from(stop: PollStop) -> Self {
        match stop {
            PollStop::Exhausted { attempts } => DriverError::TxTimeout { attempts },
            PollStop::Cancelled => DriverError::Cancelled,
        }
    }
}

/// Result of one receive probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxOutcome {
    /// RX_DONE was not latched
    NoPacket,
    /// A packet arrived but failed its payload CRC; nothing was copied
    CrcError,
    /// A packet was copied into the buffer (possibly truncated to its length)
    Received(usize),
}

impl RxOutcome {
    /// Bytes copied into the caller's buffer
    pub fn len(self) -> usize {
        match self {
            RxOutcome::Received(n) => n,
            RxOutcome::NoPacket | RxOutcome::CrcError => 0,
        }
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

/// Link quality of the most recently received packet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalQuality {
    pub rssi_dbm: i16,
    pub snr_db: f32,
}

/// RSSI in dBm from the raw `REG_PKT_RSSI_VALUE`
pub fn rssi_from_raw(raw: u8) -> i16 {
    raw as i16 - RSSI_OFFSET_HF
}

/// SNR in dB from the raw two's complement `REG_PKT_SNR_VALUE`
pub fn snr_from_raw(raw: u8) -> f32 {
    (raw as i8) as f32 * 0.25
}

/// Main driver structure for RFM95 radio transceivers
///
/// All operations take `&mut self`, so at most one register transaction or
/// multi-step sequence is in flight per driver. Wrap the driver in a `Mutex`
/// to share it between threads.
#[derive(Debug)]
pub struct Rfm95Driver<H: Hal> {
    transport: RegisterTransport<H>,
    /// Last mode written to `REG_OPMODE`, `None` before the first write
    mode: Option<Mode>,
    frequency_hz: u64,
    /// Last output power applied, already clamped
    tx_power_dbm: Option<i8>,
    poll: PollPolicy,
}

impl<H: Hal> Rfm95Driver<H> {
    /// Create a driver tuned to [`DEFAULT_FREQUENCY_HZ`] with unbounded polling
    pub fn new(hal: H) -> Self {
        Self {
            transport: RegisterTransport::new(hal),
            mode: None,
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            tx_power_dbm: None,
            poll: PollPolicy::default(),
        }
    }

    /// Carrier frequency `initialize` will apply
    pub fn with_frequency(mut self, frequency_hz: u64) -> Self {
        self.frequency_hz = frequency_hz;
        self
    }

    /// Output power `initialize` will apply
    pub fn with_tx_power(mut self, power_dbm: i8) -> Self {
        self.tx_power_dbm = Some(clamp_tx_power(power_dbm));
        self
    }

    /// Polling policy for the transmit completion wait
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll = policy;
        self
    }

    pub fn set_poll_policy(&mut self, policy: PollPolicy) {
        self.poll = policy;
    }

    pub fn poll_policy(&self) -> &PollPolicy {
        &self.poll
    }

    /// Pulse the reset line: low 10 ms, high, then 10 ms before the chip is usable
    pub fn reset(&mut self) -> Result<(), DriverError> {
        log::debug!("Resetting RFM95");
        self.transport.set_reset_line(false)?;
        self.transport.delay_ms(RESET_PULSE_MS);
        self.transport.set_reset_line(true)?;
        self.transport.delay_ms(RESET_PULSE_MS);
        self.mode = None;
        Ok(())
    }

    /// Reset the chip, check its version and program the telemetry modem profile.
    ///
    /// On a version mismatch nothing is written and
    /// [`DriverError::VersionMismatch`] is returned; retrying is up to the caller.
    /// The carrier frequency and, if one was set, the output power are
    /// re-applied so a re-initialised chip comes back with the same settings.
    pub fn initialize(&mut self) -> Result<(), DriverError> {
        self.transport.release()?;
        self.reset()?;

        let version = self.transport.read_register(REG_VERSION)?;
        if version != EXPECTED_VERSION {
            log::error!(
                "RFM95 not found: version register reads 0x{version:02X}, expected 0x{EXPECTED_VERSION:02X}"
            );
            return Err(DriverError::VersionMismatch {
                expected: EXPECTED_VERSION,
                found: version,
            });
        }

        self.set_mode(Mode::Sleep)?;
        self.set_frequency(self.frequency_hz)?;

        self.transport.write_register(REG_FIFO_TX_BASE_ADDR, 0x00)?;
        self.transport.write_register(REG_FIFO_RX_BASE_ADDR, 0x00)?;

        self.transport
            .update_register(REG_LNA, LNA_BOOST_HF, LNA_BOOST_HF)?;

        self.transport
            .write_register(REG_MODEM_CONFIG_1, TELEMETRY_MODEM.modem_config_1())?;
        self.transport
            .write_register(REG_MODEM_CONFIG_2, TELEMETRY_MODEM.modem_config_2())?;

        let [preamble_msb, preamble_lsb] = TELEMETRY_MODEM.preamble();
        self.transport.write_register(REG_PREAMBLE_MSB, preamble_msb)?;
        self.transport.write_register(REG_PREAMBLE_LSB, preamble_lsb)?;

        if let Some(power) = self.tx_power_dbm {
            self.set_tx_power(power)?;
        }

        self.set_mode(Mode::Standby)?;

        log::info!(
            "RFM95 initialized: {} Hz, SF7/BW125/CR4-5, power {}",
            self.frequency_hz,
            self.tx_power_dbm
                .map_or_else(|| "chip default".to_string(), |p| format!("{p} dBm"))
        );
        Ok(())
    }

    /// Write `REG_OPMODE`; the value is not read back
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), DriverError> {
        self.transport.write_register(REG_OPMODE, mode.opmode())?;
        if self.mode != Some(mode) {
            log::debug!("Mode changed: {:?} -> {:?}", self.mode, mode);
        }
        self.mode = Some(mode);
        Ok(())
    }

    /// Last mode written by the driver
    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    /// Program the carrier frequency (MSB, MID, LSB)
    pub fn set_frequency(&mut self, frequency_hz: u64) -> Result<(), DriverError> {
        let frf = frf_from_hz(frequency_hz);
        let [msb, mid, lsb] = frf_bytes(frf);
        self.transport.write_register(REG_FRF_MSB, msb)?;
        self.transport.write_register(REG_FRF_MID, mid)?;
        self.transport.write_register(REG_FRF_LSB, lsb)?;
        self.frequency_hz = frequency_hz;
        log::debug!("Frequency set to {frequency_hz} Hz (FRF 0x{frf:06X})");
        Ok(())
    }

    pub fn frequency_hz(&self) -> u64 {
        self.frequency_hz
    }

    /// Program the PA_BOOST output power, clamped to 2..=17 dBm
    pub fn set_tx_power(&mut self, power_dbm: i8) -> Result<(), DriverError> {
        let clamped = clamp_tx_power(power_dbm);
        if clamped != power_dbm {
            log::warn!("TX power {power_dbm} dBm out of range, using {clamped} dBm");
        }
        self.transport
            .write_register(REG_PA_CONFIG, pa_config_for_dbm(clamped))?;
        self.tx_power_dbm = Some(clamped);
        Ok(())
    }

    pub fn tx_power_dbm(&self) -> Option<i8> {
        self.tx_power_dbm
    }

    /// Read the silicon revision register
    pub fn version(&mut self) -> Result<u8, DriverError> {
        Ok(self.transport.read_register(REG_VERSION)?)
    }

    /// Snapshot of `REG_IRQ_FLAGS`
    pub fn irq_flags(&mut self) -> Result<IrqFlags, DriverError> {
        Ok(IrqFlags::from(self.transport.read_register(REG_IRQ_FLAGS)?))
    }

    /// Write-1-to-clear the given flags only
    pub fn clear_irq(&mut self, flags: IrqFlags) -> Result<(), DriverError> {
        self.transport.write_register(REG_IRQ_FLAGS, flags.bits())?;
        Ok(())
    }

    /// Send one packet and block until the chip reports TX_DONE.
    ///
    /// The wait follows the driver's [`PollPolicy`]. With the default policy
    /// it never gives up; a bounded policy ends with
    /// [`DriverError::TxTimeout`], a tripped cancel token with
    /// [`DriverError::Cancelled`]. In both cases the chip is put back into
    /// standby before the error is returned.
    pub fn transmit(&mut self, payload: &[u8]) -> Result<(), DriverError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(DriverError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }

        log::debug!("Transmitting {} bytes", payload.len());

        self.set_mode(Mode::Standby)?;
        self.transport.write_register(REG_FIFO_ADDR_PTR, 0x00)?;
        self.transport.write_burst(payload)?;
        self.transport
            .write_register(REG_PAYLOAD_LENGTH, payload.len() as u8)?;
        self.set_mode(Mode::Transmit)?;

        if let Err(err) = self.wait_tx_done() {
            if !matches!(err, DriverError::Hal(_)) {
                log::warn!("Transmission aborted: {err}");
                self.set_mode(Mode::Standby)?;
            }
            return Err(err);
        }

        self.clear_irq(IrqFlags::TX_DONE)?;
        self.set_mode(Mode::Standby)?;
        log::debug!("Transmission completed");
        Ok(())
    }

    fn wait_tx_done(&mut self) -> Result<(), DriverError> {
        let policy = self.poll.clone();
        let mut poller = policy.start();
        loop {
            if self.irq_flags()?.tx_done() {
                return Ok(());
            }
            poller.next_attempt()?;
            self.transport.delay_ms(poller.interval_ms());
        }
    }

    /// Probe the receiver once; returns the number of bytes copied.
    ///
    /// No packet and a CRC failure both yield 0. Use
    /// [`receive_packet`](Self::receive_packet) to tell them apart.
    pub fn receive(&mut self, buf: &mut [u8]) -> Result<usize, DriverError> {
        Ok(self.receive_packet(buf)?.len())
    }

    /// Probe the receiver once without blocking.
    ///
    /// Enters continuous receive, then inspects a single IRQ snapshot. When a
    /// packet is pending only RX_DONE is cleared; a CRC failure leaves
    /// PAYLOAD_CRC_ERROR latched. Packets longer than `buf` are truncated
    /// silently.
    pub fn receive_packet(&mut self, buf: &mut [u8]) -> Result<RxOutcome, DriverError> {
        self.set_mode(Mode::ReceiveContinuous)?;

        let flags = self.irq_flags()?;
        if !flags.rx_done() {
            return Ok(RxOutcome::NoPacket);
        }

        self.clear_irq(IrqFlags::RX_DONE)?;

        if flags.crc_error() {
            log::warn!("CRC error - received packet discarded");
            return Ok(RxOutcome::CrcError);
        }

        let reported = self.transport.read_register(REG_RX_NB_BYTES)? as usize;
        let len = reported.min(buf.len());
        if len < reported {
            log::warn!("Received {reported} bytes, truncated to {len}");
        }

        let start = self.transport.read_register(REG_FIFO_RX_CURRENT_ADDR)?;
        self.transport.write_register(REG_FIFO_ADDR_PTR, start)?;
        self.transport.read_burst(&mut buf[..len])?;

        log::debug!("Received {len} bytes from FIFO offset 0x{start:02X}");
        Ok(RxOutcome::Received(len))
    }

    /// RSSI of the last received packet in dBm
    pub fn rssi_dbm(&mut self) -> Result<i16, DriverError> {
        Ok(rssi_from_raw(
            self.transport.read_register(REG_PKT_RSSI_VALUE)?,
        ))
    }

    /// SNR of the last received packet in dB
    pub fn snr_db(&mut self) -> Result<f32, DriverError> {
        Ok(snr_from_raw(
            self.transport.read_register(REG_PKT_SNR_VALUE)?,
        ))
    }

    pub fn signal_quality(&mut self) -> Result<SignalQuality, DriverError> {
        Ok(SignalQuality {
            rssi_dbm: self.rssi_dbm()?,
            snr_db: self.snr_db()?,
        })
    }

    pub fn hal(&self) -> &H {
        self.transport.hal()
    }

    pub fn hal_mut(&mut self) -> &mut H {
        self.transport.hal_mut()
    }

    /// Consume the driver and hand back the HAL
    pub fn release(self) -> H {
        self.transport.into_hal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radio::hal::SimulatedChip;

    #[test]
    fn test_rssi_and_snr_conversion() {
        assert_eq!(rssi_from_raw(77), -80);
        assert_eq!(rssi_from_raw(0), -157);
        assert_eq!(snr_from_raw(0xF8), -2.0);
        assert_eq!(snr_from_raw(0x28), 10.0);
    }

    #[test]
    fn test_rx_outcome_len() {
        assert_eq!(RxOutcome::Received(7).len(), 7);
        assert!(RxOutcome::CrcError.is_empty());
        assert!(RxOutcome::NoPacket.is_empty());
    }

    #[test]
    fn test_poll_stop_maps_to_driver_error() {
        assert_eq!(
            DriverError::from(PollStop::Exhausted { attempts: 4 }),
            DriverError::TxTimeout { attempts: 4 }
        );
        assert_eq!(DriverError::from(PollStop::Cancelled), DriverError::Cancelled);
    }

    #[test]
    fn test_builder_settings_survive_initialize() {
        let chip = SimulatedChip::new();
        let mut driver = Rfm95Driver::new(chip.clone())
            .with_frequency(868_000_000)
            .with_tx_power(20);
        driver.initialize().unwrap();

        assert_eq!(chip.register(REG_FRF_MSB), 0xD9);
        assert_eq!(chip.register(REG_PA_CONFIG), 0x8F);
        assert_eq!(driver.tx_power_dbm(), Some(17));
        assert_eq!(driver.mode(), Some(Mode::Standby));
    }

    #[test]
    fn test_reset_forgets_mode() {
        let mut driver = Rfm95Driver::new(SimulatedChip::new());
        driver.set_mode(Mode::Standby).unwrap();
        driver.reset().unwrap();
        assert_eq!(driver.mode(), None);
    }
}
