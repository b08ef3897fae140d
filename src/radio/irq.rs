//! # RFM95 Interrupt Flags
//!
//! The LoRa page exposes a single 8-bit interrupt register (`REG_IRQ_FLAGS`).
//! Flags are latched by the chip and cleared by writing a 1 to the
//! corresponding bit, so clearing one event never disturbs the others as
//! long as only that bit is written back.
//!
//! ## Bit Assignments
//!
//! ```text
//! Bit 7: RxTimeout
//! Bit 6: RxDone
//! Bit 5: PayloadCrcError
//! Bit 4: ValidHeader
//! Bit 3: TxDone
//! Bit 2: CadDone
//! Bit 1: FhssChangeChannel
//! Bit 0: CadDetected
//! ```
//!
//! ## Example
//!
//! ```rust
//! use rfm95_rs::radio::irq::IrqFlags;
//!
//! let snapshot = IrqFlags::from_bits_retain(0x60);
//! assert!(snapshot.rx_done());
//! assert!(snapshot.crc_error());
//! assert_eq!(IrqFlags::RX_DONE.bits(), 0x40);
//! ```

use bitflags::bitflags;

bitflags! {
    /// Snapshot of `REG_IRQ_FLAGS`, also used as the write-back clear mask
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct IrqFlags: u8 {
        /// Reception timed out (single reception only)
        const RX_TIMEOUT          = 0b1000_0000;
        /// A complete packet has been received
        const RX_DONE             = 0b0100_0000;
        /// The payload CRC of the received packet failed
        const PAYLOAD_CRC_ERROR   = 0b0010_0000;
        /// A valid header has been received in explicit mode
        const VALID_HEADER        = 0b0001_0000;
        /// The packet has been transmitted
        const TX_DONE             = 0b0000_1000;
        /// Channel activity detection finished
        const CAD_DONE            = 0b0000_0100;
        /// Frequency hopping channel change request
        const FHSS_CHANGE_CHANNEL = 0b0000_0010;
        /// Channel activity detected
        const CAD_DETECTED        = 0b0000_0001;
    }
}

impl IrqFlags {
    /// Returns `true` if the `TxDone` interrupt is latched.
    pub fn tx_done(self) -> bool {
        self.contains(Self::TX_DONE)
    }

    /// Returns `true` if the `RxDone` interrupt is latched.
    pub fn rx_done(self) -> bool {
        self.contains(Self::RX_DONE)
    }

    /// Returns `true` if the `PayloadCrcError` interrupt is latched.
    pub fn crc_error(self) -> bool {
        self.contains(Self::PAYLOAD_CRC_ERROR)
    }
}

impl From<u8> for IrqFlags {
    fn from(raw: u8) -> Self {
        Self::from_bits_retain(raw)
    }
}

impl From<IrqFlags> for u8 {
    fn from(flags: IrqFlags) -> Self {
        flags.bits()
    }
}
