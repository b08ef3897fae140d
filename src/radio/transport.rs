//! # Register Transport
//!
//! Single-register and FIFO burst transactions over the HAL. Every transaction
//! is framed by chip-select: asserted before the first byte and released after
//! the last one, also when the bus reports an error midway.
//!
//! ## Frame Formats
//!
//! ```text
//! read    TX: [addr & 0x7F, 0x00]        RX: [--, value]
//! write   TX: [addr | 0x80, value]       then 1 ms settle
//! burst   TX: [0x80, b0, b1, ... bN]     (FIFO write)
//!         TX: [0x00]  RX: [b0 ... bN]    (FIFO read)
//! ```

use crate::radio::hal::{Hal, HalError, Line};
use crate::radio::registers::{
    REG_FIFO, SPI_ADDRESS_MASK, SPI_FILLER, SPI_WRITE_BIT, WRITE_SETTLE_MS,
};

/// Owns the HAL and serialises register traffic through it
#[derive(Debug)]
pub struct RegisterTransport<H: Hal> {
    hal: H,
}

impl<H: Hal> RegisterTransport<H> {
    pub fn new(hal: H) -> Self {
        Self { hal }
    }

    /// Read one register.
    pub fn read_register(&mut self, addr: u8) -> Result<u8, HalError> {
        let tx = [addr & SPI_ADDRESS_MASK, SPI_FILLER];
        let mut rx = [0u8; 2];
        self.framed(|hal| hal.spi_transfer(&tx, &mut rx))?;
        log::trace!("read  0x{:02X} -> 0x{:02X}", addr & SPI_ADDRESS_MASK, rx[1]);
        Ok(rx[1])
    }

    /// Write one register and wait for it to settle.
    pub fn write_register(&mut self, addr: u8, value: u8) -> Result<(), HalError> {
        let frame = [addr | SPI_WRITE_BIT, value];
        self.framed(|hal| hal.spi_write(&frame))?;
        log::trace!("write 0x{:02X} <- 0x{:02X}", addr & SPI_ADDRESS_MASK, value);
        self.hal.delay_ms(WRITE_SETTLE_MS);
        Ok(())
    }

    /// Read-modify-write helper: `reg = (reg & !mask) | (value & mask)`
    pub fn update_register(&mut self, addr: u8, mask: u8, value: u8) -> Result<(), HalError> {
        let current = self.read_register(addr)?;
        self.write_register(addr, (current & !mask) | (value & mask))
    }

    /// Burst-write `data` into the FIFO at the current FIFO pointer.
    pub fn write_burst(&mut self, data: &[u8]) -> Result<(), HalError> {
        self.framed(|hal| {
            hal.spi_write(&[REG_FIFO | SPI_WRITE_BIT])?;
            hal.spi_write(data)
        })?;
        log::trace!("burst write {} bytes: {}", data.len(), hex::encode(data));
        Ok(())
    }

    /// Burst-read `buf.len()` bytes out of the FIFO at the current FIFO pointer.
    pub fn read_burst(&mut self, buf: &mut [u8]) -> Result<(), HalError> {
        self.framed(|hal| {
            hal.spi_write(&[REG_FIFO & SPI_ADDRESS_MASK])?;
            hal.spi_read(buf)
        })?;
        log::trace!("burst read {} bytes: {}", buf.len(), hex::encode(&*buf));
        Ok(())
    }

    /// Drive chip-select to its idle (high) level.
    pub fn release(&mut self) -> Result<(), HalError> {
        self.hal.gpio_write(Line::ChipSelect, true)
    }

    pub fn set_reset_line(&mut self, high: bool) -> Result<(), HalError> {
        self.hal.gpio_write(Line::Reset, high)
    }

    pub fn delay_ms(&mut self, ms: u32) {
        self.hal.delay_ms(ms);
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    pub fn into_hal(self) -> H {
        self.hal
    }

    /// Run `op` with chip-select asserted, releasing it whatever the outcome
    fn framed<F>(&mut self, op: F) -> Result<(), HalError>
    where
        F: FnOnce(&mut H) -> Result<(), HalError>,
    {
        self.hal.gpio_write(Line::ChipSelect, false)?;
        let result = op(&mut self.hal);
        let released = self.hal.gpio_write(Line::ChipSelect, true);
        result.and(released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Wire {
        Cs(bool),
        Transfer(Vec<u8>),
        Write(Vec<u8>),
        Read(usize),
        Delay(u32),
    }

    /// Records raw HAL calls and answers reads with a fixed byte
    #[derive(Default)]
    struct RecordingHal {
        wire: Vec<Wire>,
        answer: u8,
        fail_writes: bool,
    }

    impl Hal for RecordingHal {
        fn spi_transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), HalError> {
            self.wire.push(Wire::Transfer(tx.to_vec()));
            rx.fill(self.answer);
            rx[0] = 0;
            Ok(())
        }

        fn spi_write(&mut self, data: &[u8]) -> Result<(), HalError> {
            if self.fail_writes {
                return Err(HalError::Spi);
            }
            self.wire.push(Wire::Write(data.to_vec()));
            Ok(())
        }

        fn spi_read(&mut self, buf: &mut [u8]) -> Result<(), HalError> {
            self.wire.push(Wire::Read(buf.len()));
            buf.fill(self.answer);
            Ok(())
        }

        fn gpio_write(&mut self, line: Line, high: bool) -> Result<(), HalError> {
            assert_eq!(line, Line::ChipSelect);
            self.wire.push(Wire::Cs(high));
            Ok(())
        }

        fn delay_ms(&mut self, ms: u32) {
            self.wire.push(Wire::Delay(ms));
        }
    }

    #[test]
    fn test_read_frame() {
        let mut transport = RegisterTransport::new(RecordingHal {
            answer: 0x12,
            ..Default::default()
        });
        assert_eq!(transport.read_register(0x42).unwrap(), 0x12);
        assert_eq!(
            transport.hal().wire,
            vec![
                Wire::Cs(false),
                Wire::Transfer(vec![0x42, 0x00]),
                Wire::Cs(true)
            ]
        );
    }

    #[test]
    fn test_read_masks_write_bit() {
        let mut transport = RegisterTransport::new(RecordingHal::default());
        transport.read_register(0xC2).unwrap();
        assert_eq!(transport.hal().wire[1], Wire::Transfer(vec![0x42, 0x00]));
    }

    #[test]
    fn test_write_frame_then_settle() {
        let mut transport = RegisterTransport::new(RecordingHal::default());
        transport.write_register(0x09, 0x8F).unwrap();
        assert_eq!(
            transport.hal().wire,
            vec![
                Wire::Cs(false),
                Wire::Write(vec![0x89, 0x8F]),
                Wire::Cs(true),
                Wire::Delay(1)
            ]
        );
    }

    #[test]
    fn test_bursts_address_fifo_once() {
        let mut transport = RegisterTransport::new(RecordingHal::default());
        transport.write_burst(&[0xDE, 0xAD, 0xBE]).unwrap();
        let mut buf = [0u8; 4];
        transport.read_burst(&mut buf).unwrap();

        assert_eq!(
            transport.hal().wire,
            vec![
                Wire::Cs(false),
                Wire::Write(vec![0x80]),
                Wire::Write(vec![0xDE, 0xAD, 0xBE]),
                Wire::Cs(true),
                Wire::Cs(false),
                Wire::Write(vec![0x00]),
                Wire::Read(4),
                Wire::Cs(true),
            ]
        );
    }

    #[test]
    fn test_chip_select_released_on_error() {
        let mut transport = RegisterTransport::new(RecordingHal {
            fail_writes: true,
            ..Default::default()
        });
        assert_eq!(transport.write_register(0x01, 0x81), Err(HalError::Spi));
        assert_eq!(transport.hal().wire, vec![Wire::Cs(false), Wire::Cs(true)]);
    }

    #[test]
    fn test_update_register_preserves_other_bits() {
        let mut transport = RegisterTransport::new(RecordingHal {
            answer: 0x20,
            ..Default::default()
        });
        transport.update_register(0x0C, 0x03, 0x03).unwrap();
        assert!(transport.hal().wire.contains(&Wire::Write(vec![0x8C, 0x23])));
    }
}
