//! Simulated RFM95 for testing
//!
//! This module provides a register-level model of the RFM95 that implements
//! [`Hal`], so the driver can be exercised without hardware. The model decodes
//! the SPI frames the same way the chip does (address byte with the write bit,
//! auto-incrementing FIFO pointer, write-1-to-clear IRQ register) and records
//! every transaction in an operation log for assertions.
//!
//! `SimulatedChip` is a cheap handle around shared state: clone it before
//! handing one copy to the driver and keep the other to inspect or steer the
//! chip.
//!
//! ```rust
//! use rfm95_rs::radio::hal::{InboundPacket, SimulatedChip};
//! use rfm95_rs::radio::Rfm95Driver;
//!
//! let chip = SimulatedChip::new();
//! let mut driver = Rfm95Driver::new(chip.clone());
//! driver.initialize().unwrap();
//!
//! chip.queue_packet(InboundPacket::new(b"hello".to_vec()));
//! let mut buf = [0u8; 16];
//! assert_eq!(driver.receive(&mut buf).unwrap(), 5);
//! assert_eq!(&buf[..5], b"hello");
//! ```

use crate::radio::hal::{Hal, HalError, Line};
use crate::radio::irq::IrqFlags;
use crate::radio::registers::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// One entry of the simulated chip's operation log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChipOp {
    /// Chip-select driven to the given level
    ChipSelect(bool),
    /// Reset line driven to the given level
    Reset(bool),
    /// Delay requested by the host
    Delay(u32),
    /// Single register written
    WriteRegister { addr: u8, value: u8 },
    /// Single register read, with the value returned to the host
    ReadRegister { addr: u8, value: u8 },
    /// Burst write into the FIFO
    WriteFifo(Vec<u8>),
    /// Burst read out of the FIFO
    ReadFifo(Vec<u8>),
}

/// Packet waiting to be "received" by the simulated chip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundPacket {
    pub payload: Vec<u8>,
    /// FIFO address the demodulator stores the packet at
    pub fifo_offset: u8,
    /// Raw `REG_PKT_RSSI_VALUE`
    pub rssi_raw: u8,
    /// Raw `REG_PKT_SNR_VALUE`
    pub snr_raw: u8,
    /// Latch PAYLOAD_CRC_ERROR together with RX_DONE
    pub crc_error: bool,
}

impl InboundPacket {
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            payload,
            fifo_offset: 0,
            rssi_raw: 0,
            snr_raw: 0,
            crc_error: false,
        }
    }

    pub fn at_offset(mut self, offset: u8) -> Self {
        self.fifo_offset = offset;
        self
    }

    pub fn with_signal(mut self, rssi_raw: u8, snr_raw: u8) -> Self {
        self.rssi_raw = rssi_raw;
        self.snr_raw = snr_raw;
        self
    }

    pub fn with_crc_error(mut self) -> Self {
        self.crc_error = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
}

/// Transaction in progress between chip-select low and high
#[derive(Debug)]
struct Transaction {
    target: Option<(Access, u8)>,
    data: Vec<u8>,
}

#[derive(Debug)]
struct ChipState {
    registers: [u8; 128],
    fifo: [u8; FIFO_SIZE],
    version: u8,
    cs_low: bool,
    reset_low: bool,
    transaction: Option<Transaction>,
    inbound: VecDeque<InboundPacket>,
    transmitted: Vec<Vec<u8>>,
    tx_done_after_polls: Option<u32>,
    tx_polls_left: Option<u32>,
    ops: Vec<ChipOp>,
    unframed_bytes: usize,
    elapsed_ms: u64,
    fail_spi: u32,
}

impl ChipState {
    fn new() -> Self {
        let mut state = Self {
            registers: [0; 128],
            fifo: [0; FIFO_SIZE],
            version: EXPECTED_VERSION,
            cs_low: false,
            reset_low: false,
            transaction: None,
            inbound: VecDeque::new(),
            transmitted: Vec::new(),
            tx_done_after_polls: Some(0),
            tx_polls_left: None,
            ops: Vec::new(),
            unframed_bytes: 0,
            elapsed_ms: 0,
            fail_spi: 0,
        };
        state.power_on();
        state
    }

    /// Power-on register values (FSK standby at 434 MHz)
    fn power_on(&mut self) {
        self.registers = [0; 128];
        self.registers[REG_OPMODE as usize] = 0x09;
        self.registers[REG_FRF_MSB as usize] = 0x6C;
        self.registers[REG_FRF_MID as usize] = 0x80;
        self.registers[REG_FRF_LSB as usize] = 0x00;
        self.registers[REG_PA_CONFIG as usize] = 0x4F;
        self.registers[REG_LNA as usize] = 0x20;
        self.registers[REG_FIFO_TX_BASE_ADDR as usize] = 0x80;
        self.registers[REG_MODEM_CONFIG_1 as usize] = 0x72;
        self.registers[REG_MODEM_CONFIG_2 as usize] = 0x70;
        self.registers[REG_PREAMBLE_LSB as usize] = 0x08;
        self.registers[REG_PAYLOAD_LENGTH as usize] = 0x01;
        self.registers[REG_VERSION as usize] = self.version;
        self.tx_polls_left = None;
    }

    fn mode_bits(&self) -> u8 {
        self.registers[REG_OPMODE as usize] & 0x07
    }

    fn irq(&self) -> IrqFlags {
        IrqFlags::from(self.registers[REG_IRQ_FLAGS as usize])
    }

    fn latch(&mut self, flags: IrqFlags) {
        self.registers[REG_IRQ_FLAGS as usize] |= flags.bits();
    }

    fn check_spi(&mut self) -> Result<(), HalError> {
        if self.fail_spi > 0 {
            self.fail_spi -= 1;
            return Err(HalError::Spi);
        }
        Ok(())
    }

    /// Clock one byte through the chip and return what it shifts out
    fn clock(&mut self, byte: u8) -> u8 {
        let target = match self.transaction.as_mut() {
            Some(tx) => tx.target,
            None => {
                self.unframed_bytes += 1;
                return 0;
            }
        };

        match target {
            None => {
                let access = if byte & SPI_WRITE_BIT != 0 {
                    Access::Write
                } else {
                    Access::Read
                };
                if let Some(tx) = self.transaction.as_mut() {
                    tx.target = Some((access, byte & SPI_ADDRESS_MASK));
                }
                0
            }
            Some((access, addr)) => {
                let offset = self.transaction.as_ref().map_or(0, |tx| tx.data.len());
                // Non-FIFO bursts walk the register map
                let addr = if addr == REG_FIFO {
                    REG_FIFO
                } else {
                    addr.wrapping_add(offset as u8) & SPI_ADDRESS_MASK
                };
                let value = match access {
                    Access::Write => {
                        self.write_register(addr, byte);
                        byte
                    }
                    Access::Read => self.read_register(addr),
                };
                if let Some(tx) = self.transaction.as_mut() {
                    tx.data.push(value);
                }
                value
            }
        }
    }

    fn read_register(&mut self, addr: u8) -> u8 {
        match addr {
            REG_FIFO => {
                let ptr = self.registers[REG_FIFO_ADDR_PTR as usize];
                self.registers[REG_FIFO_ADDR_PTR as usize] = ptr.wrapping_add(1);
                self.fifo[ptr as usize]
            }
            REG_IRQ_FLAGS => {
                self.step_transmitter();
                self.registers[REG_IRQ_FLAGS as usize]
            }
            _ => self.registers[addr as usize],
        }
    }

    fn write_register(&mut self, addr: u8, value: u8) {
        match addr {
            REG_FIFO => {
                let ptr = self.registers[REG_FIFO_ADDR_PTR as usize];
                self.fifo[ptr as usize] = value;
                self.registers[REG_FIFO_ADDR_PTR as usize] = ptr.wrapping_add(1);
            }
            REG_IRQ_FLAGS => {
                self.registers[REG_IRQ_FLAGS as usize] &= !value;
            }
            REG_VERSION | REG_RX_NB_BYTES | REG_FIFO_RX_CURRENT_ADDR => {}
            REG_OPMODE => {
                self.registers[REG_OPMODE as usize] = value;
                self.enter_mode(value & 0x07);
            }
            _ => self.registers[addr as usize] = value,
        }
    }

    fn enter_mode(&mut self, mode: u8) {
        match mode {
            MODE_TX => {
                let base = self.registers[REG_FIFO_TX_BASE_ADDR as usize] as usize;
                let len = self.registers[REG_PAYLOAD_LENGTH as usize] as usize;
                let packet = (0..len).map(|i| self.fifo[(base + i) % FIFO_SIZE]).collect();
                self.transmitted.push(packet);
                self.tx_polls_left = self.tx_done_after_polls;
            }
            MODE_RX_CONTINUOUS => {
                if !self.irq().rx_done() {
                    self.deliver_next_packet();
                }
            }
            _ => self.tx_polls_left = None,
        }
    }

    /// Count an IRQ read in TX mode and finish the transmission when due
    fn step_transmitter(&mut self) {
        if self.mode_bits() != MODE_TX {
            return;
        }
        match self.tx_polls_left {
            Some(0) => {
                self.latch(IrqFlags::TX_DONE);
                self.tx_polls_left = None;
                // The chip falls back to standby once the packet is out
                self.registers[REG_OPMODE as usize] =
                    (self.registers[REG_OPMODE as usize] & !0x07) | MODE_STDBY;
            }
            Some(n) => self.tx_polls_left = Some(n - 1),
            None => {}
        }
    }

    fn deliver_next_packet(&mut self) {
        let Some(packet) = self.inbound.pop_front() else {
            return;
        };
        let offset = packet.fifo_offset as usize;
        for (i, byte) in packet.payload.iter().enumerate() {
            self.fifo[(offset + i) % FIFO_SIZE] = *byte;
        }
        self.registers[REG_FIFO_RX_CURRENT_ADDR as usize] = packet.fifo_offset;
        self.registers[REG_RX_NB_BYTES as usize] = packet.payload.len().min(MAX_PAYLOAD_LEN) as u8;
        self.registers[REG_PKT_RSSI_VALUE as usize] = packet.rssi_raw;
        self.registers[REG_PKT_SNR_VALUE as usize] = packet.snr_raw;

        let mut flags = IrqFlags::RX_DONE | IrqFlags::VALID_HEADER;
        if packet.crc_error {
            flags |= IrqFlags::PAYLOAD_CRC_ERROR;
        }
        self.latch(flags);
    }

    fn select(&mut self, low: bool) {
        if !low && self.cs_low {
            self.finish_transaction();
        }
        self.ops.push(ChipOp::ChipSelect(!low));
        if low && !self.cs_low {
            self.transaction = Some(Transaction {
                target: None,
                data: Vec::new(),
            });
        }
        self.cs_low = low;
    }

    fn finish_transaction(&mut self) {
        let Some(tx) = self.transaction.take() else {
            return;
        };
        match tx.target {
            Some((Access::Write, REG_FIFO)) => self.ops.push(ChipOp::WriteFifo(tx.data)),
            Some((Access::Read, REG_FIFO)) => self.ops.push(ChipOp::ReadFifo(tx.data)),
            Some((access, addr)) => {
                for (i, value) in tx.data.into_iter().enumerate() {
                    let addr = addr.wrapping_add(i as u8) & SPI_ADDRESS_MASK;
                    self.ops.push(match access {
                        Access::Write => ChipOp::WriteRegister { addr, value },
                        Access::Read => ChipOp::ReadRegister { addr, value },
                    });
                }
            }
            None => {}
        }
    }

    fn drive_reset(&mut self, low: bool) {
        self.ops.push(ChipOp::Reset(!low));
        if self.reset_low && !low {
            self.power_on();
        }
        self.reset_low = low;
    }
}

/// Register-level RFM95 model implementing [`Hal`]
#[derive(Clone)]
pub struct SimulatedChip {
    state: Arc<Mutex<ChipState>>,
}

impl Default for SimulatedChip {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SimulatedChip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("SimulatedChip")
            .field("mode", &state.registers[REG_OPMODE as usize])
            .field("irq", &state.irq())
            .field("pending_rx", &state.inbound.len())
            .finish()
    }
}

impl SimulatedChip {
    /// Chip at power-on, answering version 0x12 and completing a
    /// transmission on the first IRQ poll
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ChipState::new())),
        }
    }

    fn state(&self) -> MutexGuard<'_, ChipState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Another handle onto the same chip
    pub fn handle(&self) -> Self {
        self.clone()
    }

    /// Report a different silicon revision (kept across resets)
    pub fn set_version(&self, version: u8) {
        let mut state = self.state();
        state.version = version;
        state.registers[REG_VERSION as usize] = version;
    }

    /// Number of IRQ reads in TX mode before TX_DONE latches; `None` never
    /// completes a transmission
    pub fn set_tx_done_after_polls(&self, polls: Option<u32>) {
        self.state().tx_done_after_polls = polls;
    }

    /// Queue a packet delivered the next time the host enters RX continuous
    pub fn queue_packet(&self, packet: InboundPacket) {
        self.state().inbound.push_back(packet);
    }

    /// Fail the next `count` SPI operations with [`HalError::Spi`]
    pub fn fail_next_spi(&self, count: u32) {
        self.state().fail_spi = count;
    }

    pub fn register(&self, addr: u8) -> u8 {
        self.state().registers[(addr & SPI_ADDRESS_MASK) as usize]
    }

    /// Poke a register directly, bypassing the bus and the op log
    pub fn set_register(&self, addr: u8, value: u8) {
        self.state().registers[(addr & SPI_ADDRESS_MASK) as usize] = value;
    }

    /// Latch interrupt flags as if the modem had raised them
    pub fn raise_irq(&self, flags: IrqFlags) {
        self.state().latch(flags);
    }

    pub fn irq_flags(&self) -> IrqFlags {
        self.state().irq()
    }

    pub fn fifo(&self) -> Vec<u8> {
        self.state().fifo.to_vec()
    }

    /// Packets that left the chip, in transmission order
    pub fn transmitted(&self) -> Vec<Vec<u8>> {
        self.state().transmitted.clone()
    }

    pub fn pending_packets(&self) -> usize {
        self.state().inbound.len()
    }

    pub fn ops(&self) -> Vec<ChipOp> {
        self.state().ops.clone()
    }

    /// Register and FIFO accesses only, without line edges and delays
    pub fn bus_ops(&self) -> Vec<ChipOp> {
        self.state()
            .ops
            .iter()
            .filter(|op| {
                !matches!(
                    op,
                    ChipOp::ChipSelect(_) | ChipOp::Reset(_) | ChipOp::Delay(_)
                )
            })
            .cloned()
            .collect()
    }

    pub fn clear_ops(&self) {
        self.state().ops.clear();
    }

    /// Bytes clocked while chip-select was high
    pub fn unframed_bytes(&self) -> usize {
        self.state().unframed_bytes
    }

    /// `true` while chip-select is asserted
    pub fn is_selected(&self) -> bool {
        self.state().cs_low
    }

    /// Sum of all delays requested by the host
    pub fn elapsed_ms(&self) -> u64 {
        self.state().elapsed_ms
    }
}

impl Hal for SimulatedChip {
    fn spi_transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), HalError> {
        if tx.len() != rx.len() {
            return Err(HalError::InvalidConfig(format!(
                "transfer length mismatch: tx {} rx {}",
                tx.len(),
                rx.len()
            )));
        }
        let mut state = self.state();
        state.check_spi()?;
        for (out, byte) in rx.iter_mut().zip(tx) {
            *out = state.clock(*byte);
        }
        Ok(())
    }

    fn spi_write(&mut self, data: &[u8]) -> Result<(), HalError> {
        let mut state = self.state();
        state.check_spi()?;
        for byte in data {
            state.clock(*byte);
        }
        Ok(())
    }

    fn spi_read(&mut self, buf: &mut [u8]) -> Result<(), HalError> {
        let mut state = self.state();
        state.check_spi()?;
        for out in buf.iter_mut() {
            *out = state.clock(SPI_FILLER);
        }
        Ok(())
    }

    fn gpio_write(&mut self, line: Line, high: bool) -> Result<(), HalError> {
        let mut state = self.state();
        match line {
            Line::ChipSelect => state.select(!high),
            Line::Reset => state.drive_reset(!high),
        }
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        let mut state = self.state();
        state.ops.push(ChipOp::Delay(ms));
        state.elapsed_ms += ms as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(chip: &mut SimulatedChip, addr: u8, value: u8) {
        chip.gpio_write(Line::ChipSelect, false).unwrap();
        chip.spi_write(&[addr | SPI_WRITE_BIT, value]).unwrap();
        chip.gpio_write(Line::ChipSelect, true).unwrap();
    }

    fn read(chip: &mut SimulatedChip, addr: u8) -> u8 {
        let mut rx = [0u8; 2];
        chip.gpio_write(Line::ChipSelect, false).unwrap();
        chip.spi_transfer(&[addr, SPI_FILLER], &mut rx).unwrap();
        chip.gpio_write(Line::ChipSelect, true).unwrap();
        rx[1]
    }

    #[test]
    fn test_version_register() {
        let mut chip = SimulatedChip::new();
        assert_eq!(read(&mut chip, REG_VERSION), 0x12);
    }

    #[test]
    fn test_irq_write_one_to_clear() {
        let mut chip = SimulatedChip::new();
        chip.raise_irq(IrqFlags::RX_DONE | IrqFlags::PAYLOAD_CRC_ERROR);
        write(&mut chip, REG_IRQ_FLAGS, IrqFlags::RX_DONE.bits());
        assert_eq!(chip.irq_flags(), IrqFlags::PAYLOAD_CRC_ERROR);
    }

    #[test]
    fn test_fifo_pointer_auto_increments() {
        let mut chip = SimulatedChip::new();
        write(&mut chip, REG_FIFO_ADDR_PTR, 0x10);
        chip.gpio_write(Line::ChipSelect, false).unwrap();
        chip.spi_write(&[REG_FIFO | SPI_WRITE_BIT, 1, 2, 3]).unwrap();
        chip.gpio_write(Line::ChipSelect, true).unwrap();

        assert_eq!(&chip.fifo()[0x10..0x13], &[1, 2, 3]);
        assert_eq!(chip.register(REG_FIFO_ADDR_PTR), 0x13);
        assert!(chip.ops().contains(&ChipOp::WriteFifo(vec![1, 2, 3])));
    }

    #[test]
    fn test_bytes_without_chip_select_are_ignored() {
        let mut chip = SimulatedChip::new();
        chip.spi_write(&[REG_PA_CONFIG | SPI_WRITE_BIT, 0xFF]).unwrap();
        assert_eq!(chip.unframed_bytes(), 2);
        assert_eq!(chip.register(REG_PA_CONFIG), 0x4F);
    }

    #[test]
    fn test_reset_restores_power_on_state() {
        let mut chip = SimulatedChip::new();
        write(&mut chip, REG_PA_CONFIG, 0x8F);
        chip.gpio_write(Line::Reset, false).unwrap();
        chip.gpio_write(Line::Reset, true).unwrap();
        assert_eq!(chip.register(REG_PA_CONFIG), 0x4F);
        assert_eq!(chip.register(REG_VERSION), 0x12);
    }

    #[test]
    fn test_transmit_completes_after_configured_polls() {
        let mut chip = SimulatedChip::new();
        chip.set_tx_done_after_polls(Some(2));
        write(&mut chip, REG_PAYLOAD_LENGTH, 0);
        write(&mut chip, REG_OPMODE, MODE_LONG_RANGE | MODE_TX);

        assert!(!IrqFlags::from(read(&mut chip, REG_IRQ_FLAGS)).tx_done());
        assert!(!IrqFlags::from(read(&mut chip, REG_IRQ_FLAGS)).tx_done());
        assert!(IrqFlags::from(read(&mut chip, REG_IRQ_FLAGS)).tx_done());
        assert_eq!(chip.register(REG_OPMODE), MODE_LONG_RANGE | MODE_STDBY);
    }

    #[test]
    fn test_injected_spi_failure() {
        let mut chip = SimulatedChip::new();
        chip.fail_next_spi(1);
        assert_eq!(chip.spi_write(&[0x00]), Err(HalError::Spi));
        assert!(chip.spi_write(&[0x00]).is_ok());
    }
}
