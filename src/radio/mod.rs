pub mod driver;
pub mod frequency;
pub mod hal;
pub mod irq;
pub mod modem;
pub mod poll;
pub mod registers;
pub mod transport;

pub use driver::{DriverError, Rfm95Driver, RxOutcome, SignalQuality, DEFAULT_FREQUENCY_HZ};
pub use irq::IrqFlags;
pub use modem::Mode;
pub use poll::{CancelToken, PollPolicy};
