//! Host-side driver for the Semtech SX1261/SX1262 sub-GHz LoRa/FSK
//! transceivers.
//!
//! This crate is the command codec and driver state machine described by
//! DS §13: it serializes modem configuration into the SPI frames the
//! silicon expects, decodes the status bytes it returns, coordinates the
//! chip-select/reset/busy/DIO1 GPIO handshake around every transaction,
//! applies the documented errata at the right moments, and exposes a
//! transmit/receive mailbox an application drives without touching
//! registers directly.
//!
//! ```no_run
//! use sx126x_driver::{Config, Device, PinRegistry, SpiBus};
//!
//! # fn example(bus: Box<dyn SpiBus>, registry: &mut dyn PinRegistry) -> Result<(), sx126x_driver::RadioError> {
//! let config = Config::default();
//! let mut device = Device::new(config, bus, registry)?;
//!
//! device.enqueue_tx(b"hello".to_vec())?;
//! while device.service(std::time::Duration::from_millis(100))? {}
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod config;
mod device;
pub mod errata;
pub mod error;
pub mod gpio;
pub mod mailbox;
pub mod reducer;
pub mod spi;
pub mod status;
pub mod types;

pub use config::{CadConfig, Config, PinNames, Workarounds};
pub use device::{Device, Payload};
pub use error::RadioError;
pub use gpio::{GpioLine, GpioPins, PinMode, PinRegistry};
pub use mailbox::{mailbox, MailboxReceiver, MailboxSender};
pub use spi::{Interface, SpiBus};
pub use status::Status;
pub use types::{ChipVariant, Modem};
