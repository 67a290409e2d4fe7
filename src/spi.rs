//! SPI framing layer: busy-line handshake, chip-select choreography, and
//! the register/buffer read-modify-write helpers every command builds on.

use std::thread::sleep;
use std::time::{Duration, Instant};

use log::{trace, warn};

use crate::error::RadioError;
use crate::gpio::GpioLine;
use crate::types::{OpCode, Register};

const RESET_PULSE: Duration = Duration::from_millis(1);

/// A full-duplex byte exchange capability, abstracted so the driver doesn't
/// depend on a specific bus implementation. Deliberately narrower than
/// `embedded_hal::spi::SpiDevice`: that trait drives chip-select itself,
/// which would collide with the busy-then-CS sequencing this layer
/// requires.
pub trait SpiBus: Send {
    fn transfer(&mut self, write: &[u8], read: &mut [u8]) -> Result<(), RadioError>;
}

/// Adapts an `embedded-hal` 1.0 `SpiBus<u8>` into the local [`SpiBus`]
/// trait.
pub struct EhalSpiBus<S> {
    bus: S,
}

impl<S> EhalSpiBus<S> {
    pub fn new(bus: S) -> Self {
        Self { bus }
    }
}

impl<S> SpiBus for EhalSpiBus<S>
where
    S: embedded_hal::spi::SpiBus<u8> + Send,
{
    fn transfer(&mut self, write: &[u8], read: &mut [u8]) -> Result<(), RadioError> {
        self.bus
            .transfer(read, write)
            .map_err(|e| RadioError::Spi(format!("{e:?}")))
    }
}

/// Owns the bus handle and the three GPIO lines ("busy", "reset", optional
/// "cs") that every transaction coordinates around.
pub struct Interface {
    bus: Box<dyn SpiBus>,
    reset: Box<dyn GpioLine>,
    busy: Box<dyn GpioLine>,
    cs: Option<Box<dyn GpioLine>>,
    pub busy_poll_interval: Duration,
    pub busy_timeout: Duration,
    pub reset_busy_timeout: Duration,
}

impl Interface {
    pub fn new(
        bus: Box<dyn SpiBus>,
        reset: Box<dyn GpioLine>,
        busy: Box<dyn GpioLine>,
        cs: Option<Box<dyn GpioLine>>,
        busy_poll_interval: Duration,
        busy_timeout: Duration,
        reset_busy_timeout: Duration,
    ) -> Self {
        Self {
            bus,
            reset,
            busy,
            cs,
            busy_poll_interval,
            busy_timeout,
            reset_busy_timeout,
        }
    }

    /// Polls the busy line at `busy_poll_interval` until it reads low, or
    /// fails with `Busy` once `timeout` elapses (§4.1).
    fn wait_on_busy(&mut self, timeout: Duration) -> Result<(), RadioError> {
        let start = Instant::now();
        while self.busy.is_high()? {
            if start.elapsed() >= timeout {
                warn!("busy line did not clear within {timeout:?}");
                return Err(RadioError::Busy);
            }
            sleep(self.busy_poll_interval);
        }
        Ok(())
    }

    fn cs_low(&mut self) -> Result<(), RadioError> {
        match &mut self.cs {
            Some(cs) => cs.set_low(),
            None => Ok(()),
        }
    }

    fn cs_high(&mut self) -> Result<(), RadioError> {
        match &mut self.cs {
            Some(cs) => cs.set_high(),
            None => Ok(()),
        }
    }

    /// Waits on busy, drives chip-select low for one full-duplex exchange,
    /// and restores chip-select high on every exit path including failure
    /// (§3 invariants, §4.1).
    pub fn transact(&mut self, write: &[u8]) -> Result<Vec<u8>, RadioError> {
        self.wait_on_busy(self.busy_timeout)?;

        self.cs_low()?;
        let mut read = vec![0u8; write.len()];
        let result = self.bus.transfer(write, &mut read);
        self.cs_high()?;

        result?;
        trace!("spi transact: mosi={write:02x?} miso={read:02x?}");
        Ok(read)
    }

    /// `ReadRegister`: `[ReadRegister, addr_hi, addr_lo, NOP, NOP…]`, MISO
    /// captured from byte 4 onward. Returns the chip status byte (byte 0
    /// of the response) alongside the payload.
    pub fn read_register(&mut self, addr: u16, n: usize) -> Result<(u8, Vec<u8>), RadioError> {
        let addr_bytes = addr.to_be_bytes();
        let mut write = vec![OpCode::ReadRegister as u8, addr_bytes[0], addr_bytes[1], 0];
        write.extend(std::iter::repeat(0u8).take(n));
        let resp = self.transact(&write)?;
        Ok((resp[0], resp[4..].to_vec()))
    }

    /// `WriteRegister`: `[WriteRegister, addr_hi, addr_lo, bytes…]`.
    pub fn write_register(&mut self, addr: u16, bytes: &[u8]) -> Result<u8, RadioError> {
        let addr_bytes = addr.to_be_bytes();
        let mut write = vec![OpCode::WriteRegister as u8, addr_bytes[0], addr_bytes[1]];
        write.extend_from_slice(bytes);
        let resp = self.transact(&write)?;
        Ok(resp[0])
    }

    /// Convenience for the single named registers the errata engine and
    /// sync-word setup touch.
    pub fn read_named_register(&mut self, reg: Register, n: usize) -> Result<(u8, Vec<u8>), RadioError> {
        self.read_register(reg as u16, n)
    }

    pub fn write_named_register(&mut self, reg: Register, bytes: &[u8]) -> Result<u8, RadioError> {
        self.write_register(reg as u16, bytes)
    }

    /// `ReadBuffer`: a single NOP stall byte after the offset.
    pub fn read_buffer(&mut self, offset: u8, n: usize) -> Result<(u8, Vec<u8>), RadioError> {
        let mut write = vec![OpCode::ReadBuffer as u8, offset, 0];
        write.extend(std::iter::repeat(0u8).take(n));
        let resp = self.transact(&write)?;
        Ok((resp[0], resp[3..].to_vec()))
    }

    /// `WriteBuffer`: `[WriteBuffer, offset, bytes…]`.
    pub fn write_buffer(&mut self, offset: u8, bytes: &[u8]) -> Result<u8, RadioError> {
        let mut write = vec![OpCode::WriteBuffer as u8, offset];
        write.extend_from_slice(bytes);
        let resp = self.transact(&write)?;
        Ok(resp[0])
    }

    /// Drives chip-select high, pulses reset low for ≥1 ms, then waits for
    /// busy to clear within `reset_busy_timeout` (§4.1 "Hard reset").
    pub fn hard_reset(&mut self) -> Result<(), RadioError> {
        self.cs_high()?;
        self.reset.set_low()?;
        sleep(RESET_PULSE);
        self.reset.set_high()?;
        self.wait_on_busy(self.reset_busy_timeout)
    }
}

/// Test-only fakes shared across `commands/*` unit tests, so each module
/// doesn't reinvent a fake bus/busy-line pair.
#[cfg(test)]
pub(crate) mod tests_support {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct FakeLine {
        high: Rc<RefCell<bool>>,
    }

    impl GpioLine for FakeLine {
        fn set_high(&mut self) -> Result<(), RadioError> {
            *self.high.borrow_mut() = true;
            Ok(())
        }
        fn set_low(&mut self) -> Result<(), RadioError> {
            *self.high.borrow_mut() = false;
            Ok(())
        }
        fn is_high(&mut self) -> Result<bool, RadioError> {
            Ok(*self.high.borrow())
        }
    }

    struct RecordingBus {
        response: Vec<u8>,
        last_write: Rc<RefCell<Vec<u8>>>,
    }

    impl SpiBus for RecordingBus {
        fn transfer(&mut self, write: &[u8], read: &mut [u8]) -> Result<(), RadioError> {
            *self.last_write.borrow_mut() = write.to_vec();
            let n = read.len().min(self.response.len());
            read[..n].copy_from_slice(&self.response[..n]);
            Ok(())
        }
    }

    /// A fake `Interface` plus a handle to read back the last MOSI frame it
    /// sent, for asserting command encoders produce the exact bytes §4.3
    /// and §8 specify.
    pub struct TestHarness {
        pub iface: Interface,
        last_write: Rc<RefCell<Vec<u8>>>,
    }

    impl TestHarness {
        pub fn last_mosi(&self) -> Vec<u8> {
            self.last_write.borrow().clone()
        }
    }

    /// `response` is the fixed MISO payload every transaction on this fake
    /// bus returns (padded/truncated to the MOSI length).
    pub fn fake_interface(response: Vec<u8>) -> TestHarness {
        let last_write = Rc::new(RefCell::new(Vec::new()));
        let iface = Interface::new(
            Box::new(RecordingBus {
                response,
                last_write: last_write.clone(),
            }),
            Box::new(FakeLine { high: Rc::new(RefCell::new(true)) }),
            Box::new(FakeLine { high: Rc::new(RefCell::new(false)) }),
            None,
            Duration::from_millis(1),
            Duration::from_millis(50),
            Duration::from_millis(50),
        );
        TestHarness { iface, last_write }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct FakeLine {
        high: Rc<RefCell<bool>>,
    }

    impl GpioLine for FakeLine {
        fn set_high(&mut self) -> Result<(), RadioError> {
            *self.high.borrow_mut() = true;
            Ok(())
        }
        fn set_low(&mut self) -> Result<(), RadioError> {
            *self.high.borrow_mut() = false;
            Ok(())
        }
        fn is_high(&mut self) -> Result<bool, RadioError> {
            Ok(*self.high.borrow())
        }
    }

    struct FakeBus {
        response: Vec<u8>,
    }

    impl SpiBus for FakeBus {
        fn transfer(&mut self, write: &[u8], read: &mut [u8]) -> Result<(), RadioError> {
            assert_eq!(write.len(), read.len());
            read.copy_from_slice(&self.response[..read.len()]);
            Ok(())
        }
    }

    fn make_interface(response: Vec<u8>) -> Interface {
        let busy_state = Rc::new(RefCell::new(false));
        Interface::new(
            Box::new(FakeBus { response }),
            Box::new(FakeLine { high: Rc::new(RefCell::new(true)) }),
            Box::new(FakeLine { high: busy_state }),
            None,
            Duration::from_millis(1),
            Duration::from_millis(50),
            Duration::from_millis(50),
        )
    }

    #[test]
    fn transact_returns_full_response() {
        let mut iface = make_interface(vec![0x00, 0xAA, 0xBB, 0xCC]);
        let resp = iface.transact(&[0x13, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(resp, vec![0x00, 0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn read_register_splits_status_and_payload() {
        let mut iface = make_interface(vec![0x00, 0, 0, 0, 0x42]);
        let (status, payload) = iface.read_register(0x0736, 1).unwrap();
        assert_eq!(status, 0x00);
        assert_eq!(payload, vec![0x42]);
    }

    #[test]
    fn busy_timeout_surfaces_busy_error() {
        let mut iface = Interface::new(
            Box::new(FakeBus { response: vec![0; 4] }),
            Box::new(FakeLine { high: Rc::new(RefCell::new(true)) }),
            Box::new(FakeLine { high: Rc::new(RefCell::new(true)) }),
            None,
            Duration::from_millis(1),
            Duration::from_millis(5),
            Duration::from_millis(5),
        );
        let err = iface.transact(&[0x00]).unwrap_err();
        assert!(matches!(err, RadioError::Busy));
    }
}
