//! GPIO controller: acquires the driver's five control lines. The timed
//! reset pulse itself lives in `Interface::hard_reset` (`spi.rs`), which
//! also owns the post-reset busy wait the pulse must be followed by.

use log::debug;

use crate::config::PinNames;
use crate::error::RadioError;

/// The direction/pull/edge a line is configured with at acquisition time.
/// Requested once, at construction, per §4.2 — never changed afterward.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PinMode {
    OutputHigh,
    OutputLow,
    InputNoPull,
    /// Pull-down input with rising-edge detection, used for `dio1`.
    InputPullDownRisingEdge,
}

/// A single GPIO line, abstracted over whatever host adapter backs it.
/// Object-safe so `GpioPins` can hold heterogeneous line types behind one
/// vtable, the same way `SpiBus` (`spi.rs`) abstracts the bus.
pub trait GpioLine: Send {
    fn set_high(&mut self) -> Result<(), RadioError>;
    fn set_low(&mut self) -> Result<(), RadioError>;
    fn is_high(&mut self) -> Result<bool, RadioError>;
}

/// Resolves a named pin into a configured line. Implemented by the host;
/// the driver never creates or owns the underlying device node (§6).
pub trait PinRegistry {
    fn get(&mut self, name: &str, mode: PinMode) -> Result<Box<dyn GpioLine>, RadioError>;
}

/// Adapts an `embedded-hal` 1.0 pin pair into a [`GpioLine`]. Most host
/// adapters can hand a `PinRegistry::get` implementation one of these
/// directly rather than writing a bespoke wrapper.
pub struct EhalPin<P> {
    pin: P,
}

impl<P> EhalPin<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P> GpioLine for EhalPin<P>
where
    P: embedded_hal::digital::OutputPin + embedded_hal::digital::InputPin + Send,
{
    fn set_high(&mut self) -> Result<(), RadioError> {
        self.pin
            .set_high()
            .map_err(|e| RadioError::Gpio(format!("{e:?}")))
    }

    fn set_low(&mut self) -> Result<(), RadioError> {
        self.pin
            .set_low()
            .map_err(|e| RadioError::Gpio(format!("{e:?}")))
    }

    fn is_high(&mut self) -> Result<bool, RadioError> {
        self.pin
            .is_high()
            .map_err(|e| RadioError::Gpio(format!("{e:?}")))
    }
}

/// The six named lines the driver coordinates around every SPI transaction
/// and the bring-up/shutdown sequence. `rx_en` and `cs` are optional: not
/// every board switches Rx separately from Tx, and not every SPI primitive
/// needs the driver to manage chip-select itself.
pub struct GpioPins {
    pub reset: Box<dyn GpioLine>,
    pub busy: Box<dyn GpioLine>,
    pub dio1: Box<dyn GpioLine>,
    pub tx_en: Box<dyn GpioLine>,
    pub rx_en: Option<Box<dyn GpioLine>>,
    pub cs: Option<Box<dyn GpioLine>>,
}

impl GpioPins {
    /// Resolves all required lines (and any optional ones named in
    /// `names`), setting each line's mode exactly once. Missing required
    /// pins surface as `RadioError::PinNotFound`.
    pub fn acquire(
        registry: &mut dyn PinRegistry,
        names: &PinNames,
    ) -> Result<Self, RadioError> {
        let reset = registry.get(&names.reset, PinMode::OutputHigh)?;
        let busy = registry.get(&names.busy, PinMode::InputNoPull)?;
        let dio1 = registry.get(&names.dio1, PinMode::InputPullDownRisingEdge)?;
        let tx_en = registry.get(&names.tx_en, PinMode::OutputLow)?;

        let rx_en = names
            .rx_en
            .as_ref()
            .map(|name| registry.get(name, PinMode::OutputLow))
            .transpose()?;

        let cs = names
            .cs
            .as_ref()
            .map(|name| registry.get(name, PinMode::OutputHigh))
            .transpose()?;

        debug!("gpio lines acquired: reset/busy/dio1/tx_en required, rx_en={}, cs={}",
            rx_en.is_some(), cs.is_some());

        Ok(Self {
            reset,
            busy,
            dio1,
            tx_en,
            rx_en,
            cs,
        })
    }
}
