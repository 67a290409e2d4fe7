//! Error kinds surfaced by the driver.

use crate::status::{CommandStatus, ChipMode};

/// Every way a call into this crate can fail.
///
/// Errors raised during [`crate::Device::new`]'s bring-up sequence are fatal to the
/// session: the constructor tears the chip down to sleep and returns the original
/// error. Errors raised by a single operation after bring-up are returned to the
/// caller without closing the session.
#[derive(Debug, thiserror::Error)]
pub enum RadioError {
    /// Construction was refused because `Config::enable` was false.
    #[error("radio disabled in config")]
    Disabled,

    /// A required GPIO line was not present in the caller's pin registry.
    #[error("pin not found: {0}")]
    PinNotFound(&'static str),

    /// A GPIO line was found but could not be put into the direction/mode the
    /// driver requires.
    #[error("failed to configure pin {0}")]
    PinConfigFailed(&'static str),

    /// The busy line did not go low within the configured timeout.
    #[error("busy line did not clear within timeout")]
    Busy,

    /// The underlying SPI primitive reported an error.
    #[error("spi transaction failed: {0}")]
    Spi(String),

    /// A GPIO primitive reported an error.
    #[error("gpio operation failed: {0}")]
    Gpio(String),

    /// An interrupt bit incompatible with the active modem was requested for
    /// `SetDioIrqParams`, `ClearIrqStatus`, or decoded from `GetIrqStatus`.
    #[error("irq bit illegal for active modem")]
    IllegalIrqForModem,

    /// More than three DIO mask values were supplied to `SetDioIrqParams`.
    #[error("too many dio masks supplied (max 3)")]
    TooManyDioMasks,

    /// `Config::modem` carried an unsupported enumerant.
    #[error("unknown modem in config")]
    UnknownModem,

    /// A bounded mailbox was full when a non-blocking enqueue was attempted.
    #[error("queue full")]
    QueueFull,

    /// A bounded mailbox produced nothing before the caller's timeout elapsed.
    #[error("timed out waiting for a received payload")]
    RxTimeout,

    /// An errata routine was invoked in a state that doesn't admit it. Not
    /// fatal: the session continues.
    #[error("errata precondition not met: {0}")]
    ErrataPrecondition(&'static str),

    /// `GetStatus` returned an operating mode or command status outside the
    /// documented range.
    #[error("unexpected status byte: chip_mode={chip_mode:?} command_status={command_status:?}")]
    UnexpectedStatus {
        chip_mode: Option<ChipMode>,
        command_status: Option<CommandStatus>,
    },

    /// Configuration failed clamping/validation in a way that cannot be
    /// silently defaulted (e.g. a required field entirely absent).
    #[error("invalid configuration: {0}")]
    Config(String),
}
