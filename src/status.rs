//! The decoded device status cached on a [`crate::device::Device`] (§3).
//!
//! This module holds data types and pure byte-decoding; the SPI
//! transactions that populate them live in `commands/stats.rs`.

use std::time::Instant;

use crate::error::RadioError;

/// Bits 6:4 of the status byte returned by `GetStatus` (and leading every
/// other response). DS table 13-76.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ChipMode {
    StdbyRc = 2,
    StdbyXosc = 3,
    Fs = 4,
    Rx = 5,
    Tx = 6,
}

/// Bits 3:1 of the status byte. DS table 13-76.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CommandStatus {
    DataAvailable = 2,
    CmdTimeout = 3,
    CmdProcessingError = 4,
    CmdExecuteError = 5,
    TxDone = 6,
}

/// Decodes the status byte shared by `GetStatus` and, as its leading byte,
/// every other response (§6).
pub fn decode_status_byte(byte: u8) -> Result<(ChipMode, CommandStatus), RadioError> {
    let chip_mode_bits = (byte >> 4) & 0b111;
    let command_bits = (byte >> 1) & 0b111;

    let chip_mode = match chip_mode_bits {
        2 => ChipMode::StdbyRc,
        3 => ChipMode::StdbyXosc,
        4 => ChipMode::Fs,
        5 => ChipMode::Rx,
        6 => ChipMode::Tx,
        _ => {
            return Err(RadioError::UnexpectedStatus {
                chip_mode: None,
                command_status: None,
            })
        }
    };

    let command_status = match command_bits {
        2 => CommandStatus::DataAvailable,
        3 => CommandStatus::CmdTimeout,
        4 => CommandStatus::CmdProcessingError,
        5 => CommandStatus::CmdExecuteError,
        6 => CommandStatus::TxDone,
        _ => {
            return Err(RadioError::UnexpectedStatus {
                chip_mode: Some(chip_mode),
                command_status: None,
            })
        }
    };

    Ok((chip_mode, command_status))
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BufferStatus {
    pub rx_payload_length: u8,
    pub rx_start_pointer: u8,
}

/// DS §13.5.5. `header_errors` and `length_errors` occupy the same wire
/// position (bytes 6:7); whichever the active modem defines is populated,
/// the other retains its last cached value (spec §9).
#[derive(Clone, Copy, Debug, Default)]
pub struct PacketStats {
    pub total_received: u16,
    pub crc_errors: u16,
    pub header_errors: u16,
    pub length_errors: u16,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PacketStatus {
    /// dBm.
    pub signal_strength: f32,
    pub snr_ratio: f32,
    /// dBm.
    pub denoised_signal_strength: f32,
    pub stats: PacketStats,
}

/// DS §13.5.1, table 13-86. Bits of the `GetDeviceErrors` bitset.
#[repr(u16)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DeviceErrorBit {
    Rc64kCalib = 0,
    Rc13mCalib = 1,
    PllCalib = 2,
    AdcCalib = 3,
    ImgCalib = 4,
    XoscStart = 5,
    PllLock = 6,
    PaRamp = 7,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeviceErrors(pub u16);

impl DeviceErrors {
    pub fn contains(self, bit: DeviceErrorBit) -> bool {
        self.0 & (1 << bit as u16) != 0
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Modem {
    pub chip_mode: ChipMode,
    pub command: CommandStatus,
}

impl Default for Modem {
    fn default() -> Self {
        Self {
            chip_mode: ChipMode::StdbyRc,
            command: CommandStatus::DataAvailable,
        }
    }
}

/// Write-through cache of the most recently decoded device status (§3).
/// An implementation may drop this entirely if callers always read return
/// values directly; kept here so `Device` can surface the last known state
/// between operations. `updated_at` is diagnostic only and not part of any
/// invariant.
#[derive(Clone, Debug)]
pub struct Status {
    pub modem: Modem,
    pub modem_updated_at: Instant,
    pub buffer: BufferStatus,
    pub buffer_updated_at: Instant,
    pub packet: PacketStatus,
    pub packet_updated_at: Instant,
    pub error: DeviceErrors,
    pub error_updated_at: Instant,
}

impl Default for Status {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            modem: Modem::default(),
            modem_updated_at: now,
            buffer: BufferStatus::default(),
            buffer_updated_at: now,
            packet: PacketStatus::default(),
            packet_updated_at: now,
            error: DeviceErrors::default(),
            error_updated_at: now,
        }
    }
}
