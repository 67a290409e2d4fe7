//! Opcodes, register addresses, and the small enumerations the command codec
//! packs onto the wire. Purely declarative — no SPI or GPIO handling lives
//! here.

use serde::{Deserialize, Serialize};

/// DS §13.1-13.6. One variant per command this driver issues.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[allow(dead_code)]
pub enum OpCode {
    ResetStats = 0x00,
    ClearIrqStatus = 0x02,
    ClearDeviceErrors = 0x07,
    SetDioIrqParams = 0x08,
    GetStats = 0x10,
    GetPacketType = 0x11,
    GetIrqStatus = 0x12,
    GetRxBufferStatus = 0x13,
    GetPacketStatus = 0x14,
    GetRssiInst = 0x15,
    GetDeviceErrors = 0x17,
    WriteRegister = 0x0D,
    ReadRegister = 0x1D,
    WriteBuffer = 0x0E,
    ReadBuffer = 0x1E,
    SetStandby = 0x80,
    SetRx = 0x82,
    SetTx = 0x83,
    SetSleep = 0x84,
    SetRfFrequency = 0x86,
    SetCadParams = 0x88,
    Calibrate = 0x89,
    SetPacketType = 0x8A,
    SetModulationParams = 0x8B,
    SetPacketParams = 0x8C,
    SetTxParams = 0x8E,
    SetBufferBaseAddress = 0x8F,
    SetRxDutyCycle = 0x94,
    SetPaConfig = 0x95,
    SetRegulatorMode = 0x96,
    SetDIO3AsTCXOCtrl = 0x97,
    CalibrateImage = 0x98,
    SetLoRaSymbNumTimeout = 0xA0,
    SetRxTxFallbackMode = 0x93,
    SetDIO2AsRfSwitchCtrl = 0x9D,
    StopTimerOnPreamble = 0x9F,
    SetFs = 0xC1,
    SetCAD = 0xC5,
    GetStatus = 0xC0,
    SetTxContinuousWave = 0xD1,
    SetTxInfinitePreamble = 0xD2,
}

/// Register addresses referenced outside the opcode table (DS §13/§6).
#[repr(u16)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[allow(dead_code)]
pub enum Register {
    FskSyncWord = 0x06C0,
    IqPolarity = 0x0736,
    LoraSyncWordMsb = 0x0740,
    TxModulation = 0x0889,
    TxClamp = 0x08D8,
    RtcControl = 0x0902,
    EventMask = 0x0944,
}

/// DS §13.4.2, table 13-38. Must be set before any other configuration
/// command, in `STDBY_RC` mode.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PacketType {
    Gfsk = 0,
    Lora = 1,
}

/// Which command/IRQ subset is legal. Mirrors `Config::modem`.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Modem {
    Lora,
    Fsk,
}

/// Selects the per-variant PA auto-tune table and transmit power bounds
/// (§4.5).
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ChipVariant {
    Sx1261,
    Sx1262,
}

impl ChipVariant {
    /// Inclusive (min, max) transmit power in dBm, DS table 13-21.
    pub fn power_range(self) -> (i8, i8) {
        match self {
            Self::Sx1261 => (-17, 15),
            Self::Sx1262 => (-9, 22),
        }
    }
}

/// DS §13.1.15/Table 13-41. Power ramp time; names carry the time in µs.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[allow(dead_code)]
pub enum RampTime {
    R10 = 0,
    R20 = 1,
    R40 = 2,
    R80 = 3,
    R200 = 4,
    R800 = 5,
    R1700 = 6,
    R3400 = 7,
}

impl RampTime {
    /// Unknown ramp times default to 200 µs (§4.3 clamping policy).
    pub fn from_us(us: u32) -> Self {
        match us {
            10 => Self::R10,
            20 => Self::R20,
            40 => Self::R40,
            80 => Self::R80,
            200 => Self::R200,
            800 => Self::R800,
            1700 => Self::R1700,
            3400 => Self::R3400,
            _ => Self::R200,
        }
    }
}

/// DS §13.1.1, table 13-2. Bit 0 selects RTC timeout wake-up, bit 2 selects
/// warm (configuration-retaining) over cold start.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum SleepMode {
    ColdStart = 0b000,
    ColdStartRtc = 0b001,
    WarmStart = 0b100,
    WarmStartRtc = 0b101,
}

/// DS §13.1.2, table 13-5.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum StandbyMode {
    Rc = 0,
    Xosc = 1,
}

/// DS §13.4.1, table 13-36. `exit_mode` for `SetCadParams`.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum CadExitMode {
    Standby = 0,
    Rx = 1,
}

/// DS §13.3.6. Voltage supplied to an external TCXO via DIO3.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[allow(dead_code)]
pub enum TcxoVoltage {
    V1_6 = 0x00,
    V1_7 = 0x01,
    V1_8 = 0x02,
    V2_2 = 0x03,
    V2_4 = 0x04,
    V2_7 = 0x05,
    V3_0 = 0x06,
    V3_3 = 0x07,
}

/// DS §13.1.12, table 13-29. Bit positions in the `Calibrate` mask and in
/// the IRQ mask words. Bit indices are shared between the two uses at the
/// source level only by coincidence; `Calibrate` uses its own mask layout.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[allow(dead_code)]
pub enum CalibParam {
    Rc64k = 0,
    Rc13m = 1,
    Pll = 2,
    Adc1 = 3,
    Adc2 = 4,
    Image = 5,
}

/// All six calibration blocks, the mask `Calibrate(0x7F)` equivalent used
/// during bring-up.
pub const CALIBRATE_ALL: u8 = 0x7F;

/// DS §13.3.2, table 13-29. One bit per interrupt condition. `val()` is the
/// bit index used on the wire for both SX1261/SX1262 (no 6x/8x bifurcation
/// on this family).
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IrqBit {
    TxDone = 0,
    RxDone = 1,
    PreambleDetected = 2,
    SyncWordValid = 3,
    HeaderValid = 4,
    HeaderErr = 5,
    CrcErr = 6,
    CadDone = 7,
    CadDetected = 8,
    Timeout = 9,
}

impl IrqBit {
    /// Whether this bit may be set/cleared/read while `modem` is active
    /// (§4.4).
    pub fn legal_for(self, modem: Modem) -> bool {
        match self {
            Self::SyncWordValid => modem == Modem::Fsk,
            Self::HeaderValid | Self::HeaderErr | Self::CadDone | Self::CadDetected => {
                modem == Modem::Lora
            }
            _ => true,
        }
    }
}

/// A composed IRQ mask as used by `SetDioIrqParams`/`ClearIrqStatus`/
/// `GetIrqStatus`. `0x03FF` sets every defined bit.
pub const IRQ_ALL: u16 = 0x03FF;

/// DS §13.4.1, table 13-37. Calibration frequency byte pairs for
/// `CalibrateImage`, keyed by the RF band the operating frequency falls in.
/// Unmatched frequencies use the widest band that contains them; frequencies
/// outside every documented band fall back to the 902-928 MHz entry, the
/// most common ISM deployment for this family.
pub fn image_calib_bytes(freq_hz: u32) -> (u8, u8) {
    let mhz = freq_hz / 1_000_000;
    match mhz {
        430..=440 => (0x6B, 0x6F),
        470..=510 => (0x75, 0x81),
        779..=787 => (0xC1, 0xC5),
        863..=870 => (0xD7, 0xDB),
        902..=928 => (0xE1, 0xE9),
        _ => (0xE1, 0xE9),
    }
}
