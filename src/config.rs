//! Process-wide configuration handed to the driver at construction.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{CadExitMode, ChipVariant, Modem, SleepMode, StandbyMode};

/// Named GPIO identifiers, resolved at construction through the caller's
/// pin registry (§6). `tx_en`, `reset`, `busy`, and `dio1` are required;
/// `rx_en` and `cs` are optional depending on the board's RF switch and SPI
/// wiring.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PinNames {
    pub reset: String,
    pub busy: String,
    pub dio1: String,
    pub tx_en: String,
    pub rx_en: Option<String>,
    pub cs: Option<String>,
}

/// Channel Activity Detection parameters for `SetCadParams`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CadConfig {
    /// One of {1, 2, 4, 8, 16} symbols.
    pub symbol_number: u8,
    pub detection_peak: u8,
    pub detection_minimum: u8,
    pub exit_mode: CadExitMode,
    /// 24-bit timeout.
    pub timeout: u32,
}

impl Default for CadConfig {
    fn default() -> Self {
        Self {
            symbol_number: 4,
            detection_peak: 22,
            detection_minimum: 10,
            exit_mode: CadExitMode::Standby,
            timeout: 0,
        }
    }
}

/// Which of the four named silicon errata (§4.8) to apply. Independent of
/// each other; all default on, matching the teacher's always-on behavior
/// for the workarounds it implements.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Workarounds {
    pub bandwidth_500k: bool,
    pub tx_clamp: bool,
    pub implicit_timeout: bool,
    pub inverted_iq_loss: bool,
}

impl Default for Workarounds {
    fn default() -> Self {
        Self {
            bandwidth_500k: true,
            tx_clamp: true,
            implicit_timeout: true,
            inverted_iq_loss: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// If false, construction fails with `RadioError::Disabled`.
    pub enable: bool,
    pub modem: Modem,
    pub variant: ChipVariant,

    // LoRa modulation.
    pub bandwidth: u32,
    pub spreading_factor: u8,
    pub coding_rate: u8,
    pub ldro: bool,

    // FSK modulation.
    pub bitrate: u32,
    pub pulse_shape: f32,
    pub frequency_deviation: u32,

    // RF.
    pub frequency: u32,
    pub frequency_range: (u32, u32),
    pub ramp_time_us: u32,
    pub transmit_power: i8,

    // Packet framing.
    pub preamble_length: u16,
    pub payload_length: u8,
    pub header_implicit: bool,
    pub crc: bool,
    pub inverted_iq: bool,
    pub sync_word: u16,

    pub standby_mode: StandbyMode,
    pub sleep_mode: SleepMode,

    pub tx_buffer_address: u8,
    pub rx_buffer_address: u8,
    pub rx_queue_size: usize,
    pub tx_queue_size: usize,
    pub dio2_as_rf_switch: bool,

    pub pins: PinNames,
    pub cad: CadConfig,
    pub workarounds: Workarounds,

    /// Whether defaulting/clamping decisions are logged (§7: "observable in
    /// logs... at a level below information"). Doesn't affect clamping
    /// itself, only its visibility.
    pub log_clamps: bool,
    /// Poll interval for the busy-line wait (§4.1, default 10 ms).
    pub busy_poll_interval: Duration,
    /// Busy-wait timeout for ordinary transactions (§4.1, default 1 s).
    pub busy_timeout: Duration,
    /// Busy-wait timeout immediately following a hard reset (§4.1, default
    /// 5 s).
    pub reset_busy_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable: true,
            modem: Modem::Lora,
            variant: ChipVariant::Sx1262,

            bandwidth: 125_000,
            spreading_factor: 7,
            coding_rate: 5,
            ldro: false,

            bitrate: 4_800,
            pulse_shape: 0.5,
            frequency_deviation: 25_000,

            frequency: 915_000_000,
            frequency_range: (902, 928),
            ramp_time_us: 200,
            transmit_power: 22,

            preamble_length: 12,
            payload_length: 0,
            header_implicit: false,
            crc: true,
            inverted_iq: false,
            sync_word: 0x1424,

            standby_mode: StandbyMode::Rc,
            sleep_mode: SleepMode::WarmStart,

            tx_buffer_address: 0,
            rx_buffer_address: 0,
            rx_queue_size: 8,
            tx_queue_size: 8,
            dio2_as_rf_switch: true,

            pins: PinNames::default(),
            cad: CadConfig::default(),
            workarounds: Workarounds::default(),

            log_clamps: true,
            busy_poll_interval: Duration::from_millis(10),
            busy_timeout: Duration::from_secs(1),
            reset_busy_timeout: Duration::from_secs(5),
        }
    }
}
