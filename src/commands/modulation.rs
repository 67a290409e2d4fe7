//! `SetModulationParams` (DS §13.4.5; spec §4.3).

use crate::error::RadioError;
use crate::spi::Interface;
use crate::types::{Modem, OpCode};

/// The six LoRa bandwidths the datasheet defines, keyed by Hz. Values
/// outside this table clamp to 125 kHz (§4.3 clamping policy).
const LORA_BANDWIDTHS: &[(u32, u8)] = &[
    (7_800, 0x00),
    (10_400, 0x08),
    (15_600, 0x01),
    (20_800, 0x09),
    (31_250, 0x02),
    (41_700, 0x0A),
    (62_500, 0x03),
    (125_000, 0x04),
    (250_000, 0x05),
    (500_000, 0x06),
];

/// The FSK bandwidths DS table 13-45 defines. Values outside this table
/// clamp to 9.7 kHz.
const FSK_BANDWIDTHS: &[(u32, u8)] = &[
    (4_800, 0x1f),
    (5_800, 0x17),
    (7_300, 0x0f),
    (9_700, 0x1e),
];

fn lookup_bandwidth(table: &[(u32, u8)], hz: u32, default_code: u8) -> u8 {
    table
        .iter()
        .find(|(v, _)| *v == hz)
        .map(|(_, code)| *code)
        .unwrap_or(default_code)
}

/// Spreading factor outside [5,12] clamps to 7 (§4.3).
pub fn clamp_spreading_factor(sf: u8) -> u8 {
    if (5..=12).contains(&sf) {
        sf
    } else {
        7
    }
}

/// Coding rate outside {5,6,7,8} clamps to 5 (i.e. 4/5).
pub fn clamp_coding_rate(cr: u8) -> u8 {
    if (5..=8).contains(&cr) {
        cr
    } else {
        5
    }
}

/// LoRa bandwidth clamps to 125 kHz when not one of the fixed table
/// values.
pub fn clamp_lora_bandwidth(hz: u32) -> u8 {
    lookup_bandwidth(LORA_BANDWIDTHS, hz, 0x04)
}

/// FSK bandwidth clamps to 9.7 kHz when not one of the fixed table values.
pub fn clamp_fsk_bandwidth(hz: u32) -> u8 {
    lookup_bandwidth(FSK_BANDWIDTHS, hz, 0x1e)
}

/// FSK bitrate outside [600, 300000] bps clamps to 4800.
pub fn clamp_fsk_bitrate(bps: u32) -> u32 {
    if (600..=300_000).contains(&bps) {
        bps
    } else {
        4_800
    }
}

/// FSK pulse shape not in {0, 0.3, 0.5, 0.7, 1.0} clamps to 0.5.
pub fn clamp_pulse_shape(shape: f32) -> f32 {
    const KNOWN: [f32; 5] = [0.0, 0.3, 0.5, 0.7, 1.0];
    if KNOWN.iter().any(|k| (*k - shape).abs() < f32::EPSILON) {
        shape
    } else {
        0.5
    }
}

fn pulse_shape_code(shape: f32) -> u8 {
    match clamp_pulse_shape(shape) {
        s if (s - 0.0).abs() < f32::EPSILON => 0x00,
        s if (s - 0.3).abs() < f32::EPSILON => 0x08,
        s if (s - 0.5).abs() < f32::EPSILON => 0x09,
        s if (s - 0.7).abs() < f32::EPSILON => 0x0A,
        _ => 0x0B,
    }
}

/// `br = 32 × 32000000 / bitrate_bps`, taken mod 2²⁴ for packing (§4.3).
pub fn fsk_bitrate_register(bitrate_bps: u32) -> u32 {
    let bitrate = clamp_fsk_bitrate(bitrate_bps) as u64;
    let br = (32u64 * 32_000_000) / bitrate;
    (br % (1u64 << 24)) as u32
}

/// `fd = fd_hz × 33554432 / 32000000`, taken mod 2²⁴ (§4.3).
pub fn fsk_deviation_register(fd_hz: u32) -> u32 {
    let fd = (fd_hz as u64 * 33_554_432) / 32_000_000;
    (fd % (1u64 << 24)) as u32
}

/// LoRa parameters for `SetModulationParams`.
#[derive(Clone, Copy, Debug)]
pub struct LoraModParams {
    pub spreading_factor: u8,
    pub bandwidth_hz: u32,
    pub coding_rate: u8,
    pub ldro: bool,
}

/// FSK parameters for `SetModulationParams`.
#[derive(Clone, Copy, Debug)]
pub struct FskModParams {
    pub bitrate_bps: u32,
    pub pulse_shape: f32,
    pub bandwidth_hz: u32,
    pub frequency_deviation_hz: u32,
}

pub enum ModParams {
    Lora(LoraModParams),
    Fsk(FskModParams),
}

/// LoRa: `[0x8B, SF, BW, CR, LDRO]`.
/// FSK: `[0x8B, br23:16, br15:8, br7:0, pulseShape, BW, fd23:16, fd15:8, fd7:0]`.
pub fn set_modulation_params(iface: &mut Interface, modem: Modem, params: ModParams) -> Result<(), RadioError> {
    match (modem, params) {
        (Modem::Lora, ModParams::Lora(p)) => {
            let sf = clamp_spreading_factor(p.spreading_factor);
            let bw = clamp_lora_bandwidth(p.bandwidth_hz);
            let cr = clamp_coding_rate(p.coding_rate);
            iface.transact(&[OpCode::SetModulationParams as u8, sf, bw, cr, p.ldro as u8])?;
        }
        (Modem::Fsk, ModParams::Fsk(p)) => {
            let br = fsk_bitrate_register(p.bitrate_bps).to_be_bytes();
            let pulse = pulse_shape_code(p.pulse_shape);
            let bw = clamp_fsk_bandwidth(p.bandwidth_hz);
            let fd = fsk_deviation_register(p.frequency_deviation_hz).to_be_bytes();
            iface.transact(&[
                OpCode::SetModulationParams as u8,
                br[1],
                br[2],
                br[3],
                pulse,
                bw,
                fd[1],
                fd[2],
                fd[3],
            ])?;
        }
        (Modem::Lora, ModParams::Fsk(_)) | (Modem::Fsk, ModParams::Lora(_)) => {
            return Err(RadioError::UnknownModem);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spreading_factor_clamps_out_of_range() {
        assert_eq!(clamp_spreading_factor(4), 7);
        assert_eq!(clamp_spreading_factor(13), 7);
        assert_eq!(clamp_spreading_factor(9), 9);
    }

    #[test]
    fn coding_rate_clamps_out_of_range() {
        assert_eq!(clamp_coding_rate(9), 5);
        assert_eq!(clamp_coding_rate(6), 6);
    }

    #[test]
    fn unknown_lora_bandwidth_clamps_to_125k() {
        assert_eq!(clamp_lora_bandwidth(1), 0x04);
        assert_eq!(clamp_lora_bandwidth(500_000), 0x06);
    }

    #[test]
    fn unknown_fsk_bitrate_clamps_to_4800() {
        assert_eq!(clamp_fsk_bitrate(1), 4_800);
        assert_eq!(clamp_fsk_bitrate(9_600), 9_600);
    }

    #[test]
    fn unknown_pulse_shape_clamps_to_half() {
        assert_eq!(clamp_pulse_shape(0.9), 0.5);
        assert_eq!(clamp_pulse_shape(0.7), 0.7);
    }
}
