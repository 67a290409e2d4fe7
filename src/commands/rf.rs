//! RF frequency, transmit power, and power-amplifier configuration
//! (DS §13.4.1, §13.1.14, §13.4.4; spec §4.3, §4.5).

use crate::error::RadioError;
use crate::spi::Interface;
use crate::types::{ChipVariant, OpCode, RampTime};

const FREQ_STEP_NUMER: u64 = 33_554_432;
const FREQ_STEP_DENOM: u64 = 32_000_000;

/// `r = freqHz × 33554432 / 32000000`; the low 32 bits are emitted
/// big-endian (§4.3, §8 property 4). Computed in 64-bit space to avoid
/// overflow before the division.
pub fn rf_freq_register(freq_hz: u32) -> u32 {
    ((freq_hz as u64 * FREQ_STEP_NUMER) / FREQ_STEP_DENOM) as u32
}

/// `[0x86, r31:24, r23:16, r15:8, r7:0]`.
pub fn set_rf_frequency(iface: &mut Interface, freq_hz: u32) -> Result<(), RadioError> {
    let r = rf_freq_register(freq_hz).to_be_bytes();
    iface.transact(&[OpCode::SetRfFrequency as u8, r[0], r[1], r[2], r[3]])?;
    Ok(())
}

/// Transmit power clamped to the variant's permitted interval (§3
/// invariants, §8 property 6).
pub fn clamp_transmit_power(variant: ChipVariant, power: i8) -> i8 {
    let (min, max) = variant.power_range();
    power.clamp(min, max)
}

/// `[0x8E, dbm, rampTime]`; `dbm` is two's-complement.
pub fn set_tx_params(
    iface: &mut Interface,
    variant: ChipVariant,
    power: i8,
    ramp_time_us: u32,
) -> Result<(), RadioError> {
    let power = clamp_transmit_power(variant, power);
    let ramp = RampTime::from_us(ramp_time_us);
    iface.transact(&[OpCode::SetTxParams as u8, power as u8, ramp as u8])?;
    Ok(())
}

/// `(PaDutyCycle, HpMax)` pair from the per-variant auto-tune table (§4.5),
/// keyed by the already-clamped transmit power. `pub(crate)` so the
/// configuration reducer can seed its intermediate struct from the same
/// table before applying overrides.
pub(crate) fn pa_autotune(variant: ChipVariant, clamped_power: i8) -> (u8, u8) {
    match variant {
        ChipVariant::Sx1261 => match clamped_power {
            15 => (6, 0),
            14 => (4, 0),
            10 => (1, 0),
            _ => (1, 0),
        },
        ChipVariant::Sx1262 => {
            if clamped_power == 22 {
                (4, 7)
            } else if clamped_power >= 20 {
                (3, 5)
            } else if clamped_power >= 17 {
                (2, 3)
            } else if clamped_power >= 14 {
                (2, 2)
            } else {
                (2, 2)
            }
        }
    }
}

/// Explicit override for `SetPaConfig`: when supplied, skips the auto-tune
/// table entirely (§4.5 "Overrides applied via composition skip the table
/// lookup entirely").
#[derive(Clone, Copy, Debug)]
pub struct PaConfigOverride {
    pub duty_cycle: u8,
    pub hp_max: u8,
}

/// `[0x95, duty, hpMax, deviceSel, paLut]`. `device_sel` is `1` for
/// SX1261, `0` for SX1262 (§4.5); `pa_lut` is always `1` for this family.
pub fn set_pa_config(
    iface: &mut Interface,
    variant: ChipVariant,
    transmit_power: i8,
    override_cfg: Option<PaConfigOverride>,
) -> Result<(), RadioError> {
    let clamped = clamp_transmit_power(variant, transmit_power);
    let (duty_cycle, hp_max) = match override_cfg {
        Some(o) => (o.duty_cycle, o.hp_max),
        None => pa_autotune(variant, clamped),
    };
    let device_sel = match variant {
        ChipVariant::Sx1261 => 1,
        ChipVariant::Sx1262 => 0,
    };
    let pa_lut = 1;
    iface.transact(&[
        OpCode::SetPaConfig as u8,
        duty_cycle,
        hp_max,
        device_sel,
        pa_lut,
    ])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spi::tests_support::fake_interface;

    #[test]
    fn rf_frequency_scenario_c() {
        // 868 MHz -> [0x86, 0x36, 0x40, 0x00, 0x00]
        let mut h = fake_interface(vec![0; 5]);
        set_rf_frequency(&mut h.iface, 868_000_000).unwrap();
        assert_eq!(h.last_mosi(), vec![0x86, 0x36, 0x40, 0x00, 0x00]);
    }

    #[test]
    fn pa_config_scenario_d_sx1262_max_power() {
        let mut h = fake_interface(vec![0; 5]);
        set_pa_config(&mut h.iface, ChipVariant::Sx1262, 22, None).unwrap();
        assert_eq!(h.last_mosi(), vec![0x95, 0x04, 0x07, 0x00, 0x01]);
    }

    #[test]
    fn pa_config_scenario_e_sx1261_clamped() {
        let mut h = fake_interface(vec![0; 5]);
        set_pa_config(&mut h.iface, ChipVariant::Sx1261, -50, None).unwrap();
        assert_eq!(h.last_mosi(), vec![0x95, 0x01, 0x00, 0x01, 0x01]);
    }

    #[test]
    fn transmit_power_clamped_to_variant_range() {
        assert_eq!(clamp_transmit_power(ChipVariant::Sx1261, 50), 15);
        assert_eq!(clamp_transmit_power(ChipVariant::Sx1261, -50), -17);
        assert_eq!(clamp_transmit_power(ChipVariant::Sx1262, 50), 22);
        assert_eq!(clamp_transmit_power(ChipVariant::Sx1262, -50), -9);
    }
}
