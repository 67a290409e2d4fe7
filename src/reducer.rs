//! Configuration reducer (§4.6): seed an intermediate struct from the live
//! `Config`, fold a caller-supplied list of override closures over it in
//! order, then hand the result to the matching command encoder. Each
//! encoder still applies the clamping policy itself, so composition never
//! needs to duplicate it.
//!
//! No state persists between calls: a fresh intermediate is built, folded,
//! and consumed every time one of these functions runs.

use crate::commands::modulation::{set_modulation_params, FskModParams, LoraModParams, ModParams};
use crate::commands::packet::{set_cad_params, set_packet_params, FskPacketParams, LoraPacketParams, PacketParams};
use crate::commands::rf::{clamp_transmit_power, pa_autotune, set_pa_config, PaConfigOverride};
use crate::config::{CadConfig, Config};
use crate::error::RadioError;
use crate::spi::Interface;
use crate::types::{ChipVariant, Modem};

/// Intermediate seeded from the auto-tune table (§4.5) before overrides run.
#[derive(Clone, Copy, Debug)]
pub struct PaIntermediate {
    pub duty_cycle: u8,
    pub hp_max: u8,
}

fn seed_pa(variant: ChipVariant, transmit_power: i8) -> PaIntermediate {
    let clamped = clamp_transmit_power(variant, transmit_power);
    let (duty_cycle, hp_max) = pa_autotune(variant, clamped);
    PaIntermediate { duty_cycle, hp_max }
}

/// Folds `overrides` over a PA intermediate seeded from the auto-tune
/// table, then issues `SetPaConfig` with the result.
pub fn reduce_pa_config(
    iface: &mut Interface,
    config: &Config,
    overrides: &[&dyn Fn(&mut PaIntermediate)],
) -> Result<(), RadioError> {
    let mut intermediate = seed_pa(config.variant, config.transmit_power);
    for f in overrides {
        f(&mut intermediate);
    }
    set_pa_config(
        iface,
        config.variant,
        config.transmit_power,
        Some(PaConfigOverride {
            duty_cycle: intermediate.duty_cycle,
            hp_max: intermediate.hp_max,
        }),
    )
}

fn seed_modulation(config: &Config) -> ModParams {
    match config.modem {
        Modem::Lora => ModParams::Lora(LoraModParams {
            spreading_factor: config.spreading_factor,
            bandwidth_hz: config.bandwidth,
            coding_rate: config.coding_rate,
            ldro: config.ldro,
        }),
        Modem::Fsk => ModParams::Fsk(FskModParams {
            bitrate_bps: config.bitrate,
            pulse_shape: config.pulse_shape,
            bandwidth_hz: config.bandwidth,
            frequency_deviation_hz: config.frequency_deviation,
        }),
    }
}

/// Folds `overrides` over modulation parameters seeded from `config`, then
/// issues `SetModulationParams`. Overrides only make sense for the active
/// modem's variant; mixing them is a caller error caught by the closure
/// signature, not by this function.
pub fn reduce_modulation_params(
    iface: &mut Interface,
    config: &Config,
    lora_overrides: &[&dyn Fn(&mut LoraModParams)],
    fsk_overrides: &[&dyn Fn(&mut FskModParams)],
) -> Result<(), RadioError> {
    let mut params = seed_modulation(config);
    match &mut params {
        ModParams::Lora(p) => {
            for f in lora_overrides {
                f(p);
            }
        }
        ModParams::Fsk(p) => {
            for f in fsk_overrides {
                f(p);
            }
        }
    }
    set_modulation_params(iface, config.modem, params)
}

fn seed_packet_params(config: &Config) -> PacketParams {
    match config.modem {
        Modem::Lora => PacketParams::Lora(LoraPacketParams {
            preamble_length: config.preamble_length,
            header_implicit: config.header_implicit,
            payload_length: config.payload_length,
            crc: config.crc,
            inverted_iq: config.inverted_iq,
        }),
        Modem::Fsk => PacketParams::Fsk(FskPacketParams {
            preamble_length: config.preamble_length,
            preamble_detector_length: 0,
            sync_word_length: 16,
            address_comparison: 0,
            variable_length: true,
            payload_length: config.payload_length,
            crc_type: config.crc as u8,
            whitening: false,
        }),
    }
}

/// Folds `overrides` over packet framing parameters seeded from `config`,
/// then issues `SetPacketParams`.
pub fn reduce_packet_params(
    iface: &mut Interface,
    config: &Config,
    lora_overrides: &[&dyn Fn(&mut LoraPacketParams)],
    fsk_overrides: &[&dyn Fn(&mut FskPacketParams)],
) -> Result<(), RadioError> {
    let mut params = seed_packet_params(config);
    match &mut params {
        PacketParams::Lora(p) => {
            for f in lora_overrides {
                f(p);
            }
        }
        PacketParams::Fsk(p) => {
            for f in fsk_overrides {
                f(p);
            }
        }
    }
    set_packet_params(iface, params)
}

/// Folds `overrides` over the CAD intermediate seeded from `config.cad`,
/// then issues `SetCadParams`.
pub fn reduce_cad_params(
    iface: &mut Interface,
    config: &Config,
    overrides: &[&dyn Fn(&mut CadConfig)],
) -> Result<(), RadioError> {
    let mut cad = config.cad;
    for f in overrides {
        f(&mut cad);
    }
    set_cad_params(iface, &cad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spi::tests_support::fake_interface;

    #[test]
    fn pa_config_override_skips_autotune_table() {
        let mut h = fake_interface(vec![0; 5]);
        let mut config = Config::default();
        config.variant = ChipVariant::Sx1262;
        config.transmit_power = 22;
        let force_low_power: &dyn Fn(&mut PaIntermediate) = &|i| {
            i.duty_cycle = 1;
            i.hp_max = 1;
        };
        reduce_pa_config(&mut h.iface, &config, &[force_low_power]).unwrap();
        assert_eq!(h.last_mosi(), vec![0x95, 0x01, 0x01, 0x00, 0x01]);
    }

    #[test]
    fn pa_config_no_overrides_matches_autotune_scenario_d() {
        let mut h = fake_interface(vec![0; 5]);
        let mut config = Config::default();
        config.variant = ChipVariant::Sx1262;
        config.transmit_power = 22;
        reduce_pa_config(&mut h.iface, &config, &[]).unwrap();
        assert_eq!(h.last_mosi(), vec![0x95, 0x04, 0x07, 0x00, 0x01]);
    }

    #[test]
    fn modulation_override_applies_after_seed() {
        let mut h = fake_interface(vec![0; 5]);
        let mut config = Config::default();
        config.modem = Modem::Lora;
        config.spreading_factor = 7;
        let bump_sf: &dyn Fn(&mut LoraModParams) = &|p| p.spreading_factor = 10;
        reduce_modulation_params(&mut h.iface, &config, &[bump_sf], &[]).unwrap();
        assert_eq!(h.last_mosi()[1], 10);
    }

    #[test]
    fn overrides_compose_in_order() {
        let mut h = fake_interface(vec![0; 5]);
        let mut config = Config::default();
        config.modem = Modem::Lora;
        let set_five: &dyn Fn(&mut LoraModParams) = &|p| p.spreading_factor = 5;
        let then_nine: &dyn Fn(&mut LoraModParams) = &|p| p.spreading_factor = 9;
        reduce_modulation_params(&mut h.iface, &config, &[set_five, then_nine], &[]).unwrap();
        assert_eq!(h.last_mosi()[1], 9);
    }
}
