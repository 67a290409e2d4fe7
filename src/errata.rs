//! Silicon errata workarounds (§4.8), each a conditional read-modify-write
//! triggered right after the command that makes it relevant. Every routine
//! degrades gracefully: an unmet precondition returns
//! `RadioError::ErrataPrecondition` rather than touching the chip, and is
//! not fatal to the session.

use crate::error::RadioError;
use crate::spi::Interface;
use crate::types::{ChipVariant, Modem, Register};

/// After `SetModulationParams`: clear bit 2 of the Tx-modulation register
/// when in LoRa mode at 500 kHz bandwidth, otherwise set it (DS §16.1.2).
pub fn modulation_quality_workaround(
    iface: &mut Interface,
    modem: Modem,
    bandwidth_hz: u32,
) -> Result<(), RadioError> {
    let (_, bytes) = iface.read_named_register(Register::TxModulation, 1)?;
    let mut value = bytes[0];
    if modem == Modem::Lora && bandwidth_hz == 500_000 {
        value &= 0xFB;
    } else {
        value |= 0x04;
    }
    iface.write_named_register(Register::TxModulation, &[value])?;
    Ok(())
}

/// After `SetPaConfig`, SX1261 has no clamp register to touch (DS §15.2.2).
/// `enable` toggles between the "apply" and "reverse" operations named in
/// §4.8.
pub fn tx_clamp_workaround(
    iface: &mut Interface,
    variant: ChipVariant,
    enable: bool,
) -> Result<(), RadioError> {
    if variant != ChipVariant::Sx1262 {
        return Err(RadioError::ErrataPrecondition("tx clamp workaround is SX1262-only"));
    }
    let (_, bytes) = iface.read_named_register(Register::TxClamp, 1)?;
    let value = if enable {
        bytes[0] | 0x1E
    } else {
        (bytes[0] & 0xE1) | 0x08
    };
    iface.write_named_register(Register::TxClamp, &[value])?;
    Ok(())
}

/// After an Rx-with-timeout sequence using an implicit header, LoRa only
/// (DS §15.3.2): stop the RTC, then set bit 1 of the event-mask register.
pub fn implicit_header_timeout_workaround(
    iface: &mut Interface,
    modem: Modem,
    header_implicit: bool,
) -> Result<(), RadioError> {
    if modem != Modem::Lora || !header_implicit {
        return Err(RadioError::ErrataPrecondition(
            "implicit-header timeout workaround requires LoRa with an implicit header",
        ));
    }
    iface.write_named_register(Register::RtcControl, &[0x00])?;
    let (_, bytes) = iface.read_named_register(Register::EventMask, 1)?;
    let value = bytes[0] | 0x02;
    iface.write_named_register(Register::EventMask, &[value])?;
    Ok(())
}

/// After `SetPacketParams`: clear bit 2 of the IQ-polarity register when
/// inverted IQ is active, otherwise set it.
pub fn inverted_iq_loss_workaround(iface: &mut Interface, inverted_iq: bool) -> Result<(), RadioError> {
    let (_, bytes) = iface.read_named_register(Register::IqPolarity, 1)?;
    let value = if inverted_iq {
        bytes[0] & 0xFB
    } else {
        bytes[0] | 0x04
    };
    iface.write_named_register(Register::IqPolarity, &[value])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spi::tests_support::fake_interface;

    #[test]
    fn modulation_quality_clears_bit_at_500k_lora() {
        let mut h = fake_interface(vec![0x00, 0x04]);
        modulation_quality_workaround(&mut h.iface, Modem::Lora, 500_000).unwrap();
        let mosi = h.last_mosi();
        assert_eq!(mosi[0], 0x0D);
        assert_eq!(*mosi.last().unwrap(), 0x00);
    }

    #[test]
    fn modulation_quality_sets_bit_otherwise() {
        let mut h = fake_interface(vec![0x00, 0x00]);
        modulation_quality_workaround(&mut h.iface, Modem::Lora, 125_000).unwrap();
        assert_eq!(*h.last_mosi().last().unwrap(), 0x04);
    }

    #[test]
    fn tx_clamp_rejected_on_sx1261() {
        let mut h = fake_interface(vec![0x00, 0x00]);
        let err = tx_clamp_workaround(&mut h.iface, ChipVariant::Sx1261, true).unwrap_err();
        assert!(matches!(err, RadioError::ErrataPrecondition(_)));
    }

    #[test]
    fn tx_clamp_sets_then_reverses() {
        let mut h = fake_interface(vec![0x00, 0x00]);
        tx_clamp_workaround(&mut h.iface, ChipVariant::Sx1262, true).unwrap();
        assert_eq!(*h.last_mosi().last().unwrap(), 0x1E);

        let mut h = fake_interface(vec![0x00, 0xFF]);
        tx_clamp_workaround(&mut h.iface, ChipVariant::Sx1262, false).unwrap();
        assert_eq!(*h.last_mosi().last().unwrap(), (0xFF & 0xE1) | 0x08);
    }

    #[test]
    fn implicit_header_timeout_rejected_without_implicit_header() {
        let mut h = fake_interface(vec![0x00, 0x00]);
        let err = implicit_header_timeout_workaround(&mut h.iface, Modem::Lora, false).unwrap_err();
        assert!(matches!(err, RadioError::ErrataPrecondition(_)));
    }

    #[test]
    fn inverted_iq_loss_clears_bit_when_active() {
        let mut h = fake_interface(vec![0x00, 0x04]);
        inverted_iq_loss_workaround(&mut h.iface, true).unwrap();
        assert_eq!(*h.last_mosi().last().unwrap(), 0x00);
    }
}
