//! `SetPacketParams` and `SetCadParams` (DS §13.4.6, §13.4.1; spec §4.3).

use crate::config::CadConfig;
use crate::error::RadioError;
use crate::spi::Interface;
use crate::types::OpCode;

use crate::commands::low_24_be;

/// LoRa packet framing for `SetPacketParams`.
#[derive(Clone, Copy, Debug)]
pub struct LoraPacketParams {
    pub preamble_length: u16,
    pub header_implicit: bool,
    pub payload_length: u8,
    pub crc: bool,
    pub inverted_iq: bool,
}

/// FSK packet framing for `SetPacketParams`. Not sourced from `Config` —
/// the driver's FSK support covers modulation and framing on the wire but
/// leaves the detector/whitening knobs at their datasheet defaults.
#[derive(Clone, Copy, Debug)]
pub struct FskPacketParams {
    pub preamble_length: u16,
    pub preamble_detector_length: u8,
    pub sync_word_length: u8,
    pub address_comparison: u8,
    pub variable_length: bool,
    pub payload_length: u8,
    pub crc_type: u8,
    pub whitening: bool,
}

pub enum PacketParams {
    Lora(LoraPacketParams),
    Fsk(FskPacketParams),
}

/// LoRa: `[0x8C, pre_hi, pre_lo, headerType, payloadLen, crc, iq]`.
/// FSK: `[0x8C, pre_hi, pre_lo, preDetLen, syncWordLen, addrComp, packetType, payloadLen, crcFsk, whitening]`.
pub fn set_packet_params(iface: &mut Interface, params: PacketParams) -> Result<(), RadioError> {
    match params {
        PacketParams::Lora(p) => {
            let pre = p.preamble_length.to_be_bytes();
            iface.transact(&[
                OpCode::SetPacketParams as u8,
                pre[0],
                pre[1],
                p.header_implicit as u8,
                p.payload_length,
                p.crc as u8,
                p.inverted_iq as u8,
            ])?;
        }
        PacketParams::Fsk(p) => {
            let pre = p.preamble_length.to_be_bytes();
            iface.transact(&[
                OpCode::SetPacketParams as u8,
                pre[0],
                pre[1],
                p.preamble_detector_length,
                p.sync_word_length,
                p.address_comparison,
                p.variable_length as u8,
                p.payload_length,
                p.crc_type,
                p.whitening as u8,
            ])?;
        }
    }
    Ok(())
}

/// `[0x88, symNum, peak, min, exit, to23:16, to15:8, to7:0]`.
pub fn set_cad_params(iface: &mut Interface, cad: &CadConfig) -> Result<(), RadioError> {
    let to = low_24_be(cad.timeout);
    iface.transact(&[
        OpCode::SetCadParams as u8,
        cad.symbol_number,
        cad.detection_peak,
        cad.detection_minimum,
        cad.exit_mode as u8,
        to[0],
        to[1],
        to[2],
    ])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spi::tests_support::fake_interface;
    use crate::types::CadExitMode;

    #[test]
    fn lora_packet_params_wire_format() {
        let mut h = fake_interface(vec![0; 7]);
        set_packet_params(
            &mut h.iface,
            PacketParams::Lora(LoraPacketParams {
                preamble_length: 12,
                header_implicit: false,
                payload_length: 32,
                crc: true,
                inverted_iq: false,
            }),
        )
        .unwrap();
        assert_eq!(h.last_mosi(), vec![0x8C, 0x00, 0x0C, 0x00, 0x20, 0x01, 0x00]);
    }

    #[test]
    fn fsk_packet_params_wire_format() {
        let mut h = fake_interface(vec![0; 10]);
        set_packet_params(
            &mut h.iface,
            PacketParams::Fsk(FskPacketParams {
                preamble_length: 16,
                preamble_detector_length: 0,
                sync_word_length: 16,
                address_comparison: 0,
                variable_length: true,
                payload_length: 255,
                crc_type: 1,
                whitening: false,
            }),
        )
        .unwrap();
        assert_eq!(
            h.last_mosi(),
            vec![0x8C, 0x00, 0x10, 0x00, 16, 0, 1, 255, 1, 0]
        );
    }

    #[test]
    fn cad_params_wire_format() {
        let mut h = fake_interface(vec![0; 8]);
        let cad = CadConfig {
            symbol_number: 4,
            detection_peak: 22,
            detection_minimum: 10,
            exit_mode: CadExitMode::Standby,
            timeout: 0xFF_0102_03,
        };
        set_cad_params(&mut h.iface, &cad).unwrap();
        assert_eq!(h.last_mosi(), vec![0x88, 4, 22, 10, 0, 0x01, 0x02, 0x03]);
    }
}
