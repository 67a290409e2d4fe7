//! Status, buffer, packet, and error telemetry reads (DS §13.5; spec §4.3).

use crate::error::RadioError;
use crate::spi::Interface;
use crate::status::{decode_status_byte, BufferStatus, ChipMode, CommandStatus, DeviceErrors, PacketStats, PacketStatus};
use crate::types::{Modem, OpCode};

/// `[0xC0, NOP]`; byte 1 carries the decoded status.
pub fn get_status(iface: &mut Interface) -> Result<(ChipMode, CommandStatus), RadioError> {
    let resp = iface.transact(&[OpCode::GetStatus as u8, 0])?;
    decode_status_byte(resp[1])
}

/// `[0x13, NOP, NOP, NOP]`; bytes 2,3 → {payloadLen, startPtr}.
pub fn get_rx_buffer_status(iface: &mut Interface) -> Result<BufferStatus, RadioError> {
    let resp = iface.transact(&[OpCode::GetRxBufferStatus as u8, 0, 0, 0])?;
    Ok(BufferStatus {
        rx_payload_length: resp[2],
        rx_start_pointer: resp[3],
    })
}

fn rssi_from_byte(b: u8) -> f32 {
    -(b as f32) / 2.0
}

/// `[0x14, NOP, NOP, NOP, NOP]`. byte2 → rssi=-b/2; byte3 → snr=i8(b)/4;
/// byte4 → signalRssi=-b/2. `stats` is folded in separately by the caller,
/// since it comes from a different command.
pub fn get_packet_status(iface: &mut Interface) -> Result<PacketStatus, RadioError> {
    let resp = iface.transact(&[OpCode::GetPacketStatus as u8, 0, 0, 0, 0])?;
    Ok(PacketStatus {
        signal_strength: rssi_from_byte(resp[2]),
        snr_ratio: (resp[3] as i8) as f32 / 4.0,
        denoised_signal_strength: rssi_from_byte(resp[4]),
        stats: PacketStats::default(),
    })
}

/// `[0x15, NOP, NOP]`; byte2 → -b/2.
pub fn get_rssi_inst(iface: &mut Interface) -> Result<f32, RadioError> {
    let resp = iface.transact(&[OpCode::GetRssiInst as u8, 0, 0])?;
    Ok(rssi_from_byte(resp[2]))
}

/// `[0x10, NOP×7]`. bytes 2,3 → total; 4,5 → crcErrors; 6,7 → header-or-length
/// errors depending on the active modem (§9).
pub fn get_stats(iface: &mut Interface, modem: Modem) -> Result<PacketStats, RadioError> {
    let resp = iface.transact(&[OpCode::GetStats as u8, 0, 0, 0, 0, 0, 0, 0])?;
    let total = u16::from_be_bytes([resp[2], resp[3]]);
    let crc_errors = u16::from_be_bytes([resp[4], resp[5]]);
    let last = u16::from_be_bytes([resp[6], resp[7]]);
    let (header_errors, length_errors) = match modem {
        Modem::Lora => (last, 0),
        Modem::Fsk => (0, last),
    };
    Ok(PacketStats {
        total_received: total,
        crc_errors,
        header_errors,
        length_errors,
    })
}

/// `[0x00, NOP×6]`. The caller decides whether to also reset any cached
/// `Stats` (§4.3).
pub fn reset_stats(iface: &mut Interface) -> Result<(), RadioError> {
    iface.transact(&[OpCode::ResetStats as u8, 0, 0, 0, 0, 0, 0])?;
    Ok(())
}

/// `[0x17, NOP, NOP, NOP]`; bytes 2,3 → bitset.
pub fn get_device_errors(iface: &mut Interface) -> Result<DeviceErrors, RadioError> {
    let resp = iface.transact(&[OpCode::GetDeviceErrors as u8, 0, 0, 0])?;
    Ok(DeviceErrors(u16::from_be_bytes([resp[2], resp[3]])))
}

/// `[0x07, NOP, NOP]`. Opcode `0x07` collides with `ClearIrqStatus`'s
/// constant table entry at the source level; this frame is the one the
/// datasheet documents for clearing device errors and is followed here
/// regardless (§9).
pub fn clear_device_errors(iface: &mut Interface) -> Result<(), RadioError> {
    iface.transact(&[OpCode::ClearDeviceErrors as u8, 0, 0])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spi::tests_support::fake_interface;

    #[test]
    fn rx_buffer_status_scenario_g() {
        let mut h = fake_interface(vec![0x00, 0x01, 0x20, 0x00]);
        let status = get_rx_buffer_status(&mut h.iface).unwrap();
        assert_eq!(h.last_mosi(), vec![0x13, 0x00, 0x00, 0x00]);
        assert_eq!(status.rx_payload_length, 0x20);
        assert_eq!(status.rx_start_pointer, 0x00);
    }

    #[test]
    fn device_errors_scenario_h() {
        let mut h = fake_interface(vec![0x00, 0x01, 0x00, 0x60]);
        let errors = get_device_errors(&mut h.iface).unwrap();
        assert_eq!(h.last_mosi(), vec![0x17, 0x00, 0x00, 0x00]);
        assert_eq!(errors.0, 0x0060);
    }

    #[test]
    fn stats_route_last_field_by_modem() {
        let mut h = fake_interface(vec![0x00, 0x01, 0x00, 0x05, 0x00, 0x01, 0x00, 0x02]);
        let lora = get_stats(&mut h.iface, Modem::Lora).unwrap();
        assert_eq!(lora.total_received, 5);
        assert_eq!(lora.crc_errors, 1);
        assert_eq!(lora.header_errors, 2);
        assert_eq!(lora.length_errors, 0);

        let mut h = fake_interface(vec![0x00, 0x01, 0x00, 0x05, 0x00, 0x01, 0x00, 0x02]);
        let fsk = get_stats(&mut h.iface, Modem::Fsk).unwrap();
        assert_eq!(fsk.header_errors, 0);
        assert_eq!(fsk.length_errors, 2);
    }

    #[test]
    fn rssi_inst_converts_to_negative_halves() {
        let mut h = fake_interface(vec![0x00, 0x01, 40]);
        let rssi = get_rssi_inst(&mut h.iface).unwrap();
        assert_eq!(rssi, -20.0);
    }
}
