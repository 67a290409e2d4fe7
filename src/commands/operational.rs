//! Mode transitions, calibration, and buffer base address (DS §13.1-13.2).

use crate::commands::low_24_be;
use crate::error::RadioError;
use crate::spi::Interface;
use crate::types::{
    image_calib_bytes, CALIBRATE_ALL, Modem, OpCode, PacketType, SleepMode, StandbyMode,
    TcxoVoltage,
};

/// `[0x84, mode]`.
pub fn set_sleep(iface: &mut Interface, mode: SleepMode) -> Result<(), RadioError> {
    iface.transact(&[OpCode::SetSleep as u8, mode as u8])?;
    Ok(())
}

/// `[0x80, mode]`.
pub fn set_standby(iface: &mut Interface, mode: StandbyMode) -> Result<(), RadioError> {
    iface.transact(&[OpCode::SetStandby as u8, mode as u8])?;
    Ok(())
}

/// `[0xC1]`.
pub fn set_fs(iface: &mut Interface) -> Result<(), RadioError> {
    iface.transact(&[OpCode::SetFs as u8])?;
    Ok(())
}

/// `[0x83, t23:16, t15:8, t7:0]`. `timeout` wider than 24 bits is silently
/// truncated (§8 property 3).
pub fn set_tx(iface: &mut Interface, timeout: u32) -> Result<(), RadioError> {
    let t = low_24_be(timeout);
    iface.transact(&[OpCode::SetTx as u8, t[0], t[1], t[2]])?;
    Ok(())
}

/// `[0x82, t23:16, t15:8, t7:0]`.
pub fn set_rx(iface: &mut Interface, timeout: u32) -> Result<(), RadioError> {
    let t = low_24_be(timeout);
    iface.transact(&[OpCode::SetRx as u8, t[0], t[1], t[2]])?;
    Ok(())
}

/// `[0x9F, 0/1]`.
pub fn stop_timer_on_preamble(iface: &mut Interface, stop: bool) -> Result<(), RadioError> {
    iface.transact(&[OpCode::StopTimerOnPreamble as u8, stop as u8])?;
    Ok(())
}

/// `[0x94, rx24, sleep24]`.
pub fn set_rx_duty_cycle(
    iface: &mut Interface,
    rx_period: u32,
    sleep_period: u32,
) -> Result<(), RadioError> {
    let rx = low_24_be(rx_period);
    let sleep = low_24_be(sleep_period);
    iface.transact(&[
        OpCode::SetRxDutyCycle as u8,
        rx[0],
        rx[1],
        rx[2],
        sleep[0],
        sleep[1],
        sleep[2],
    ])?;
    Ok(())
}

/// `[0xC5]`, LoRa only. The source rejects this outright in FSK rather than
/// silently falling back (spec §9 preserves that choice).
pub fn set_cad(iface: &mut Interface, modem: Modem) -> Result<(), RadioError> {
    if modem != Modem::Lora {
        return Err(RadioError::IllegalIrqForModem);
    }
    iface.transact(&[OpCode::SetCAD as u8])?;
    Ok(())
}

/// `[0xD1]`.
pub fn set_tx_continuous_wave(iface: &mut Interface) -> Result<(), RadioError> {
    iface.transact(&[OpCode::SetTxContinuousWave as u8])?;
    Ok(())
}

/// `[0xD2]`.
pub fn set_tx_infinite_preamble(iface: &mut Interface) -> Result<(), RadioError> {
    iface.transact(&[OpCode::SetTxInfinitePreamble as u8])?;
    Ok(())
}

/// `[0x96, mode]`. `dc_dc` selects the DC-DC regulator over the LDO.
pub fn set_regulator_mode(iface: &mut Interface, dc_dc: bool) -> Result<(), RadioError> {
    iface.transact(&[OpCode::SetRegulatorMode as u8, dc_dc as u8])?;
    Ok(())
}

/// `[0x89, mask]`. Bring-up always calibrates every block.
pub fn calibrate(iface: &mut Interface, mask: u8) -> Result<(), RadioError> {
    iface.transact(&[OpCode::Calibrate as u8, mask])?;
    Ok(())
}

pub fn calibrate_all(iface: &mut Interface) -> Result<(), RadioError> {
    calibrate(iface, CALIBRATE_ALL)
}

/// `[0x98, f1, f2]`. Frequency band endpoints, keyed by the configured RF
/// frequency (DS table 13-37).
pub fn calibrate_image(iface: &mut Interface, freq_hz: u32) -> Result<(), RadioError> {
    let (f1, f2) = image_calib_bytes(freq_hz);
    iface.transact(&[OpCode::CalibrateImage as u8, f1, f2])?;
    Ok(())
}

/// `[0x8A, type]`. Must be the first configuration command issued in
/// `STDBY_RC` mode (§4.7).
pub fn set_packet_type(iface: &mut Interface, packet_type: PacketType) -> Result<(), RadioError> {
    iface.transact(&[OpCode::SetPacketType as u8, packet_type as u8])?;
    Ok(())
}

/// `[0x11, NOP, NOP]`, byte 2 carries the type.
pub fn get_packet_type(iface: &mut Interface) -> Result<PacketType, RadioError> {
    let resp = iface.transact(&[OpCode::GetPacketType as u8, 0, 0])?;
    match resp[2] {
        0 => Ok(PacketType::Gfsk),
        1 => Ok(PacketType::Lora),
        other => Err(RadioError::Config(format!(
            "unknown packet type byte {other:#04x}"
        ))),
    }
}

/// `[0x8F, tx, rx]`.
pub fn set_buffer_base_address(iface: &mut Interface, tx: u8, rx: u8) -> Result<(), RadioError> {
    iface.transact(&[OpCode::SetBufferBaseAddress as u8, tx, rx])?;
    Ok(())
}

/// `[0xA0, n]`.
pub fn set_lora_symb_num_timeout(iface: &mut Interface, n: u8) -> Result<(), RadioError> {
    iface.transact(&[OpCode::SetLoRaSymbNumTimeout as u8, n])?;
    Ok(())
}

/// `[0x93, mode]`. Chip mode entered automatically after Rx/Tx completes,
/// independent of the CAD-specific `exit_mode` in `SetCadParams`.
pub fn set_rx_tx_fallback_mode(iface: &mut Interface, mode: u8) -> Result<(), RadioError> {
    iface.transact(&[OpCode::SetRxTxFallbackMode as u8, mode])?;
    Ok(())
}

/// `[0x9D, 0/1]`. Bring-up issues this once, keyed by
/// `Config::dio2_as_rf_switch` (§4.7).
pub fn set_dio2_as_rf_switch_ctrl(iface: &mut Interface, enable: bool) -> Result<(), RadioError> {
    iface.transact(&[OpCode::SetDIO2AsRfSwitchCtrl as u8, enable as u8])?;
    Ok(())
}

/// `[0x97, voltage, t23:16, t15:8, t7:0]`. `timeout` is the usual 24-bit
/// wire field, low three bytes only.
pub fn set_dio3_as_tcxo_ctrl(
    iface: &mut Interface,
    voltage: TcxoVoltage,
    timeout: u32,
) -> Result<(), RadioError> {
    let t = low_24_be(timeout);
    iface.transact(&[
        OpCode::SetDIO3AsTCXOCtrl as u8,
        voltage as u8,
        t[0],
        t[1],
        t[2],
    ])?;
    Ok(())
}
