//! `SetDioIrqParams`, `GetIrqStatus`, `ClearIrqStatus` (DS §13.3.1-13.3.3;
//! spec §4.3, §4.4).

use crate::error::RadioError;
use crate::spi::Interface;
use crate::types::{IrqBit, Modem, OpCode, IRQ_ALL};

/// Up to three DIO pin masks may follow the primary IRQ mask. More than
/// three is rejected.
const MAX_DIO_MASKS: usize = 3;

fn validate_mask(mask: u16, modem: Modem) -> Result<(), RadioError> {
    if mask == IRQ_ALL {
        return Err(RadioError::IllegalIrqForModem);
    }
    for bit in [
        IrqBit::TxDone,
        IrqBit::RxDone,
        IrqBit::PreambleDetected,
        IrqBit::SyncWordValid,
        IrqBit::HeaderValid,
        IrqBit::HeaderErr,
        IrqBit::CrcErr,
        IrqBit::CadDone,
        IrqBit::CadDetected,
        IrqBit::Timeout,
    ] {
        if mask & (1 << bit as u16) != 0 && !bit.legal_for(modem) {
            return Err(RadioError::IllegalIrqForModem);
        }
    }
    Ok(())
}

/// `[0x08, irq_hi, irq_lo, dio1_hi, dio1_lo, dio2_hi, dio2_lo, dio3_hi, dio3_lo]`.
/// When `dio_masks` is empty, the primary mask is duplicated to DIO1 and
/// DIO2, and DIO3 is left zero (§4.4). More than three masks is rejected.
pub fn set_dio_irq_params(
    iface: &mut Interface,
    modem: Modem,
    irq_mask: u16,
    dio_masks: &[u16],
) -> Result<(), RadioError> {
    if dio_masks.len() > MAX_DIO_MASKS {
        return Err(RadioError::TooManyDioMasks);
    }
    validate_mask(irq_mask, modem)?;
    for &m in dio_masks {
        validate_mask(m, modem)?;
    }

    let (dio1, dio2, dio3) = if dio_masks.is_empty() {
        (irq_mask, irq_mask, 0u16)
    } else {
        let mut masks = [0u16; MAX_DIO_MASKS];
        masks[..dio_masks.len()].copy_from_slice(dio_masks);
        (masks[0], masks[1], masks[2])
    };

    let irq = irq_mask.to_be_bytes();
    let d1 = dio1.to_be_bytes();
    let d2 = dio2.to_be_bytes();
    let d3 = dio3.to_be_bytes();
    iface.transact(&[
        OpCode::SetDioIrqParams as u8,
        irq[0],
        irq[1],
        d1[0],
        d1[1],
        d2[0],
        d2[1],
        d3[0],
        d3[1],
    ])?;
    Ok(())
}

/// `[0x12, NOP, NOP, NOP]`; bytes 2,3 carry the 16-bit IRQ status.
pub fn get_irq_status(iface: &mut Interface, modem: Modem) -> Result<u16, RadioError> {
    let resp = iface.transact(&[OpCode::GetIrqStatus as u8, 0, 0, 0])?;
    let status = u16::from_be_bytes([resp[2], resp[3]]);
    validate_mask(status, modem)?;
    Ok(status)
}

/// `[0x02, NOP, mask_hi, mask_lo]`.
pub fn clear_irq_status(iface: &mut Interface, modem: Modem, mask: u16) -> Result<(), RadioError> {
    validate_mask(mask, modem)?;
    let m = mask.to_be_bytes();
    iface.transact(&[OpCode::ClearIrqStatus as u8, 0, m[0], m[1]])?;
    Ok(())
}
