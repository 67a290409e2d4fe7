//! Session state machine and mailbox abstraction (§4.7, §5): the bring-up
//! sequence, steady-state IRQ servicing, and the bounded Tx/Rx payload
//! queues an application drives without touching registers directly.

use std::thread::sleep;
use std::time::{Duration, Instant};

use log::{debug, trace, warn};

use crate::commands::irq::{clear_irq_status, get_irq_status, set_dio_irq_params};
use crate::commands::operational::{
    calibrate_image, set_buffer_base_address, set_dio2_as_rf_switch_ctrl, set_packet_type,
    set_rx, set_standby, set_sleep, set_tx,
};
use crate::commands::rf::{set_rf_frequency, set_tx_params};
use crate::commands::stats::{get_device_errors, get_packet_status, get_rx_buffer_status, get_status};
use crate::config::Config;
use crate::error::RadioError;
use crate::errata::{
    implicit_header_timeout_workaround, inverted_iq_loss_workaround,
    modulation_quality_workaround, tx_clamp_workaround,
};
use crate::gpio::{GpioLine, GpioPins, PinRegistry};
use crate::mailbox::{mailbox, MailboxReceiver, MailboxSender};
use crate::reducer::{reduce_modulation_params, reduce_packet_params, reduce_pa_config};
use crate::spi::{Interface, SpiBus};
use crate::status::Status;
use crate::types::{IrqBit, Modem, PacketType, Register};

/// A received or to-be-sent radio payload.
pub type Payload = Vec<u8>;

/// The live handle described in spec §3. Owns the SPI connector (via
/// `Interface`), the GPIO lines not already owned by `Interface`
/// (`dio1`, `tx_en`, optional `rx_en`), the immutable `Config`, the
/// write-through `Status` cache, and the two bounded mailboxes.
pub struct Device {
    iface: Interface,
    dio1: Box<dyn GpioLine>,
    tx_en: Box<dyn GpioLine>,
    rx_en: Option<Box<dyn GpioLine>>,
    config: Config,
    status: Status,
    tx_sender: MailboxSender<Payload>,
    tx_receiver: MailboxReceiver<Payload>,
    rx_sender: MailboxSender<Payload>,
    rx_receiver: MailboxReceiver<Payload>,
    closed: bool,
}

fn poll_for_high(
    line: &mut dyn GpioLine,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<bool, RadioError> {
    let start = Instant::now();
    loop {
        if line.is_high()? {
            return Ok(true);
        }
        if start.elapsed() >= timeout {
            return Ok(false);
        }
        sleep(poll_interval);
    }
}

impl Device {
    /// Validates `config`, acquires pins, drives an initial hard reset,
    /// initializes the mailboxes, then runs the fixed bring-up sequence of
    /// §4.7. Any non-success during bring-up aborts it, drives `close`, and
    /// surfaces the original failure.
    pub fn new(
        config: Config,
        bus: Box<dyn SpiBus>,
        registry: &mut dyn PinRegistry,
    ) -> Result<Self, RadioError> {
        if !config.enable {
            return Err(RadioError::Disabled);
        }

        let pins = GpioPins::acquire(registry, &config.pins)?;
        let GpioPins {
            reset,
            busy,
            dio1,
            tx_en,
            rx_en,
            cs,
        } = pins;

        let iface = Interface::new(
            bus,
            reset,
            busy,
            cs,
            config.busy_poll_interval,
            config.busy_timeout,
            config.reset_busy_timeout,
        );

        let (tx_sender, tx_receiver) = mailbox(config.tx_queue_size);
        let (rx_sender, rx_receiver) = mailbox(config.rx_queue_size);

        let mut device = Self {
            iface,
            dio1,
            tx_en,
            rx_en,
            config,
            status: Status::default(),
            tx_sender,
            tx_receiver,
            rx_sender,
            rx_receiver,
            closed: false,
        };

        if let Err(e) = device.iface.hard_reset() {
            let _ = device.close();
            return Err(e);
        }

        if let Err(e) = device.bring_up() {
            let _ = device.close();
            return Err(e);
        }

        Ok(device)
    }

    fn modem_packet_type(&self) -> PacketType {
        match self.config.modem {
            Modem::Lora => PacketType::Lora,
            Modem::Fsk => PacketType::Gfsk,
        }
    }

    /// `SetStandby → SetPacketType → CalibrateImage → SetRfFrequency →
    /// SetTxParams → SetBufferBaseAddress → SetModulationParams →
    /// SetPacketParams → SetDioIrqParams → write sync-word register →
    /// read-back sync-word register → SetDIO2AsRfSwitchCtrl →
    /// SetRx(continuous)` (§4.7).
    fn bring_up(&mut self) -> Result<(), RadioError> {
        let cfg = self.config.clone();

        set_standby(&mut self.iface, cfg.standby_mode)?;
        set_packet_type(&mut self.iface, self.modem_packet_type())?;

        calibrate_image(&mut self.iface, cfg.frequency)?;

        set_rf_frequency(&mut self.iface, cfg.frequency)?;
        set_tx_params(&mut self.iface, cfg.variant, cfg.transmit_power, cfg.ramp_time_us)?;
        set_buffer_base_address(&mut self.iface, cfg.tx_buffer_address, cfg.rx_buffer_address)?;

        reduce_modulation_params(&mut self.iface, &cfg, &[], &[])?;
        if cfg.workarounds.bandwidth_500k {
            modulation_quality_workaround(&mut self.iface, cfg.modem, cfg.bandwidth)
                .log_non_fatal(cfg.log_clamps);
        }

        reduce_packet_params(&mut self.iface, &cfg, &[], &[])?;
        if cfg.workarounds.inverted_iq_loss {
            inverted_iq_loss_workaround(&mut self.iface, cfg.inverted_iq).log_non_fatal(cfg.log_clamps);
        }

        let irq_mask = default_irq_mask(cfg.modem);
        set_dio_irq_params(&mut self.iface, cfg.modem, irq_mask, &[])?;

        self.write_sync_word(&cfg)?;

        set_dio2_as_rf_switch_ctrl(&mut self.iface, cfg.dio2_as_rf_switch)?;

        // Bring-up always enters Rx continuous (no timeout), so the
        // implicit-header-timeout errata has no "active timeout" to guard
        // yet; it is applied by `issue_rx` whenever a caller later starts an
        // Rx window with a nonzero timeout (§4.8).
        self.issue_rx(0)?;

        debug!("bring-up complete: modem={:?} freq={}Hz", cfg.modem, cfg.frequency);
        Ok(())
    }

    /// Issues `SetRx(timeout)` and enters the Rx GPIO lines. When `timeout`
    /// is nonzero (an Rx window with an active timeout, as opposed to
    /// continuous Rx) and the config is LoRa with an implicit header, also
    /// applies the implicit-header-timeout errata right after (§4.8: "Used
    /// when packets are received with implicit headers and an active
    /// timeout").
    fn issue_rx(&mut self, timeout: u32) -> Result<(), RadioError> {
        set_rx(&mut self.iface, timeout)?;
        self.enter_rx_lines()?;
        if timeout != 0 && self.config.workarounds.implicit_timeout {
            implicit_header_timeout_workaround(
                &mut self.iface,
                self.config.modem,
                self.config.header_implicit,
            )
            .log_non_fatal(self.config.log_clamps);
        }
        Ok(())
    }

    /// Starts an Rx window with the given 24-bit timeout (`0` enters
    /// continuous Rx). The public entry point for the Rx path the
    /// implicit-header-timeout errata is triggered from.
    pub fn receive(&mut self, timeout: u32) -> Result<(), RadioError> {
        self.issue_rx(timeout)
    }

    /// Writes `Config::sync_word` to the register matching the active
    /// modem, then reads it back to confirm the write landed; a mismatch
    /// is treated as a bring-up failure (§4.7).
    fn write_sync_word(&mut self, cfg: &Config) -> Result<(), RadioError> {
        let reg = match cfg.modem {
            Modem::Lora => Register::LoraSyncWordMsb,
            Modem::Fsk => Register::FskSyncWord,
        };
        let bytes = cfg.sync_word.to_be_bytes();
        self.iface.write_named_register(reg, &bytes)?;
        let (_, readback) = self.iface.read_named_register(reg, 2)?;
        if readback != bytes {
            return Err(RadioError::Config(format!(
                "sync word readback mismatch: wrote {bytes:02x?}, read {readback:02x?}"
            )));
        }
        Ok(())
    }

    fn enter_rx_lines(&mut self) -> Result<(), RadioError> {
        self.tx_en.set_low()?;
        if let Some(rx_en) = &mut self.rx_en {
            rx_en.set_high()?;
        }
        Ok(())
    }

    fn enter_tx_lines(&mut self) -> Result<(), RadioError> {
        if let Some(rx_en) = &mut self.rx_en {
            rx_en.set_low()?;
        }
        self.tx_en.set_high()?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Non-blocking enqueue onto the transmit mailbox; fails with
    /// `QueueFull` rather than blocking (§5(c)).
    pub fn enqueue_tx(&self, payload: Payload) -> Result<(), RadioError> {
        self.tx_sender.try_send(payload)
    }

    /// Blocks up to `timeout` for a received payload (§5(d)).
    pub fn dequeue_rx(&self, timeout: Duration) -> Result<Payload, RadioError> {
        self.rx_receiver.recv_timeout(timeout)
    }

    /// Blocks on the DIO1 rising edge up to `timeout`, polling at the
    /// configured busy-poll interval. The sole wake signal in steady state
    /// (§4.7).
    pub fn wait_for_irq(&mut self, timeout: Duration) -> Result<bool, RadioError> {
        poll_for_high(self.dio1.as_mut(), timeout, self.config.busy_poll_interval)
    }

    /// `GetIrqStatus`, validated against the active modem (§4.4).
    pub fn get_irq_status(&mut self) -> Result<u16, RadioError> {
        get_irq_status(&mut self.iface, self.config.modem)
    }

    /// `ClearIrqStatus` for the given bit mask.
    pub fn clear_irq_status(&mut self, mask: u16) -> Result<(), RadioError> {
        clear_irq_status(&mut self.iface, self.config.modem, mask)
    }

    /// Reads the most recently reported Rx payload out of the data buffer
    /// and updates the cached buffer/packet status (§4.3 `GetRxBufferStatus`,
    /// `GetPacketStatus`).
    fn read_rx_payload(&mut self) -> Result<Payload, RadioError> {
        let buffer_status = get_rx_buffer_status(&mut self.iface)?;
        self.status.buffer = buffer_status;
        self.status.buffer_updated_at = Instant::now();

        let (_, payload) = self
            .iface
            .read_buffer(buffer_status.rx_start_pointer, buffer_status.rx_payload_length as usize)?;

        if let Ok(packet_status) = get_packet_status(&mut self.iface) {
            self.status.packet.signal_strength = packet_status.signal_strength;
            self.status.packet.snr_ratio = packet_status.snr_ratio;
            self.status.packet.denoised_signal_strength = packet_status.denoised_signal_strength;
            self.status.packet_updated_at = Instant::now();
        }

        Ok(payload)
    }

    /// Writes `payload` into the Tx buffer and issues `SetTx`, re-applying
    /// `SetPaConfig` first so the tx-clamp errata (§4.8, triggered "after
    /// `SetPaConfig`") has something to follow. Does not wait for
    /// completion; the caller (or `service`) observes `TxDone` via the
    /// usual IRQ path.
    fn begin_transmit(&mut self, payload: &[u8]) -> Result<(), RadioError> {
        self.enter_tx_lines()?;
        self.iface.write_buffer(self.config.tx_buffer_address, payload)?;
        reduce_pa_config(&mut self.iface, &self.config.clone(), &[])?;
        if self.config.workarounds.tx_clamp {
            tx_clamp_workaround(&mut self.iface, self.config.variant, true).log_non_fatal(self.config.log_clamps);
        }
        set_tx(&mut self.iface, 0)?;
        Ok(())
    }

    /// One IRQ-processing tick (§5's "IRQ-processing task"): waits up to
    /// `timeout` for DIO1, and on a rising edge reads `GetIrqStatus`,
    /// drains a received payload into the Rx mailbox on `RxDone`, resumes
    /// Rx-continuous and starts the next queued Tx payload on `TxDone`,
    /// then clears every observed bit. Returns whether an edge was
    /// observed.
    pub fn service(&mut self, timeout: Duration) -> Result<bool, RadioError> {
        if !self.wait_for_irq(timeout)? {
            return Ok(false);
        }

        let irq = self.get_irq_status()?;
        trace!("irq status: {irq:#06x}");

        if irq & (1 << IrqBit::RxDone as u16) != 0 {
            match self.read_rx_payload() {
                Ok(payload) => {
                    if self.rx_sender.try_send(payload).is_err() {
                        warn!("rx mailbox full, dropping received payload");
                    }
                }
                Err(e) => warn!("failed to read rx payload after RxDone: {e}"),
            }
        }

        if irq & (1 << IrqBit::TxDone as u16) != 0 {
            if self.config.workarounds.tx_clamp {
                tx_clamp_workaround(&mut self.iface, self.config.variant, false)
                    .log_non_fatal(self.config.log_clamps);
            }
            match self.tx_receiver.recv_timeout(Duration::ZERO) {
                Ok(next) => self.begin_transmit(&next)?,
                Err(_) => self.issue_rx(0)?,
            }
        }

        if let Ok((chip_mode, command_status)) = get_status(&mut self.iface) {
            self.status.modem.chip_mode = chip_mode;
            self.status.modem.command = command_status;
            self.status.modem_updated_at = Instant::now();
        }
        if let Ok(errors) = get_device_errors(&mut self.iface) {
            self.status.error = errors;
            self.status.error_updated_at = Instant::now();
        }

        self.clear_irq_status(irq)?;
        Ok(true)
    }

    /// `SetSleep(configured_mode)`, drives `tx_en` low, drains both
    /// mailboxes (§4.7).
    pub fn close(&mut self) -> Result<(), RadioError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let sleep_result = set_sleep(&mut self.iface, self.config.sleep_mode);
        let tx_en_result = self.tx_en.set_low();

        self.tx_receiver.drain();
        self.rx_receiver.drain();

        sleep_result?;
        tx_en_result?;
        Ok(())
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.close();
        }
    }
}

/// The IRQ bits bring-up enables by default: everything legal for the
/// active modem except the CAD bits, which only matter to callers that
/// explicitly drive `SetCAD`.
fn default_irq_mask(modem: Modem) -> u16 {
    let mut mask = (1 << IrqBit::TxDone as u16)
        | (1 << IrqBit::RxDone as u16)
        | (1 << IrqBit::Timeout as u16)
        | (1 << IrqBit::CrcErr as u16)
        | (1 << IrqBit::PreambleDetected as u16);
    match modem {
        Modem::Lora => mask |= 1 << IrqBit::HeaderErr as u16,
        Modem::Fsk => mask |= 1 << IrqBit::SyncWordValid as u16,
    }
    mask
}

/// Errata routines are allowed to fail with `ErrataPrecondition` without
/// aborting the caller (§4.8 "degrade gracefully"); this logs that failure
/// at a level below information rather than propagating it.
trait LogNonFatal {
    fn log_non_fatal(self, log_clamps: bool);
}

impl LogNonFatal for Result<(), RadioError> {
    fn log_non_fatal(self, log_clamps: bool) {
        if let Err(e) = self {
            if log_clamps {
                debug!("errata skipped: {e}");
            }
        }
    }
}
