//! Bounded transmit/receive mailboxes (§5). Thin wrappers over
//! `std::sync::mpsc::sync_channel`: `try_send` already gives the
//! non-blocking "drop with `QueueFull`" semantics a transmit queue needs,
//! and `recv_timeout` already gives the bounded receive wait — no custom
//! queue type earns its keep here.

use std::sync::mpsc::{sync_channel, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::time::Duration;

use crate::error::RadioError;

/// The producing half of a bounded mailbox.
pub struct MailboxSender<T> {
    tx: SyncSender<T>,
}

impl<T> MailboxSender<T> {
    /// Non-blocking; a full queue fails with `QueueFull` rather than
    /// blocking the caller (§5(c)).
    pub fn try_send(&self, item: T) -> Result<(), RadioError> {
        match self.tx.try_send(item) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(RadioError::QueueFull),
            Err(TrySendError::Disconnected(_)) => Err(RadioError::QueueFull),
        }
    }
}

/// The consuming half of a bounded mailbox.
pub struct MailboxReceiver<T> {
    rx: Receiver<T>,
}

impl<T> MailboxReceiver<T> {
    /// Blocks up to `timeout`; an empty queue past that deadline fails with
    /// `RxTimeout` (§5(d)).
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RadioError> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => RadioError::RxTimeout,
            RecvTimeoutError::Disconnected => RadioError::RxTimeout,
        })
    }

    /// Empties the mailbox without blocking, discarding whatever is queued.
    /// Used by `Device::close` to drain both mailboxes on shutdown (§4.7).
    pub fn drain(&self) {
        while self.rx.recv_timeout(Duration::ZERO).is_ok() {}
    }
}

/// A bounded producer/consumer pair, sized at construction.
pub fn mailbox<T>(capacity: usize) -> (MailboxSender<T>, MailboxReceiver<T>) {
    let (tx, rx) = sync_channel(capacity);
    (MailboxSender { tx }, MailboxReceiver { rx })
}
