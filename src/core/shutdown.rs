//! Process-wide stop signal.
//!
//! Nothing is ever sent on the channel: dropping the only sender disconnects
//! every receiver at once, which wakes all interruptible sleeps.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, bounded};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

pub struct ShutdownTrigger {
    tx: Mutex<Option<Sender<()>>>,
}

#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: Receiver<()>,
}

pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = bounded(0);
    (
        ShutdownTrigger {
            tx: Mutex::new(Some(tx)),
        },
        Shutdown { rx },
    )
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.tx.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}

impl Shutdown {
    pub fn requested(&self) -> bool {
        !matches!(self.rx.try_recv(), Err(TryRecvError::Empty))
    }

    /// Sleep for `period` unless shutdown arrives first. Returns false on shutdown.
    pub fn sleep(&self, period: Duration) -> bool {
        if period.is_zero() {
            return !self.requested();
        }
        matches!(self.rx.recv_timeout(period), Err(RecvTimeoutError::Timeout))
    }
}
