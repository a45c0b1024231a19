use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};

use chrono::{DateTime, Utc};

use crate::abort::AbortSignal;

/// Source of time and the only place the scheduler blocks.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Blocks until `deadline`, returning early if an abort is requested.
    fn sleep_until(&self, deadline: DateTime<Utc>) -> Result<(), AbortSignal>;

    /// Non-blocking abort check for boundaries that do not sleep.
    fn check_abort(&self) -> Result<(), AbortSignal> {
        Ok(())
    }
}

/// Wall clock whose sleeps wake up as soon as an [`AbortSignal`] arrives on the channel.
pub struct SystemClock {
    abort_rx: Receiver<AbortSignal>,
}

impl SystemClock {
    pub fn new(abort_rx: Receiver<AbortSignal>) -> Self {
        Self { abort_rx }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep_until(&self, deadline: DateTime<Utc>) -> Result<(), AbortSignal> {
        self.check_abort()?;
        loop {
            let remaining = match (deadline - Utc::now()).to_std() {
                Ok(remaining) if !remaining.is_zero() => remaining,
                _ => return Ok(()),
            };
            match self.abort_rx.recv_timeout(remaining) {
                Ok(signal) => return Err(signal),
                Err(RecvTimeoutError::Timeout) => {}
                // No one can abort any more; plain sleep.
                Err(RecvTimeoutError::Disconnected) => std::thread::sleep(remaining),
            }
        }
    }

    fn check_abort(&self) -> Result<(), AbortSignal> {
        match self.abort_rx.try_recv() {
            Ok(signal) => Err(signal),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => Ok(()),
        }
    }
}
