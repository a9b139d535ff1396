use crossbeam_channel::{never, tick, Receiver};
use std::time::{Duration, Instant};

/// Periodic tick source for the session loop. Cancelling swaps in a channel that never
/// fires, so a `select!` arm on [`TickHandle::receiver`] goes quiet immediately.
#[derive(Debug)]
pub struct TickHandle {
    rx: Receiver<Instant>,
    interval: Duration,
    cancelled: bool,
}

impl TickHandle {
    pub fn start(interval: Duration) -> Self {
        Self {
            rx: tick(interval),
            interval,
            cancelled: false,
        }
    }

    pub fn receiver(&self) -> &Receiver<Instant> {
        &self.rx
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn cancel(&mut self) {
        if !self.cancelled {
            self.rx = never();
            self.cancelled = true;
        }
    }
}
