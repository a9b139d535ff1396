//! Interrupt, terminate, and resize signals.
//!
//! Handlers only flip atomics; the session loop polls them with [`take_shutdown_request`]
//! and [`take_resize`].

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);
static RESIZE_PENDING: AtomicBool = AtomicBool::new(false);

/// True once after SIGINT or SIGTERM arrived.
pub fn take_shutdown_request() -> bool {
    SHUTDOWN_REQUESTED.swap(false, Ordering::SeqCst)
}

/// True once after SIGWINCH arrived.
pub fn take_resize() -> bool {
    RESIZE_PENDING.swap(false, Ordering::SeqCst)
}

#[cfg(unix)]
mod imp {
    use super::{RESIZE_PENDING, SHUTDOWN_REQUESTED};
    use anyhow::{anyhow, Result};
    use std::sync::atomic::Ordering;
    use tracing::debug;

    pub(super) extern "C" fn handle_shutdown(_: libc::c_int) {
        SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
    }

    pub(super) extern "C" fn handle_resize(_: libc::c_int) {
        RESIZE_PENDING.store(true, Ordering::SeqCst);
    }

    pub(super) type Previous = Vec<(libc::c_int, libc::sighandler_t)>;

    pub(super) fn install() -> Result<Previous> {
        let shutdown = handle_shutdown as *const () as libc::sighandler_t;
        let resize = handle_resize as *const () as libc::sighandler_t;
        let wanted = [
            (libc::SIGINT, shutdown),
            (libc::SIGTERM, shutdown),
            (libc::SIGWINCH, resize),
        ];
        let mut previous = Vec::with_capacity(wanted.len());
        for (signal, handler) in wanted {
            // SAFETY: both handlers are extern "C" functions that only store to an
            // atomic, which is async-signal-safe.
            let old = unsafe { libc::signal(signal, handler) };
            if old == libc::SIG_ERR {
                debug!(signal, "failed to install signal handler");
                restore(&previous);
                return Err(anyhow!("failed to install handler for signal {signal}"));
            }
            previous.push((signal, old));
        }
        Ok(previous)
    }

    pub(super) fn restore(previous: &Previous) {
        for &(signal, handler) in previous.iter().rev() {
            // SAFETY: `handler` is the disposition the OS returned for this signal.
            unsafe {
                libc::signal(signal, handler);
            }
        }
    }
}

#[cfg(not(unix))]
mod imp {
    use anyhow::Result;

    pub(super) type Previous = ();

    pub(super) fn install() -> Result<Previous> {
        Ok(())
    }

    pub(super) fn restore(_: &Previous) {}
}

/// Installed handlers. Dropping or releasing restores the previous dispositions.
pub struct SignalSubscription {
    previous: Option<imp::Previous>,
}

impl SignalSubscription {
    pub fn install() -> Result<Self> {
        SHUTDOWN_REQUESTED.store(false, Ordering::SeqCst);
        RESIZE_PENDING.store(false, Ordering::SeqCst);
        Ok(Self {
            previous: Some(imp::install()?),
        })
    }

    pub fn is_active(&self) -> bool {
        self.previous.is_some()
    }

    /// Restore previous handlers. Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(previous) = self.previous.take() {
            imp::restore(&previous);
        }
    }
}

impl Drop for SignalSubscription {
    fn drop(&mut self) {
        self.release();
    }
}
