//! Timer loop for stdin/stdout that is not a terminal: one plain `HH:MM:SS` line per
//! second, no escape sequences, no keyboard control.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

use crate::clock::{ClockMode, TimeModel, TimeSource};
use crate::config::ClockConfig;
use crate::notify::{ring_bell, Notifier, BELL_REPEAT, NOTIFICATION_TITLE};
use crate::render::format_hms;

/// Count down `base_seconds`, printing each new value, then announce completion.
pub fn run_headless_timer<S, N, W>(
    base_seconds: u64,
    config: &ClockConfig,
    source: S,
    notifier: &N,
    out: &mut W,
    mut sleep: impl FnMut(Duration),
) -> io::Result<()>
where
    S: TimeSource,
    N: Notifier + ?Sized,
    W: Write,
{
    let mut model = TimeModel::new(ClockMode::Timer, base_seconds, source);
    model.start();
    let tick = Duration::from_millis(config.tick_rate_ms);
    let mut last_printed = None;
    info!(base_seconds, "headless timer started");
    loop {
        let remaining = model.display_seconds();
        if last_printed != Some(remaining) {
            writeln!(out, "{}", format_hms(remaining))?;
            out.flush()?;
            last_printed = Some(remaining);
        }
        if model.is_done() {
            break;
        }
        sleep(tick);
    }

    if model.mark_notified() {
        if config.notify_on_complete {
            let delivered = notifier.notify(NOTIFICATION_TITLE, config.completion_text());
            debug!(delivered, "completion notification");
        }
        if config.play_sound_on_complete {
            ring_bell(out, BELL_REPEAT)?;
        }
    }
    Ok(())
}

/// Production sleep for [`run_headless_timer`].
pub fn thread_sleep(interval: Duration) {
    thread::sleep(interval);
}
