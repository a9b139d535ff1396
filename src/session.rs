//! Interactive full-screen clock runtime.
//!
//! [`ClockSession`] holds the per-run state and reacts to ticks, key chunks, and
//! resizes. [`run_interactive`] owns the terminal and drives a session from one
//! `select!` loop until an exit key or a signal arrives.

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, never, select, Receiver};
use crossterm::terminal::size as terminal_size;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, info};

use crate::clock::{ClockMode, MonotonicClock, TimeModel, TimeSource};
use crate::config::ClockConfig;
use crate::glyph::GlyphRenderer;
use crate::input::{dispatch_chunk, spawn_input_thread, InputAction};
use crate::notify::{ring_bell, Notifier, BELL_REPEAT, NOTIFICATION_TITLE};
use crate::render::{ClockView, FrameRenderer, TerminalSize, CLEAR_AND_HOME};
use crate::scheduler::TickHandle;
use crate::signals::{take_resize, take_shutdown_request, SignalSubscription};
use crate::terminal_restore::TerminalRestoreGuard;

const EVENT_LOOP_IDLE_MS: u64 = 50;
const INPUT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionControl {
    Continue,
    Exit,
}

/// One-shot latch for the shutdown path.
#[derive(Debug, Default)]
pub struct ShutdownGuard {
    started: bool,
}

impl ShutdownGuard {
    /// Returns `true` only for the first caller.
    pub fn begin(&mut self) -> bool {
        !std::mem::replace(&mut self.started, true)
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

/// Owns the tick source, the input channel, and the release steps for the terminal and
/// signal handlers.
/// Every exit route ends in [`Teardown::run`]: the normal return calls it directly, and
/// an early `?` return reaches it through `Drop`. Only the first call does any work.
pub struct Teardown<F: FnMut()> {
    shutdown: ShutdownGuard,
    ticks: TickHandle,
    input: Receiver<Vec<u8>>,
    release: F,
}

impl<F: FnMut()> Teardown<F> {
    pub fn new(ticks: TickHandle, input: Receiver<Vec<u8>>, release: F) -> Self {
        Self {
            shutdown: ShutdownGuard::default(),
            ticks,
            input,
            release,
        }
    }

    pub fn ticks(&self) -> &TickHandle {
        &self.ticks
    }

    pub fn input(&self) -> &Receiver<Vec<u8>> {
        &self.input
    }

    /// Cancel the tick, disconnect input, run the release steps, then clear the screen.
    /// Returns `false` when shutdown already ran.
    pub fn run(&mut self, out: &mut impl Write) -> io::Result<bool> {
        if !self.shutdown.begin() {
            return Ok(false);
        }
        self.ticks.cancel();
        self.input = never();
        (self.release)();
        out.write_all(CLEAR_AND_HOME)?;
        out.flush()?;
        Ok(true)
    }
}

impl<F: FnMut()> Drop for Teardown<F> {
    fn drop(&mut self) {
        if let Err(err) = self.run(&mut io::stdout()) {
            debug!(error = %err, "clear screen failed during teardown");
        }
    }
}

pub struct ClockSession<W, G, N, S = MonotonicClock>
where
    W: Write,
    G: GlyphRenderer,
    N: Notifier,
    S: TimeSource,
{
    config: ClockConfig,
    model: TimeModel<S>,
    renderer: FrameRenderer<G>,
    notifier: N,
    out: W,
}

impl<W, G, N, S> ClockSession<W, G, N, S>
where
    W: Write,
    G: GlyphRenderer,
    N: Notifier,
    S: TimeSource,
{
    pub fn new(config: ClockConfig, model: TimeModel<S>, glyphs: G, notifier: N, out: W) -> Self {
        Self {
            config,
            model,
            renderer: FrameRenderer::new(glyphs),
            notifier,
            out,
        }
    }

    pub fn model(&self) -> &TimeModel<S> {
        &self.model
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn frames_written(&self) -> u64 {
        self.renderer.frames_written()
    }

    /// Start the clock and draw the first frame.
    pub fn start(&mut self, size: Option<TerminalSize>) -> io::Result<()> {
        self.model.start();
        self.redraw(size, true)
    }

    pub fn on_tick(&mut self, size: Option<TerminalSize>) -> io::Result<()> {
        self.redraw(size, false)
    }

    /// Apply one raw input chunk. Unbound keys change nothing and draw nothing.
    pub fn on_input(
        &mut self,
        chunk: &[u8],
        size: Option<TerminalSize>,
    ) -> io::Result<SessionControl> {
        let Some(action) = dispatch_chunk(chunk, &self.config.keybindings) else {
            return Ok(SessionControl::Continue);
        };
        debug!(?action, "input action");
        match action {
            InputAction::Exit => return Ok(SessionControl::Exit),
            InputAction::TogglePause => {
                if self.model.is_done() {
                    return Ok(SessionControl::Continue);
                }
                self.model.toggle_pause();
            }
            InputAction::Restart => self.model.restart(),
        }
        self.redraw(size, false)?;
        Ok(SessionControl::Continue)
    }

    /// Re-layout for new terminal dimensions with exactly one forced frame.
    pub fn on_resize(&mut self, size: Option<TerminalSize>) -> io::Result<()> {
        self.renderer.invalidate();
        self.redraw(size, true)
    }

    /// Completion is detected and announced before the frame that shows it.
    fn redraw(&mut self, size: Option<TerminalSize>, force: bool) -> io::Result<()> {
        let view = ClockView {
            mode: self.model.mode(),
            seconds: self.model.display_seconds(),
            paused: self.model.is_paused(),
            done: self.model.is_done(),
        };
        if view.done {
            self.announce_completion()?;
        }
        self.renderer
            .render(&mut self.out, &view, &self.config, size, force)
            .map(|_| ())
    }

    fn announce_completion(&mut self) -> io::Result<()> {
        if !self.model.mark_notified() {
            return Ok(());
        }
        info!(base_seconds = self.model.base_seconds(), "timer complete");
        if self.config.notify_on_complete {
            let delivered = self
                .notifier
                .notify(NOTIFICATION_TITLE, self.config.completion_text());
            debug!(delivered, "completion notification");
        }
        if self.config.play_sound_on_complete {
            ring_bell(&mut self.out, BELL_REPEAT)?;
        }
        Ok(())
    }
}

/// Current terminal dimensions, or `None` when they cannot be read.
pub fn current_size() -> Option<TerminalSize> {
    terminal_size()
        .ok()
        .filter(|(cols, rows)| *cols > 0 && *rows > 0)
        .map(|(cols, rows)| TerminalSize { cols, rows })
}

/// Run the full-screen clock until the user exits or a signal arrives. Returns the
/// process exit code.
pub fn run_interactive<G, N>(
    mode: ClockMode,
    base_seconds: u64,
    config: ClockConfig,
    glyphs: G,
    notifier: N,
) -> Result<i32>
where
    G: GlyphRenderer,
    N: Notifier,
{
    let guard = TerminalRestoreGuard::new();
    let mut stdout = io::stdout();
    guard
        .enable_raw_mode()
        .context("failed to enable raw terminal mode")?;
    guard
        .hide_cursor(&mut stdout)
        .context("failed to hide cursor")?;
    let mut signals = SignalSubscription::install()?;

    let (input_tx, input_rx) = bounded::<Vec<u8>>(INPUT_CHANNEL_CAPACITY);
    let _input_thread = spawn_input_thread(input_tx);
    let closed_input = never::<Vec<u8>>();
    let mut input_open = true;
    let ticks = TickHandle::start(Duration::from_millis(config.tick_rate_ms));
    let mut teardown = Teardown::new(ticks, input_rx, move || {
        signals.release();
        guard.restore();
    });
    info!(%mode, base_seconds, tick_ms = config.tick_rate_ms, "session started");

    let model = TimeModel::new(mode, base_seconds, MonotonicClock);
    let mut session = ClockSession::new(config, model, glyphs, notifier, stdout);
    session.start(current_size())?;

    let idle = Duration::from_millis(EVENT_LOOP_IDLE_MS);
    let mut running = true;
    while running {
        if take_shutdown_request() {
            debug!("shutdown signal received");
            break;
        }
        if take_resize() {
            session.on_resize(current_size())?;
        }
        let active_input = if input_open {
            teardown.input()
        } else {
            &closed_input
        };
        select! {
            recv(teardown.ticks().receiver()) -> _ => session.on_tick(current_size())?,
            recv(active_input) -> chunk => match chunk {
                Ok(bytes) => {
                    if session.on_input(&bytes, current_size())? == SessionControl::Exit {
                        running = false;
                    }
                }
                Err(_) => {
                    debug!("input closed");
                    input_open = false;
                }
            },
            default(idle) => {}
        }
    }

    if teardown.run(session.output_mut())? {
        info!("session ended");
    }
    Ok(0)
}
