//! Drift-free clock arithmetic for timer and stopwatch runs.
//!
//! Elapsed time is banked in `accumulated` whenever the clock pauses and measured
//! against `anchor` while it runs, so irregular tick scheduling never skews it.

use std::time::{Duration, Instant};

/// Source of "now" for the time model. Monotonic in production, simulated in tests.
pub trait TimeSource {
    fn now(&self) -> Instant;
}

/// Production time source backed by `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl TimeSource for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    Timer,
    Stopwatch,
}

impl ClockMode {
    pub fn title(self) -> &'static str {
        match self {
            ClockMode::Timer => "Timer",
            ClockMode::Stopwatch => "Stopwatch",
        }
    }
}

impl std::fmt::Display for ClockMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Mutable per-run clock state. Owned by exactly one runtime.
#[derive(Debug)]
pub struct TimeModel<S: TimeSource = MonotonicClock> {
    source: S,
    mode: ClockMode,
    base_seconds: u64,
    anchor: Instant,
    accumulated: Duration,
    paused: bool,
    done: bool,
    notified: bool,
}

impl<S: TimeSource> TimeModel<S> {
    /// Build a model anchored at the source's current instant. Stopwatch ignores
    /// `base_seconds`.
    pub fn new(mode: ClockMode, base_seconds: u64, source: S) -> Self {
        let anchor = source.now();
        let base_seconds = match mode {
            ClockMode::Timer => base_seconds,
            ClockMode::Stopwatch => 0,
        };
        Self {
            source,
            mode,
            base_seconds,
            anchor,
            accumulated: Duration::ZERO,
            paused: false,
            done: false,
            notified: false,
        }
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    pub fn base_seconds(&self) -> u64 {
        self.base_seconds
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn is_notified(&self) -> bool {
        self.notified
    }

    /// Begin the first unpaused interval.
    pub fn start(&mut self) {
        self.reset_at(self.source.now());
    }

    pub fn pause(&mut self) {
        if self.paused {
            return;
        }
        let now = self.source.now();
        self.accumulated += now.saturating_duration_since(self.anchor);
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if !self.paused || self.done {
            return;
        }
        self.anchor = self.source.now();
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Reset accumulators, completion, and the notification guard.
    pub fn restart(&mut self) {
        self.reset_at(self.source.now());
    }

    fn reset_at(&mut self, now: Instant) {
        self.anchor = now;
        self.accumulated = Duration::ZERO;
        self.paused = false;
        self.done = false;
        self.notified = false;
    }

    pub fn elapsed(&self) -> Duration {
        if self.paused {
            self.accumulated
        } else {
            self.accumulated + self.source.now().saturating_duration_since(self.anchor)
        }
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed().as_secs()
    }

    /// Seconds to show. In timer mode reaching zero latches `done` and pauses the
    /// clock until the next restart.
    pub fn display_seconds(&mut self) -> u64 {
        let elapsed = self.elapsed_seconds();
        match self.mode {
            ClockMode::Stopwatch => elapsed,
            ClockMode::Timer => {
                let remaining = self.base_seconds.saturating_sub(elapsed);
                if remaining == 0 && !self.done {
                    self.pause();
                    self.done = true;
                }
                remaining
            }
        }
    }

    /// Claim the one completion notification allowed per run. Returns `true` only on
    /// the first call after completion since the last restart.
    pub fn mark_notified(&mut self) -> bool {
        if !self.done || self.notified {
            return false;
        }
        self.notified = true;
        true
    }
}
