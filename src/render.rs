//! Frame layout and redraw suppression for the full-screen clock.

use std::io::{self, Write};
use tracing::debug;
use unicode_width::UnicodeWidthStr;

use crate::clock::ClockMode;
use crate::config::{ClockConfig, Keybindings};
use crate::glyph::{render_time_block, GlyphRenderer};

/// Clear the screen and home the cursor.
pub const CLEAR_AND_HOME: &[u8] = b"\x1b[2J\x1b[H";
/// Raw mode disables output post-processing, so lines need an explicit carriage return.
const LINE_BREAK: &str = "\r\n";
/// Width assumed when the terminal size cannot be queried.
pub const FALLBACK_COLUMNS: u16 = 120;
pub const PAUSED_LABEL: &str = "Paused";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalSize {
    pub cols: u16,
    pub rows: u16,
}

/// Everything visible in one frame that comes from the clock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockView {
    pub mode: ClockMode,
    pub seconds: u64,
    pub paused: bool,
    pub done: bool,
}

/// Fingerprint of the visible state. Equal keys mean an identical frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderKey {
    seconds: u64,
    paused: bool,
    done: bool,
    cols: u16,
    rows: u16,
}

impl RenderKey {
    pub fn new(view: &ClockView, size: Option<TerminalSize>) -> Self {
        let size = size.unwrap_or(TerminalSize { cols: 0, rows: 0 });
        Self {
            seconds: view.seconds,
            paused: view.paused,
            done: view.done,
            cols: size.cols,
            rows: size.rows,
        }
    }
}

/// `HH:MM:SS`; hours keep growing past 99.
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

pub fn controls_help_line(bindings: &Keybindings) -> String {
    format!(
        "Controls: {}/{} Pause-Resume | {} Restart | {}/{}/Ctrl+C Exit",
        bindings.pause.label(),
        bindings.pause_alt.label(),
        bindings.restart.label(),
        bindings.exit.label(),
        bindings.exit_alt.label(),
    )
}

/// Header and controls pinned to the top, plus the trailing separator when non-empty.
pub fn top_lines(mode: ClockMode, config: &ClockConfig) -> Vec<String> {
    let mut lines = Vec::new();
    if config.show_header {
        lines.push(format!("{} | Font: {}", mode.title(), config.font));
    }
    if config.show_controls {
        lines.push(controls_help_line(&config.keybindings));
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Glyph block followed by the status line, if any.
pub fn center_lines(view: &ClockView, config: &ClockConfig, glyphs: Vec<String>) -> Vec<String> {
    let mut lines = glyphs;
    if view.done {
        if !config.completion_message.is_empty() {
            lines.push(String::new());
            lines.push(config.completion_message.clone());
        }
    } else if view.paused {
        lines.push(String::new());
        lines.push(PAUSED_LABEL.to_string());
    }
    lines
}

/// Lay out the frame as screen lines. Only the center block is centered; the top block
/// keeps the first rows.
pub fn compose_frame(
    top: Vec<String>,
    center: Vec<String>,
    centered: bool,
    size: Option<TerminalSize>,
) -> Vec<String> {
    if !centered {
        return top.into_iter().chain(center).collect();
    }
    let center = if center.is_empty() {
        vec![String::new()]
    } else {
        center
    };
    let cols = size.map(|size| size.cols).unwrap_or(FALLBACK_COLUMNS) as usize;
    let rows = size
        .map(|size| size.rows as usize)
        .unwrap_or(top.len() + center.len());
    let block_width = center.iter().map(|line| line.width()).max().unwrap_or(0);
    let pad_left = cols.saturating_sub(block_width) / 2;
    let available_height = rows.saturating_sub(top.len());
    let pad_top = available_height.saturating_sub(center.len()) / 2;

    let prefix = " ".repeat(pad_left);
    let mut lines = top;
    lines.extend(std::iter::repeat(String::new()).take(pad_top));
    lines.extend(center.into_iter().map(|line| format!("{prefix}{line}")));
    lines
}

/// Remembers the last drawn fingerprint so unchanged frames cost no I/O.
#[derive(Debug, Default)]
pub struct RenderDiffer {
    last: Option<RenderKey>,
}

impl RenderDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` and report whether a redraw is needed.
    pub fn should_draw(&mut self, key: RenderKey, force: bool) -> bool {
        if !force && self.last == Some(key) {
            return false;
        }
        self.last = Some(key);
        true
    }

    /// Forget the last frame so the next request always draws.
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}

/// Owns the differ and the glyph renderer and writes whole frames.
pub struct FrameRenderer<G: GlyphRenderer> {
    differ: RenderDiffer,
    glyphs: G,
    frames_written: u64,
}

impl<G: GlyphRenderer> FrameRenderer<G> {
    pub fn new(glyphs: G) -> Self {
        Self {
            differ: RenderDiffer::new(),
            glyphs,
            frames_written: 0,
        }
    }

    pub fn invalidate(&mut self) {
        self.differ.invalidate();
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn glyphs(&self) -> &G {
        &self.glyphs
    }

    /// Draw the frame for `view` unless it matches the previous one. Returns whether
    /// anything was written.
    pub fn render(
        &mut self,
        out: &mut dyn Write,
        view: &ClockView,
        config: &ClockConfig,
        size: Option<TerminalSize>,
        force: bool,
    ) -> io::Result<bool> {
        let key = RenderKey::new(view, size);
        if !self.differ.should_draw(key, force) {
            return Ok(false);
        }
        let glyphs = render_time_block(&self.glyphs, &format_hms(view.seconds), &config.font);
        let lines = compose_frame(
            top_lines(view.mode, config),
            center_lines(view, config, glyphs),
            config.center_display,
            size,
        );
        let mut frame = Vec::with_capacity(lines.iter().map(|line| line.len() + 2).sum());
        frame.extend_from_slice(CLEAR_AND_HOME);
        frame.extend_from_slice(lines.join(LINE_BREAK).as_bytes());
        out.write_all(&frame)?;
        out.flush()?;
        self.frames_written += 1;
        debug!(seconds = view.seconds, paused = view.paused, done = view.done, force, "frame drawn");
        Ok(true)
    }
}
