//! Command-line front end shared by the `timer` and `stopwatch` binaries.

use anyhow::Result;
use clap::{Args, Parser};
use serde_json::{json, Map};
use std::fmt;
use std::io::{self, IsTerminal, Write};
use tracing::{info, warn};

use crate::clock::{ClockMode, MonotonicClock};
use crate::config::{load_config, update_config, ClockConfig, ConfigPaths};
use crate::duration::parse_duration_args;
use crate::glyph::{is_timer_compatible, FigletRenderer, FontCatalog, GlyphRenderer};
use crate::headless::{run_headless_timer, thread_sleep};
use crate::notify::NotificationDispatcher;
use crate::session::run_interactive;
use crate::settings::{run_settings, SettingsProgram};
use crate::telemetry::init_tracing;

pub const USAGE: &str = "Usage

Stopwatch
  stopwatch

Timer
  timer <number> <hr/hrs/min/sec> [<number> <hr/hrs/min/sec> ...]
  Example: timer 5 min 2 sec

Settings
  timer settings

Controls
  Defaults: p/Space Pause-Resume | r Restart | q/e/Ctrl+C Exit
  Keybindings are customizable in `timer settings`.

Font Styles
  timer style
  timer style --compatible
  timer style <font>
";

/// File logging switches shared by both binaries.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Enable JSON trace logging to a temp file
    #[arg(long = "logs", env = "CLI_TIMER_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "CLI_TIMER_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,
}

impl LogArgs {
    pub fn enabled(&self) -> bool {
        self.logs && !self.no_logs
    }
}

#[derive(Debug, Parser)]
#[command(name = "timer", about = "Full-screen countdown timer", version)]
pub struct TimerCli {
    #[command(flatten)]
    pub log: LogArgs,

    /// `<number> <unit>` pairs, `settings`, or `style [--all | --compatible | <font>]`
    #[arg(num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Debug, Parser)]
#[command(name = "stopwatch", about = "Full-screen stopwatch", version)]
pub struct StopwatchCli {
    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSelectionError {
    Unknown(String),
    Incompatible(String),
}

impl fmt::Display for FontSelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontSelectionError::Unknown(font) => write!(f, "Unknown font: {font}"),
            FontSelectionError::Incompatible(font) => {
                write!(f, "Font is incompatible with timer digits: {font}")
            }
        }
    }
}

impl std::error::Error for FontSelectionError {}

/// Everything a command needs from the environment, resolved once per process.
pub struct CliContext {
    pub paths: ConfigPaths,
    pub catalog: FontCatalog,
    pub renderer: FigletRenderer,
}

impl CliContext {
    pub fn new(paths: ConfigPaths) -> Self {
        let font_dir = paths.font_dir();
        Self {
            catalog: FontCatalog::new(&font_dir),
            renderer: FigletRenderer::new(font_dir),
            paths,
        }
    }

    pub fn from_env() -> Self {
        Self::new(ConfigPaths::from_env())
    }

    pub fn load_config(&mut self) -> ClockConfig {
        let Self {
            paths,
            catalog,
            renderer,
        } = self;
        let renderer: &FigletRenderer = renderer;
        load_config(paths, |font| catalog.resolve_compatible(renderer, font))
    }
}

fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

/// Canonical name for `requested`, provided it exists and can draw the clock.
pub fn select_font(
    catalog: &mut FontCatalog,
    renderer: &dyn GlyphRenderer,
    requested: &str,
) -> Result<String, FontSelectionError> {
    let font = catalog
        .normalize(requested)
        .ok_or_else(|| FontSelectionError::Unknown(requested.to_string()))?;
    if !is_timer_compatible(renderer, &font) {
        return Err(FontSelectionError::Incompatible(requested.to_string()));
    }
    Ok(font)
}

/// `timer style ...`. Returns the exit code.
pub fn run_style(
    ctx: &mut CliContext,
    args: &[String],
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<i32> {
    match args {
        [] => list_all_fonts(ctx, out),
        [flag] if flag == "--all" => list_all_fonts(ctx, out),
        [flag] if flag == "--compatible" => {
            write!(out, "Checking font compatibility for timer digits...\n\n")?;
            let current = ctx.load_config().font;
            write!(out, "Current font: {current}\n\nTimer-compatible fonts:\n")?;
            for font in ctx.catalog.compatible_fonts(&ctx.renderer) {
                writeln!(out, "{font}")?;
            }
            Ok(0)
        }
        _ => {
            let requested = args.join(" ");
            match select_font(&mut ctx.catalog, &ctx.renderer, &requested) {
                Ok(font) => {
                    let mut patch = Map::new();
                    patch.insert("font".to_string(), json!(font));
                    let CliContext {
                        paths,
                        catalog,
                        renderer,
                    } = &mut *ctx;
                    let renderer: &FigletRenderer = renderer;
                    let saved = update_config(paths, patch, |name| {
                        catalog.resolve_compatible(renderer, name)
                    })?;
                    info!(font = %saved.font, "font updated");
                    writeln!(out, "Font set to: {}", saved.font)?;
                    Ok(0)
                }
                Err(selection) => {
                    writeln!(err, "{selection}")?;
                    writeln!(err, "Run `timer style` to list fonts.")?;
                    writeln!(err, "Run `timer style --compatible` to list only compatible fonts.")?;
                    Ok(1)
                }
            }
        }
    }
}

fn list_all_fonts(ctx: &mut CliContext, out: &mut dyn Write) -> Result<i32> {
    let current = ctx.load_config().font;
    write!(out, "Current font: {current}\n\nAvailable fonts:\n")?;
    for font in ctx.catalog.all_fonts() {
        writeln!(out, "{font}")?;
    }
    write!(
        out,
        "\nTip: Some fonts do not support timer digits.\nUse `timer style <font>` to validate and set safely.\n"
    )?;
    Ok(0)
}

fn run_settings_command(ctx: &mut CliContext) -> Result<i32> {
    if !is_interactive() {
        eprintln!("`timer settings` requires an interactive terminal (TTY).");
        return Ok(1);
    }
    let config = ctx.load_config();
    let fonts = ctx.catalog.all_fonts().to_vec();
    let program = SettingsProgram::from_env()?;
    run_settings(&program, &ctx.paths, &config, &fonts)
}

fn run_clock(ctx: &mut CliContext, mode: ClockMode, base_seconds: u64) -> Result<i32> {
    let config = ctx.load_config();
    let notifier = NotificationDispatcher::system();
    if is_interactive() {
        let renderer = FigletRenderer::new(ctx.paths.font_dir());
        return run_interactive(mode, base_seconds, config, renderer, notifier);
    }
    match mode {
        ClockMode::Stopwatch => {
            eprintln!("Stopwatch requires an interactive terminal (TTY).");
            Ok(1)
        }
        ClockMode::Timer => {
            let mut stdout = io::stdout();
            run_headless_timer(
                base_seconds,
                &config,
                MonotonicClock,
                &notifier,
                &mut stdout,
                thread_sleep,
            )?;
            Ok(0)
        }
    }
}

/// `timer` with its raw positional arguments. Returns the exit code.
pub fn run_timer(ctx: &mut CliContext, args: &[String]) -> Result<i32> {
    let Some(first) = args.first() else {
        print!("{USAGE}");
        return Ok(1);
    };
    match first.as_str() {
        "settings" => run_settings_command(ctx),
        "style" => {
            let stdout = io::stdout();
            let stderr = io::stderr();
            run_style(ctx, &args[1..], &mut stdout.lock(), &mut stderr.lock())
        }
        _ => match parse_duration_args(args) {
            Ok(total) => run_clock(ctx, ClockMode::Timer, total),
            Err(err) => {
                eprint!("{err}\n\n");
                print!("{USAGE}");
                Ok(1)
            }
        },
    }
}

fn finish(result: Result<i32>) -> i32 {
    match result {
        Ok(code) => code,
        Err(err) => {
            warn!(error = %format!("{err:#}"), "command failed");
            eprintln!("{err:#}");
            1
        }
    }
}

fn start_logging(args: &LogArgs) {
    match init_tracing(args) {
        Ok(Some(path)) => info!(path = %path.display(), "file logging enabled"),
        Ok(None) => {}
        Err(err) => eprintln!("File logging disabled: {err:#}"),
    }
}

pub fn timer_main() -> i32 {
    let cli = TimerCli::parse();
    start_logging(&cli.log);
    let mut ctx = CliContext::from_env();
    finish(run_timer(&mut ctx, &cli.args))
}

pub fn stopwatch_main() -> i32 {
    let cli = StopwatchCli::parse();
    start_logging(&cli.log);
    let mut ctx = CliContext::from_env();
    finish(run_clock(&mut ctx, ClockMode::Stopwatch, 0))
}
