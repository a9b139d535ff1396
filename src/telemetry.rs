use anyhow::{Context, Result};
use std::env;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_subscriber::fmt::time::UtcTime;

use crate::cli::LogArgs;

static TRACE_LOG: OnceLock<PathBuf> = OnceLock::new();

pub fn tracing_log_path() -> PathBuf {
    env::var("CLI_TIMER_TRACE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("cli_timer_trace.jsonl"))
}

/// JSON trace events go to a file, never the terminal the clock draws on. Returns the
/// log path when file logging is active.
pub fn init_tracing(args: &LogArgs) -> Result<Option<PathBuf>> {
    init_tracing_to(args, &tracing_log_path())
}

pub fn init_tracing_to(args: &LogArgs, path: &Path) -> Result<Option<PathBuf>> {
    if !args.enabled() {
        return Ok(None);
    }
    if let Some(active) = TRACE_LOG.get() {
        return Ok(Some(active.clone()));
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open trace log {}", path.display()))?;
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_timer(UtcTime::rfc_3339())
        .with_writer(file)
        .with_current_span(false)
        .with_span_list(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("another tracing subscriber is already installed")?;
    Ok(Some(TRACE_LOG.get_or_init(|| path.to_path_buf()).clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled() -> LogArgs {
        LogArgs {
            logs: true,
            no_logs: false,
        }
    }

    #[test]
    fn disabled_logging_touches_nothing() {
        let path = env::temp_dir().join("cli_timer_trace_disabled_test.jsonl");
        let args = LogArgs {
            logs: true,
            no_logs: true,
        };
        assert_eq!(init_tracing_to(&args, &path).unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_log_path_is_reported() {
        let path = env::temp_dir()
            .join("cli_timer_missing_trace_dir")
            .join("nested")
            .join("trace.jsonl");
        let err = init_tracing_to(&enabled(), &path).unwrap_err();
        assert!(err.to_string().starts_with("failed to open trace log"));
    }
}
