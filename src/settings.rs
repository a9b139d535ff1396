//! Launcher for the external interactive settings editor.
//!
//! The editor receives a JSON state file (`--state <path>`) describing the current
//! config and available fonts, writes the config file itself, and exits with status 2
//! when the user cancels.

use anyhow::{Context, Result};
use serde::Serialize;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

use crate::config::{ClockConfig, ConfigPaths};

/// Exit status the editor uses for "closed without saving".
pub const CANCELLED_STATUS: i32 = 2;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsState<'a> {
    pub config_path: String,
    pub config: &'a ClockConfig,
    pub fonts: &'a [String],
}

/// How the editor is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsProgram {
    /// `$CLI_TIMER_SETTINGS_CMD`, already split into words.
    Custom(Vec<String>),
    /// `go run .` inside the editor's source directory.
    GoRun { dir: PathBuf },
}

#[derive(Debug)]
pub enum SettingsError {
    GoMissing,
    InvalidCommand(String),
    Spawn(io::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::GoMissing => {
                write!(f, "Go is required for `timer settings` (Bubble Tea UI).")
            }
            SettingsError::InvalidCommand(err) => {
                write!(f, "Invalid CLI_TIMER_SETTINGS_CMD: {err}")
            }
            SettingsError::Spawn(err) => write!(f, "Failed to run settings UI: {err}"),
        }
    }
}

impl std::error::Error for SettingsError {}

impl SettingsProgram {
    /// Pick the editor from the environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::resolve(
            env::var("CLI_TIMER_SETTINGS_CMD").ok(),
            env::var_os("CLI_TIMER_SETTINGS_DIR").map(PathBuf::from),
        )
    }

    pub fn resolve(command: Option<String>, dir: Option<PathBuf>) -> Result<Self, SettingsError> {
        if let Some(command) = command.filter(|value| !value.trim().is_empty()) {
            let words = shell_words::split(&command)
                .map_err(|err| SettingsError::InvalidCommand(err.to_string()))?;
            return Ok(SettingsProgram::Custom(words));
        }
        let dir = dir
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("settings-ui"));
        Ok(SettingsProgram::GoRun { dir })
    }

    fn command(&self, state_path: &Path) -> Result<Command, SettingsError> {
        let mut command = match self {
            SettingsProgram::Custom(words) => {
                let (program, args) = words
                    .split_first()
                    .ok_or_else(|| SettingsError::InvalidCommand("empty command".to_string()))?;
                let mut command = Command::new(program);
                command.args(args);
                command
            }
            SettingsProgram::GoRun { dir } => {
                let mut command = Command::new("go");
                command.args(["run", "."]).current_dir(dir);
                command
            }
        };
        command.arg("--state").arg(state_path);
        Ok(command)
    }
}

fn go_available() -> bool {
    Command::new("go")
        .arg("version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

/// Map the editor's exit status to ours. Cancellation is not a failure, and a
/// signal-terminated editor counts as a generic failure.
pub fn map_exit_status(code: Option<i32>) -> i32 {
    match code {
        Some(CANCELLED_STATUS) => 0,
        Some(code) => code,
        None => 1,
    }
}

pub fn write_state_file(
    paths: &ConfigPaths,
    config: &ClockConfig,
    fonts: &[String],
) -> Result<PathBuf> {
    paths.ensure_dir()?;
    let state = SettingsState {
        config_path: paths.config_file().display().to_string(),
        config,
        fonts,
    };
    let text = serde_json::to_string(&state).context("failed to serialize settings state")?;
    let path = paths.settings_state_file();
    fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Run the editor with inherited stdio and return the process exit code to use.
pub fn run_settings(
    program: &SettingsProgram,
    paths: &ConfigPaths,
    config: &ClockConfig,
    fonts: &[String],
) -> Result<i32> {
    if matches!(program, SettingsProgram::GoRun { .. }) && !go_available() {
        return Err(SettingsError::GoMissing.into());
    }
    let mut command = program.command(&paths.settings_state_file())?;

    let state_path = write_state_file(paths, config, fonts)?;
    info!(?program, state = %state_path.display(), "launching settings editor");
    let status = command.status();
    if let Err(err) = fs::remove_file(&state_path) {
        debug!(error = %err, "settings state file already gone");
    }
    let status = status.map_err(SettingsError::Spawn)?;
    debug!(code = ?status.code(), "settings editor exited");
    Ok(map_exit_status(status.code()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_paths(name: &str) -> ConfigPaths {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        ConfigPaths::new(env::temp_dir().join(format!("cli_timer_settings_{name}_{unique}")))
    }

    fn custom(script: &str) -> SettingsProgram {
        SettingsProgram::Custom(vec![
            "sh".to_string(),
            "-c".to_string(),
            script.to_string(),
            "sh".to_string(),
        ])
    }

    #[test]
    fn exit_status_mapping() {
        assert_eq!(map_exit_status(Some(0)), 0);
        assert_eq!(map_exit_status(Some(2)), 0);
        assert_eq!(map_exit_status(Some(5)), 5);
        assert_eq!(map_exit_status(None), 1);
    }

    #[test]
    fn command_override_is_shell_split() {
        let program =
            SettingsProgram::resolve(Some("my-editor --theme 'dark mode'".into()), None).unwrap();
        assert_eq!(
            program,
            SettingsProgram::Custom(vec![
                "my-editor".to_string(),
                "--theme".to_string(),
                "dark mode".to_string()
            ])
        );
        assert!(matches!(
            SettingsProgram::resolve(Some("broken 'quote".into()), None),
            Err(SettingsError::InvalidCommand(_))
        ));
    }

    #[test]
    fn default_program_runs_go_in_editor_dir() {
        let program = SettingsProgram::resolve(None, Some(PathBuf::from("/opt/editor"))).unwrap();
        assert_eq!(
            program,
            SettingsProgram::GoRun {
                dir: PathBuf::from("/opt/editor")
            }
        );
        let SettingsProgram::GoRun { dir } = SettingsProgram::resolve(Some("  ".into()), None)
            .unwrap()
        else {
            panic!("expected go program");
        };
        assert!(dir.ends_with("settings-ui"));
    }

    #[test]
    fn state_payload_uses_camel_case() {
        let paths = temp_paths("payload");
        let fonts = vec!["Standard".to_string(), "Big".to_string()];
        let path = write_state_file(&paths, &ClockConfig::default(), &fonts).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value["configPath"].as_str().unwrap().ends_with("config.json"));
        assert_eq!(value["config"]["font"], "Standard");
        assert_eq!(value["fonts"][1], "Big");
        let _ = fs::remove_dir_all(paths.dir());
    }

    #[cfg(unix)]
    #[test]
    fn editor_sees_state_file_which_is_removed_afterwards() {
        let paths = temp_paths("run");
        let fonts = vec!["Standard".to_string()];
        let program = custom(r#"[ "$1" = "--state" ] && grep -q configPath "$2" && exit 7"#);
        let code = run_settings(&program, &paths, &ClockConfig::default(), &fonts).unwrap();
        assert_eq!(code, 7);
        assert!(!paths.settings_state_file().exists());
        let _ = fs::remove_dir_all(paths.dir());
    }

    #[cfg(unix)]
    #[test]
    fn cancelled_editor_exits_cleanly() {
        let paths = temp_paths("cancel");
        let code = run_settings(&custom("exit 2"), &paths, &ClockConfig::default(), &[]).unwrap();
        assert_eq!(code, 0);
        let _ = fs::remove_dir_all(paths.dir());
    }

    #[test]
    fn missing_editor_reports_spawn_failure() {
        let paths = temp_paths("missing");
        let program = SettingsProgram::Custom(vec!["cli-timer-no-such-editor".to_string()]);
        let err = run_settings(&program, &paths, &ClockConfig::default(), &[]).unwrap_err();
        assert!(err.to_string().starts_with("Failed to run settings UI"));
        assert!(!paths.settings_state_file().exists());
        let _ = fs::remove_dir_all(paths.dir());
    }
}
