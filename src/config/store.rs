use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use super::defaults::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, FONT_DIR_NAME, SETTINGS_STATE_FILE_NAME,
};
use super::ClockConfig;

/// Filesystem locations for persisted state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    dir: PathBuf,
}

impl ConfigPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `$CLI_TIMER_HOME`, else `~/.cli-timer`, else a temp-dir fallback when no home
    /// directory is known.
    pub fn from_env() -> Self {
        if let Some(dir) = env::var_os("CLI_TIMER_HOME").filter(|value| !value.is_empty()) {
            return Self::new(dir);
        }
        let home = env::var_os("HOME")
            .or_else(|| env::var_os("USERPROFILE"))
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);
        Self::new(home.join(CONFIG_DIR_NAME))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE_NAME)
    }

    pub fn settings_state_file(&self) -> PathBuf {
        self.dir.join(SETTINGS_STATE_FILE_NAME)
    }

    /// Extra `.flf` FIGlet fonts live here.
    pub fn font_dir(&self) -> PathBuf {
        self.dir.join(FONT_DIR_NAME)
    }

    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))
    }
}

fn read_raw(paths: &ConfigPaths) -> Value {
    let path = paths.config_file();
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "config not readable; using defaults");
            return Value::Object(Map::new());
        }
    };
    serde_json::from_str(&text).unwrap_or_else(|err| {
        warn!(path = %path.display(), error = %err, "config is not valid JSON; using defaults");
        Value::Object(Map::new())
    })
}

/// Read and normalize the config file. Missing or malformed files yield defaults.
pub fn load_config<F>(paths: &ConfigPaths, resolve_font: F) -> ClockConfig
where
    F: FnMut(&str) -> Option<String>,
{
    ClockConfig::from_value(&read_raw(paths), resolve_font)
}

/// Normalize `config` and write it as pretty JSON, returning what was written.
pub fn save_config<F>(
    paths: &ConfigPaths,
    config: &ClockConfig,
    resolve_font: F,
) -> Result<ClockConfig>
where
    F: FnMut(&str) -> Option<String>,
{
    let raw = serde_json::to_value(config).context("failed to serialize config")?;
    let normalized = ClockConfig::from_value(&raw, resolve_font);
    paths.ensure_dir()?;
    let mut text =
        serde_json::to_string_pretty(&normalized).context("failed to serialize config")?;
    text.push('\n');
    let path = paths.config_file();
    fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(normalized)
}

/// Merge `patch` over the current file contents and persist the result.
pub fn update_config<F>(
    paths: &ConfigPaths,
    patch: Map<String, Value>,
    mut resolve_font: F,
) -> Result<ClockConfig>
where
    F: FnMut(&str) -> Option<String>,
{
    let current = load_config(paths, &mut resolve_font);
    let mut merged = match serde_json::to_value(&current).context("failed to serialize config")? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    merged.extend(patch);
    let next = ClockConfig::from_value(&Value::Object(merged), &mut resolve_font);
    save_config(paths, &next, &mut resolve_font)?;
    Ok(load_config(paths, resolve_font))
}
