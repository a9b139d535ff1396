//! Clock configuration: typed values, field-by-field normalization, and persistence.
//!
//! A malformed field never rejects the whole file; it silently falls back to its
//! documented default.

mod defaults;
mod store;

use serde::{Serialize, Serializer};
use serde_json::Value;

pub use defaults::{
    DEFAULT_COMPLETION_MESSAGE, DEFAULT_FONT, DEFAULT_KEYBINDINGS, DEFAULT_NOTIFY_ON_COMPLETE,
    DEFAULT_PLAY_SOUND_ON_COMPLETE, DEFAULT_TICK_RATE_MS, MAX_COMPLETION_MESSAGE_CHARS,
    MAX_TICK_RATE_MS, MIN_TICK_RATE_MS,
};
pub use store::{load_config, save_config, update_config, ConfigPaths};

use defaults::LEGACY_DEFAULT_KEYBINDINGS;

/// Normalized single-key token: one printable ASCII character or the spacebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyToken {
    Space,
    Char(char),
}

impl KeyToken {
    /// Parse a config value. Accepts `space` or one character in `!`..=`~`,
    /// case-insensitively and ignoring surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim().to_lowercase();
        if value == "space" {
            return Some(KeyToken::Space);
        }
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) if ('!'..='~').contains(&ch) => Some(KeyToken::Char(ch)),
            _ => None,
        }
    }

    pub fn as_config_str(&self) -> String {
        match self {
            KeyToken::Space => "space".to_string(),
            KeyToken::Char(ch) => ch.to_string(),
        }
    }

    /// Label shown in the controls help line.
    pub fn label(&self) -> String {
        match self {
            KeyToken::Space => "Spacebar".to_string(),
            KeyToken::Char(ch) => ch.to_string(),
        }
    }
}

impl Serialize for KeyToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_config_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Keybindings {
    #[serde(rename = "pauseKey")]
    pub pause: KeyToken,
    #[serde(rename = "pauseAltKey")]
    pub pause_alt: KeyToken,
    #[serde(rename = "restartKey")]
    pub restart: KeyToken,
    #[serde(rename = "exitKey")]
    pub exit: KeyToken,
    #[serde(rename = "exitAltKey")]
    pub exit_alt: KeyToken,
}

impl Default for Keybindings {
    fn default() -> Self {
        DEFAULT_KEYBINDINGS
    }
}

impl Keybindings {
    pub fn is_pause(&self, token: KeyToken) -> bool {
        token == self.pause || token == self.pause_alt
    }

    pub fn is_restart(&self, token: KeyToken) -> bool {
        token == self.restart
    }

    pub fn is_exit(&self, token: KeyToken) -> bool {
        token == self.exit || token == self.exit_alt
    }

    /// Normalize a raw `keybindings` object. Invalid entries keep the default, and a
    /// set equal to the legacy defaults migrates to the current defaults.
    pub fn from_value(raw: Option<&Value>) -> Self {
        let mut next = DEFAULT_KEYBINDINGS;
        let Some(Value::Object(map)) = raw else {
            return next;
        };
        let token = |key: &str, fallback: KeyToken| {
            map.get(key)
                .and_then(Value::as_str)
                .and_then(KeyToken::parse)
                .unwrap_or(fallback)
        };
        next.pause = token("pauseKey", next.pause);
        next.pause_alt = token("pauseAltKey", next.pause_alt);
        next.restart = token("restartKey", next.restart);
        next.exit = token("exitKey", next.exit);
        next.exit_alt = token("exitAltKey", next.exit_alt);

        if next == LEGACY_DEFAULT_KEYBINDINGS {
            return DEFAULT_KEYBINDINGS;
        }
        next
    }
}

/// Session configuration. Immutable once a clock run starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockConfig {
    pub font: String,
    pub center_display: bool,
    pub show_header: bool,
    pub show_controls: bool,
    pub tick_rate_ms: u64,
    pub completion_message: String,
    pub notify_on_complete: bool,
    pub play_sound_on_complete: bool,
    pub keybindings: Keybindings,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            font: DEFAULT_FONT.to_string(),
            center_display: true,
            show_header: true,
            show_controls: true,
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            completion_message: DEFAULT_COMPLETION_MESSAGE.to_string(),
            notify_on_complete: DEFAULT_NOTIFY_ON_COMPLETE,
            play_sound_on_complete: DEFAULT_PLAY_SOUND_ON_COMPLETE,
            keybindings: DEFAULT_KEYBINDINGS,
        }
    }
}

impl ClockConfig {
    /// Build a config from arbitrary JSON. `resolve_font` maps a requested font name
    /// to its canonical, timer-compatible spelling, or `None` to keep the default.
    pub fn from_value<F>(raw: &Value, mut resolve_font: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut next = Self::default();
        let Value::Object(map) = raw else {
            return next;
        };
        let flag = |key: &str, fallback: bool| {
            map.get(key).and_then(Value::as_bool).unwrap_or(fallback)
        };

        next.center_display = flag("centerDisplay", next.center_display);
        next.show_header = flag("showHeader", next.show_header);
        next.show_controls = flag("showControls", next.show_controls);
        next.notify_on_complete = flag("notifyOnComplete", next.notify_on_complete);
        next.play_sound_on_complete = flag("playSoundOnComplete", next.play_sound_on_complete);
        if let Some(raw_rate) = map.get("tickRateMs").and_then(Value::as_f64) {
            next.tick_rate_ms = sanitize_tick_rate(raw_rate);
        }
        if let Some(message) = map.get("completionMessage").and_then(Value::as_str) {
            next.completion_message = normalize_completion_message(message);
        }
        next.keybindings = Keybindings::from_value(map.get("keybindings"));
        if let Some(font) = map.get("font").and_then(Value::as_str) {
            if let Some(resolved) = resolve_font(font) {
                next.font = resolved;
            }
        }
        next
    }

    /// Message shown on screen and in notifications once the timer finishes.
    pub fn completion_text(&self) -> &str {
        if self.completion_message.is_empty() {
            DEFAULT_COMPLETION_MESSAGE
        } else {
            &self.completion_message
        }
    }
}

/// Clamp a raw tick rate into `[MIN_TICK_RATE_MS, MAX_TICK_RATE_MS]`; non-finite
/// values fall back to the default.
pub fn sanitize_tick_rate(raw: f64) -> u64 {
    if !raw.is_finite() {
        return DEFAULT_TICK_RATE_MS;
    }
    let value = raw.floor();
    if value < MIN_TICK_RATE_MS as f64 {
        MIN_TICK_RATE_MS
    } else if value > MAX_TICK_RATE_MS as f64 {
        MAX_TICK_RATE_MS
    } else {
        value as u64
    }
}

/// Strip carriage returns, fold newlines into spaces, and cap the length.
pub fn normalize_completion_message(raw: &str) -> String {
    raw.chars()
        .filter(|ch| *ch != '\r')
        .map(|ch| if ch == '\n' { ' ' } else { ch })
        .take(MAX_COMPLETION_MESSAGE_CHARS)
        .collect()
}
