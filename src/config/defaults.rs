use super::{KeyToken, Keybindings};

pub const DEFAULT_FONT: &str = "Standard";
pub const DEFAULT_TICK_RATE_MS: u64 = 100;
pub const MIN_TICK_RATE_MS: u64 = 50;
pub const MAX_TICK_RATE_MS: u64 = 1000;
pub const DEFAULT_COMPLETION_MESSAGE: &str = "Time is up!";
pub const MAX_COMPLETION_MESSAGE_CHARS: usize = 240;
pub const DEFAULT_NOTIFY_ON_COMPLETE: bool = true;
pub const DEFAULT_PLAY_SOUND_ON_COMPLETE: bool = false;

/// Directory name under the home directory when `CLI_TIMER_HOME` is unset.
pub(super) const CONFIG_DIR_NAME: &str = ".cli-timer";
pub(super) const CONFIG_FILE_NAME: &str = "config.json";
pub(super) const SETTINGS_STATE_FILE_NAME: &str = "settings-state.json";
pub(super) const FONT_DIR_NAME: &str = "fonts";

pub const DEFAULT_KEYBINDINGS: Keybindings = Keybindings {
    pause: KeyToken::Char('p'),
    pause_alt: KeyToken::Space,
    restart: KeyToken::Char('r'),
    exit: KeyToken::Char('q'),
    exit_alt: KeyToken::Char('e'),
};

/// Shipped defaults before `q` became the exit key; migrated on load.
pub(super) const LEGACY_DEFAULT_KEYBINDINGS: Keybindings = Keybindings {
    pause: KeyToken::Char('p'),
    pause_alt: KeyToken::Space,
    restart: KeyToken::Char('r'),
    exit: KeyToken::Char('s'),
    exit_alt: KeyToken::Char('e'),
};
