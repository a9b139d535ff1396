use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn timer_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_timer").expect("timer test binary not built")
}

fn stopwatch_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_stopwatch").expect("stopwatch test binary not built")
}

/// Config home with notifications off so no desktop commands are spawned.
fn quiet_home(name: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = env::temp_dir().join(format!("cli_timer_it_{name}_{unique}"));
    fs::create_dir_all(&dir).expect("create config home");
    fs::write(
        dir.join("config.json"),
        r#"{ "notifyOnComplete": false, "tickRateMs": 50 }"#,
    )
    .expect("write config");
    dir
}

fn run(bin: &str, home: &Path, args: &[&str]) -> Output {
    Command::new(bin)
        .args(args)
        .env("CLI_TIMER_HOME", home)
        .env_remove("CLI_TIMER_LOGS")
        .output()
        .expect("run binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn timer_help_describes_arguments() {
    let home = quiet_home("help");
    let output = run(timer_bin(), &home, &["--help"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("--no-logs"));
}

#[test]
fn timer_without_arguments_prints_usage() {
    let home = quiet_home("usage");
    let output = run(timer_bin(), &home, &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).starts_with("Usage\n"));
}

#[test]
fn zero_duration_is_rejected() {
    let home = quiet_home("zero");
    let output = run(timer_bin(), &home, &["0", "sec"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("Total duration must be greater than zero."));
    assert!(stdout(&output).contains("Example: timer 5 min 2 sec"));
}

#[test]
fn non_interactive_timer_prints_plain_countdown() {
    let home = quiet_home("headless");
    let output = run(timer_bin(), &home, &["1", "sec"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "00:00:01\n00:00:00\n");
}

#[test]
fn non_interactive_stopwatch_is_refused() {
    let home = quiet_home("stopwatch");
    let output = run(stopwatch_bin(), &home, &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Stopwatch requires an interactive terminal (TTY)."));
}

#[test]
fn settings_require_a_terminal() {
    let home = quiet_home("settings");
    let output = run(timer_bin(), &home, &["settings"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("`timer settings` requires an interactive terminal (TTY)."));
}

#[test]
fn style_rejects_unknown_font() {
    let home = quiet_home("style");
    let output = run(timer_bin(), &home, &["style", "Definitely", "Missing"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("Unknown font: Definitely Missing\n"));
}

#[test]
fn style_lists_bundled_fonts() {
    let home = quiet_home("style_list");
    let output = run(timer_bin(), &home, &["style"]);
    assert!(output.status.success());
    assert!(stdout(&output)
        .contains("Available fonts:\nBlock\nDots\nItalic\nPixel\nShadow\nStandard\n"));
}

#[test]
fn style_compatible_lists_bundled_fonts() {
    let home = quiet_home("style_compatible");
    let output = run(timer_bin(), &home, &["style", "--compatible"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Current font: Standard\n"));
    assert!(text.contains("Timer-compatible fonts:\nBlock\n"));
    assert!(text.ends_with("Shadow\nStandard\n"));
}

#[test]
fn style_selection_is_persisted_with_canonical_name() {
    let home = quiet_home("style_set");
    let output = run(timer_bin(), &home, &["style", "shadow"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Font set to: Shadow\n");

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(home.join("config.json")).expect("read config"))
            .expect("parse config");
    assert_eq!(saved["font"], "Shadow");
    assert_eq!(saved["tickRateMs"], 50);

    let listing = run(timer_bin(), &home, &["style"]);
    assert!(stdout(&listing).starts_with("Current font: Shadow\n"));
}
