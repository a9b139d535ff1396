use tracing::debug;

use super::{succeeded, CommandRunner};

/// Seconds the KDE passive popup stays visible.
const KDIALOG_TIMEOUT_SECS: &str = "5";

/// Candidate commands in the order they are tried.
pub(super) fn candidates(title: &str, message: &str) -> Vec<(&'static str, Vec<String>)> {
    let owned = |items: &[&str]| items.iter().map(|item| item.to_string()).collect::<Vec<_>>();
    vec![
        (
            "termux-notification",
            owned(&["--title", title, "--content", message]),
        ),
        ("notify-send", owned(&[title, message])),
        (
            "kdialog",
            owned(&["--title", title, "--passivepopup", message, KDIALOG_TIMEOUT_SECS]),
        ),
        (
            "zenity",
            vec![
                "--notification".to_string(),
                format!("--text={title}\n{message}"),
            ],
        ),
    ]
}

pub(super) fn notify(runner: &dyn CommandRunner, title: &str, message: &str) -> bool {
    for (program, args) in candidates(title, message) {
        if succeeded(runner.run(program, &args)) {
            return true;
        }
        debug!(program, "notification command did not succeed");
    }
    false
}
