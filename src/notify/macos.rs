use tracing::debug;

use super::{fresh_group_id, succeeded, CommandRunner, VerifyPolicy};

const NOTIFIER: &str = "terminal-notifier";
const SCRIPT_RUNNER: &str = "osascript";

pub(super) fn notify(
    runner: &dyn CommandRunner,
    verify: &VerifyPolicy,
    title: &str,
    message: &str,
) -> bool {
    if notify_with_notifier(runner, verify, title, message) {
        return true;
    }
    debug!("falling back to osascript notification");
    let script = format!(
        "display notification \"{}\" with title \"{}\"",
        escape_applescript(message),
        escape_applescript(title)
    );
    succeeded(runner.run(SCRIPT_RUNNER, &["-e".to_string(), script]))
}

/// Post through terminal-notifier and confirm it actually reached the notification
/// list. The group is removed afterwards either way.
fn notify_with_notifier(
    runner: &dyn CommandRunner,
    verify: &VerifyPolicy,
    title: &str,
    message: &str,
) -> bool {
    let group = fresh_group_id();
    let args = vec![
        "-title".to_string(),
        title.to_string(),
        "-message".to_string(),
        message.to_string(),
        "-group".to_string(),
        group.clone(),
    ];
    if !succeeded(runner.run(NOTIFIER, &args)) {
        return false;
    }

    let mut delivered = false;
    for attempt in 1..=verify.attempts {
        verify.wait();
        let listing = runner.run(NOTIFIER, &["-list".to_string(), group.clone()]);
        if listing.is_some_and(|output| output.success && output.stdout.contains(&group)) {
            debug!(attempt, "terminal-notifier delivery confirmed");
            delivered = true;
            break;
        }
    }
    if !delivered {
        debug!(attempts = verify.attempts, "terminal-notifier delivery not confirmed");
    }
    let _ = runner.run(NOTIFIER, &["-remove".to_string(), group]);
    delivered
}

pub(super) fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
