use super::macos::escape_applescript;
use super::windows::{balloon_script, escape_single_quotes, toast_script};
use super::*;
use std::cell::RefCell;
use std::time::Duration;

type Handler = Box<dyn Fn(&str, &[String]) -> Option<CommandOutput>>;

/// Records every command and answers from a scripted handler.
struct RecordingRunner {
    calls: RefCell<Vec<(String, Vec<String>)>>,
    detached: RefCell<Vec<(String, Vec<String>)>>,
    handler: Handler,
}

impl RecordingRunner {
    fn new(handler: impl Fn(&str, &[String]) -> Option<CommandOutput> + 'static) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            detached: RefCell::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    fn programs(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|(program, _)| program.clone())
            .collect()
    }

    fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.borrow().clone()
    }

    fn detached(&self) -> Vec<(String, Vec<String>)> {
        self.detached.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[String]) -> Option<CommandOutput> {
        self.calls
            .borrow_mut()
            .push((program.to_string(), args.to_vec()));
        (self.handler)(program, args)
    }

    /// Launch succeeds unless the handler reports the program as missing.
    fn spawn_detached(&self, program: &str, args: &[String]) -> bool {
        self.detached
            .borrow_mut()
            .push((program.to_string(), args.to_vec()));
        (self.handler)(program, args).is_some()
    }
}

fn ok() -> Option<CommandOutput> {
    Some(CommandOutput {
        success: true,
        stdout: String::new(),
    })
}

fn failed() -> Option<CommandOutput> {
    Some(CommandOutput::default())
}

fn no_wait() -> VerifyPolicy {
    VerifyPolicy {
        attempts: 8,
        delay: Duration::ZERO,
    }
}

fn dispatcher(platform: Platform, runner: RecordingRunner) -> NotificationDispatcher<RecordingRunner> {
    NotificationDispatcher::new(platform, runner, no_wait())
}

#[test]
fn platform_detection_maps_os_names() {
    assert_eq!(Platform::from_os("macos"), Platform::MacOs);
    assert_eq!(Platform::from_os("windows"), Platform::Windows);
    assert_eq!(Platform::from_os("linux"), Platform::Linux);
    assert_eq!(Platform::from_os("freebsd"), Platform::Unsupported);
}

#[test]
fn unsupported_platform_runs_nothing() {
    let notifier = dispatcher(Platform::Unsupported, RecordingRunner::new(|_, _| ok()));
    assert!(!notifier.notify("t", "m"));
    assert!(notifier.runner().calls().is_empty());
}

#[test]
fn macos_verified_delivery_skips_fallback_and_cleans_up() {
    let runner = RecordingRunner::new(|_, args| {
        if args.first().map(String::as_str) == Some("-list") {
            Some(CommandOutput {
                success: true,
                stdout: format!("GroupID Title\n{} Timer complete\n", args[1]),
            })
        } else {
            ok()
        }
    });
    let notifier = dispatcher(Platform::MacOs, runner);
    assert!(notifier.notify("Timer complete", "Time is up!"));

    let calls = notifier.runner().calls();
    assert_eq!(calls.len(), 3);
    let group = calls[0].1[5].clone();
    assert!(group.starts_with("cli-timer-"));
    assert_eq!(calls[1].1, vec!["-list".to_string(), group.clone()]);
    assert_eq!(calls[2].1, vec!["-remove".to_string(), group]);
}

#[test]
fn macos_unverified_delivery_polls_then_falls_back() {
    // `-list` succeeds but never mentions the group.
    let notifier = dispatcher(Platform::MacOs, RecordingRunner::new(|_, _| ok()));
    assert!(notifier.notify("Timer complete", "say \"hi\""));

    let programs = notifier.runner().programs();
    // post + 8 polls + remove + osascript
    assert_eq!(programs.len(), 11);
    assert_eq!(
        programs.iter().filter(|p| *p == "terminal-notifier").count(),
        10
    );
    let calls = notifier.runner().calls();
    let (program, args) = calls.last().unwrap();
    assert_eq!(program, "osascript");
    assert_eq!(
        args[1],
        "display notification \"say \\\"hi\\\"\" with title \"Timer complete\""
    );
}

#[test]
fn macos_missing_notifier_goes_straight_to_osascript() {
    let runner = RecordingRunner::new(|program, _| {
        if program == "terminal-notifier" {
            None
        } else {
            failed()
        }
    });
    let notifier = dispatcher(Platform::MacOs, runner);
    assert!(!notifier.notify("t", "m"));
    assert_eq!(
        notifier.runner().programs(),
        vec!["terminal-notifier".to_string(), "osascript".to_string()]
    );
}

#[test]
fn applescript_escaping_handles_backslashes_first() {
    assert_eq!(escape_applescript(r#"a\b"c"#), r#"a\\b\"c"#);
}

#[test]
fn windows_falls_back_to_balloon() {
    let runner = RecordingRunner::new(|_, args| {
        if args[3].contains("ToastNotificationManager") {
            failed()
        } else {
            ok()
        }
    });
    let notifier = dispatcher(Platform::Windows, runner);
    assert!(notifier.notify("Timer complete", "It's done"));

    let calls = notifier.runner().calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].1[3].contains("CreateTextNode('It''s done')"));

    let detached = notifier.runner().detached();
    assert_eq!(detached.len(), 1);
    assert_eq!(detached[0].0, "powershell");
    assert!(detached[0].1[3].contains("$icon.BalloonTipText = 'It''s done'"));
    assert!(detached[0].1[3].contains("Start-Sleep -Milliseconds 5000"));
    assert!(detached[0].1[3].ends_with("$icon.Dispose()"));
}

#[test]
fn windows_balloon_launch_failure_reports_undelivered() {
    let runner = RecordingRunner::new(|_, _| None);
    let notifier = dispatcher(Platform::Windows, runner);
    assert!(!notifier.notify("Timer complete", "Time is up!"));
    assert_eq!(notifier.runner().detached().len(), 1);
}

#[test]
fn windows_scripts_embed_escaped_text() {
    assert_eq!(escape_single_quotes("a'b"), "a''b");
    assert!(toast_script("T", "M").contains("CreateTextNode('T')"));
    assert!(balloon_script("T", "M").contains("ShowBalloonTip(5000)"));
}

#[test]
fn linux_chain_stops_at_first_success() {
    let runner = RecordingRunner::new(|program, _| match program {
        "termux-notification" => None,
        "notify-send" => failed(),
        _ => ok(),
    });
    let notifier = dispatcher(Platform::Linux, runner);
    assert!(notifier.notify("Timer complete", "Time is up!"));

    let calls = notifier.runner().calls();
    let programs: Vec<&str> = calls.iter().map(|(program, _)| program.as_str()).collect();
    assert_eq!(programs, vec!["termux-notification", "notify-send", "kdialog"]);
    assert_eq!(
        calls[2].1,
        vec!["--title", "Timer complete", "--passivepopup", "Time is up!", "5"]
    );
}

#[test]
fn linux_total_failure_reports_not_delivered() {
    let notifier = dispatcher(Platform::Linux, RecordingRunner::new(|_, _| None));
    assert!(!notifier.notify("t", "m"));
    assert_eq!(notifier.runner().calls().len(), 4);
}

#[test]
fn group_ids_are_unique() {
    assert_ne!(fresh_group_id(), fresh_group_id());
}

#[test]
fn bell_writes_requested_count() {
    let mut out = Vec::new();
    ring_bell(&mut out, BELL_REPEAT).unwrap();
    assert_eq!(out, vec![0x07, 0x07, 0x07]);
}
