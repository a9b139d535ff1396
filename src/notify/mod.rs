//! Desktop notifications and the terminal bell for timer completion.
//!
//! Each platform tries an ordered chain of external commands and stops at the first
//! that reports success. A command that cannot be launched counts the same as one that
//! exits non-zero. Nothing here returns an error to the caller.

mod linux;
mod macos;
mod windows;
#[cfg(test)]
mod tests;

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

pub const NOTIFICATION_TITLE: &str = "Timer complete";
/// Number of BEL bytes written when the completion sound is enabled.
pub const BELL_REPEAT: usize = 3;
const BELL: u8 = 0x07;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
    Unsupported,
}

impl Platform {
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            "linux" | "android" => Platform::Linux,
            _ => Platform::Unsupported,
        }
    }
}

/// What the dispatcher needs from a finished command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
}

/// Runs an external program to completion. `None` means it could not be launched.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Option<CommandOutput>;

    /// Launch without waiting for exit. Returns whether the process started.
    fn spawn_detached(&self, program: &str, args: &[String]) -> bool;
}

/// Runs commands with stdin detached so they can never read the session's keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Option<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();
        match output {
            Ok(output) => Some(CommandOutput {
                success: output.status.success(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            }),
            Err(err) => {
                debug!(program, error = %err, "notification command failed to launch");
                None
            }
        }
    }

    fn spawn_detached(&self, program: &str, args: &[String]) -> bool {
        let spawned = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(mut child) => {
                // Reap off the session thread.
                thread::spawn(move || {
                    if let Err(err) = child.wait() {
                        debug!(error = %err, "detached notification command wait failed");
                    }
                });
                true
            }
            Err(err) => {
                debug!(program, error = %err, "notification command failed to launch");
                false
            }
        }
    }
}

/// Delivery check for notifiers that can accept a notification without showing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for VerifyPolicy {
    fn default() -> Self {
        Self {
            attempts: 8,
            delay: Duration::from_millis(75),
        }
    }
}

impl VerifyPolicy {
    pub(crate) fn wait(&self) {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }
}

pub struct NotificationDispatcher<R: CommandRunner = SystemCommandRunner> {
    platform: Platform,
    runner: R,
    verify: VerifyPolicy,
}

impl NotificationDispatcher<SystemCommandRunner> {
    pub fn system() -> Self {
        Self::new(Platform::current(), SystemCommandRunner, VerifyPolicy::default())
    }
}

impl<R: CommandRunner> NotificationDispatcher<R> {
    pub fn new(platform: Platform, runner: R, verify: VerifyPolicy) -> Self {
        Self {
            platform,
            runner,
            verify,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Show a desktop notification. Returns whether any mechanism reported delivery.
    pub fn notify(&self, title: &str, message: &str) -> bool {
        let delivered = match self.platform {
            Platform::MacOs => macos::notify(&self.runner, &self.verify, title, message),
            Platform::Windows => windows::notify(&self.runner, title, message),
            Platform::Linux => linux::notify(&self.runner, title, message),
            Platform::Unsupported => {
                debug!("no notification mechanism for this platform");
                return false;
            }
        };
        if delivered {
            debug!(platform = ?self.platform, "notification delivered");
        } else {
            warn!(platform = ?self.platform, "every notification mechanism failed");
        }
        delivered
    }
}

/// Something that can announce completion. Lets the session run against a recorder.
pub trait Notifier {
    fn notify(&self, title: &str, message: &str) -> bool;
}

impl<R: CommandRunner> Notifier for NotificationDispatcher<R> {
    fn notify(&self, title: &str, message: &str) -> bool {
        NotificationDispatcher::notify(self, title, message)
    }
}

pub(crate) fn succeeded(output: Option<CommandOutput>) -> bool {
    output.is_some_and(|output| output.success)
}

/// Unique per call, so a verification query never matches an older notification.
pub(crate) fn fresh_group_id() -> String {
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("cli-timer-{}-{nanos}-{seq}", std::process::id())
}

/// Write `count` BEL bytes and flush.
pub fn ring_bell(out: &mut dyn Write, count: usize) -> io::Result<()> {
    out.write_all(&vec![BELL; count])?;
    out.flush()
}
