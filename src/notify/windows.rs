use tracing::debug;

use super::{succeeded, CommandRunner};

const POWERSHELL: &str = "powershell";
/// How long the tray balloon stays up before the icon is disposed.
const BALLOON_VISIBLE_MS: u32 = 5000;

pub(super) fn notify(runner: &dyn CommandRunner, title: &str, message: &str) -> bool {
    let title = escape_single_quotes(title);
    let message = escape_single_quotes(message);
    if succeeded(runner.run(POWERSHELL, &powershell_args(toast_script(&title, &message)))) {
        return true;
    }
    debug!("toast notification failed; trying tray balloon");
    // The balloon script sleeps while the icon is shown, so it is not waited on.
    runner.spawn_detached(POWERSHELL, &powershell_args(balloon_script(&title, &message)))
}

fn powershell_args(script: String) -> Vec<String> {
    vec![
        "-NoProfile".to_string(),
        "-NonInteractive".to_string(),
        "-Command".to_string(),
        script,
    ]
}

pub(super) fn toast_script(title: &str, message: &str) -> String {
    [
        "[Windows.UI.Notifications.ToastNotificationManager, Windows.UI.Notifications, ContentType = WindowsRuntime] > $null".to_string(),
        "$template = [Windows.UI.Notifications.ToastNotificationManager]::GetTemplateContent([Windows.UI.Notifications.ToastTemplateType]::ToastText02)".to_string(),
        "$text = $template.GetElementsByTagName('text')".to_string(),
        format!("$text.Item(0).AppendChild($template.CreateTextNode('{title}')) > $null"),
        format!("$text.Item(1).AppendChild($template.CreateTextNode('{message}')) > $null"),
        "$toast = [Windows.UI.Notifications.ToastNotification]::new($template)".to_string(),
        "[Windows.UI.Notifications.ToastNotificationManager]::CreateToastNotifier('cli-timer').Show($toast)".to_string(),
    ]
    .join("; ")
}

pub(super) fn balloon_script(title: &str, message: &str) -> String {
    [
        "Add-Type -AssemblyName System.Windows.Forms".to_string(),
        "Add-Type -AssemblyName System.Drawing".to_string(),
        "$icon = New-Object System.Windows.Forms.NotifyIcon".to_string(),
        "$icon.Icon = [System.Drawing.SystemIcons]::Information".to_string(),
        format!("$icon.BalloonTipTitle = '{title}'"),
        format!("$icon.BalloonTipText = '{message}'"),
        "$icon.Visible = $true".to_string(),
        format!("$icon.ShowBalloonTip({BALLOON_VISIBLE_MS})"),
        format!("Start-Sleep -Milliseconds {BALLOON_VISIBLE_MS}"),
        "$icon.Dispose()".to_string(),
    ]
    .join("; ")
}

pub(super) fn escape_single_quotes(text: &str) -> String {
    text.replace('\'', "''")
}
