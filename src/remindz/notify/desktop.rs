use super::{ChannelKind, Notification, NotificationChannel, Permission};
use crate::error::{RemindzError, Result};
use std::path::PathBuf;
use std::process::Command;

const APP_NAME: &str = "remindz";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    /// freedesktop `notify-send`
    NotifySend,
    /// macOS `osascript -e 'display notification ...'`
    OsaScript,
}

/// Delivers through the platform's notification center by shelling out to
/// its notifier command.
#[derive(Debug)]
pub struct DesktopChannel {
    program: PathBuf,
    backend: Backend,
    permission: Permission,
}

impl DesktopChannel {
    /// Find a usable notifier for this session, if any.
    pub fn detect() -> Option<Self> {
        if cfg!(target_os = "macos") {
            return which::which("osascript")
                .ok()
                .map(|program| Self::with_program(program, Backend::OsaScript));
        }

        let has_display = std::env::var_os("DISPLAY").is_some()
            || std::env::var_os("WAYLAND_DISPLAY").is_some();
        if !has_display {
            return None;
        }
        which::which("notify-send")
            .ok()
            .map(|program| Self::with_program(program, Backend::NotifySend))
    }

    fn with_program(program: PathBuf, backend: Backend) -> Self {
        Self {
            program,
            backend,
            permission: Permission::Prompt,
        }
    }

    fn command(&self, notification: &Notification) -> Command {
        let mut cmd = Command::new(&self.program);
        match self.backend {
            Backend::NotifySend => {
                cmd.arg(format!("--app-name={}", APP_NAME))
                    .arg(&notification.title)
                    .arg(&notification.body);
            }
            Backend::OsaScript => {
                cmd.arg("-e").arg(format!(
                    "display notification {} with title {}",
                    applescript_quote(&notification.body),
                    applescript_quote(&notification.title)
                ));
            }
        }
        cmd
    }
}

fn applescript_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

impl NotificationChannel for DesktopChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Native
    }

    fn permission(&self) -> Permission {
        self.permission
    }

    fn request_permission(&mut self) -> Result<Permission> {
        // The notifier may have been uninstalled since detection
        self.permission = if self.program.exists() {
            Permission::Granted
        } else {
            Permission::Denied
        };
        Ok(self.permission)
    }

    fn deliver(&mut self, notification: &Notification) -> Result<()> {
        let status = self
            .command(notification)
            .status()
            .map_err(RemindzError::Io)?;
        if !status.success() {
            return Err(RemindzError::Notify(format!(
                "{} exited with {}",
                self.program.display(),
                status
            )));
        }
        Ok(())
    }
}
