use super::{ChannelKind, Notification, NotificationChannel, Permission};
use crate::error::{RemindzError, Result};
use colored::Colorize;
use console::Term;

/// Prints notifications to stdout, ringing the bell when attached to a
/// terminal.
pub struct TerminalChannel {
    term: Term,
    permission: Permission,
}

impl TerminalChannel {
    /// Undecided permission: granted on request only when stdout is a terminal.
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
            permission: Permission::Prompt,
        }
    }

    /// Always allowed, e.g. when the user picked this channel explicitly.
    pub fn granted() -> Self {
        Self {
            term: Term::stdout(),
            permission: Permission::Granted,
        }
    }
}

impl Default for TerminalChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationChannel for TerminalChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Terminal
    }

    fn permission(&self) -> Permission {
        self.permission
    }

    fn request_permission(&mut self) -> Result<Permission> {
        if self.permission == Permission::Prompt {
            self.permission = if self.term.is_term() {
                Permission::Granted
            } else {
                Permission::Denied
            };
        }
        Ok(self.permission)
    }

    fn deliver(&mut self, notification: &Notification) -> Result<()> {
        if self.term.is_term() {
            self.term.write_str("\x07").map_err(RemindzError::Io)?;
        }
        self.term
            .write_line(&format!("⏰ {}", notification.title.bold()))
            .map_err(RemindzError::Io)?;
        self.term
            .write_line(&format!("   {}", notification.body.dimmed()))
            .map_err(RemindzError::Io)?;
        Ok(())
    }
}
