use crate::config::RemindzConfig;
use crate::context::Firing;
use crate::model::Reminder;
use chrono::{DateTime, Utc};

pub mod complete;
pub mod config;
pub mod create;
pub mod delete;
pub mod fire;
pub mod helpers;
pub mod list;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// A reminder as shown to users, with its schedule resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedReminder {
    pub reminder: Reminder,
    /// Human form of the schedule, e.g. `every Monday at 10:00`
    pub schedule: String,
    /// `None` once the reminder no longer has an armed job.
    pub next_fire: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_reminders: Vec<Reminder>,
    pub listed_reminders: Vec<ListedReminder>,
    pub firings: Vec<Firing>,
    pub config: Option<RemindzConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_reminders(mut self, reminders: Vec<Reminder>) -> Self {
        self.affected_reminders = reminders;
        self
    }

    pub fn with_listed_reminders(mut self, reminders: Vec<ListedReminder>) -> Self {
        self.listed_reminders = reminders;
        self
    }

    pub fn with_firings(mut self, firings: Vec<Firing>) -> Self {
        self.firings = firings;
        self
    }

    pub fn with_config(mut self, config: RemindzConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn has_warnings(&self) -> bool {
        self.messages
            .iter()
            .any(|m| matches!(m.level, MessageLevel::Warning | MessageLevel::Error))
    }
}
