//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for every UI.
//!
//! It offers two surfaces over the same [`ReminderContext`]:
//!
//! - **Command methods** (`create`, `list`, `complete`, `delete`, `run_due`,
//!   `config`) return `Result<CmdResult>` with user-facing messages. The CLI
//!   uses these.
//! - **Plain functions** (`fetch_reminders`, `create_reminder`,
//!   `mark_completed`, `delete_reminder`) never fail: errors are logged and
//!   turned into a [`Response::Failure`] carrying only a message. They
//!   serialize to JSON as either the value itself or `{"message": ...}`.
//!
//! Both surfaces hydrate the store on first use.
//!
//! ## Time
//!
//! The facade reads the clock once per call through an injectable
//! `fn() -> DateTime<Utc>`, so tests can pin "now".

use crate::commands;
use crate::context::ReminderContext;
use crate::error::Result;
use crate::model::{NewReminder, Reminder, ReminderId};
use crate::notify::NotificationChannel;
use crate::store::DataStore;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

const FETCH_FAILED: &str = "Error fetching reminders";
const INVALID_DATA: &str = "Invalid reminder data";
const NOT_FOUND: &str = "Reminder not found";
const DELETED: &str = "Reminder deleted";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Either the requested value or a failure message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response<T> {
    Ok(T),
    Failure(ApiMessage),
}

impl<T> Response<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Response::Ok(v) => Some(v),
            Response::Failure(_) => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub ok: bool,
}

/// The main API facade for remindz operations.
pub struct RemindzApi<S: DataStore, C: NotificationChannel, Tz: TimeZone> {
    ctx: ReminderContext<S, C, Tz>,
    config_dir: PathBuf,
    clock: fn() -> DateTime<Utc>,
}

impl<S: DataStore, C: NotificationChannel, Tz: TimeZone> RemindzApi<S, C, Tz> {
    pub fn new(ctx: ReminderContext<S, C, Tz>, config_dir: PathBuf) -> Self {
        Self {
            ctx,
            config_dir,
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn context(&self) -> &ReminderContext<S, C, Tz> {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut ReminderContext<S, C, Tz> {
        &mut self.ctx
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Hydrate from storage if that has not happened yet.
    pub fn load(&mut self) -> Result<usize> {
        if self.ctx.is_loaded() {
            return Ok(0);
        }
        self.ctx.load()
    }

    pub fn create(&mut self, data: NewReminder) -> Result<commands::CmdResult> {
        self.load()?;
        let now = self.now();
        commands::create::run(&mut self.ctx, data, now)
    }

    pub fn list(&mut self, filter: commands::list::ListFilter) -> Result<commands::CmdResult> {
        self.load()?;
        commands::list::run(&self.ctx, filter)
    }

    pub fn complete(&mut self, id: ReminderId) -> Result<commands::CmdResult> {
        self.load()?;
        commands::complete::run(&mut self.ctx, id)
    }

    pub fn delete(&mut self, id: ReminderId) -> Result<commands::CmdResult> {
        self.load()?;
        commands::delete::run(&mut self.ctx, id)
    }

    /// Fire whatever is due right now.
    pub fn run_due(&mut self) -> Result<commands::CmdResult> {
        self.load()?;
        let now = self.now();
        commands::fire::run(&mut self.ctx, now)
    }

    pub fn next_wakeup(&self) -> Option<DateTime<Utc>> {
        self.ctx.next_wakeup()
    }

    pub fn config(&self, action: ConfigAction) -> Result<commands::CmdResult> {
        config(&self.config_dir, action)
    }

    pub fn fetch_reminders(&mut self) -> Response<Vec<Reminder>> {
        let fetched = self.load().and_then(|_| self.ctx.list());
        match fetched {
            Ok(reminders) => Response::Ok(reminders),
            Err(e) => {
                tracing::error!(error = %e, "fetch_reminders failed");
                Response::Failure(ApiMessage::new(FETCH_FAILED))
            }
        }
    }

    pub fn create_reminder(&mut self, data: NewReminder) -> Response<Reminder> {
        match self.create(data).and_then(single_affected) {
            Ok(reminder) => Response::Ok(reminder),
            Err(e) => {
                tracing::error!(error = %e, "create_reminder failed");
                Response::Failure(ApiMessage::new(INVALID_DATA))
            }
        }
    }

    pub fn mark_completed(&mut self, id: ReminderId) -> Response<Reminder> {
        match self.complete(id).and_then(single_affected) {
            Ok(reminder) => Response::Ok(reminder),
            Err(e) => {
                tracing::error!(error = %e, id, "mark_completed failed");
                Response::Failure(ApiMessage::new(NOT_FOUND))
            }
        }
    }

    pub fn delete_reminder(&mut self, id: ReminderId) -> DeleteResponse {
        match self.delete(id) {
            Ok(_) => DeleteResponse {
                message: DELETED.to_string(),
                ok: true,
            },
            Err(e) => {
                tracing::error!(error = %e, id, "delete_reminder failed");
                DeleteResponse {
                    message: NOT_FOUND.to_string(),
                    ok: false,
                }
            }
        }
    }
}

/// Config access that needs no store or channel, usable before a
/// [`RemindzApi`] can be built.
pub fn config(config_dir: &Path, action: ConfigAction) -> Result<commands::CmdResult> {
    commands::config::run(config_dir, action)
}

fn single_affected(result: commands::CmdResult) -> Result<Reminder> {
    result.affected_reminders.into_iter().next().ok_or_else(|| {
        crate::error::RemindzError::Store("command returned no reminder".to_string())
    })
}

pub use crate::commands::config::ConfigAction;
pub use crate::commands::list::ListFilter;
pub use crate::commands::{CmdMessage, CmdResult, ListedReminder, MessageLevel};
