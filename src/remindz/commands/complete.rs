use crate::commands::{CmdMessage, CmdResult};
use crate::context::ReminderContext;
use crate::error::Result;
use crate::model::ReminderId;
use crate::notify::NotificationChannel;
use crate::store::DataStore;
use chrono::TimeZone;

use super::helpers::persistence_warning;

pub fn run<S, C, Tz>(ctx: &mut ReminderContext<S, C, Tz>, id: ReminderId) -> Result<CmdResult>
where
    S: DataStore,
    C: NotificationChannel,
    Tz: TimeZone,
{
    let saved = ctx.complete(id)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Reminder {} completed: {}",
        saved.value.id, saved.value.title
    )));
    if !saved.persisted {
        result.add_message(persistence_warning());
    }
    Ok(result.with_affected_reminders(vec![saved.value]))
}
