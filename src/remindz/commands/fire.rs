use crate::commands::{CmdMessage, CmdResult};
use crate::context::ReminderContext;
use crate::error::Result;
use crate::notify::{Delivery, NotificationChannel};
use crate::store::DataStore;
use chrono::{DateTime, TimeZone, Utc};

use super::helpers::persistence_warning;

/// Fire every reminder due at `now`.
pub fn run<S, C, Tz>(ctx: &mut ReminderContext<S, C, Tz>, now: DateTime<Utc>) -> Result<CmdResult>
where
    S: DataStore,
    C: NotificationChannel,
    Tz: TimeZone,
{
    let firings = ctx.fire_due(now)?;
    let mut result = CmdResult::default();

    for firing in &firings {
        let r = &firing.reminder;
        match &firing.delivery {
            Delivery::Delivered => {
                result.add_message(CmdMessage::info(format!("Notified {}: {}", r.id, r.title)))
            }
            Delivery::Suppressed => {}
            Delivery::PermissionDenied => result.add_message(CmdMessage::warning(format!(
                "Notification permission denied for reminder {}: {}",
                r.id, r.title
            ))),
            Delivery::Failed(e) => result.add_message(CmdMessage::error(format!(
                "Could not notify reminder {}: {}",
                r.id, e
            ))),
        }
        if firing.completed {
            result.add_message(CmdMessage::success(format!(
                "Reminder {} completed: {}",
                r.id, r.title
            )));
        }
        if !firing.persisted {
            result.add_message(persistence_warning());
        }
    }

    Ok(result.with_firings(firings))
}
