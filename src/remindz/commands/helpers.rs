use crate::commands::{CmdMessage, ListedReminder};
use crate::context::ReminderContext;
use crate::model::Reminder;
use crate::notify::NotificationChannel;
use crate::schedule::Schedule;
use crate::store::DataStore;
use chrono::TimeZone;

pub fn listed<S, C, Tz>(ctx: &ReminderContext<S, C, Tz>, reminder: Reminder) -> ListedReminder
where
    S: DataStore,
    C: NotificationChannel,
    Tz: TimeZone,
{
    let schedule = Schedule::for_reminder(&reminder, ctx.timezone()).describe(ctx.timezone());
    let next_fire = ctx.scheduler().get(reminder.id).map(|job| job.next_fire);
    ListedReminder {
        reminder,
        schedule,
        next_fire,
    }
}

pub fn persistence_warning() -> CmdMessage {
    CmdMessage::warning("Could not save reminders; this change will be lost on exit")
}
