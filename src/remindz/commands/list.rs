use crate::commands::CmdResult;
use crate::context::ReminderContext;
use crate::error::Result;
use crate::notify::NotificationChannel;
use crate::store::DataStore;
use chrono::TimeZone;

use super::helpers::listed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFilter {
    #[default]
    All,
    Active,
    Completed,
}

pub fn run<S, C, Tz>(ctx: &ReminderContext<S, C, Tz>, filter: ListFilter) -> Result<CmdResult>
where
    S: DataStore,
    C: NotificationChannel,
    Tz: TimeZone,
{
    let reminders = ctx.list()?;
    let listed: Vec<_> = reminders
        .into_iter()
        .filter(|r| match filter {
            ListFilter::All => true,
            ListFilter::Active => r.is_active(),
            ListFilter::Completed => r.completed,
        })
        .map(|r| listed(ctx, r))
        .collect();

    Ok(CmdResult::default().with_listed_reminders(listed))
}
