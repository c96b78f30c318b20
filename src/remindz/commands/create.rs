use crate::commands::{CmdMessage, CmdResult};
use crate::context::ReminderContext;
use crate::error::Result;
use crate::model::NewReminder;
use crate::notify::NotificationChannel;
use crate::store::DataStore;
use chrono::{DateTime, TimeZone, Utc};

use super::helpers::{listed, persistence_warning};

pub fn run<S, C, Tz>(
    ctx: &mut ReminderContext<S, C, Tz>,
    data: NewReminder,
    now: DateTime<Utc>,
) -> Result<CmdResult>
where
    S: DataStore,
    C: NotificationChannel,
    Tz: TimeZone,
{
    let saved = ctx.create(data, now)?;
    let view = listed(ctx, saved.value.clone());

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Reminder {} created: {} ({})",
        view.reminder.id, view.reminder.title, view.schedule
    )));
    if !saved.persisted {
        result.add_message(persistence_warning());
    }
    Ok(result
        .with_affected_reminders(vec![saved.value])
        .with_listed_reminders(vec![view]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::context::fixtures::loaded_context;
    use crate::error::RemindzError;
    use crate::model::Frequency;

    fn utc(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap()
    }

    #[test]
    fn creates_and_reports_schedule() {
        let mut ctx = loaded_context();
        let result = run(
            &mut ctx,
            NewReminder::new("Pay bill", utc(1, 9), Frequency::Once),
            utc(1, 0),
        )
        .unwrap();

        assert_eq!(result.affected_reminders[0].id, 1);
        assert_eq!(result.listed_reminders[0].next_fire, Some(utc(1, 9)));
        assert_eq!(
            result.messages[0].content,
            "Reminder 1 created: Pay bill (once at 2024-01-01 09:00)"
        );
    }

    #[test]
    fn warns_when_not_persisted() {
        let mut ctx = loaded_context();
        ctx.book_mut().store_mut().set_simulate_write_error(true);

        let result = run(
            &mut ctx,
            NewReminder::new("Pay bill", utc(1, 9), Frequency::Daily),
            utc(1, 0),
        )
        .unwrap();
        assert!(result
            .messages
            .iter()
            .any(|m| m.level == MessageLevel::Warning));
    }

    #[test]
    fn rejects_empty_title() {
        let mut ctx = loaded_context();
        let err = run(
            &mut ctx,
            NewReminder::new("", utc(1, 9), Frequency::Once),
            utc(1, 0),
        )
        .unwrap_err();
        assert!(matches!(err, RemindzError::InvalidReminder(_)));
    }
}
