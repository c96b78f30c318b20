//! # Recurrence Rules
//!
//! A recurring reminder fires whenever the wall clock matches the components
//! taken from its due date, at the granularity of its frequency:
//!
//! | frequency | fixed components                 |
//! |-----------|----------------------------------|
//! | hourly    | minute                           |
//! | daily     | hour, minute                     |
//! | weekly    | weekday, hour, minute            |
//! | monthly   | day of month, hour, minute       |
//!
//! Matching happens at second zero, in the user's time zone. The rule keeps
//! recurring forever; only cancelling the job stops it.
//!
//! Months without the rule's day are skipped, local times that fall into a
//! DST gap are skipped, and ambiguous local times resolve to the earlier
//! instant.

use crate::model::{Frequency, Reminder};
use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Timelike, Utc, Weekday};
use std::fmt;

/// Long enough to reach any day-of-month from any starting date.
const SEARCH_DAYS: u64 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub minute: u32,
    pub hour: Option<u32>,
    pub weekday: Option<Weekday>,
    pub day_of_month: Option<u32>,
}

impl RecurrenceRule {
    /// Derive the rule for a recurring frequency. `Once` has no rule.
    pub fn from_due<Tz: TimeZone>(due: &DateTime<Tz>, frequency: Frequency) -> Option<Self> {
        let minute = due.minute();
        let hour = due.hour();
        let rule = match frequency {
            Frequency::Once => return None,
            Frequency::Hourly => Self {
                minute,
                hour: None,
                weekday: None,
                day_of_month: None,
            },
            Frequency::Daily => Self {
                minute,
                hour: Some(hour),
                weekday: None,
                day_of_month: None,
            },
            Frequency::Weekly => Self {
                minute,
                hour: Some(hour),
                weekday: Some(due.weekday()),
                day_of_month: None,
            },
            Frequency::Monthly => Self {
                minute,
                hour: Some(hour),
                weekday: None,
                day_of_month: Some(due.day()),
            },
        };
        Some(rule)
    }

    fn matches_date(&self, date: NaiveDate) -> bool {
        self.weekday.is_none_or(|w| date.weekday() == w)
            && self.day_of_month.is_none_or(|d| date.day() == d)
    }

    /// The first instant strictly after `after` that matches the rule.
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = after.timezone();
        let start = after.naive_local().date();
        let hours: Vec<u32> = match self.hour {
            Some(h) => vec![h],
            None => (0..24).collect(),
        };

        for offset in 0..SEARCH_DAYS {
            let date = start.checked_add_days(Days::new(offset))?;
            if !self.matches_date(date) {
                continue;
            }
            for &hour in &hours {
                let Some(naive) = date.and_hms_opt(hour, self.minute, 0) else {
                    continue;
                };
                if let Some(candidate) = tz.from_local_datetime(&naive).earliest() {
                    if candidate > *after {
                        return Some(candidate);
                    }
                }
            }
        }
        None
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.hour, self.weekday, self.day_of_month) {
            (None, _, _) => write!(f, "every hour at :{:02}", self.minute),
            (Some(h), Some(w), _) => {
                write!(f, "every {} at {:02}:{:02}", weekday_name(w), h, self.minute)
            }
            (Some(h), None, Some(d)) => {
                write!(f, "every month on day {} at {:02}:{:02}", d, h, self.minute)
            }
            (Some(h), None, None) => write!(f, "every day at {:02}:{:02}", h, self.minute),
        }
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// When a reminder's job fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Once { at: DateTime<Utc> },
    Recurring(RecurrenceRule),
}

impl Schedule {
    pub fn for_reminder<Tz: TimeZone>(reminder: &Reminder, tz: &Tz) -> Self {
        let local_due = reminder.due_date.with_timezone(tz);
        match RecurrenceRule::from_due(&local_due, reminder.frequency) {
            Some(rule) => Schedule::Recurring(rule),
            None => Schedule::Once {
                at: reminder.due_date,
            },
        }
    }

    /// Instant a freshly armed job should fire: the first occurrence after
    /// `since` for a recurring rule, the due date for a one-shot. Either may
    /// already be past, in which case it fires on the next tick.
    pub fn first_fire<Tz: TimeZone>(
        &self,
        tz: &Tz,
        since: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        match self {
            Schedule::Once { at } => Some(*at),
            Schedule::Recurring(rule) => rule
                .next_after(&since.with_timezone(tz))
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    /// Instant to re-arm at after firing at `fired_at`; `None` disarms.
    pub fn next_after<Tz: TimeZone>(
        &self,
        tz: &Tz,
        fired_at: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        match self {
            Schedule::Once { .. } => None,
            Schedule::Recurring(rule) => rule
                .next_after(&fired_at.with_timezone(tz))
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    pub fn describe<Tz: TimeZone>(&self, tz: &Tz) -> String {
        match self {
            Schedule::Once { at } => format!(
                "once at {}",
                at.with_timezone(tz).naive_local().format("%Y-%m-%d %H:%M")
            ),
            Schedule::Recurring(rule) => rule.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn once_has_no_rule() {
        assert_eq!(
            RecurrenceRule::from_due(&utc(2024, 1, 1, 9, 0), Frequency::Once),
            None
        );
    }

    #[test]
    fn hourly_keeps_minute_only() {
        let rule = RecurrenceRule::from_due(&utc(2024, 1, 1, 9, 15), Frequency::Hourly).unwrap();
        assert_eq!(rule.hour, None);

        let next = rule.next_after(&utc(2024, 3, 5, 13, 20)).unwrap();
        assert_eq!(next, utc(2024, 3, 5, 14, 15));
        let next = rule.next_after(&utc(2024, 3, 5, 13, 10)).unwrap();
        assert_eq!(next, utc(2024, 3, 5, 13, 15));
    }

    #[test]
    fn next_is_strictly_after() {
        let rule = RecurrenceRule::from_due(&utc(2024, 1, 1, 9, 0), Frequency::Daily).unwrap();
        let next = rule.next_after(&utc(2024, 2, 1, 9, 0)).unwrap();
        assert_eq!(next, utc(2024, 2, 2, 9, 0));
    }

    #[test]
    fn weekly_recurs_on_same_weekday_and_time() {
        // 2024-01-01 is a Monday
        let rule = RecurrenceRule::from_due(&utc(2024, 1, 1, 10, 0), Frequency::Weekly).unwrap();
        assert_eq!(rule.weekday, Some(Weekday::Mon));

        let mut at = utc(2024, 1, 1, 10, 0);
        let mut fires = Vec::new();
        for _ in 0..3 {
            at = rule.next_after(&at).unwrap();
            fires.push(at);
        }
        assert_eq!(
            fires,
            vec![utc(2024, 1, 8, 10, 0), utc(2024, 1, 15, 10, 0), utc(2024, 1, 22, 10, 0)]
        );
        assert!(fires.iter().all(|f| f.weekday() == Weekday::Mon));
        assert_eq!(rule.to_string(), "every Monday at 10:00");
    }

    #[test]
    fn monthly_skips_months_without_the_day() {
        let rule = RecurrenceRule::from_due(&utc(2024, 1, 31, 8, 30), Frequency::Monthly).unwrap();
        let next = rule.next_after(&utc(2024, 1, 31, 8, 30)).unwrap();
        assert_eq!(next, utc(2024, 3, 31, 8, 30));
        assert_eq!(rule.to_string(), "every month on day 31 at 08:30");
    }

    #[test]
    fn rule_uses_local_components() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let reminder = Reminder {
            id: 1,
            title: "Standup".into(),
            description: None,
            // 07:45 UTC is 09:45 at +02:00
            due_date: utc(2024, 6, 3, 7, 45),
            frequency: Frequency::Daily,
            completed: false,
        };
        let schedule = Schedule::for_reminder(&reminder, &tz);
        assert_eq!(schedule.describe(&tz), "every day at 09:45");

        let first = schedule.first_fire(&tz, utc(2024, 6, 10, 12, 0)).unwrap();
        assert_eq!(first, utc(2024, 6, 11, 7, 45));
    }

    #[test]
    fn once_fires_at_due_even_when_overdue_and_never_rearms() {
        let reminder = Reminder {
            id: 1,
            title: "Pay bill".into(),
            description: None,
            due_date: utc(2024, 1, 1, 9, 0),
            frequency: Frequency::Once,
            completed: false,
        };
        let schedule = Schedule::for_reminder(&reminder, &Utc);

        assert_eq!(
            schedule.first_fire(&Utc, utc(2024, 2, 1, 0, 0)),
            Some(utc(2024, 1, 1, 9, 0))
        );
        assert_eq!(schedule.next_after(&Utc, utc(2024, 1, 1, 9, 0)), None);
        assert_eq!(schedule.describe(&Utc), "once at 2024-01-01 09:00");
    }

    mod dst {
        use super::*;
        use chrono::TimeZone;
        use pretty_assertions::assert_eq;
        use chrono_tz::Europe::Amsterdam;

        // 2024-03-31: 02:00 CET jumps to 03:00 CEST.
        // 2024-10-27: 03:00 CEST falls back to 02:00 CET.

        fn local(m: u32, d: u32, h: u32, min: u32) -> DateTime<chrono_tz::Tz> {
            Amsterdam.with_ymd_and_hms(2024, m, d, h, min, 0).unwrap()
        }

        #[test]
        fn daily_time_inside_gap_skips_that_day() {
            let rule = RecurrenceRule::from_due(&local(3, 1, 2, 30), Frequency::Daily).unwrap();
            let next = rule.next_after(&local(3, 30, 3, 0)).unwrap();
            assert_eq!(next.with_timezone(&Utc), utc(2024, 4, 1, 0, 30));
        }

        #[test]
        fn hourly_skips_the_missing_hour() {
            let rule = RecurrenceRule::from_due(&local(3, 1, 9, 30), Frequency::Hourly).unwrap();
            // 01:45 CET, so 02:30 does not exist and 03:30 CEST is next
            let next = rule.next_after(&local(3, 31, 1, 45)).unwrap();
            assert_eq!(next.with_timezone(&Utc), utc(2024, 3, 31, 1, 30));
        }

        #[test]
        fn daily_ambiguous_time_uses_earliest_instant_once() {
            let rule = RecurrenceRule::from_due(&local(10, 1, 2, 30), Frequency::Daily).unwrap();
            let first = rule.next_after(&local(10, 26, 12, 0)).unwrap();
            // 02:30 CEST, the first of the two 02:30s
            assert_eq!(first.with_timezone(&Utc), utc(2024, 10, 27, 0, 30));

            let second = rule.next_after(&first).unwrap();
            assert_eq!(second.with_timezone(&Utc), utc(2024, 10, 28, 1, 30));
        }

        #[test]
        fn hourly_repeated_hour_fires_once() {
            let rule = RecurrenceRule::from_due(&local(10, 1, 9, 30), Frequency::Hourly).unwrap();
            let at_first_half_past_two = utc(2024, 10, 27, 0, 30).with_timezone(&Amsterdam);
            let next = rule.next_after(&at_first_half_past_two).unwrap();
            // The CET 02:30 (01:30 UTC) is skipped; 03:30 CET is next
            assert_eq!(next.with_timezone(&Utc), utc(2024, 10, 27, 2, 30));
        }

        #[test]
        fn schedule_describes_local_wall_clock() {
            let reminder = Reminder {
                id: 1,
                title: "Night job".into(),
                description: None,
                due_date: local(3, 1, 2, 30).with_timezone(&Utc),
                frequency: Frequency::Daily,
                completed: false,
            };
            let schedule = Schedule::for_reminder(&reminder, &Amsterdam);
            assert_eq!(schedule.describe(&Amsterdam), "every day at 02:30");
            assert_eq!(
                schedule.first_fire(&Amsterdam, utc(2024, 3, 30, 12, 0)),
                Some(utc(2024, 4, 1, 0, 30))
            );
        }
    }
}
