//! # Job Registry
//!
//! One armed [`Job`] per active reminder. The registry does not own a timer:
//! whoever drives it asks for [`Scheduler::next_wakeup`], sleeps until then,
//! and collects [`Scheduler::due`] jobs. This keeps firing deterministic and
//! lets tests simulate time by passing instants.

use crate::model::{Reminder, ReminderId};
use crate::schedule::Schedule;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub reminder_id: ReminderId,
    pub schedule: Schedule,
    pub next_fire: DateTime<Utc>,
}

/// A job that came due, captured before it is re-armed or dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueJob {
    pub reminder_id: ReminderId,
    pub occurrence: DateTime<Utc>,
}

pub struct Scheduler<Tz: TimeZone> {
    tz: Tz,
    jobs: HashMap<ReminderId, Job>,
}

impl<Tz: TimeZone> Scheduler<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            jobs: HashMap::new(),
        }
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// Arm a job for the reminder, replacing any existing one for its id.
    /// A recurring job fires first at its earliest occurrence after `since`,
    /// which may already be due. Completed reminders are not armed. Returns
    /// the first fire instant.
    pub fn register(
        &mut self,
        reminder: &Reminder,
        since: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        self.jobs.remove(&reminder.id);
        if !reminder.is_active() {
            return None;
        }

        let schedule = Schedule::for_reminder(reminder, &self.tz);
        let Some(next_fire) = schedule.first_fire(&self.tz, since) else {
            tracing::warn!(id = reminder.id, "no future occurrence, job not armed");
            return None;
        };

        tracing::debug!(id = reminder.id, %next_fire, "armed job");
        self.jobs.insert(
            reminder.id,
            Job {
                reminder_id: reminder.id,
                schedule,
                next_fire,
            },
        );
        Some(next_fire)
    }

    /// Remove the job for `id`. Returns whether one was armed.
    pub fn cancel(&mut self, id: ReminderId) -> bool {
        let removed = self.jobs.remove(&id).is_some();
        if removed {
            tracing::debug!(id, "cancelled job");
        }
        removed
    }

    pub fn get(&self, id: ReminderId) -> Option<&Job> {
        self.jobs.get(&id)
    }

    /// Ids with an armed job, in no particular order.
    pub fn ids(&self) -> Vec<ReminderId> {
        self.jobs.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn next_wakeup(&self) -> Option<DateTime<Utc>> {
        self.jobs.values().map(|j| j.next_fire).min()
    }

    /// Take every job due at `now`, in fire order, re-arming recurring ones
    /// past `now` and dropping one-shots.
    pub fn due(&mut self, now: DateTime<Utc>) -> Vec<DueJob> {
        let mut due: Vec<DueJob> = self
            .jobs
            .values()
            .filter(|j| j.next_fire <= now)
            .map(|j| DueJob {
                reminder_id: j.reminder_id,
                occurrence: j.next_fire,
            })
            .collect();
        due.sort_by_key(|d| (d.occurrence, d.reminder_id));

        for fired in &due {
            let Some(job) = self.jobs.get_mut(&fired.reminder_id) else {
                continue;
            };
            // Missed occurrences collapse into this one firing
            match job.schedule.next_after(&self.tz, now) {
                Some(next) => job.next_fire = next,
                None => {
                    self.jobs.remove(&fired.reminder_id);
                }
            }
        }
        due
    }
}
