//! # Reminder Context
//!
//! [`ReminderContext`] is the single owner of all runtime state:
//!
//! - the [`ReminderBook`] (reminders, id counter, storage)
//! - the [`Scheduler`] (one armed job per active reminder)
//! - the [`Notifier`] (channel plus dedup cache)
//!
//! Every operation takes `&mut self`, so a firing job can never interleave
//! with a delete or completion of the same reminder. Several contexts can
//! live side by side (tests do this constantly) and dropping one tears down
//! all of its jobs.
//!
//! ## Lifecycle Coupling
//!
//! - `create` arms a job, `complete` and `delete` cancel it
//! - `load` arms a job for every active reminder it hydrates, starting from
//!   the reminder's fired-through checkpoint, so occurrences missed while no
//!   process was running are due at once
//! - `fire_due` notifies, then completes a one-shot reminder whose
//!   notification was attempted, or moves a recurring reminder's checkpoint
//! - every mutation first syncs with storage: reminders another process
//!   added are armed, ones it removed or completed are cancelled
//!
//! A job that comes due for a reminder that no longer exists or is already
//! completed is dropped without notifying.

use crate::config::RemindzConfig;
use crate::error::{RemindzError, Result};
use crate::model::{Frequency, NewReminder, Reminder, ReminderId};
use crate::notify::{Delivery, Notification, NotificationChannel, NotificationKey, Notifier};
use crate::reminders::{ReminderBook, Saved};
use crate::scheduler::Scheduler;
use crate::store::DataStore;
use chrono::{DateTime, TimeZone, Utc};

/// The outcome of one due job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Firing {
    /// The reminder as it was when it fired.
    pub reminder: Reminder,
    pub occurrence: DateTime<Utc>,
    pub delivery: Delivery,
    /// A one-shot reminder was marked completed by this firing.
    pub completed: bool,
    /// False when the completion could not be written to storage.
    pub persisted: bool,
}

pub struct ReminderContext<S: DataStore, C: NotificationChannel, Tz: TimeZone> {
    book: ReminderBook<S>,
    scheduler: Scheduler<Tz>,
    notifier: Notifier<C>,
    default_body: String,
}

impl<S: DataStore, C: NotificationChannel, Tz: TimeZone> ReminderContext<S, C, Tz> {
    pub fn new(store: S, channel: C, tz: Tz, config: &RemindzConfig) -> Self {
        Self {
            book: ReminderBook::new(store),
            scheduler: Scheduler::new(tz),
            notifier: Notifier::new(channel, config.dedup_capacity),
            default_body: config.default_body.clone(),
        }
    }

    pub fn book(&self) -> &ReminderBook<S> {
        &self.book
    }

    pub fn book_mut(&mut self) -> &mut ReminderBook<S> {
        &mut self.book
    }

    pub fn scheduler(&self) -> &Scheduler<Tz> {
        &self.scheduler
    }

    pub fn notifier(&self) -> &Notifier<C> {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut Notifier<C> {
        &mut self.notifier
    }

    pub fn timezone(&self) -> &Tz {
        self.scheduler.timezone()
    }

    pub fn is_loaded(&self) -> bool {
        self.book.is_loaded()
    }

    /// Hydrate from storage once and arm jobs for active reminders.
    /// Returns the number of jobs armed by this call.
    pub fn load(&mut self) -> Result<usize> {
        let loaded = self.book.load()?;
        let mut armed = 0;
        for reminder in loaded.iter().filter(|r| r.is_active()) {
            if self.arm(reminder).is_some() {
                armed += 1;
            }
        }
        if !loaded.is_empty() {
            tracing::info!(count = loaded.len(), armed, "loaded reminders");
        }
        Ok(armed)
    }

    fn require_loaded(&self) -> Result<()> {
        if self.book.is_loaded() {
            Ok(())
        } else {
            Err(RemindzError::Store(
                "Reminders have not been loaded".to_string(),
            ))
        }
    }

    fn arm(&mut self, reminder: &Reminder) -> Option<DateTime<Utc>> {
        let since = self.book.armed_since(reminder);
        self.scheduler.register(reminder, since)
    }

    /// Re-read storage if another process changed it and bring the job
    /// registry in line with what is there now.
    fn refresh(&mut self) -> Result<()> {
        let Some(current) = self.book.sync()? else {
            return Ok(());
        };
        for id in self.scheduler.ids() {
            if !current.iter().any(|r| r.id == id && r.is_active()) {
                self.scheduler.cancel(id);
            }
        }
        for reminder in current.iter().filter(|r| r.is_active()) {
            if self.scheduler.get(reminder.id).is_none() {
                self.arm(reminder);
            }
        }
        Ok(())
    }

    pub fn create(&mut self, data: NewReminder, now: DateTime<Utc>) -> Result<Saved<Reminder>> {
        self.require_loaded()?;
        self.refresh()?;
        let saved = self.book.create(data, now)?;
        self.arm(&saved.value);
        tracing::info!(id = saved.value.id, title = %saved.value.title, "created reminder");
        Ok(saved)
    }

    pub fn list(&self) -> Result<Vec<Reminder>> {
        self.require_loaded()?;
        Ok(self.book.list())
    }

    pub fn get(&self, id: ReminderId) -> Result<&Reminder> {
        self.require_loaded()?;
        self.book.get(id)
    }

    pub fn complete(&mut self, id: ReminderId) -> Result<Saved<Reminder>> {
        self.require_loaded()?;
        self.refresh()?;
        let saved = self.book.complete(id)?;
        self.scheduler.cancel(id);
        tracing::info!(id, "completed reminder");
        Ok(saved)
    }

    pub fn delete(&mut self, id: ReminderId) -> Result<Saved<Reminder>> {
        self.require_loaded()?;
        self.refresh()?;
        let saved = self.book.delete(id)?;
        self.scheduler.cancel(id);
        tracing::info!(id, "deleted reminder");
        Ok(saved)
    }

    pub fn next_wakeup(&self) -> Option<DateTime<Utc>> {
        self.scheduler.next_wakeup()
    }

    /// Fire every job due at `now`.
    pub fn fire_due(&mut self, now: DateTime<Utc>) -> Result<Vec<Firing>> {
        self.require_loaded()?;
        self.refresh()?;
        let mut firings = Vec::new();

        for due in self.scheduler.due(now) {
            let reminder = match self.book.get(due.reminder_id) {
                Ok(r) if r.is_active() => r.clone(),
                _ => {
                    tracing::debug!(id = due.reminder_id, "stale job dropped");
                    self.scheduler.cancel(due.reminder_id);
                    continue;
                }
            };

            tracing::info!(id = reminder.id, "Reminder triggered: {}", reminder.title);
            let notification = Notification {
                key: NotificationKey {
                    reminder_id: reminder.id,
                    occurrence: due.occurrence,
                },
                title: reminder.title.clone(),
                body: reminder
                    .description
                    .clone()
                    .unwrap_or_else(|| self.default_body.clone()),
            };
            let delivery = self.notifier.notify(&notification);

            let (completed, persisted) = if reminder.frequency.is_recurring() {
                (false, self.book.record_fired(reminder.id, now)?.persisted)
            } else if delivery.attempted() {
                match self.complete_once(reminder.id)? {
                    Some(saved) => (true, saved.persisted),
                    None => (false, true),
                }
            } else {
                (false, true)
            };

            firings.push(Firing {
                reminder,
                occurrence: due.occurrence,
                delivery,
                completed,
                persisted,
            });
        }
        Ok(firings)
    }

    /// Complete the reminder if it is a pending one-shot.
    fn complete_once(&mut self, id: ReminderId) -> Result<Option<Saved<Reminder>>> {
        let pending_once = self
            .book
            .get(id)
            .map(|r| r.frequency == Frequency::Once && r.is_active())
            .unwrap_or(false);
        if !pending_once {
            return Ok(None);
        }
        self.complete(id).map(Some)
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::notify::fixtures::RecordingChannel;
    use crate::store::memory::InMemoryStore;

    pub type TestContext = ReminderContext<InMemoryStore, RecordingChannel, Utc>;

    /// An empty, loaded context on UTC with a recording native channel.
    pub fn loaded_context() -> TestContext {
        let mut ctx = ReminderContext::new(
            InMemoryStore::new(),
            RecordingChannel::native(),
            Utc,
            &RemindzConfig::default(),
        );
        ctx.load().unwrap();
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::fixtures::RecordingChannel;
    use crate::notify::Permission;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::fs::FileStore;
    use crate::store::memory::InMemoryStore;
    use pretty_assertions::assert_eq;

    type TestContext = ReminderContext<InMemoryStore, RecordingChannel, Utc>;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn context_with(store: InMemoryStore) -> TestContext {
        ReminderContext::new(
            store,
            RecordingChannel::native(),
            Utc,
            &RemindzConfig::default(),
        )
    }

    fn loaded_context() -> TestContext {
        let mut ctx = context_with(InMemoryStore::new());
        ctx.load().unwrap();
        ctx
    }

    #[test]
    fn operations_require_load() {
        let mut ctx = context_with(InMemoryStore::new());
        let err = ctx
            .create(
                NewReminder::new("A", utc(2024, 1, 1, 9, 0), Frequency::Once),
                utc(2023, 12, 31, 0, 0),
            )
            .unwrap_err();
        assert!(matches!(err, RemindzError::Store(_)));
    }

    #[test]
    fn once_reminder_fires_once_and_completes() {
        let mut ctx = loaded_context();
        let saved = ctx
            .create(
                NewReminder::new("Pay bill", utc(2024, 1, 1, 9, 0), Frequency::Once),
                utc(2023, 12, 31, 0, 0),
            )
            .unwrap();
        assert_eq!(saved.value.id, 1);
        assert!(!saved.value.completed);

        let firings = ctx.fire_due(utc(2024, 1, 1, 9, 0)).unwrap();
        assert_eq!(firings.len(), 1);
        assert_eq!(firings[0].delivery, Delivery::Delivered);
        assert!(firings[0].completed);

        let delivered = &ctx.notifier().channel().delivered;
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].title, "Pay bill");
        assert_eq!(delivered[0].body, "Reminder due!");
        assert!(ctx.get(1).unwrap().completed);
        assert!(ctx.scheduler().is_empty());

        // Nothing left to fire
        assert!(ctx.fire_due(utc(2024, 1, 2, 9, 0)).unwrap().is_empty());
    }

    #[test]
    fn description_becomes_body() {
        let mut ctx = loaded_context();
        ctx.create(
            NewReminder::new("Dentist", utc(2024, 1, 1, 9, 0), Frequency::Once)
                .with_description("Bring insurance card"),
            utc(2023, 12, 31, 0, 0),
        )
        .unwrap();
        ctx.fire_due(utc(2024, 1, 1, 9, 0)).unwrap();
        assert_eq!(
            ctx.notifier().channel().delivered[0].body,
            "Bring insurance card"
        );
    }

    #[test]
    fn denied_permission_still_completes_once_reminder() {
        let mut ctx = loaded_context();
        *ctx.notifier_mut().channel_mut() = RecordingChannel::terminal(Permission::Denied);
        ctx.create(
            NewReminder::new("Pay bill", utc(2024, 1, 1, 9, 0), Frequency::Once),
            utc(2023, 12, 31, 0, 0),
        )
        .unwrap();

        let firings = ctx.fire_due(utc(2024, 1, 1, 9, 0)).unwrap();
        assert_eq!(firings[0].delivery, Delivery::PermissionDenied);
        assert!(firings[0].completed);
    }

    #[test]
    fn weekly_reminder_recurs_until_deleted() {
        let mut ctx = loaded_context();
        // Monday 2024-01-01 10:00
        ctx.create(
            NewReminder::new("Team sync", utc(2024, 1, 1, 10, 0), Frequency::Weekly),
            utc(2023, 12, 31, 0, 0),
        )
        .unwrap();
        assert_eq!(ctx.next_wakeup(), Some(utc(2024, 1, 1, 10, 0)));

        for week in 0..3 {
            let at = utc(2024, 1, 1 + 7 * week, 10, 0);
            let firings = ctx.fire_due(at).unwrap();
            assert_eq!(firings.len(), 1);
            assert!(!firings[0].completed);
        }
        assert_eq!(ctx.next_wakeup(), Some(utc(2024, 1, 22, 10, 0)));
        assert!(!ctx.get(1).unwrap().completed);

        ctx.delete(1).unwrap();
        assert_eq!(ctx.next_wakeup(), None);
        assert!(ctx.fire_due(utc(2024, 1, 22, 10, 0)).unwrap().is_empty());
        assert_eq!(ctx.notifier().channel().delivered.len(), 3);
    }

    #[test]
    fn completing_cancels_the_job() {
        let mut ctx = loaded_context();
        ctx.create(
            NewReminder::new("Water plants", utc(2024, 1, 1, 18, 0), Frequency::Daily),
            utc(2023, 12, 31, 0, 0),
        )
        .unwrap();

        ctx.complete(1).unwrap();
        assert!(ctx.fire_due(utc(2024, 1, 5, 0, 0)).unwrap().is_empty());
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut ctx = loaded_context();
        assert!(matches!(ctx.complete(9), Err(RemindzError::NotFound(9))));
        assert!(matches!(ctx.delete(9), Err(RemindzError::NotFound(9))));
        assert!(ctx.list().unwrap().is_empty());
    }

    #[test]
    fn reload_rearms_only_active_reminders() {
        let store = StoreFixture::new()
            .with_reminder(1, "Daily", utc(2024, 1, 1, 8, 0), Frequency::Daily)
            .with_completed(2, "Done", utc(2024, 1, 1, 8, 0))
            .with_reminder(3, "Later", utc(2024, 2, 1, 8, 0), Frequency::Once)
            .build();
        let mut ctx = context_with(store);

        let armed = ctx.load().unwrap();
        assert_eq!(armed, 2);
        assert!(ctx.scheduler().get(1).is_some());
        assert!(ctx.scheduler().get(2).is_none());
        // Never fired: the due date itself is the first occurrence
        assert_eq!(ctx.next_wakeup(), Some(utc(2024, 1, 1, 8, 0)));

        // Loading again neither re-reads nor re-arms
        assert_eq!(ctx.load().unwrap(), 0);
    }

    #[test]
    fn overdue_once_reminder_fires_after_restart() {
        let store = StoreFixture::new()
            .with_reminder(1, "Missed", utc(2024, 1, 1, 9, 0), Frequency::Once)
            .build();
        let mut ctx = context_with(store);
        ctx.load().unwrap();

        let firings = ctx.fire_due(utc(2024, 1, 3, 0, 0)).unwrap();
        assert_eq!(firings.len(), 1);
        assert!(firings[0].completed);
    }

    #[test]
    fn round_trip_through_storage() {
        let mut ctx = loaded_context();
        let now = utc(2023, 12, 31, 0, 0);
        ctx.create(NewReminder::new("A", utc(2024, 1, 1, 9, 0), Frequency::Once), now)
            .unwrap();
        ctx.create(
            NewReminder::new("B", utc(2024, 1, 1, 9, 0), Frequency::Hourly).with_description("b"),
            now,
        )
        .unwrap();
        ctx.create(NewReminder::new("C", utc(2024, 1, 1, 9, 0), Frequency::Monthly), now)
            .unwrap();
        ctx.complete(1).unwrap();
        let before = ctx.list().unwrap();

        let store = std::mem::take(ctx.book_mut().store_mut());
        let mut reloaded = context_with(store);
        reloaded.load().unwrap();

        assert_eq!(reloaded.list().unwrap(), before);
        assert_eq!(reloaded.scheduler().len(), 2);
        let next = reloaded
            .create(NewReminder::new("D", utc(2024, 1, 1, 9, 0), Frequency::Once), now)
            .unwrap();
        assert_eq!(next.value.id, 4);
    }

    #[test]
    fn independent_contexts_do_not_share_dedup_state() {
        let mut first = loaded_context();
        let mut second = loaded_context();
        let now = utc(2023, 12, 31, 0, 0);
        for ctx in [&mut first, &mut second] {
            ctx.create(NewReminder::new("A", utc(2024, 1, 1, 9, 0), Frequency::Once), now)
                .unwrap();
            ctx.fire_due(utc(2024, 1, 1, 9, 0)).unwrap();
        }
        assert_eq!(first.notifier().channel().delivered.len(), 1);
        assert_eq!(second.notifier().channel().delivered.len(), 1);
    }

    #[test]
    fn failed_completion_write_is_reported() {
        let mut ctx = loaded_context();
        ctx.create(
            NewReminder::new("Pay bill", utc(2024, 1, 1, 9, 0), Frequency::Once),
            utc(2023, 12, 31, 0, 0),
        )
        .unwrap();
        ctx.book_mut().store_mut().set_simulate_write_error(true);

        let firings = ctx.fire_due(utc(2024, 1, 1, 9, 0)).unwrap();
        assert!(firings[0].completed);
        assert!(!firings[0].persisted);
    }

    #[test]
    fn recurring_occurrence_missed_while_stopped_fires_on_next_run() {
        let store = StoreFixture::new()
            .with_reminder(1, "Stand-up", utc(2024, 1, 1, 9, 0), Frequency::Daily)
            .build();
        let mut ctx = context_with(store);
        ctx.load().unwrap();

        let now = utc(2024, 1, 2, 9, 0) + chrono::Duration::seconds(30);
        let firings = ctx.fire_due(now).unwrap();
        assert_eq!(firings.len(), 1);
        assert!(!firings[0].completed);
        assert!(firings[0].persisted);
        assert_eq!(ctx.next_wakeup(), Some(utc(2024, 1, 3, 9, 0)));
    }

    #[test]
    fn fired_occurrence_is_not_repeated_by_the_next_process() {
        let store = StoreFixture::new()
            .with_reminder(1, "Stand-up", utc(2024, 1, 1, 9, 0), Frequency::Daily)
            .build();
        let mut first = context_with(store);
        first.load().unwrap();
        assert_eq!(first.fire_due(utc(2024, 1, 2, 10, 0)).unwrap().len(), 1);

        let store = std::mem::take(first.book_mut().store_mut());
        let mut second = context_with(store);
        second.load().unwrap();
        assert!(second.fire_due(utc(2024, 1, 2, 11, 0)).unwrap().is_empty());
        assert_eq!(second.fire_due(utc(2024, 1, 3, 9, 0)).unwrap().len(), 1);
    }

    #[test]
    fn recurring_reminder_created_after_its_due_time_waits_for_next_occurrence() {
        let mut ctx = loaded_context();
        ctx.create(
            NewReminder::new("Water plants", utc(2024, 1, 1, 9, 0), Frequency::Daily),
            utc(2024, 1, 5, 12, 0),
        )
        .unwrap();

        assert!(ctx.fire_due(utc(2024, 1, 5, 12, 0)).unwrap().is_empty());
        assert_eq!(ctx.next_wakeup(), Some(utc(2024, 1, 6, 9, 0)));
    }

    #[test]
    fn contexts_sharing_a_directory_see_each_others_writes() {
        let dir = tempfile::tempdir().unwrap();
        let shared = |dir: &std::path::Path| {
            let mut ctx = ReminderContext::new(
                FileStore::new(dir.to_path_buf()),
                RecordingChannel::native(),
                Utc,
                &RemindzConfig::default(),
            );
            ctx.load().unwrap();
            ctx
        };
        let created = utc(2023, 12, 31, 0, 0);
        let mut watcher = shared(dir.path());
        let mut other = shared(dir.path());

        watcher
            .create(NewReminder::new("A", utc(2024, 1, 1, 9, 0), Frequency::Once), created)
            .unwrap();
        let b = other
            .create(NewReminder::new("B", utc(2024, 1, 1, 10, 0), Frequency::Once), created)
            .unwrap();
        let c = watcher
            .create(NewReminder::new("C", utc(2024, 1, 1, 11, 0), Frequency::Once), created)
            .unwrap();
        assert_eq!(b.value.id, 2);
        assert_eq!(c.value.id, 3);

        // The watcher armed B when it synced, and drops A once the other deletes it
        other.delete(1).unwrap();
        let fired: Vec<_> = watcher
            .fire_due(utc(2024, 1, 1, 12, 0))
            .unwrap()
            .into_iter()
            .map(|f| f.reminder.title)
            .collect();
        assert_eq!(fired, vec!["B", "C"]);

        let mut fresh = shared(dir.path());
        let titles: Vec<_> = fresh.list().unwrap().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["B", "C"]);
        assert!(fresh.list().unwrap().iter().all(|r| r.completed));
        assert!(fresh.fire_due(utc(2024, 1, 1, 12, 0)).unwrap().is_empty());
    }
}
