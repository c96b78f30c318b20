//! # Reminder Book
//!
//! The in-memory source of truth for reminders. A [`ReminderBook`] owns the
//! map of reminders and the id counter, and writes the whole collection back
//! to its [`DataStore`] after every mutation.
//!
//! ## Ids
//!
//! Ids are sequential and never reused. On load the counter resumes at
//! `max(existing ids) + 1`, or at the persisted high-water mark when that is
//! larger (it is larger after the highest reminder was deleted).
//!
//! ## Fired-Through Checkpoints
//!
//! For each recurring reminder the book remembers the instant up to which its
//! occurrences have been handled: its creation time, then every firing. A
//! fresh process arms the job from there, so an occurrence that passed while
//! nothing was running is due right away instead of being skipped.
//!
//! ## Other Writers
//!
//! Several processes may share one data directory (`watch` in one terminal,
//! `add` in another). [`ReminderBook::sync`] re-reads the slots when they no
//! longer hold what this book last read or wrote, and callers sync before
//! every mutation so a stale map is never written back.
//!
//! ## Persistence Failures
//!
//! A failed write does not fail the mutation: the in-memory change stands,
//! the error is logged, and the returned [`Saved::persisted`] flag is false so
//! callers can surface a warning.

use crate::error::{RemindzError, Result};
use crate::model::{NewReminder, Reminder, ReminderId};
use crate::store::{DataStore, FIRED_SLOT, NEXT_ID_SLOT, REMINDERS_SLOT};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// A mutation result together with whether it reached storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved<T> {
    pub value: T,
    pub persisted: bool,
}

pub struct ReminderBook<S: DataStore> {
    store: S,
    reminders: BTreeMap<ReminderId, Reminder>,
    fired_through: BTreeMap<ReminderId, DateTime<Utc>>,
    next_id: ReminderId,
    loaded: bool,
    /// Raw `reminders` slot as last read or written by this book.
    synced: Option<String>,
}

impl<S: DataStore> ReminderBook<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            reminders: BTreeMap::new(),
            fired_through: BTreeMap::new(),
            next_id: 1,
            loaded: false,
            synced: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn next_id(&self) -> ReminderId {
        self.next_id
    }

    /// Hydrate from storage. Only the first successful call reads the slot.
    ///
    /// Returns the reminders that were loaded by this call (empty on repeat
    /// calls), so the caller can arm their jobs exactly once.
    pub fn load(&mut self) -> Result<Vec<Reminder>> {
        if self.loaded {
            return Ok(Vec::new());
        }

        let raw = self.store.read_slot(REMINDERS_SLOT)?;
        let parsed = parse_reminders(raw.as_deref())?;
        self.replace(&parsed, raw);
        self.next_id = self.next_id.max(self.read_high_water());
        self.loaded = true;

        tracing::debug!(
            count = parsed.len(),
            next_id = self.next_id,
            "hydrated reminders"
        );
        Ok(parsed)
    }

    /// Pick up changes another process wrote since this book last touched
    /// the slot. Returns the current reminders when anything changed.
    ///
    /// The id counter never moves backwards, so ids handed out here stay
    /// unique even when the other writer already used the next one.
    pub fn sync(&mut self) -> Result<Option<Vec<Reminder>>> {
        if !self.loaded {
            return Ok(None);
        }

        let raw = self.store.read_slot(REMINDERS_SLOT)?;
        if raw == self.synced {
            return Ok(None);
        }

        let parsed = parse_reminders(raw.as_deref())?;
        let own_next = self.next_id;
        let own_fired = std::mem::take(&mut self.fired_through);
        self.replace(&parsed, raw);
        self.next_id = self.next_id.max(own_next).max(self.read_high_water());
        for (id, at) in own_fired {
            if self.reminders.contains_key(&id) {
                let entry = self.fired_through.entry(id).or_insert(at);
                *entry = (*entry).max(at);
            }
        }

        tracing::info!(count = parsed.len(), "reminders changed on disk, reloaded");
        Ok(Some(parsed))
    }

    /// Swap in reminders read from storage along with their checkpoints.
    fn replace(&mut self, parsed: &[Reminder], raw: Option<String>) {
        self.reminders = parsed.iter().map(|r| (r.id, r.clone())).collect();
        let max_id = self.reminders.keys().next_back().copied().unwrap_or(0);
        self.next_id = max_id + 1;
        self.fired_through = self
            .read_fired()
            .into_iter()
            .filter(|(id, _)| self.reminders.contains_key(id))
            .collect();
        self.synced = raw;
    }

    fn read_high_water(&self) -> ReminderId {
        match self.store.read_slot(NEXT_ID_SLOT) {
            Ok(Some(raw)) => match raw.trim().parse() {
                Ok(id) => id,
                Err(_) => {
                    tracing::warn!(value = %raw.trim(), "ignoring malformed id high-water mark");
                    1
                }
            },
            Ok(None) => 1,
            Err(e) => {
                tracing::warn!(error = %e, "could not read id high-water mark");
                1
            }
        }
    }

    fn read_fired(&self) -> BTreeMap<ReminderId, DateTime<Utc>> {
        match self.store.read_slot(FIRED_SLOT) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring malformed fired-through checkpoints");
                BTreeMap::new()
            }),
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read fired-through checkpoints");
                BTreeMap::new()
            }
        }
    }

    pub fn create(&mut self, data: NewReminder, now: DateTime<Utc>) -> Result<Saved<Reminder>> {
        let title = data.title.trim();
        if title.is_empty() {
            return Err(RemindzError::InvalidReminder(
                "Title cannot be empty".to_string(),
            ));
        }

        let data = NewReminder {
            title: title.to_string(),
            description: data
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            ..data
        };

        let id = self.next_id;
        self.next_id += 1;
        let reminder = data.into_reminder(id);
        self.reminders.insert(id, reminder.clone());
        if reminder.frequency.is_recurring() {
            self.fired_through.insert(id, now);
        }

        let persisted = self.persist();
        Ok(Saved {
            value: reminder,
            persisted,
        })
    }

    /// All reminders, ordered by id.
    pub fn list(&self) -> Vec<Reminder> {
        self.reminders.values().cloned().collect()
    }

    pub fn get(&self, id: ReminderId) -> Result<&Reminder> {
        self.reminders.get(&id).ok_or(RemindzError::NotFound(id))
    }

    /// The instant a recurring job should be armed after: the later of the
    /// reminder's checkpoint and the minute before its due date, so the due
    /// date itself is the first occurrence.
    pub fn armed_since(&self, reminder: &Reminder) -> DateTime<Utc> {
        let floor = reminder.due_date - Duration::minutes(1);
        self.fired_through
            .get(&reminder.id)
            .map_or(floor, |at| (*at).max(floor))
    }

    /// Remember that occurrences of `id` up to `at` are handled.
    pub fn record_fired(&mut self, id: ReminderId, at: DateTime<Utc>) -> Result<Saved<()>> {
        if !self.reminders.contains_key(&id) {
            return Err(RemindzError::NotFound(id));
        }
        let entry = self.fired_through.entry(id).or_insert(at);
        *entry = (*entry).max(at);

        let persisted = self.persist();
        Ok(Saved {
            value: (),
            persisted,
        })
    }

    pub fn complete(&mut self, id: ReminderId) -> Result<Saved<Reminder>> {
        let reminder = self
            .reminders
            .get_mut(&id)
            .ok_or(RemindzError::NotFound(id))?;
        reminder.completed = true;
        let updated = reminder.clone();
        self.fired_through.remove(&id);

        let persisted = self.persist();
        Ok(Saved {
            value: updated,
            persisted,
        })
    }

    pub fn delete(&mut self, id: ReminderId) -> Result<Saved<Reminder>> {
        let removed = self
            .reminders
            .remove(&id)
            .ok_or(RemindzError::NotFound(id))?;
        self.fired_through.remove(&id);

        let persisted = self.persist();
        Ok(Saved {
            value: removed,
            persisted,
        })
    }

    /// Write the whole collection, the id high-water mark and checkpoints.
    fn persist(&mut self) -> bool {
        match self.write_all() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "failed to persist reminders");
                false
            }
        }
    }

    fn write_all(&mut self) -> Result<()> {
        let all: Vec<&Reminder> = self.reminders.values().collect();
        let data = serde_json::to_string_pretty(&all).map_err(RemindzError::Serialization)?;
        let fired =
            serde_json::to_string_pretty(&self.fired_through).map_err(RemindzError::Serialization)?;
        self.store.write_slot(REMINDERS_SLOT, &data)?;
        self.synced = Some(data);
        self.store
            .write_slot(NEXT_ID_SLOT, &self.next_id.to_string())?;
        self.store.write_slot(FIRED_SLOT, &fired)?;
        Ok(())
    }
}

fn parse_reminders(raw: Option<&str>) -> Result<Vec<Reminder>> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => {
            serde_json::from_str(raw).map_err(RemindzError::Serialization)
        }
        _ => Ok(Vec::new()),
    }
}
