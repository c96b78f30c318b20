//! # Storage Layer
//!
//! Persistence for remindz is a key-value store of named **slots**. Each slot
//! holds one serialized value and is always read and written whole.
//!
//! ## Slots
//!
//! - `reminders`: the JSON array of every reminder
//! - `reminders.next_id`: the id high-water mark, so ids are never reissued
//!   after the highest one is deleted
//! - `reminders.fired_through`: per recurring reminder, the instant up to
//!   which its occurrences have been handled
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: one `<slot>.json` file per slot in the data directory
//! - [`memory::InMemoryStore`]: no persistence, used by tests
//!
//! The store knows nothing about reminders; [`crate::reminders::ReminderBook`]
//! owns the (de)serialization of the slot contents.

use crate::error::Result;

pub mod fs;
pub mod memory;

pub const REMINDERS_SLOT: &str = "reminders";
pub const NEXT_ID_SLOT: &str = "reminders.next_id";
pub const FIRED_SLOT: &str = "reminders.fired_through";

/// Abstract interface for slot storage.
pub trait DataStore {
    /// Read the raw value of a slot. `Ok(None)` when the slot was never written.
    fn read_slot(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite a slot with a new value.
    fn write_slot(&mut self, key: &str, value: &str) -> Result<()>;
}
