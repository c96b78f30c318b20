use super::DataStore;
use crate::error::{RemindzError, Result};
use std::collections::HashMap;

/// In-memory storage for testing and development.
/// Does NOT persist data.
#[derive(Default)]
pub struct InMemoryStore {
    slots: HashMap<String, String>,
    simulate_write_error: bool,
    writes: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, for exercising persistence error paths.
    pub fn set_simulate_write_error(&mut self, simulate: bool) {
        self.simulate_write_error = simulate;
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl DataStore for InMemoryStore {
    fn read_slot(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write_slot(&mut self, key: &str, value: &str) -> Result<()> {
        if self.simulate_write_error {
            return Err(RemindzError::Store(format!(
                "Simulated write failure for slot {}",
                key
            )));
        }
        self.slots.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{Frequency, Reminder};
    use crate::store::{NEXT_ID_SLOT, REMINDERS_SLOT};
    use chrono::{DateTime, Utc};

    /// Builds a store whose `reminders` slot already holds data, as if written
    /// by an earlier process.
    #[derive(Default)]
    pub struct StoreFixture {
        reminders: Vec<Reminder>,
        next_id: Option<u64>,
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_reminder(
            mut self,
            id: u64,
            title: &str,
            due_date: DateTime<Utc>,
            frequency: Frequency,
        ) -> Self {
            self.reminders.push(Reminder {
                id,
                title: title.to_string(),
                description: None,
                due_date,
                frequency,
                completed: false,
            });
            self
        }

        pub fn with_completed(mut self, id: u64, title: &str, due_date: DateTime<Utc>) -> Self {
            self.reminders.push(Reminder {
                id,
                title: title.to_string(),
                description: None,
                due_date,
                frequency: Frequency::Once,
                completed: true,
            });
            self
        }

        pub fn with_next_id(mut self, next_id: u64) -> Self {
            self.next_id = Some(next_id);
            self
        }

        pub fn build(self) -> InMemoryStore {
            let mut store = InMemoryStore::new();
            let data = serde_json::to_string(&self.reminders).unwrap();
            store.write_slot(REMINDERS_SLOT, &data).unwrap();
            if let Some(next_id) = self.next_id {
                store.write_slot(NEXT_ID_SLOT, &next_id.to_string()).unwrap();
            }
            store
        }
    }
}
