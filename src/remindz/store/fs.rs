use super::DataStore;
use crate::error::{RemindzError, Result};
use std::fs;
use std::path::{Path, PathBuf};

const SLOT_EXT: &str = ".json";

/// File-backed slots: `<root>/<slot>.json`.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}{}", key, SLOT_EXT))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(RemindzError::Io)?;
        }
        Ok(())
    }
}

impl DataStore for FileStore {
    fn read_slot(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(RemindzError::Io)?;
        Ok(Some(content))
    }

    fn write_slot(&mut self, key: &str, value: &str) -> Result<()> {
        self.ensure_dir()?;

        // Write then rename so a crash never leaves a half-written slot
        let path = self.slot_path(key);
        let tmp = self.root.join(format!(".{}{}.tmp", key, SLOT_EXT));
        fs::write(&tmp, value).map_err(RemindzError::Io)?;
        fs::rename(&tmp, &path).map_err(RemindzError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_slot_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        assert!(store.read_slot("reminders").unwrap().is_none());
    }

    #[test]
    fn writes_create_the_root_and_overwrite_whole_slot() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("data");
        let mut store = FileStore::new(root.clone());

        store.write_slot("reminders", "[1,2,3]").unwrap();
        store.write_slot("reminders", "[]").unwrap();

        assert!(root.join("reminders.json").exists());
        assert_eq!(store.read_slot("reminders").unwrap().as_deref(), Some("[]"));
        assert!(!root.join(".reminders.json.tmp").exists());
    }

    #[test]
    fn slots_are_independent_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());

        store.write_slot("reminders", "[]").unwrap();
        store.write_slot("reminders.next_id", "7").unwrap();

        assert_eq!(
            store.read_slot("reminders.next_id").unwrap().as_deref(),
            Some("7")
        );
        assert_eq!(store.slot_path("reminders.next_id"), dir.path().join("reminders.next_id.json"));
    }
}
