//! Append-only quiz history.
//!
//! The whole history lives under one key as a JSON array, oldest first.
//! `append` is a read-modify-write of that array: two processes sharing a
//! data directory can lose each other's entries (last writer wins).

use tracing::{info, warn};

use crate::models::HistoryEntry;

use super::storage::{Storage, StorageError};

pub const HISTORY_KEY: &str = "mcqHistory";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    #[error("history entry {0} not found")]
    NotFound(usize),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct HistoryStore<S: Storage> {
    storage: S,
}

impl<S: Storage> HistoryStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// All entries, oldest first. A missing key reads as an empty history.
    pub fn list(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        let Some(raw) = self.storage.read(HISTORY_KEY)? else {
            return Ok(Vec::new());
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&raw).map_err(|e| {
            warn!(error = %e, "stored quiz history could not be parsed");
            StorageError::corrupt(HISTORY_KEY, e)
        })
    }

    pub fn get(&self, index: usize) -> Result<HistoryEntry, HistoryError> {
        self.list()?
            .into_iter()
            .nth(index)
            .ok_or(HistoryError::NotFound(index))
    }

    /// Load, push, write back. Corrupt history is left untouched.
    pub fn append(&self, entry: HistoryEntry) -> Result<usize, StorageError> {
        let mut entries = self.list()?;
        entries.push(entry);

        let raw = serde_json::to_string(&entries).map_err(|e| StorageError::io(HISTORY_KEY, e))?;
        self.storage.write(HISTORY_KEY, &raw)?;

        info!(entries = entries.len(), "appended quiz to history");
        Ok(entries.len())
    }

    /// Remove every entry. Irreversible.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(HISTORY_KEY)?;
        info!("cleared quiz history");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::storage::MemoryStorage;
    use crate::models::{QuestionSet, sample_question};

    fn entry(topic: &str) -> HistoryEntry {
        let set = QuestionSet::new(vec![sample_question(1, 0), sample_question(2, 1)], "summary").unwrap();
        HistoryEntry::new("2024-05-01T10:00:00Z", topic, "medium", &set)
    }

    #[test]
    fn test_append_then_list() {
        let store = HistoryStore::new(MemoryStorage::new());
        assert!(store.list().unwrap().is_empty());

        assert_eq!(store.append(entry("Cells")).unwrap(), 1);
        assert_eq!(store.append(entry("Algorithms")).unwrap(), 2);

        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].topic, "Cells");
        assert_eq!(entries.last(), Some(&entry("Algorithms")));
    }

    #[test]
    fn test_clear_empties_store() {
        let store = HistoryStore::new(MemoryStorage::new());
        store.append(entry("Cells")).unwrap();
        store.clear().unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_get_by_index() {
        let store = HistoryStore::new(MemoryStorage::new());
        store.append(entry("Cells")).unwrap();

        assert_eq!(store.get(0).unwrap().topic, "Cells");
        assert_eq!(store.get(1), Err(HistoryError::NotFound(1)));
    }

    #[test]
    fn test_corrupt_history_is_not_overwritten() {
        let storage = MemoryStorage::new();
        storage.write(HISTORY_KEY, "{not json").unwrap();
        let store = HistoryStore::new(storage.clone());

        assert!(matches!(store.list(), Err(StorageError::Corrupt { .. })));
        assert!(store.append(entry("Cells")).is_err());
        assert_eq!(storage.read(HISTORY_KEY).unwrap().as_deref(), Some("{not json"));
    }

    #[test]
    fn test_interleaved_writers_last_one_wins() {
        let storage = MemoryStorage::new();
        let first = HistoryStore::new(storage.clone());
        let second = HistoryStore::new(storage);

        first.append(entry("Cells")).unwrap();
        let snapshot = second.list().unwrap();
        first.append(entry("Algorithms")).unwrap();

        // A writer holding an older snapshot replaces the whole array.
        let mut stale = snapshot;
        stale.push(entry("Genetics"));
        second
            .storage
            .write(HISTORY_KEY, &serde_json::to_string(&stale).unwrap())
            .unwrap();

        let topics: Vec<String> = first.list().unwrap().into_iter().map(|e| e.topic).collect();
        assert_eq!(topics, vec!["Cells".to_string(), "Genetics".to_string()]);
    }
}
