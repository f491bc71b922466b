mod history;
mod preferences;
mod storage;

pub use history::{HISTORY_KEY, HistoryError, HistoryStore};
pub use preferences::{Preferences, THEME_KEY};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};

#[cfg(test)]
pub(crate) use storage::scratch_dir;
