use tracing::warn;

use crate::models::Theme;

use super::storage::{Storage, StorageError};

pub const THEME_KEY: &str = "theme";

/// User preferences that survive restarts.
pub struct Preferences<S: Storage> {
    storage: S,
}

impl<S: Storage> Preferences<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Stored theme, or dark when nothing usable is stored.
    pub fn theme(&self) -> Theme {
        match self.storage.read(THEME_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, value = %raw, "ignoring unreadable theme preference");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!(error = %e, "could not read theme preference");
                Theme::default()
            }
        }
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&theme).map_err(|e| StorageError::io(THEME_KEY, e))?;
        self.storage.write(THEME_KEY, &raw)
    }
}
