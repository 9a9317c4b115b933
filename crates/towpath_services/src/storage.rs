//! Local persistent store for the session token and theme flag
//!
//! The browser build keeps these two values in localStorage; here they live
//! in one small JSON file. Writes go straight to disk, the values change a
//! handful of times per session.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use towpath_core::Theme;

use crate::ServicesError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoreState {
    token: Option<String>,
    dark_mode: bool,
}

#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl LocalStore {
    /// Open the store, reading existing state if the file is present.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ServicesError> {
        let path = path.into();
        let state = if path.exists() {
            serde_json::from_str(&std::fs::read_to_string(&path)?)?
        } else {
            StoreState::default()
        };
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    pub fn set_token(&self, token: Option<String>) -> Result<(), ServicesError> {
        self.lock().token = token;
        self.persist()
    }

    pub fn theme(&self) -> Theme {
        if self.lock().dark_mode {
            Theme::Night
        } else {
            Theme::Day
        }
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), ServicesError> {
        self.lock().dark_mode = theme.is_night();
        self.persist()
    }

    fn persist(&self) -> Result<(), ServicesError> {
        let json = serde_json::to_string_pretty(&*self.lock())?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("towpath-store-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn round_trips_token_and_theme() {
        let path = temp_path("roundtrip");
        let store = LocalStore::open(&path).unwrap();
        store.set_token(Some("tok-42".to_string())).unwrap();
        store.set_theme(Theme::Night).unwrap();

        let reopened = LocalStore::open(&path).unwrap();
        assert_eq!(reopened.token().as_deref(), Some("tok-42"));
        assert_eq!(reopened.theme(), Theme::Night);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_starts_empty() {
        let path = temp_path("fresh");
        let _ = std::fs::remove_file(&path);
        let store = LocalStore::open(&path).unwrap();
        assert_eq!(store.token(), None);
        assert_eq!(store.theme(), Theme::Day);
    }

    #[test]
    fn clearing_the_token_persists() {
        let path = temp_path("clear");
        let store = LocalStore::open(&path).unwrap();
        store.set_token(Some("tok".to_string())).unwrap();
        store.set_token(None).unwrap();

        let reopened = LocalStore::open(&path).unwrap();
        assert_eq!(reopened.token(), None);

        let _ = std::fs::remove_file(&path);
    }
}
