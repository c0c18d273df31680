//! Player preference storage.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use matchup_core::{MemoryPreferences, PreferenceError, PreferenceStore, Preferences};

/// Preferences persisted as a small JSON document.
pub struct JsonFilePreferences {
    path: PathBuf,
    cached: Mutex<Option<Preferences>>,
}

impl JsonFilePreferences {
    /// Load `path` if it exists; a missing or unreadable file means defaults.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cached = std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| match serde_json::from_str::<Preferences>(&content) {
                Ok(prefs) => Some(prefs),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt preferences file");
                    None
                }
            });
        Self {
            path,
            cached: Mutex::new(cached),
        }
    }
}

impl PreferenceStore for JsonFilePreferences {
    fn load_muted(&self) -> Option<bool> {
        let cached = *self.cached.lock().ok()?;
        cached.map(|prefs| prefs.muted)
    }

    fn save_muted(&self, muted: bool) -> Result<(), PreferenceError> {
        let mut cached = self
            .cached
            .lock()
            .map_err(|e| PreferenceError(e.to_string()))?;
        let prefs = Preferences { muted };
        let content = serde_json::to_string(&prefs).map_err(|e| PreferenceError(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PreferenceError(e.to_string()))?;
        }
        std::fs::write(&self.path, content).map_err(|e| PreferenceError(e.to_string()))?;
        *cached = Some(prefs);
        Ok(())
    }
}

/// File-backed store when a path is configured, in-memory otherwise.
pub fn open_store(path: Option<PathBuf>) -> Arc<dyn PreferenceStore> {
    match path {
        Some(path) => Arc::new(JsonFilePreferences::open(path)),
        None => Arc::new(MemoryPreferences::new()),
    }
}
