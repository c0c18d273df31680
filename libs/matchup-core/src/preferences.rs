//! Player preferences kept outside the session (currently just mute).

use crate::error::PreferenceError;
use serde::{Deserialize, Serialize};

/// Key-value boundary for persisted player preferences.
pub trait PreferenceStore: Send + Sync {
    /// Stored mute flag, if any was ever written.
    fn load_muted(&self) -> Option<bool>;

    fn save_muted(&self, muted: bool) -> Result<(), PreferenceError>;
}

/// Snapshot of all preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub muted: bool,
}

impl Preferences {
    pub fn load(store: &dyn PreferenceStore) -> Self {
        Self {
            muted: store.load_muted().unwrap_or(false),
        }
    }
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    muted: std::sync::Mutex<Option<bool>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn load_muted(&self) -> Option<bool> {
        self.muted.lock().ok().and_then(|muted| *muted)
    }

    fn save_muted(&self, muted: bool) -> Result<(), PreferenceError> {
        let mut slot = self
            .muted
            .lock()
            .map_err(|e| PreferenceError(e.to_string()))?;
        *slot = Some(muted);
        Ok(())
    }
}
