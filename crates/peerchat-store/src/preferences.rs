//! Durable client preferences (string key-value).
//!
//! Booleans are stored as the strings `"true"` / `"false"`. Missing or
//! unparsable values fall back to the product defaults: sound on, desktop
//! notifications off.

use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use peerchat_shared::constants::{
    DEFAULT_NOTIFICATIONS_ENABLED, DEFAULT_SOUND_ENABLED, PREF_NOTIFICATIONS_ENABLED,
    PREF_SOUND_ENABLED,
};

use crate::database::Database;
use crate::error::Result;

/// The notification toggles as one value, for the settings surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSnapshot {
    pub sound_enabled: bool,
    pub notifications_enabled: bool,
}

impl Default for PreferenceSnapshot {
    fn default() -> Self {
        Self {
            sound_enabled: DEFAULT_SOUND_ENABLED,
            notifications_enabled: DEFAULT_NOTIFICATIONS_ENABLED,
        }
    }
}

pub struct Preferences {
    db: Database,
}

impl Preferences {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .db
            .conn()
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db.conn().execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        Ok(match self.get(key)?.as_deref() {
            Some("true") => true,
            Some("false") => false,
            Some(other) => {
                tracing::warn!(key, value = %other, "Unparsable boolean preference, using default");
                default
            }
            None => default,
        })
    }

    pub fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set(key, if value { "true" } else { "false" })
    }

    pub fn sound_enabled(&self) -> Result<bool> {
        self.get_bool(PREF_SOUND_ENABLED, DEFAULT_SOUND_ENABLED)
    }

    pub fn set_sound_enabled(&self, enabled: bool) -> Result<()> {
        self.set_bool(PREF_SOUND_ENABLED, enabled)
    }

    pub fn notifications_enabled(&self) -> Result<bool> {
        self.get_bool(PREF_NOTIFICATIONS_ENABLED, DEFAULT_NOTIFICATIONS_ENABLED)
    }

    pub fn set_notifications_enabled(&self, enabled: bool) -> Result<()> {
        self.set_bool(PREF_NOTIFICATIONS_ENABLED, enabled)
    }

    pub fn snapshot(&self) -> Result<PreferenceSnapshot> {
        Ok(PreferenceSnapshot {
            sound_enabled: self.sound_enabled()?,
            notifications_enabled: self.notifications_enabled()?,
        })
    }

    pub fn apply(&self, snapshot: PreferenceSnapshot) -> Result<()> {
        self.set_sound_enabled(snapshot.sound_enabled)?;
        self.set_notifications_enabled(snapshot.notifications_enabled)
    }
}
