//! Durable chat history.
//!
//! The transcript is mirrored to a single key in a sqlite key-value table.
//! The in-memory store is the source of truth: storage is a best-effort
//! mirror, so every failure here is logged and degraded rather than
//! propagated. Last write wins; there is no versioning and no merging
//! (single writer, one device, one process).

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use crate::store::Message;

const HISTORY_KEY: &str = "chat_messages";

pub struct HistoryStore {
    conn: Mutex<Connection>,
}

impl HistoryStore {
    /// Open (or create) the history database at the default location.
    pub fn open_default() -> Result<Self> {
        let data_dir = dirs::data_dir().context("could not determine data directory")?;
        Self::open(data_dir.join("tagarela").join("history.db"))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Load the persisted transcript. Any failure, including an
    /// undecodable value, is treated as "no history": a broken store must
    /// never take the chat down.
    pub fn load(&self) -> Option<Vec<Message>> {
        let raw = match self.read_raw() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "failed to read chat history");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(messages) => Some(messages),
            Err(err) => {
                warn!(error = %err, "discarding undecodable chat history");
                None
            }
        }
    }

    /// Persist the full transcript under the history key.
    pub fn save(&self, messages: &[Message]) -> Result<()> {
        let raw = serde_json::to_string(messages)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![HISTORY_KEY, raw],
        )?;
        Ok(())
    }

    /// Remove the persisted transcript.
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM kv WHERE key = ?1", params![HISTORY_KEY])?;
        Ok(())
    }

    fn read_raw(&self) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let value = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![HISTORY_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{reduce, ChatAction, ChatState};

    fn open_temp() -> (tempfile::TempDir, HistoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("history.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn load_returns_none_when_nothing_was_saved() {
        let (_dir, store) = open_temp();
        assert!(store.load().is_none());
    }

    #[test]
    fn save_then_load_round_trips_texts_flags_and_order() {
        let (_dir, store) = open_temp();
        let messages = vec![
            Message::new("oi", false),
            Message::new("Olá! Como posso ajudá-lo hoje? 😊", true),
            Message::new("valeu", false),
        ];

        store.save(&messages).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.len(), messages.len());
        for (saved, loaded) in messages.iter().zip(&loaded) {
            assert_eq!(saved.id, loaded.id);
            assert_eq!(saved.text, loaded.text);
            assert_eq!(saved.is_bot, loaded.is_bot);
            assert_eq!(saved.timestamp, loaded.timestamp);
        }

        // Hydrating through the reducer marks everything as not-new.
        let mut state = ChatState::default();
        reduce(&mut state, ChatAction::Load(loaded));
        assert!(state.messages.iter().all(|m| !m.is_new));
    }

    #[test]
    fn save_overwrites_the_previous_snapshot() {
        let (_dir, store) = open_temp();
        store.save(&[Message::new("primeira", false)]).unwrap();
        store
            .save(&[Message::new("primeira", false), Message::new("segunda", true)])
            .unwrap();

        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn clear_removes_the_persisted_copy() {
        let (_dir, store) = open_temp();
        store.save(&[Message::new("oi", false)]).unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
        // Clearing twice is harmless.
        store.clear().unwrap();
    }

    #[test]
    fn undecodable_history_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");
        let store = HistoryStore::open(&path).unwrap();

        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)",
                params![HISTORY_KEY, "not json"],
            )
            .unwrap();
        }

        assert!(store.load().is_none());
    }

    #[test]
    fn messages_missing_the_is_new_field_still_load() {
        let (_dir, store) = open_temp();
        let legacy = r#"[{"id":"1700000000000abc","text":"oi","is_bot":false,"timestamp":"2024-01-01T12:00:00Z"}]"#;
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)",
                params![HISTORY_KEY, legacy],
            )
            .unwrap();
        }

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(!loaded[0].is_new);
    }
}
