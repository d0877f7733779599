//! Preset repositories
//!
//! Custom presets are stored as one serialized collection per table under
//! the `filter-presets-{table}` key.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tablekit_core::{preset_storage_key, FilterPreset, PresetRepository, Result, TableError};

/// Repository kept in memory, used in tests and for throwaway sessions
#[derive(Default)]
pub struct InMemoryPresetRepository {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryPresetRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresetRepository for InMemoryPresetRepository {
    fn load(&self, table_name: &str) -> Result<Vec<FilterPreset>> {
        let entries = self.entries.lock();
        match entries.get(&preset_storage_key(table_name)) {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, table_name: &str, presets: &[FilterPreset]) -> Result<()> {
        let json = serde_json::to_string(presets)?;
        self.entries
            .lock()
            .insert(preset_storage_key(table_name), json);
        Ok(())
    }
}

fn storage_error(err: rusqlite::Error) -> TableError {
    TableError::Storage(err.to_string())
}

/// Handle for database connections - either owned or shared
enum ConnectionHandle {
    Owned(Connection),
    Shared(Arc<Mutex<Connection>>),
}

impl ConnectionHandle {
    fn with_conn<T, F: FnOnce(&Connection) -> rusqlite::Result<T>>(&self, f: F) -> Result<T> {
        match self {
            ConnectionHandle::Owned(conn) => f(conn).map_err(storage_error),
            ConnectionHandle::Shared(shared) => {
                let guard = shared.lock();
                f(&guard).map_err(storage_error)
            }
        }
    }
}

/// Key/value preset repository backed by SQLite
pub struct SqlitePresetRepository {
    db_path: PathBuf,
    /// Holds the connection for in-memory databases (where each open creates a new db)
    memory_conn: Option<Arc<Mutex<Connection>>>,
}

impl SqlitePresetRepository {
    /// Open or create the database at the given path
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TableError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let repository = Self {
            db_path,
            memory_conn: None,
        };
        repository.initialize_schema()?;
        Ok(repository)
    }

    /// Create an in-memory database for testing
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage_error)?;
        let repository = Self {
            db_path: PathBuf::from(":memory:"),
            memory_conn: Some(Arc::new(Mutex::new(conn))),
        };
        repository.initialize_schema()?;
        Ok(repository)
    }

    pub fn path(&self) -> &std::path::Path {
        &self.db_path
    }

    fn connect(&self) -> Result<ConnectionHandle> {
        if let Some(ref conn) = self.memory_conn {
            Ok(ConnectionHandle::Shared(conn.clone()))
        } else {
            let conn = Connection::open(&self.db_path).map_err(|e| {
                TableError::Storage(format!(
                    "Failed to open database at {}: {}",
                    self.db_path.display(),
                    e
                ))
            })?;
            Ok(ConnectionHandle::Owned(conn))
        }
    }

    fn initialize_schema(&self) -> Result<()> {
        let handle = self.connect()?;
        handle.with_conn(|conn| {
            conn.execute(
                "CREATE TABLE IF NOT EXISTS preset_store (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )",
                [],
            )?;
            Ok(())
        })
    }
}

impl PresetRepository for SqlitePresetRepository {
    fn load(&self, table_name: &str) -> Result<Vec<FilterPreset>> {
        let handle = self.connect()?;
        let key = preset_storage_key(table_name);
        let json: Option<String> = handle.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM preset_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })?;

        match json {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, table_name: &str, presets: &[FilterPreset]) -> Result<()> {
        let handle = self.connect()?;
        let key = preset_storage_key(table_name);
        let json = serde_json::to_string(presets)?;
        let now = Utc::now().to_rfc3339();

        handle.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO preset_store (key, value, updated_at)
                 VALUES (?1, ?2, ?3)",
                params![key, json, now],
            )?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tablekit_core::{FilterSet, FilterValue};

    fn preset(id: &str, name: &str) -> FilterPreset {
        let mut filters = FilterSet::new();
        filters.insert("status".into(), FilterValue::list(["open", "pending"]));
        FilterPreset {
            id: id.into(),
            name: name.into(),
            description: None,
            filters,
            created_at: Utc::now(),
            is_built_in: false,
        }
    }

    #[test]
    fn test_missing_key_loads_empty() {
        let repository = SqlitePresetRepository::in_memory().unwrap();
        assert!(repository.load("users").unwrap().is_empty());
    }

    #[test]
    fn test_save_replaces_collection() {
        let repository = SqlitePresetRepository::in_memory().unwrap();
        repository
            .save("users", &[preset("custom-1", "One"), preset("custom-2", "Two")])
            .unwrap();
        repository.save("users", &[preset("custom-2", "Two")]).unwrap();

        let loaded = repository.load("users").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "custom-2");
    }

    #[test]
    fn test_tables_are_isolated() {
        let repository = SqlitePresetRepository::in_memory().unwrap();
        repository.save("users", &[preset("custom-1", "One")]).unwrap();

        assert!(repository.load("orders").unwrap().is_empty());
        assert_eq!(repository.load("users").unwrap().len(), 1);
    }

    #[test]
    fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("presets.db");

        let saved = preset("custom-1", "One");
        SqlitePresetRepository::open(&path)
            .unwrap()
            .save("users", std::slice::from_ref(&saved))
            .unwrap();

        let reopened = SqlitePresetRepository::open(&path).unwrap();
        assert_eq!(reopened.load("users").unwrap(), vec![saved]);
    }

    #[test]
    fn test_corrupt_entry_is_a_decode_error() {
        let repository = InMemoryPresetRepository::new();
        repository
            .entries
            .lock()
            .insert(preset_storage_key("users"), "not json".into());

        assert!(matches!(
            repository.load("users"),
            Err(TableError::Decode(_))
        ));
    }
}
