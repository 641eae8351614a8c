use crate::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Layout version written into `store_meta` by [`Storage::create`].
pub const SCHEMA_VERSION: u32 = 1;

/// A single-file string key/value store backed by SQLite.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Validate database structure
        let table_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type='table'
             AND name IN ('kv_store', 'store_meta')",
            [],
            |row| row.get(0),
        )?;

        if table_count != 2 {
            return Err(crate::BlockpadError::InvalidWorkspace(
                "Not a valid Blockpad database".to_string(),
            ));
        }

        let version: Option<String> = conn
            .query_row(
                "SELECT value FROM store_meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        match version.as_deref().map(str::parse::<u32>) {
            Some(Ok(v)) if v <= SCHEMA_VERSION => {}
            Some(Ok(v)) => {
                return Err(crate::BlockpadError::InvalidWorkspace(format!(
                    "Database schema version {v} is newer than supported version {SCHEMA_VERSION}"
                )));
            }
            _ => {
                return Err(crate::BlockpadError::InvalidWorkspace(
                    "Database has no readable schema version".to_string(),
                ));
            }
        }

        Ok(Self { conn })
    }

    /// Opens `path`, creating a fresh store if the file does not exist yet.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::open(path)
        } else {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            Self::create(path)
        }
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Writes `value` under `key`, replacing any previous value.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Returns `true` if a value was removed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
        Ok(removed > 0)
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn table_names(storage: &Storage) -> Vec<String> {
        storage
            .connection()
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_create_storage() {
        let temp = NamedTempFile::new().unwrap();
        let storage = Storage::create(temp.path()).unwrap();

        let tables = table_names(&storage);
        assert!(tables.contains(&"kv_store".to_string()));
        assert!(tables.contains(&"store_meta".to_string()));
    }

    #[test]
    fn test_open_existing_storage() {
        let temp = NamedTempFile::new().unwrap();
        {
            let storage = Storage::create(temp.path()).unwrap();
            storage.set("greeting", "hello").unwrap();
        }

        let storage = Storage::open(temp.path()).unwrap();
        assert_eq!(storage.get("greeting").unwrap().as_deref(), Some("hello"));
    }

    #[test]
    fn test_open_invalid_database() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "not a database").unwrap();

        let result = Storage::open(temp.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_open_foreign_sqlite_file() {
        let temp = NamedTempFile::new().unwrap();
        {
            let conn = Connection::open(temp.path()).unwrap();
            conn.execute("CREATE TABLE notes (id TEXT PRIMARY KEY)", []).unwrap();
        }

        let result = Storage::open(temp.path());
        assert!(matches!(result, Err(crate::BlockpadError::InvalidWorkspace(_))));
    }

    #[test]
    fn test_open_rejects_newer_schema_version() {
        let temp = NamedTempFile::new().unwrap();
        {
            let storage = Storage::create(temp.path()).unwrap();
            storage
                .connection()
                .execute(
                    "UPDATE store_meta SET value = ?1 WHERE key = 'schema_version'",
                    [(SCHEMA_VERSION + 1).to_string()],
                )
                .unwrap();
        }

        let result = Storage::open(temp.path());
        assert!(matches!(result, Err(crate::BlockpadError::InvalidWorkspace(_))));
    }

    #[test]
    fn test_open_rejects_missing_schema_version() {
        let temp = NamedTempFile::new().unwrap();
        {
            let storage = Storage::create(temp.path()).unwrap();
            storage
                .connection()
                .execute("DELETE FROM store_meta", [])
                .unwrap();
        }

        let result = Storage::open(temp.path());
        assert!(matches!(result, Err(crate::BlockpadError::InvalidWorkspace(_))));
    }

    #[test]
    fn test_create_records_schema_version() {
        let storage = Storage::in_memory().unwrap();
        let version: String = storage
            .connection()
            .query_row(
                "SELECT value FROM store_meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION.to_string());
    }

    #[test]
    fn test_open_or_create_makes_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("blockpad.db");
        {
            let storage = Storage::open_or_create(&path).unwrap();
            storage.set("a", "1").unwrap();
        }
        let storage = Storage::open_or_create(&path).unwrap();
        assert_eq!(storage.get("a").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_get_set_remove() {
        let storage = Storage::in_memory().unwrap();
        assert!(storage.get("missing").unwrap().is_none());

        storage.set("b", "1").unwrap();
        storage.set("a", "2").unwrap();
        storage.set("b", "3").unwrap();
        assert_eq!(storage.get("b").unwrap().as_deref(), Some("3"));
        assert_eq!(storage.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);

        assert!(storage.remove("b").unwrap());
        assert!(!storage.remove("b").unwrap());
        assert!(storage.get("b").unwrap().is_none());
    }
}
