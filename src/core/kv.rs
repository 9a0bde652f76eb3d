//! String key-value persistence shared by the conversation store and
//! settings.
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Error, Result, anyhow};
use rusqlite::{Connection, OptionalExtension, params};

use super::db;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error>;
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;
    fn remove(&self, key: &str) -> Result<(), Error>;
}

pub type SharedKv = Arc<dyn KeyValueStore + Send + Sync + 'static>;

/// Values live in the `kv` table of the app database.
pub struct SqliteKv {
    conn: Mutex<Connection>,
}

impl SqliteKv {
    pub fn open(db_path: &str) -> Result<Self, Error> {
        Ok(Self::new(db::connect(db_path)?))
    }

    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, Error> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("Database connection lock poisoned"))?;
        Ok(f(&conn)?)
    }
}

impl KeyValueStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        self.with_conn(|conn| {
            conn.query_row("SELECT value FROM kv WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO kv (key, value) VALUES (?1, ?2)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                               updated_at = CURRENT_TIMESTAMP
                "#,
                params![key, value],
            )
        })?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.with_conn(|conn| conn.execute("DELETE FROM kv WHERE key = ?", [key]))?;
        Ok(())
    }
}

/// Nothing is written to disk. Used by `chat --ephemeral` and tests.
#[derive(Default)]
pub struct MemoryKv {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.values
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.values
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_kv_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let kv = SqliteKv::open(path.to_str().unwrap()).unwrap();

        assert_eq!(kv.get("gemini_model").unwrap(), None);

        kv.set("gemini_model", "gemini-2.0-flash").unwrap();
        kv.set("gemini_model", "gemini-2.5-flash").unwrap();
        assert_eq!(
            kv.get("gemini_model").unwrap().as_deref(),
            Some("gemini-2.5-flash")
        );

        kv.remove("gemini_model").unwrap();
        assert_eq!(kv.get("gemini_model").unwrap(), None);
    }

    #[test]
    fn test_sqlite_kv_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let path = path.to_str().unwrap();

        SqliteKv::open(path).unwrap().set("system_prompt", "Be brief.").unwrap();

        let reopened = SqliteKv::open(path).unwrap();
        assert_eq!(
            reopened.get("system_prompt").unwrap().as_deref(),
            Some("Be brief.")
        );
    }

    #[test]
    fn test_memory_kv() {
        let kv = MemoryKv::new();
        kv.set("a", "1").unwrap();
        assert_eq!(kv.get("a").unwrap().as_deref(), Some("1"));
        kv.remove("a").unwrap();
        assert_eq!(kv.get("a").unwrap(), None);
    }
}
