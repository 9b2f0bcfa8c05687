use crate::dlog;
use crate::error::Result;
use crate::store::WorkoutStore;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;
use std::path::Path;

/// Key under which the serialized collection lives.
pub const WORKOUTS_KEY: &str = "workouts";

/// Local string key/value store, the shape of a browser's `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Key/value store in a single SQLite table.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened storage");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS local_storage (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO local_storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// Reads the persisted collection. Storage failures are logged and give an empty store.
pub fn load_workouts(storage: &dyn KeyValueStore) -> WorkoutStore {
    match storage.get(WORKOUTS_KEY) {
        Ok(blob) => WorkoutStore::deserialize(blob.as_deref()),
        Err(e) => {
            tracing::warn!(err = %e, "could not read persisted workouts; starting empty");
            WorkoutStore::new()
        }
    }
}

pub fn save_workouts(storage: &mut dyn KeyValueStore, store: &WorkoutStore) -> Result<()> {
    let blob = store.serialize()?;
    storage.set(WORKOUTS_KEY, &blob)?;
    dlog!("saved workouts count={} bytes={}", store.len(), blob.len());
    Ok(())
}

pub fn clear_workouts(storage: &mut dyn KeyValueStore) -> Result<()> {
    storage.remove(WORKOUTS_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::{Coordinates, Kind};

    struct BrokenStorage;

    impl KeyValueStore for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::Persistence("disk on fire".to_string()))
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Persistence("disk on fire".to_string()))
        }
        fn remove(&mut self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    fn populated() -> WorkoutStore {
        let mut s = WorkoutStore::new();
        s.create(Kind::Running, Coordinates::new(10.0, 20.0), 5.0, 25.0, 180.0)
            .unwrap();
        s.create(Kind::Cycling, Coordinates::new(0.0, 0.0), 20.0, 60.0, 150.0)
            .unwrap();
        s
    }

    #[test]
    fn sqlite_get_set_remove() {
        let mut kv = SqliteStorage::open_in_memory().unwrap();
        assert_eq!(kv.get("a").unwrap(), None);
        kv.set("a", "1").unwrap();
        kv.set("a", "2").unwrap();
        assert_eq!(kv.get("a").unwrap().as_deref(), Some("2"));
        kv.remove("a").unwrap();
        assert_eq!(kv.get("a").unwrap(), None);
        kv.remove("a").unwrap();
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut kv = SqliteStorage::open_in_memory().unwrap();
        let s = populated();
        save_workouts(&mut kv, &s).unwrap();
        assert_eq!(load_workouts(&kv), s);
    }

    #[test]
    fn missing_key_loads_empty() {
        let kv = MemoryStorage::new();
        assert!(load_workouts(&kv).is_empty());
    }

    #[test]
    fn garbage_value_loads_empty() {
        let mut kv = MemoryStorage::new();
        kv.set(WORKOUTS_KEY, "{{{").unwrap();
        assert!(load_workouts(&kv).is_empty());
    }

    #[test]
    fn unreadable_storage_loads_empty_but_failed_save_surfaces() {
        let mut kv = BrokenStorage;
        assert!(load_workouts(&kv).is_empty());
        assert!(matches!(
            save_workouts(&mut kv, &populated()),
            Err(Error::Persistence(_))
        ));
    }

    #[test]
    fn clear_removes_the_collection() {
        let mut kv = MemoryStorage::new();
        save_workouts(&mut kv, &populated()).unwrap();
        clear_workouts(&mut kv).unwrap();
        assert_eq!(kv.get(WORKOUTS_KEY).unwrap(), None);
    }
}
