use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};

use crate::app::{BotError, Result};
use crate::store::SeenStore;

pub const DEFAULT_NAMESPACE: &str = "async-convertor_bot";

pub struct SqliteSeenStore {
    conn: Mutex<Connection>,
    namespace: String,
}

impl SqliteSeenStore {
    pub fn new<P: AsRef<Path>>(path: P, namespace: &str, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        let store = Self {
            conn: Mutex::new(conn),
            namespace: namespace.to_string(),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
            namespace: DEFAULT_NAMESPACE.to_string(),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| BotError::Other(format!("Migration failed: {}", e)))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            BotError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    /// Namespaced key an item id is stored under
    pub fn key(&self, item_id: &str) -> String {
        format!("{}-{}", self.namespace, item_id)
    }

    /// When the marker for `item_id` was written, if it exists
    pub fn seen_at(&self, item_id: &str) -> Result<Option<DateTime<Utc>>> {
        let conn = self.lock()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT seen_at FROM seen WHERE key = ?1",
                params![self.key(item_id)],
                |row| row.get(0),
            )
            .optional()?;

        Ok(raw.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        }))
    }
}

impl SeenStore for SqliteSeenStore {
    fn exists(&self, item_id: &str) -> Result<bool> {
        let conn = self.lock()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM seen WHERE key = ?1",
            params![self.key(item_id)],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    fn mark_seen(&self, item_id: &str) -> Result<bool> {
        let conn = self.lock()?;

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO seen (key, seen_at) VALUES (?1, ?2)",
            params![self.key(item_id), Utc::now().to_rfc3339()],
        )?;

        Ok(inserted == 1)
    }
}
