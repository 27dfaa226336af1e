use super::{EventStore, StoreError};
use crate::event::{EventCategory, InputEvent};
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::{debug, info};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category TEXT NOT NULL,
    detail TEXT NOT NULL,
    x REAL,
    y REAL,
    timestamp TEXT NOT NULL
)";

/// SQLite-backed event store.
///
/// Opening is idempotent: the schema is created if absent, and opening
/// an existing database leaves prior rows untouched.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        info!("Opening event database at {}", path.display());
        let conn = Connection::open(path).map_err(|e| StoreError::Open(e.to_string()))?;
        Self::init(conn)
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Open(e.to_string()))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(SCHEMA, [])
            .map_err(|e| StoreError::Open(e.to_string()))?;
        debug!("Event table ready");
        Ok(Self { conn })
    }

    /// Row descriptions in insertion order, for ordering assertions.
    #[cfg(test)]
    pub fn details_in_order(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT detail FROM events ORDER BY id")
            .map_err(|e| StoreError::Query(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::Query(e.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Query(e.to_string()))
    }
}

impl EventStore for SqliteStore {
    fn insert(&mut self, event: &InputEvent) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO events (category, detail, x, y, timestamp) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    event.category.as_str(),
                    event.description,
                    event.x,
                    event.y,
                    event.timestamp.to_rfc3339(),
                ],
            )
            .map_err(|e| StoreError::Insert(e.to_string()))?;
        Ok(())
    }

    fn count(&self, category: Option<EventCategory>) -> Result<u64, StoreError> {
        let count: i64 = match category {
            Some(cat) => self
                .conn
                .query_row(
                    "SELECT COUNT(*) FROM events WHERE category = ?1",
                    params![cat.as_str()],
                    |row| row.get(0),
                )
                .map_err(|e| StoreError::Query(e.to_string()))?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))
                .map_err(|e| StoreError::Query(e.to_string()))?,
        };
        Ok(count as u64)
    }
}
