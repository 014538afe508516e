//! Durable per-entity record storage

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{EntityId, EntityType};
use crate::util::unix_millis_now;

/// Keyed record storage, one logical table per entity kind.
///
/// Records are opaque JSON documents here; typing happens in the repository
/// layer. Failures are returned to the caller, never swallowed.
pub trait LocalStore {
    /// Fetch a record by id
    fn get(&self, entity_type: EntityType, id: &EntityId) -> Result<Option<Value>>;

    /// List every record of a kind, newest first by its sort key
    fn list(&self, entity_type: EntityType) -> Result<Vec<Value>>;

    /// Insert or replace a record
    fn put(&self, entity_type: EntityType, id: &EntityId, sort_key: &str, record: &Value)
        -> Result<()>;

    /// Delete a record, returning whether one existed
    fn delete(&self, entity_type: EntityType, id: &EntityId) -> Result<bool>;
}

/// `SQLite` implementation of `LocalStore`
pub struct SqliteLocalStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteLocalStore<'a> {
    /// Create a new store with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl LocalStore for SqliteLocalStore<'_> {
    fn get(&self, entity_type: EntityType, id: &EntityId) -> Result<Option<Value>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM records WHERE entity_type = ? AND id = ?",
                params![entity_type.as_str(), id.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|raw| serde_json::from_str::<Value>(&raw).map_err(Error::from))
            .transpose()
    }

    fn list(&self, entity_type: EntityType) -> Result<Vec<Value>> {
        let mut stmt = self.conn.prepare(
            "SELECT data
             FROM records
             WHERE entity_type = ?
             ORDER BY sort_key DESC, id DESC",
        )?;

        let rows = stmt
            .query_map(params![entity_type.as_str()], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.iter()
            .map(|raw| serde_json::from_str::<Value>(raw).map_err(Error::from))
            .collect()
    }

    fn put(
        &self,
        entity_type: EntityType,
        id: &EntityId,
        sort_key: &str,
        record: &Value,
    ) -> Result<()> {
        let data = serde_json::to_string(record)?;
        self.conn.execute(
            "INSERT INTO records (entity_type, id, data, sort_key, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (entity_type, id) DO UPDATE SET
                data = excluded.data,
                sort_key = excluded.sort_key,
                updated_at = excluded.updated_at",
            params![
                entity_type.as_str(),
                id.as_str(),
                data,
                sort_key,
                unix_millis_now()
            ],
        )?;
        Ok(())
    }

    fn delete(&self, entity_type: EntityType, id: &EntityId) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM records WHERE entity_type = ? AND id = ?",
            params![entity_type.as_str(), id.as_str()],
        )?;
        Ok(rows > 0)
    }
}
