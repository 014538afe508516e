//! Append-only log of mutations waiting for remote replay

use rusqlite::{params, Connection, Row};
use serde_json::Value;

use crate::error::Result;
use crate::models::{NewOperation, OperationQueueItem};
use crate::util::unix_millis_now;

/// Ordered queue of pending operations.
///
/// Items are ordered by `(timestamp, id)`: timestamps never decrease across
/// appends and the autoincrement id breaks ties, so iteration order is
/// insertion order.
pub trait OperationQueue {
    /// Append an operation, assigning its id and timestamp
    fn enqueue(&self, operation: &NewOperation) -> Result<OperationQueueItem>;

    /// Snapshot of every queued item at call time, oldest first
    fn drain(&self) -> Result<Vec<OperationQueueItem>>;

    /// Remove a single item after it has been applied remotely
    fn remove(&self, id: i64) -> Result<()>;

    /// Number of items currently queued
    fn pending_count(&self) -> Result<usize>;
}

/// `SQLite` implementation of `OperationQueue`
pub struct SqliteOperationQueue<'a> {
    conn: &'a Connection,
}

/// Column values before domain parsing
type RawQueueRow = (i64, String, String, String, Option<String>, i64, i64);

impl<'a> SqliteOperationQueue<'a> {
    /// Create a new queue with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn read_row(row: &Row<'_>) -> rusqlite::Result<RawQueueRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
        ))
    }

    fn parse_row(raw: RawQueueRow) -> Result<OperationQueueItem> {
        let (id, operation, entity_type, entity_id, data, timestamp, retry_count) = raw;
        let data = data
            .map(|raw| serde_json::from_str::<Value>(&raw))
            .transpose()?;

        Ok(OperationQueueItem {
            id,
            operation: operation.parse()?,
            entity_type: entity_type.parse()?,
            entity_id: entity_id.into(),
            data,
            timestamp,
            retry_count: u32::try_from(retry_count).unwrap_or(u32::MAX),
        })
    }

    /// Next insertion time: wall clock, but never earlier than the newest item
    fn next_timestamp(&self) -> Result<i64> {
        let newest: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(timestamp), 0) FROM operation_queue",
            [],
            |row| row.get(0),
        )?;
        Ok(unix_millis_now().max(newest))
    }
}

impl OperationQueue for SqliteOperationQueue<'_> {
    fn enqueue(&self, operation: &NewOperation) -> Result<OperationQueueItem> {
        let timestamp = self.next_timestamp()?;
        let data = operation
            .data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            "INSERT INTO operation_queue (operation, entity_type, entity_id, data, timestamp, retry_count)
             VALUES (?, ?, ?, ?, ?, 0)",
            params![
                operation.operation.as_str(),
                operation.entity_type.as_str(),
                operation.entity_id.as_str(),
                data,
                timestamp
            ],
        )?;

        let item = OperationQueueItem {
            id: self.conn.last_insert_rowid(),
            operation: operation.operation,
            entity_type: operation.entity_type,
            entity_id: operation.entity_id.clone(),
            data: operation.data.clone(),
            timestamp,
            retry_count: 0,
        };
        tracing::debug!(
            "Queued {} {} {} as #{}",
            item.operation,
            item.entity_type,
            item.entity_id,
            item.id
        );
        Ok(item)
    }

    fn drain(&self) -> Result<Vec<OperationQueueItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, operation, entity_type, entity_id, data, timestamp, retry_count
             FROM operation_queue
             ORDER BY timestamp ASC, id ASC",
        )?;

        let rows = stmt
            .query_map([], Self::read_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(Self::parse_row).collect()
    }

    fn remove(&self, id: i64) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM operation_queue WHERE id = ?", params![id])?;
        if rows == 0 {
            tracing::debug!("Queue item #{} was already removed", id);
        }
        Ok(())
    }

    fn pending_count(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM operation_queue", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
