//! Shared database service wrapper used across clients.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

use crate::db::{Database, OperationQueue, SqliteOperationQueue};
use crate::models::OperationQueueItem;
use crate::Result;

/// Thread-safe handle to the local database.
///
/// Repositories and the sync engine share one connection through this
/// service; each call holds the lock only for its own statements.
#[derive(Clone)]
pub struct DatabaseService {
    db: Arc<Mutex<Database>>,
    db_path: Option<PathBuf>,
}

impl DatabaseService {
    /// Open a database service at the given filesystem path.
    pub fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        let db = Database::open(&db_path)?;
        tracing::info!("Using local database at {}", db_path.display());
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: Some(db_path),
        })
    }

    /// Open an in-memory database service (primarily for tests).
    pub fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: None,
        })
    }

    /// Filesystem location of the database, if any.
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Run `f` against the connection while holding the database lock.
    pub async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send,
    {
        let db = self.db.lock().await;
        f(db.connection())
    }

    /// Snapshot of the operation queue, oldest first.
    pub async fn drain_queue(&self) -> Result<Vec<OperationQueueItem>> {
        self.with_connection(|conn| SqliteOperationQueue::new(conn).drain())
            .await
    }

    /// Remove an applied operation from the queue.
    pub async fn remove_operation(&self, id: i64) -> Result<()> {
        self.with_connection(|conn| SqliteOperationQueue::new(conn).remove(id))
            .await
    }

    /// Number of operations waiting to be synced.
    pub async fn pending_count(&self) -> Result<usize> {
        self.with_connection(|conn| SqliteOperationQueue::new(conn).pending_count())
            .await
    }
}
