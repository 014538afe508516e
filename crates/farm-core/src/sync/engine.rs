//! Replays the operation queue against the remote store

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::models::{Operation, OperationQueueItem};
use crate::services::DatabaseService;
use crate::Result;

use super::connectivity::Connectivity;
use super::keys::to_remote_payload;
use super::remote::{RemoteError, RemoteResult, RemoteStore};

/// Outcome of one sync pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub success: bool,
    pub synced_count: usize,
    pub error_count: usize,
}

impl SyncReport {
    /// A pass that did nothing (offline, or another pass was running).
    pub const fn skipped() -> Self {
        Self {
            success: false,
            synced_count: 0,
            error_count: 0,
        }
    }

    const fn finished(synced_count: usize, error_count: usize) -> Self {
        Self {
            success: error_count == 0,
            synced_count,
            error_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub pending_count: usize,
    pub is_syncing: bool,
}

/// Drains the queue in FIFO order. At most one pass runs at a time.
pub struct SyncEngine {
    db: DatabaseService,
    remote: Arc<dyn RemoteStore>,
    connectivity: Connectivity,
    in_flight: AtomicBool,
}

impl SyncEngine {
    pub fn new(db: DatabaseService, remote: Arc<dyn RemoteStore>, connectivity: Connectivity) -> Self {
        Self {
            db,
            remote,
            connectivity,
            in_flight: AtomicBool::new(false),
        }
    }

    pub const fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one sync pass.
    ///
    /// Returns a zero report immediately when a pass is already running or
    /// the device is offline. Items that fail remotely stay queued and are
    /// counted in `error_count`; the pass moves on to the next item. An
    /// error is returned only when the queue itself cannot be read or
    /// updated.
    pub async fn sync_to_remote(&self) -> Result<SyncReport> {
        if self.is_syncing() {
            tracing::debug!("Sync already in progress; skipping");
            return Ok(SyncReport::skipped());
        }
        if !self.connectivity.is_online() {
            tracing::debug!("Offline; skipping sync");
            return Ok(SyncReport::skipped());
        }
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("Sync already in progress; skipping");
            return Ok(SyncReport::skipped());
        };

        let items = self.db.drain_queue().await.inspect_err(|error| {
            tracing::error!("Sync aborted: could not read the operation queue: {error}");
        })?;
        if items.is_empty() {
            return Ok(SyncReport::finished(0, 0));
        }
        tracing::info!("Syncing {} queued operation(s)", items.len());

        let mut synced_count = 0;
        let mut error_count = 0;
        for item in items {
            match self.apply(&item).await {
                Ok(()) => {
                    self.db.remove_operation(item.id).await.inspect_err(|error| {
                        tracing::error!(
                            "Sync aborted: could not dequeue #{} after applying it: {error}",
                            item.id
                        );
                    })?;
                    synced_count += 1;
                }
                Err(error) => {
                    tracing::warn!(
                        "Failed to sync {} {} {} (queue #{}): {error}",
                        item.operation,
                        item.entity_type,
                        item.entity_id,
                        item.id
                    );
                    error_count += 1;
                }
            }
        }

        let report = SyncReport::finished(synced_count, error_count);
        if report.success {
            tracing::info!("Sync complete: {synced_count} operation(s) applied");
        } else {
            tracing::warn!(
                "Sync finished with {error_count} failure(s); {synced_count} operation(s) applied"
            );
        }
        Ok(report)
    }

    async fn apply(&self, item: &OperationQueueItem) -> RemoteResult<()> {
        let collection = item.entity_type.collection();
        let id = item.entity_id.as_str();

        match item.operation {
            Operation::Create => {
                let payload = to_remote_payload(item.entity_type, required_data(item)?);
                self.remote.insert(&collection, &payload).await
            }
            Operation::Update => {
                let payload = to_remote_payload(item.entity_type, required_data(item)?);
                self.remote.update(&collection, id, &payload).await
            }
            Operation::Delete => self.remote.delete(&collection, id).await,
        }
    }

    pub async fn sync_status(&self) -> Result<SyncStatus> {
        Ok(SyncStatus {
            pending_count: self.db.pending_count().await?,
            is_syncing: self.is_syncing(),
        })
    }
}

fn required_data(item: &OperationQueueItem) -> RemoteResult<&serde_json::Value> {
    item.data.as_ref().ok_or_else(|| {
        RemoteError::InvalidPayload(format!("{} queue #{} has no data", item.operation, item.id))
    })
}

/// Holds the in-flight flag for the duration of a pass, including early
/// returns and panics.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{OperationQueue, SqliteOperationQueue};
    use crate::models::{
        EntityId, EntityType, Field, FieldDraft, FieldPatch, InventoryItem, InventoryItemDraft,
        NewOperation,
    };
    use crate::services::EntityRepository;
    use crate::sync::testing::{MemoryRemoteStore, RemoteCall};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct Harness {
        db: DatabaseService,
        remote: Arc<MemoryRemoteStore>,
        engine: Arc<SyncEngine>,
    }

    fn harness_with(remote: MemoryRemoteStore, online: bool) -> Harness {
        let db = DatabaseService::open_in_memory().unwrap();
        let remote = Arc::new(remote);
        let engine = Arc::new(SyncEngine::new(
            db.clone(),
            remote.clone(),
            Connectivity::new(online),
        ));
        Harness { db, remote, engine }
    }

    fn harness() -> Harness {
        harness_with(MemoryRemoteStore::new(), true)
    }

    async fn enqueue(db: &DatabaseService, operation: NewOperation) -> OperationQueueItem {
        db.with_connection(move |conn| SqliteOperationQueue::new(conn).enqueue(&operation))
            .await
            .unwrap()
    }

    fn field_draft(name: &str) -> FieldDraft {
        FieldDraft {
            name: name.to_string(),
            area: 12.5,
            area_unit: "acres".to_string(),
            crop_type: Some("wheat".to_string()),
            soil_type: Some("loam".to_string()),
            location: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn empty_queue_reports_success() {
        let h = harness();
        let report = h.engine.sync_to_remote().await.unwrap();
        assert_eq!(
            report,
            SyncReport {
                success: true,
                synced_count: 0,
                error_count: 0
            }
        );
        assert!(h.remote.calls().is_empty());
    }

    #[tokio::test]
    async fn applies_operations_in_fifo_order_and_drains_queue() {
        let h = harness();
        enqueue(
            &h.db,
            NewOperation::create(EntityType::Field, EntityId::from("f-1"), json!({ "id": "f-1", "areaUnit": "acres" })),
        )
        .await;
        enqueue(
            &h.db,
            NewOperation::update(EntityType::Field, EntityId::from("f-1"), json!({ "cropType": "oats" })),
        )
        .await;
        enqueue(&h.db, NewOperation::delete(EntityType::Task, EntityId::from("t-1"))).await;

        let report = h.engine.sync_to_remote().await.unwrap();

        assert_eq!(report.synced_count, 3);
        assert_eq!(report.error_count, 0);
        assert!(report.success);
        assert_eq!(h.db.pending_count().await.unwrap(), 0);
        assert_eq!(
            h.remote.calls(),
            vec![
                RemoteCall::Insert {
                    collection: "fields".to_string(),
                    payload: json!({ "id": "f-1", "area_unit": "acres" }),
                },
                RemoteCall::Update {
                    collection: "fields".to_string(),
                    id: "f-1".to_string(),
                    payload: json!({ "crop_type": "oats" }),
                },
                RemoteCall::Delete {
                    collection: "tasks".to_string(),
                    id: "t-1".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn failed_item_stays_queued_and_pass_continues() {
        let remote = MemoryRemoteStore::new();
        remote.fail_for("e-2");
        let h = harness_with(remote, true);

        for id in ["e-1", "e-2", "e-3"] {
            enqueue(
                &h.db,
                NewOperation::create(EntityType::Expense, EntityId::from(id), json!({ "id": id })),
            )
            .await;
        }

        let report = h.engine.sync_to_remote().await.unwrap();
        assert_eq!(
            report,
            SyncReport {
                success: false,
                synced_count: 2,
                error_count: 1
            }
        );
        assert_eq!(h.remote.calls().len(), 3);

        let remaining = h.db.drain_queue().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].entity_id.as_str(), "e-2");
        assert_eq!(remaining[0].retry_count, 0);

        h.remote.heal("e-2");
        let retry = h.engine.sync_to_remote().await.unwrap();
        assert_eq!(retry.synced_count, 1);
        assert!(retry.success);
        assert_eq!(h.db.pending_count().await.unwrap(), 0);
        assert_eq!(h.remote.row_count("expenses"), 3);
    }

    #[tokio::test]
    async fn missing_payload_counts_as_item_failure() {
        let h = harness();
        enqueue(
            &h.db,
            NewOperation {
                data: None,
                ..NewOperation::create(EntityType::Income, EntityId::from("i-1"), json!({}))
            },
        )
        .await;

        let report = h.engine.sync_to_remote().await.unwrap();
        assert_eq!(report.error_count, 1);
        assert!(h.remote.calls().is_empty());
        assert_eq!(h.db.pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn offline_pass_is_a_no_op() {
        let h = harness_with(MemoryRemoteStore::new(), false);
        enqueue(&h.db, NewOperation::delete(EntityType::Field, EntityId::from("f-1"))).await;

        let report = h.engine.sync_to_remote().await.unwrap();

        assert_eq!(report, SyncReport::skipped());
        assert!(h.remote.calls().is_empty());
        assert_eq!(h.db.pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn concurrent_pass_is_a_no_op() {
        let (remote, entered, release) = MemoryRemoteStore::gated();
        let h = harness_with(remote, true);
        enqueue(&h.db, NewOperation::delete(EntityType::Field, EntityId::from("f-1"))).await;

        let engine = Arc::clone(&h.engine);
        let first = tokio::spawn(async move { engine.sync_to_remote().await });
        entered.notified().await;

        assert!(h.engine.is_syncing());
        let status = h.engine.sync_status().await.unwrap();
        assert_eq!(
            status,
            SyncStatus {
                pending_count: 1,
                is_syncing: true
            }
        );

        let second = h.engine.sync_to_remote().await.unwrap();
        assert_eq!(second, SyncReport::skipped());

        release.notify_one();
        let first = first.await.unwrap().unwrap();
        assert_eq!(first.synced_count, 1);
        assert!(!h.engine.is_syncing());
        assert_eq!(h.remote.calls().len(), 1);
    }

    #[tokio::test]
    async fn repository_changes_reach_remote_in_remote_layout() {
        let h = harness();
        let fields = EntityRepository::<Field>::new(h.db.clone());
        let inventory = EntityRepository::<InventoryItem>::new(h.db.clone());

        let field = fields.add(field_draft("Creek flat")).await.unwrap();
        fields
            .update(
                &field.id,
                &FieldPatch {
                    crop_type: Some(Some("barley".to_string())),
                    ..FieldPatch::default()
                },
            )
            .await
            .unwrap();
        let item = inventory
            .add(InventoryItemDraft {
                name: "Urea".to_string(),
                category: "fertilizer".to_string(),
                quantity: 40.0,
                unit: "kg".to_string(),
                minimum_stock: Some(10.0),
                price_per_unit: None,
                storage_bin_id: None,
            })
            .await
            .unwrap();

        let report = h.engine.sync_to_remote().await.unwrap();
        assert_eq!(report.synced_count, 3);

        let row = h.remote.row("fields", field.id.as_str()).unwrap();
        assert_eq!(row["crop_type"], json!("barley"));
        assert_eq!(row["area_unit"], json!("acres"));
        assert_eq!(row["soil_type"], json!("loam"));
        assert!(row.get("cropType").is_none());
        assert!(row.get("created_at").is_some());

        let item_row = h.remote.row("inventory_items", item.id.as_str()).unwrap();
        assert_eq!(item_row["minimum_stock"], json!(10.0));

        fields.remove(&field.id).await.unwrap();
        h.engine.sync_to_remote().await.unwrap();
        assert!(h.remote.row("fields", field.id.as_str()).is_none());
        assert_eq!(h.db.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn operations_enqueued_mid_pass_wait_for_next_pass() {
        let (remote, entered, release) = MemoryRemoteStore::gated();
        let h = harness_with(remote, true);
        enqueue(&h.db, NewOperation::delete(EntityType::Task, EntityId::from("t-1"))).await;

        let engine = Arc::clone(&h.engine);
        let pass = tokio::spawn(async move { engine.sync_to_remote().await });
        entered.notified().await;

        enqueue(&h.db, NewOperation::delete(EntityType::Task, EntityId::from("t-2"))).await;
        release.notify_one();

        let report = pass.await.unwrap().unwrap();
        assert_eq!(report.synced_count, 1);
        assert_eq!(h.db.pending_count().await.unwrap(), 1);
    }
}
