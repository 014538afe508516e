//! Per-entity CRUD façade keeping the local store and operation queue in step

use std::marker::PhantomData;

use serde_json::{Map, Value};

use crate::db::{LocalStore, OperationQueue, SqliteLocalStore, SqliteOperationQueue};
use crate::error::{Error, Result};
use crate::models::{Entity, EntityId, NewOperation};
use crate::services::DatabaseService;

/// Repository for one entity kind.
///
/// Every mutation writes the local store first and then appends exactly one
/// queue item, both before the call returns. If the append fails after the
/// write, the local record stays authoritative and the error is returned.
pub struct EntityRepository<E: Entity> {
    db: DatabaseService,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for EntityRepository<E> {
    fn clone(&self) -> Self {
        Self::new(self.db.clone())
    }
}

impl<E: Entity> EntityRepository<E> {
    pub const fn new(db: DatabaseService) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    /// Create a record from a draft and queue its remote insert.
    pub async fn add(&self, draft: E::Draft) -> Result<E> {
        let entity = E::from_draft(EntityId::new(), draft, chrono::Utc::now())?;
        let record = serde_json::to_value(&entity)?;
        let sort_key = entity.sort_key();
        let id = entity.id().clone();

        self.db
            .with_connection(move |conn| {
                SqliteLocalStore::new(conn).put(E::ENTITY_TYPE, &id, &sort_key, &record)?;
                SqliteOperationQueue::new(conn).enqueue(&NewOperation::create(
                    E::ENTITY_TYPE,
                    id,
                    record,
                ))?;
                Ok(())
            })
            .await?;

        tracing::debug!("Added {} {}", E::ENTITY_TYPE, entity.id());
        Ok(entity)
    }

    /// Fetch a record by id.
    pub async fn get(&self, id: &EntityId) -> Result<Option<E>> {
        let record = self
            .db
            .with_connection(|conn| SqliteLocalStore::new(conn).get(E::ENTITY_TYPE, id))
            .await?;

        record
            .map(|record| serde_json::from_value::<E>(record).map_err(Error::from))
            .transpose()
    }

    /// Merge `patch` into the stored record and queue the changed fields only.
    pub async fn update(&self, id: &EntityId, patch: &E::Patch) -> Result<E> {
        let changes = match serde_json::to_value(patch)? {
            Value::Object(changes) if !changes.is_empty() => changes,
            Value::Object(_) => {
                return Err(Error::InvalidInput(format!(
                    "update for {} {id} has no fields",
                    E::ENTITY_TYPE
                )))
            }
            _ => {
                return Err(Error::InvalidInput(
                    "update payload must be an object".into(),
                ))
            }
        };

        let updated = self
            .db
            .with_connection(|conn| {
                let store = SqliteLocalStore::new(conn);
                let existing = store
                    .get(E::ENTITY_TYPE, id)?
                    .ok_or_else(|| not_found::<E>(id))?;

                let merged: E = serde_json::from_value(merge_fields(existing, &changes))?;
                merged.validate()?;

                store.put(
                    E::ENTITY_TYPE,
                    id,
                    &merged.sort_key(),
                    &serde_json::to_value(&merged)?,
                )?;
                SqliteOperationQueue::new(conn).enqueue(&NewOperation::update(
                    E::ENTITY_TYPE,
                    id.clone(),
                    Value::Object(changes),
                ))?;
                Ok(merged)
            })
            .await?;

        tracing::debug!("Updated {} {}", E::ENTITY_TYPE, id);
        Ok(updated)
    }

    /// Delete the local record immediately and queue the remote delete.
    pub async fn remove(&self, id: &EntityId) -> Result<()> {
        self.db
            .with_connection(|conn| {
                if !SqliteLocalStore::new(conn).delete(E::ENTITY_TYPE, id)? {
                    return Err(not_found::<E>(id));
                }
                SqliteOperationQueue::new(conn)
                    .enqueue(&NewOperation::delete(E::ENTITY_TYPE, id.clone()))?;
                Ok(())
            })
            .await?;

        tracing::debug!("Removed {} {}", E::ENTITY_TYPE, id);
        Ok(())
    }

    /// Every record of this kind, newest first by its natural date.
    pub async fn list_all(&self) -> Result<Vec<E>> {
        let records = self
            .db
            .with_connection(|conn| SqliteLocalStore::new(conn).list(E::ENTITY_TYPE))
            .await?;

        records
            .into_iter()
            .map(|record| serde_json::from_value::<E>(record).map_err(Error::from))
            .collect()
    }
}

fn not_found<E: Entity>(id: &EntityId) -> Error {
    Error::NotFound(format!("{} {id}", E::ENTITY_TYPE))
}

/// Shallow merge: top-level keys in `changes` replace those in `existing`
fn merge_fields(existing: Value, changes: &Map<String, Value>) -> Value {
    match existing {
        Value::Object(mut fields) => {
            for (key, value) in changes {
                fields.insert(key.clone(), value.clone());
            }
            Value::Object(fields)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        EntityType, Expense, ExpenseDraft, Field, FieldDraft, FieldPatch, Operation, Task,
        TaskDraft, TaskPatch, TaskStatus,
    };
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::sleep;

    fn setup() -> DatabaseService {
        DatabaseService::open_in_memory().unwrap()
    }

    fn field_draft(name: &str) -> FieldDraft {
        FieldDraft {
            name: name.to_string(),
            area: 3.0,
            area_unit: "hectares".to_string(),
            crop_type: Some("maize".to_string()),
            soil_type: None,
            location: None,
            notes: None,
        }
    }

    fn expense_draft(date: (i32, u32, u32)) -> ExpenseDraft {
        ExpenseDraft {
            field_id: None,
            category: "fuel".to_string(),
            description: "Diesel".to_string(),
            amount: 80.0,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            payment_method: None,
        }
    }

    #[tokio::test]
    async fn test_add_writes_record_and_queues_create() {
        let db = setup();
        let repo = EntityRepository::<Field>::new(db.clone());

        let field = repo.add(field_draft("North paddock")).await.unwrap();

        let fetched = repo.get(&field.id).await.unwrap().unwrap();
        assert_eq!(fetched, field);

        let queue = db.drain_queue().await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].operation, Operation::Create);
        assert_eq!(queue[0].entity_type, EntityType::Field);
        assert_eq!(queue[0].entity_id, field.id);
        assert_eq!(
            queue[0].data.as_ref(),
            Some(&serde_json::to_value(&field).unwrap())
        );
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_draft_without_side_effects() {
        let db = setup();
        let repo = EntityRepository::<Field>::new(db.clone());

        let result = repo.add(field_draft("   ")).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(repo.list_all().await.unwrap().is_empty());
        assert_eq!(db.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_merges_and_queues_partial_fields() {
        let db = setup();
        let repo = EntityRepository::<Field>::new(db.clone());
        let field = repo.add(field_draft("South")).await.unwrap();

        let patch = FieldPatch {
            crop_type: Some(Some("sorghum".to_string())),
            ..FieldPatch::default()
        };
        let updated = repo.update(&field.id, &patch).await.unwrap();

        assert_eq!(updated.crop_type.as_deref(), Some("sorghum"));
        assert_eq!(updated.name, "South");
        assert_eq!(updated.created_at, field.created_at);

        let queue = db.drain_queue().await.unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[1].operation, Operation::Update);
        assert_eq!(queue[1].data, Some(json!({ "cropType": "sorghum" })));
    }

    #[tokio::test]
    async fn test_update_null_clears_optional_field() {
        let db = setup();
        let repo = EntityRepository::<Field>::new(db.clone());
        let field = repo.add(field_draft("Creek")).await.unwrap();
        assert_eq!(field.crop_type.as_deref(), Some("maize"));

        let clear: FieldPatch = serde_json::from_value(json!({ "cropType": null })).unwrap();
        let updated = repo.update(&field.id, &clear).await.unwrap();

        assert_eq!(updated.crop_type, None);
        let stored = repo.get(&field.id).await.unwrap().unwrap();
        assert_eq!(stored.crop_type, None);

        let queue = db.drain_queue().await.unwrap();
        assert_eq!(queue[1].operation, Operation::Update);
        assert_eq!(queue[1].data, Some(json!({ "cropType": null })));
    }

    #[tokio::test]
    async fn test_update_missing_record_is_not_found() {
        let db = setup();
        let repo = EntityRepository::<Task>::new(db.clone());

        let patch = TaskPatch {
            status: Some(TaskStatus::Completed),
            ..TaskPatch::default()
        };
        let result = repo.update(&EntityId::from("missing"), &patch).await;

        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(db.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_rejects_empty_patch() {
        let db = setup();
        let repo = EntityRepository::<Field>::new(db.clone());
        let field = repo.add(field_draft("East")).await.unwrap();

        let result = repo.update(&field.id, &FieldPatch::default()).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(db.pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_validates_merged_record() {
        let db = setup();
        let repo = EntityRepository::<Field>::new(db.clone());
        let field = repo.add(field_draft("West")).await.unwrap();

        let patch = FieldPatch {
            area: Some(-4.0),
            ..FieldPatch::default()
        };
        assert!(repo.update(&field.id, &patch).await.is_err());

        let stored = repo.get(&field.id).await.unwrap().unwrap();
        assert!((stored.area - 3.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_remove_deletes_locally_and_queues_delete() {
        let db = setup();
        let repo = EntityRepository::<Task>::new(db.clone());
        let draft = TaskDraft {
            field_id: None,
            title: "Fix fence".to_string(),
            description: None,
            due_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            priority: crate::models::TaskPriority::High,
            status: TaskStatus::Pending,
        };
        let task = repo.add(draft).await.unwrap();

        repo.remove(&task.id).await.unwrap();

        assert!(repo.get(&task.id).await.unwrap().is_none());
        let queue = db.drain_queue().await.unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[1].operation, Operation::Delete);
        assert!(queue[1].data.is_none());
    }

    #[tokio::test]
    async fn test_remove_missing_record_is_not_found() {
        let db = setup();
        let repo = EntityRepository::<Task>::new(db.clone());

        let result = repo.remove(&EntityId::from("ghost")).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(db.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_all_uses_natural_order() {
        let db = setup();
        let repo = EntityRepository::<Expense>::new(db);

        repo.add(expense_draft((2026, 1, 10))).await.unwrap();
        repo.add(expense_draft((2026, 4, 2))).await.unwrap();
        repo.add(expense_draft((2026, 2, 20))).await.unwrap();

        let dates = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|expense| expense.date.to_string())
            .collect::<Vec<_>>();
        assert_eq!(dates, vec!["2026-04-02", "2026-02-20", "2026-01-10"]);
    }

    #[tokio::test]
    async fn test_list_all_breaks_date_ties_by_creation() {
        let db = setup();
        let repo = EntityRepository::<Field>::new(db);

        let first = repo.add(field_draft("First")).await.unwrap();
        sleep(Duration::from_millis(5)).await;
        let second = repo.add(field_draft("Second")).await.unwrap();

        let ids = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|field| field.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![second.id, first.id]);
    }
}
