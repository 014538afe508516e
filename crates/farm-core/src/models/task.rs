//! Task model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{clearable, require_text, timestamp_key, Entity, EntityId, EntityType};
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// A piece of scheduled farm work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: EntityId,
    pub field_id: Option<EntityId>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskDraft {
    #[serde(default)]
    pub field_id: Option<EntityId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub field_id: Option<Option<EntityId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl Entity for Task {
    type Draft = TaskDraft;
    type Patch = TaskPatch;

    const ENTITY_TYPE: EntityType = EntityType::Task;
    const REMOTE_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("id", "id"),
        ("fieldId", "field_id"),
        ("title", "title"),
        ("description", "description"),
        ("dueDate", "due_date"),
        ("priority", "priority"),
        ("status", "status"),
        ("createdAt", "created_at"),
    ];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn from_draft(id: EntityId, draft: TaskDraft, created_at: DateTime<Utc>) -> Result<Self> {
        let task = Self {
            id,
            field_id: draft.field_id,
            title: draft.title.trim().to_string(),
            description: draft.description,
            due_date: draft.due_date,
            priority: draft.priority,
            status: draft.status,
            created_at,
        };
        task.validate()?;
        Ok(task)
    }

    fn validate(&self) -> Result<()> {
        require_text("task title", &self.title)
    }

    fn sort_key(&self) -> String {
        format!("{}|{}", self.due_date, timestamp_key(&self.created_at))
    }
}
