//! Queued mutation model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::{EntityId, EntityType};
use crate::error::Error;

/// Kind of mutation waiting to be replayed remotely
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(Error::InvalidInput(format!("unknown operation '{other}'"))),
        }
    }
}

/// A mutation about to be appended to the queue
#[derive(Debug, Clone, PartialEq)]
pub struct NewOperation {
    pub operation: Operation,
    pub entity_type: EntityType,
    pub entity_id: EntityId,
    pub data: Option<Value>,
}

impl NewOperation {
    /// Create carrying the full record
    pub const fn create(entity_type: EntityType, entity_id: EntityId, record: Value) -> Self {
        Self {
            operation: Operation::Create,
            entity_type,
            entity_id,
            data: Some(record),
        }
    }

    /// Update carrying only the changed fields
    pub const fn update(entity_type: EntityType, entity_id: EntityId, changes: Value) -> Self {
        Self {
            operation: Operation::Update,
            entity_type,
            entity_id,
            data: Some(changes),
        }
    }

    pub const fn delete(entity_type: EntityType, entity_id: EntityId) -> Self {
        Self {
            operation: Operation::Delete,
            entity_type,
            entity_id,
            data: None,
        }
    }
}

/// A persisted queue entry. Immutable once written; removed after the remote
/// store acknowledges it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationQueueItem {
    pub id: i64,
    pub operation: Operation,
    pub entity_type: EntityType,
    pub entity_id: EntityId,
    pub data: Option<Value>,
    /// Insertion time (Unix ms), non-decreasing across the queue
    pub timestamp: i64,
    pub retry_count: u32,
}
