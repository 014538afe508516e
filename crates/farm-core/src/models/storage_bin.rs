//! Storage bin model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{
    clearable, require_quantity, require_text, timestamp_key, Entity, EntityId, EntityType,
};
use crate::error::{Error, Result};

/// A silo, shed bay, or bin holding harvested produce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageBin {
    pub id: EntityId,
    pub name: String,
    pub location: Option<String>,
    pub capacity: f64,
    pub current_level: f64,
    pub unit: String,
    pub crop_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StorageBin {
    /// Fill level as a fraction of capacity, `None` for zero-capacity bins
    #[must_use]
    pub fn fill_ratio(&self) -> Option<f64> {
        (self.capacity > 0.0).then(|| self.current_level / self.capacity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StorageBinDraft {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    pub capacity: f64,
    #[serde(default)]
    pub current_level: f64,
    pub unit: String,
    #[serde(default)]
    pub crop_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct StorageBinPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub location: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub crop_type: Option<Option<String>>,
}

impl Entity for StorageBin {
    type Draft = StorageBinDraft;
    type Patch = StorageBinPatch;

    const ENTITY_TYPE: EntityType = EntityType::StorageBin;
    const REMOTE_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("id", "id"),
        ("name", "name"),
        ("location", "location"),
        ("capacity", "capacity"),
        ("currentLevel", "current_level"),
        ("unit", "unit"),
        ("cropType", "crop_type"),
        ("createdAt", "created_at"),
    ];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn from_draft(id: EntityId, draft: StorageBinDraft, created_at: DateTime<Utc>) -> Result<Self> {
        let bin = Self {
            id,
            name: draft.name.trim().to_string(),
            location: draft.location,
            capacity: draft.capacity,
            current_level: draft.current_level,
            unit: draft.unit.trim().to_string(),
            crop_type: draft.crop_type,
            created_at,
        };
        bin.validate()?;
        Ok(bin)
    }

    fn validate(&self) -> Result<()> {
        require_text("bin name", &self.name)?;
        require_text("bin unit", &self.unit)?;
        require_quantity("bin capacity", self.capacity)?;
        require_quantity("bin level", self.current_level)?;
        if self.current_level > self.capacity {
            return Err(Error::InvalidInput(format!(
                "bin level {} exceeds capacity {}",
                self.current_level, self.capacity
            )));
        }
        Ok(())
    }

    fn sort_key(&self) -> String {
        timestamp_key(&self.created_at)
    }
}
