//! Income model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{
    clearable, require_quantity, require_text, timestamp_key, Entity, EntityId, EntityType,
};
use crate::error::Result;

/// Money received, typically from a harvest sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub id: EntityId,
    pub field_id: Option<EntityId>,
    pub source: String,
    pub description: Option<String>,
    pub amount: f64,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IncomeDraft {
    #[serde(default)]
    pub field_id: Option<EntityId>,
    pub source: String,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct IncomePatch {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub field_id: Option<Option<EntityId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl Entity for Income {
    type Draft = IncomeDraft;
    type Patch = IncomePatch;

    const ENTITY_TYPE: EntityType = EntityType::Income;
    const REMOTE_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("id", "id"),
        ("fieldId", "field_id"),
        ("source", "source"),
        ("description", "description"),
        ("amount", "amount"),
        ("date", "date"),
        ("createdAt", "created_at"),
    ];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn from_draft(id: EntityId, draft: IncomeDraft, created_at: DateTime<Utc>) -> Result<Self> {
        let income = Self {
            id,
            field_id: draft.field_id,
            source: draft.source.trim().to_string(),
            description: draft.description,
            amount: draft.amount,
            date: draft.date,
            created_at,
        };
        income.validate()?;
        Ok(income)
    }

    fn validate(&self) -> Result<()> {
        require_text("income source", &self.source)?;
        require_quantity("income amount", self.amount)
    }

    fn sort_key(&self) -> String {
        format!("{}|{}", self.date, timestamp_key(&self.created_at))
    }
}
