//! Expense model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{
    clearable, require_quantity, require_text, timestamp_key, Entity, EntityId, EntityType,
};
use crate::error::Result;

/// Money spent on running the farm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: EntityId,
    /// Field the expense is attributed to, if any
    pub field_id: Option<EntityId>,
    pub category: String,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExpenseDraft {
    #[serde(default)]
    pub field_id: Option<EntityId>,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ExpensePatch {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub field_id: Option<Option<EntityId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub payment_method: Option<Option<String>>,
}

impl Entity for Expense {
    type Draft = ExpenseDraft;
    type Patch = ExpensePatch;

    const ENTITY_TYPE: EntityType = EntityType::Expense;
    const REMOTE_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("id", "id"),
        ("fieldId", "field_id"),
        ("category", "category"),
        ("description", "description"),
        ("amount", "amount"),
        ("date", "date"),
        ("paymentMethod", "payment_method"),
        ("createdAt", "created_at"),
    ];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn from_draft(id: EntityId, draft: ExpenseDraft, created_at: DateTime<Utc>) -> Result<Self> {
        let expense = Self {
            id,
            field_id: draft.field_id,
            category: draft.category.trim().to_string(),
            description: draft.description,
            amount: draft.amount,
            date: draft.date,
            payment_method: draft.payment_method,
            created_at,
        };
        expense.validate()?;
        Ok(expense)
    }

    fn validate(&self) -> Result<()> {
        require_text("expense category", &self.category)?;
        require_quantity("expense amount", self.amount)
    }

    fn sort_key(&self) -> String {
        format!("{}|{}", self.date, timestamp_key(&self.created_at))
    }
}
