//! Inventory item model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{
    clearable, require_optional_quantity, require_quantity, require_text, timestamp_key, Entity,
    EntityId, EntityType,
};
use crate::error::Result;

/// Stock of a consumable: seed, fertilizer, feed, fuel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: EntityId,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    /// Reorder threshold
    pub minimum_stock: Option<f64>,
    pub price_per_unit: Option<f64>,
    pub storage_bin_id: Option<EntityId>,
    pub created_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Whether stock has fallen to or below the reorder threshold
    #[must_use]
    pub fn is_low_stock(&self) -> bool {
        self.minimum_stock
            .is_some_and(|minimum| self.quantity <= minimum)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InventoryItemDraft {
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(default)]
    pub minimum_stock: Option<f64>,
    #[serde(default)]
    pub price_per_unit: Option<f64>,
    #[serde(default)]
    pub storage_bin_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct InventoryItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub minimum_stock: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub price_per_unit: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub storage_bin_id: Option<Option<EntityId>>,
}

impl Entity for InventoryItem {
    type Draft = InventoryItemDraft;
    type Patch = InventoryItemPatch;

    const ENTITY_TYPE: EntityType = EntityType::InventoryItem;
    const REMOTE_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("id", "id"),
        ("name", "name"),
        ("category", "category"),
        ("quantity", "quantity"),
        ("unit", "unit"),
        ("minimumStock", "minimum_stock"),
        ("pricePerUnit", "price_per_unit"),
        ("storageBinId", "storage_bin_id"),
        ("createdAt", "created_at"),
    ];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn from_draft(
        id: EntityId,
        draft: InventoryItemDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        let item = Self {
            id,
            name: draft.name.trim().to_string(),
            category: draft.category.trim().to_string(),
            quantity: draft.quantity,
            unit: draft.unit.trim().to_string(),
            minimum_stock: draft.minimum_stock,
            price_per_unit: draft.price_per_unit,
            storage_bin_id: draft.storage_bin_id,
            created_at,
        };
        item.validate()?;
        Ok(item)
    }

    fn validate(&self) -> Result<()> {
        require_text("item name", &self.name)?;
        require_text("item category", &self.category)?;
        require_text("item unit", &self.unit)?;
        require_quantity("item quantity", self.quantity)?;
        require_optional_quantity("minimum stock", self.minimum_stock)?;
        require_optional_quantity("price per unit", self.price_per_unit)
    }

    fn sort_key(&self) -> String {
        timestamp_key(&self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_stock_uses_minimum_threshold() {
        let draft = InventoryItemDraft {
            name: "Urea".to_string(),
            category: "fertilizer".to_string(),
            quantity: 5.0,
            unit: "bags".to_string(),
            minimum_stock: Some(10.0),
            price_per_unit: None,
            storage_bin_id: None,
        };
        let mut item = InventoryItem::from_draft(EntityId::new(), draft, Utc::now()).unwrap();
        assert!(item.is_low_stock());

        item.quantity = 11.0;
        assert!(!item.is_low_stock());

        item.minimum_stock = None;
        assert!(!item.is_low_stock());
    }
}
