//! Field model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{
    clearable, require_quantity, require_text, timestamp_key, Entity, EntityId, EntityType,
};
use crate::error::Result;

/// A parcel of land under cultivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: EntityId,
    pub name: String,
    /// Surface area, expressed in `area_unit`
    pub area: f64,
    pub area_unit: String,
    pub crop_type: Option<String>,
    pub soil_type: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldDraft {
    pub name: String,
    pub area: f64,
    #[serde(default = "default_area_unit")]
    pub area_unit: String,
    #[serde(default)]
    pub crop_type: Option<String>,
    #[serde(default)]
    pub soil_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct FieldPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub crop_type: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub soil_type: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub location: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub notes: Option<Option<String>>,
}

fn default_area_unit() -> String {
    "hectares".to_string()
}

impl Entity for Field {
    type Draft = FieldDraft;
    type Patch = FieldPatch;

    const ENTITY_TYPE: EntityType = EntityType::Field;
    const REMOTE_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("id", "id"),
        ("name", "name"),
        ("area", "area"),
        ("areaUnit", "area_unit"),
        ("cropType", "crop_type"),
        ("soilType", "soil_type"),
        ("location", "location"),
        ("notes", "notes"),
        ("createdAt", "created_at"),
    ];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn from_draft(id: EntityId, draft: FieldDraft, created_at: DateTime<Utc>) -> Result<Self> {
        let field = Self {
            id,
            name: draft.name.trim().to_string(),
            area: draft.area,
            area_unit: draft.area_unit,
            crop_type: draft.crop_type,
            soil_type: draft.soil_type,
            location: draft.location,
            notes: draft.notes,
            created_at,
        };
        field.validate()?;
        Ok(field)
    }

    fn validate(&self) -> Result<()> {
        require_text("field name", &self.name)?;
        require_text("area unit", &self.area_unit)?;
        require_quantity("field area", self.area)
    }

    fn sort_key(&self) -> String {
        timestamp_key(&self.created_at)
    }
}
