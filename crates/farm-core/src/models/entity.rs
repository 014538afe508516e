//! Entity kinds, identifiers, and the shared entity contract

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// The six kinds of record the local data layer manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Field,
    Expense,
    Task,
    Income,
    InventoryItem,
    StorageBin,
}

impl EntityType {
    /// Every entity kind, in declaration order
    pub const ALL: [Self; 6] = [
        Self::Field,
        Self::Expense,
        Self::Task,
        Self::Income,
        Self::InventoryItem,
        Self::StorageBin,
    ];

    /// Stable name used in the local store and operation queue
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::Expense => "expense",
            Self::Task => "task",
            Self::Income => "income",
            Self::InventoryItem => "inventory_item",
            Self::StorageBin => "storage_bin",
        }
    }

    /// Remote collection name: the pluralized entity name (`field` -> `fields`)
    pub fn collection(self) -> String {
        format!("{}s", self.as_str())
    }

    /// Local -> remote field name pairs for this entity kind
    pub const fn remote_fields(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Field => super::Field::REMOTE_FIELDS,
            Self::Expense => super::Expense::REMOTE_FIELDS,
            Self::Task => super::Task::REMOTE_FIELDS,
            Self::Income => super::Income::REMOTE_FIELDS,
            Self::InventoryItem => super::InventoryItem::REMOTE_FIELDS,
            Self::StorageBin => super::StorageBin::REMOTE_FIELDS,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| Error::InvalidInput(format!("unknown entity type '{s}'")))
    }
}

/// Locally generated record identifier.
///
/// New ids are UUID v7 strings: a millisecond timestamp followed by random
/// bits, so devices can mint ids offline without coordinating. Ids read back
/// from storage are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Mint a new time-ordered id
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl FromStr for EntityId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("entity id cannot be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// Contract shared by every domain record stored through a repository.
///
/// Records serialize with camelCase keys locally. `REMOTE_FIELDS` maps each
/// of those keys to the remote column name and must list every key the
/// record serializes.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The record without its id and creation time, as supplied by callers
    type Draft: Serialize + DeserializeOwned + Send + 'static;
    /// Partial update: every mutable field optional
    type Patch: Serialize + DeserializeOwned + Send + Sync + 'static;

    const ENTITY_TYPE: EntityType;
    const REMOTE_FIELDS: &'static [(&'static str, &'static str)];

    fn id(&self) -> &EntityId;

    /// Build a validated record from a draft
    fn from_draft(id: EntityId, draft: Self::Draft, created_at: DateTime<Utc>) -> Result<Self>;

    /// Validate a merged record before it is written back
    fn validate(&self) -> Result<()>;

    /// Key for the natural newest-first ordering; compared lexicographically
    fn sort_key(&self) -> String;
}

/// Fixed-width timestamp rendering that sorts lexicographically
pub(crate) fn timestamp_key(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::InvalidInput(format!("{field} cannot be empty")))
    } else {
        Ok(())
    }
}

pub(crate) fn require_quantity(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "{field} must be a non-negative number"
        )))
    }
}

pub(crate) fn require_optional_quantity(field: &str, value: Option<f64>) -> Result<()> {
    value.map_or(Ok(()), |value| require_quantity(field, value))
}

/// Patch field that can be cleared: a present `null` reads as `Some(None)`.
/// Absent keys fall back to the patch's `Default`.
pub(crate) fn clearable<'de, D, T>(
    deserializer: D,
) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_unique() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn entity_ids_sort_by_creation_time() {
        let first = EntityId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = EntityId::new();
        assert!(first < second);
    }

    #[test]
    fn entity_id_parse_rejects_blank() {
        assert!(" ".parse::<EntityId>().is_err());
        assert_eq!("abc".parse::<EntityId>().unwrap().as_str(), "abc");
    }

    #[test]
    fn entity_type_round_trips_through_name() {
        for kind in EntityType::ALL {
            assert_eq!(kind.as_str().parse::<EntityType>().unwrap(), kind);
        }
        assert!("tractor".parse::<EntityType>().is_err());
    }

    #[test]
    fn collection_is_pluralized_type() {
        assert_eq!(EntityType::Field.collection(), "fields");
        assert_eq!(EntityType::Income.collection(), "incomes");
        assert_eq!(EntityType::InventoryItem.collection(), "inventory_items");
        assert_eq!(EntityType::StorageBin.collection(), "storage_bins");
    }

    #[test]
    fn entity_type_serializes_snake_case() {
        let json = serde_json::to_string(&EntityType::InventoryItem).unwrap();
        assert_eq!(json, "\"inventory_item\"");
    }

    #[test]
    fn timestamp_key_orders_lexicographically() {
        let earlier = DateTime::from_timestamp_millis(1_000).unwrap();
        let later = DateTime::from_timestamp_millis(10_000_000_000).unwrap();
        assert!(timestamp_key(&earlier) < timestamp_key(&later));
    }

    #[test]
    fn require_quantity_rejects_negative_and_nan() {
        assert!(require_quantity("area", 1.5).is_ok());
        assert!(require_quantity("area", -1.0).is_err());
        assert!(require_quantity("area", f64::NAN).is_err());
    }
}
