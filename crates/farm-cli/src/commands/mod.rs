pub mod add;
pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod list;
pub mod queue;
pub mod show;
pub mod status;
pub mod sync;
pub mod update;
pub mod watch;

/// Evaluate `$body` with `$entity` bound to the model type for `$kind`.
macro_rules! for_entity {
    ($kind:expr, $entity:ident => $body:expr) => {
        match $kind {
            $crate::cli::EntityKind::Field => {
                type $entity = farm_core::models::Field;
                $body
            }
            $crate::cli::EntityKind::Expense => {
                type $entity = farm_core::models::Expense;
                $body
            }
            $crate::cli::EntityKind::Task => {
                type $entity = farm_core::models::Task;
                $body
            }
            $crate::cli::EntityKind::Income => {
                type $entity = farm_core::models::Income;
                $body
            }
            $crate::cli::EntityKind::InventoryItem => {
                type $entity = farm_core::models::InventoryItem;
                $body
            }
            $crate::cli::EntityKind::StorageBin => {
                type $entity = farm_core::models::StorageBin;
                $body
            }
        }
    };
}

pub(crate) use for_entity;
