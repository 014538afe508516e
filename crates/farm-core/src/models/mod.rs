//! Data models for Farmstead

mod entity;
mod expense;
mod field;
mod income;
mod inventory;
mod operation;
mod storage_bin;
mod task;

pub use entity::{Entity, EntityId, EntityType};
pub use expense::{Expense, ExpenseDraft, ExpensePatch};
pub use field::{Field, FieldDraft, FieldPatch};
pub use income::{Income, IncomeDraft, IncomePatch};
pub use inventory::{InventoryItem, InventoryItemDraft, InventoryItemPatch};
pub use operation::{NewOperation, Operation, OperationQueueItem};
pub use storage_bin::{StorageBin, StorageBinDraft, StorageBinPatch};
pub use task::{Task, TaskDraft, TaskPatch, TaskPriority, TaskStatus};
