//! Database layer for Farmstead

mod connection;
mod migrations;
mod queue;
mod store;

pub use connection::Database;
pub use queue::{OperationQueue, SqliteOperationQueue};
pub use store::{LocalStore, SqliteLocalStore};
