//! Async services shared by every front-end

mod database;
mod repository;

pub use database::DatabaseService;
pub use repository::EntityRepository;
