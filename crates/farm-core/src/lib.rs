//! farm-core - Core library for Farmstead
//!
//! This crate contains the offline-first data layer shared by every Farmstead
//! front-end: entity models, the durable local store and operation queue,
//! per-entity repositories, and the engine that replays queued operations
//! against the remote store.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{Entity, EntityId, EntityType};
