use std::path::Path;

use farm_core::services::EntityRepository;
use farm_core::Entity;

use crate::commands::common::{normalize_record_id, open_service};
use crate::error::CliError;

pub async fn run_show<E: Entity>(id: &str, db_path: &Path) -> Result<(), CliError> {
    let id = normalize_record_id(id)?;
    let db = open_service(db_path)?;

    let record = EntityRepository::<E>::new(db)
        .get(&id)
        .await?
        .ok_or_else(|| CliError::NotFound(format!("{} {id}", E::ENTITY_TYPE)))?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
