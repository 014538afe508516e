use std::path::Path;

use farm_core::services::EntityRepository;
use farm_core::Entity;

use crate::commands::common::{normalize_record_id, open_service};
use crate::error::CliError;

pub async fn run_delete<E: Entity>(id: &str, db_path: &Path) -> Result<(), CliError> {
    let id = normalize_record_id(id)?;
    let db = open_service(db_path)?;

    EntityRepository::<E>::new(db).remove(&id).await?;
    println!("{id}");
    Ok(())
}
