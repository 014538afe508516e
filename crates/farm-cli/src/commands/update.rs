use std::path::Path;

use farm_core::services::EntityRepository;
use farm_core::Entity;
use serde_json::Value;

use crate::cli::RecordValues;
use crate::commands::common::{collect_values, normalize_record_id, open_service};
use crate::error::CliError;

pub async fn run_update<E: Entity>(
    id: &str,
    values: &RecordValues,
    db_path: &Path,
) -> Result<(), CliError> {
    let id = normalize_record_id(id)?;
    let patch = serde_json::from_value::<E::Patch>(Value::Object(collect_values(values)?))?;

    let db = open_service(db_path)?;
    let record = EntityRepository::<E>::new(db).update(&id, &patch).await?;

    println!("{}", record.id());
    Ok(())
}
