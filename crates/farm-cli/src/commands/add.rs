use std::path::Path;

use farm_core::services::EntityRepository;
use farm_core::Entity;
use serde_json::Value;

use crate::cli::RecordValues;
use crate::commands::common::{collect_values, open_service};
use crate::error::CliError;

pub async fn run_add<E: Entity>(values: &RecordValues, db_path: &Path) -> Result<(), CliError> {
    let draft = serde_json::from_value::<E::Draft>(Value::Object(collect_values(values)?))?;

    let db = open_service(db_path)?;
    let record = EntityRepository::<E>::new(db).add(draft).await?;

    println!("{}", record.id());
    Ok(())
}
