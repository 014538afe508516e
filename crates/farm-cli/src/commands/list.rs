use std::path::Path;

use farm_core::services::EntityRepository;
use farm_core::Entity;

use crate::commands::common::{format_record_lines, open_service, RecordSummary};
use crate::error::CliError;

pub async fn run_list<E: Entity + RecordSummary>(
    limit: usize,
    as_json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let db = open_service(db_path)?;
    let mut records = EntityRepository::<E>::new(db).list_all().await?;
    records.truncate(limit);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if records.is_empty() {
        println!("No {} records", E::ENTITY_TYPE);
    } else {
        for line in format_record_lines(&records) {
            println!("{line}");
        }
    }

    Ok(())
}
