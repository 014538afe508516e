use std::path::Path;

use crate::commands::common::{format_queue_line, open_service};
use crate::error::CliError;

pub async fn run_queue(limit: usize, as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let db = open_service(db_path)?;
    let mut items = db.drain_queue().await?;
    let total = items.len();
    items.truncate(limit);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("Queue is empty");
        return Ok(());
    }
    for item in &items {
        println!("{}", format_queue_line(item));
    }
    if total > items.len() {
        println!("... {} more", total - items.len());
    }
    Ok(())
}
