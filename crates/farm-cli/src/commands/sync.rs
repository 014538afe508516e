use std::path::Path;

use crate::commands::common::{
    connect_remote, format_sync_summary, load_config, open_service, require_remote,
};
use crate::error::CliError;

pub async fn run_sync(db_path: &Path, config_path: &Path) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let db = open_service(db_path)?;
    let setup = require_remote(connect_remote(db.clone(), &config)?)?;

    if !setup.refresh_connectivity().await {
        let pending = db.pending_count().await?;
        println!("Remote unreachable; {pending} change(s) stay queued");
        return Ok(());
    }

    let report = setup.engine.sync_to_remote().await?;
    let pending = db.pending_count().await?;
    println!("{}", format_sync_summary(&report, pending));
    Ok(())
}
