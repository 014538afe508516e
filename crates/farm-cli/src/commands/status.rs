use std::path::Path;

use farm_core::state::SyncState;
use farm_core::sync::SyncStatus;
use serde::Serialize;

use crate::commands::common::{connect_remote, load_config, open_service};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub state: &'static str,
    pub pending_count: usize,
    pub remote_url: Option<String>,
    pub online: bool,
    pub db_path: String,
}

pub async fn run_status(as_json: bool, db_path: &Path, config_path: &Path) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let db = open_service(db_path)?;
    let pending_count = db.pending_count().await?;

    let (remote_url, online) = match connect_remote(db, &config)? {
        Some(setup) => {
            let online = setup.refresh_connectivity().await;
            (config.remote_settings()?.map(|settings| settings.url), online)
        }
        None => (None, false),
    };

    let status = SyncStatus {
        pending_count,
        is_syncing: false,
    };
    let report = StatusReport {
        state: SyncState::from_status(online, &status).label(),
        pending_count,
        remote_url,
        online,
        db_path: db_path.display().to_string(),
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in format_status_lines(&report) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn format_status_lines(report: &StatusReport) -> Vec<String> {
    let remote = match &report.remote_url {
        Some(url) if report.online => format!("{url} (reachable)"),
        Some(url) => format!("{url} (unreachable)"),
        None => "not configured".to_string(),
    };
    vec![
        format!("State:    {}", report.state),
        format!("Pending:  {}", report.pending_count),
        format!("Remote:   {remote}"),
        format!("Database: {}", report.db_path),
    ]
}
