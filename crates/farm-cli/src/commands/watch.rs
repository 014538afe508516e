use std::path::Path;
use std::sync::Arc;

use farm_core::sync::ConnectivityMonitor;

use crate::commands::common::{
    connect_remote, format_sync_summary, load_config, open_service, require_remote,
};
use crate::error::CliError;

pub async fn run_watch(db_path: &Path, config_path: &Path) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let db = open_service(db_path)?;
    let setup = require_remote(connect_remote(db.clone(), &config)?)?;

    let monitor =
        ConnectivityMonitor::new(Arc::clone(&setup.engine)).with_settle_delay(config.settle_delay());

    if setup.refresh_connectivity().await {
        let report = monitor.sync_now().await?;
        println!("{}", format_sync_summary(&report, db.pending_count().await?));
    } else {
        println!("Remote unreachable; waiting for a connection");
    }

    let subscription = monitor.subscribe(&setup.connectivity);
    let probe = setup.probe.clone().spawn(setup.connectivity.clone());
    println!("Watching for connectivity changes (Ctrl+C to stop)");

    tokio::signal::ctrl_c().await?;

    probe.abort();
    subscription.unsubscribe();
    println!("{} pending change(s)", db.pending_count().await?);
    Ok(())
}
