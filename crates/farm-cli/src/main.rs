//! Farmstead CLI - offline-first farm records from the command line
//!
//! Every change is written locally first and queued; `farm sync` and
//! `farm watch` push the queue to the remote database.

mod cli;
mod commands;
mod error;


use clap::{CommandFactory, Parser};
use tracing_subscriber::filter::Directive;

use crate::cli::{Cli, Commands, ConfigCommands};
use crate::commands::common::{resolve_config_path, resolve_db_path};
use crate::commands::config::{run_config_init, run_config_show, ConfigInitArgs};
use crate::commands::{
    add, completions, delete, for_entity, list, queue, show, status, sync, update, watch,
};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "farm=info".parse::<Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db_path = resolve_db_path(cli.db_path);
    let config_path = resolve_config_path(cli.config);

    match cli.command {
        Some(Commands::Add { entity, values }) => {
            for_entity!(entity, E => add::run_add::<E>(&values, &db_path).await)?;
        }
        Some(Commands::List {
            entity,
            limit,
            json,
        }) => {
            for_entity!(entity, E => list::run_list::<E>(limit, json, &db_path).await)?;
        }
        Some(Commands::Show { entity, id }) => {
            for_entity!(entity, E => show::run_show::<E>(&id, &db_path).await)?;
        }
        Some(Commands::Update { entity, id, values }) => {
            for_entity!(entity, E => update::run_update::<E>(&id, &values, &db_path).await)?;
        }
        Some(Commands::Delete { entity, id }) => {
            for_entity!(entity, E => delete::run_delete::<E>(&id, &db_path).await)?;
        }
        Some(Commands::Sync) => sync::run_sync(&db_path, &config_path).await?,
        Some(Commands::Status { json }) => {
            status::run_status(json, &db_path, &config_path).await?;
        }
        Some(Commands::Queue { limit, json }) => queue::run_queue(limit, json, &db_path).await?,
        Some(Commands::Watch) => watch::run_watch(&db_path, &config_path).await?,
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Init {
                supabase_url,
                supabase_anon_key,
                access_token,
                settle_delay_ms,
                probe_interval_secs,
                request_timeout_secs,
            } => run_config_init(
                ConfigInitArgs {
                    supabase_url,
                    supabase_anon_key,
                    access_token,
                    settle_delay_ms,
                    probe_interval_secs,
                    request_timeout_secs,
                },
                &config_path,
            )?,
            ConfigCommands::Show { json } => run_config_show(json, &config_path)?,
        },
        Some(Commands::Completions { shell, output }) => {
            completions::run_completions(shell, output.as_deref())?;
        }
        None => {
            Cli::command().print_help().map_err(CliError::Io)?;
            println!();
        }
    }

    Ok(())
}
