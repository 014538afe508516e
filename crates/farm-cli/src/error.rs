use std::io;

use farm_core::sync::RemoteError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] farm_core::Error),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Record ID cannot be empty")]
    EmptyId,
    #[error("No field values provided. Use --data '<json>' or --set key=value")]
    NoValues,
    #[error("Invalid assignment `{0}`; expected key=value")]
    InvalidAssignment(String),
    #[error("--data must be a JSON object")]
    DataNotObject,
    #[error("{0} not found")]
    NotFound(String),
    #[error(
        "Sync is not configured. Run `farm config init --supabase-url <URL> --supabase-anon-key <KEY>` or set FARM_SUPABASE_URL and FARM_SUPABASE_ANON_KEY."
    )]
    SyncNotConfigured,
}
