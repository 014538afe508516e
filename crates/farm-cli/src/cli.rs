use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use farm_core::EntityType;

#[derive(Parser)]
#[command(name = "farm")]
#[command(about = "Keep farm records offline and sync them when a connection is available")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Optional path to the config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a record
    #[command(alias = "new")]
    Add {
        #[arg(value_enum)]
        entity: EntityKind,
        #[command(flatten)]
        values: RecordValues,
    },
    /// List records, newest first
    List {
        #[arg(value_enum)]
        entity: EntityKind,
        /// Number of records to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single record as JSON
    Show {
        #[arg(value_enum)]
        entity: EntityKind,
        /// Record ID
        id: String,
    },
    /// Change fields of an existing record
    #[command(alias = "edit")]
    Update {
        #[arg(value_enum)]
        entity: EntityKind,
        /// Record ID
        id: String,
        #[command(flatten)]
        values: RecordValues,
    },
    /// Delete a record
    Delete {
        #[arg(value_enum)]
        entity: EntityKind,
        /// Record ID
        id: String,
    },
    /// Push queued changes to the remote database
    Sync,
    /// Show pending changes and connectivity
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List queued operations, oldest first
    Queue {
        /// Number of operations to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Watch connectivity and sync on every reconnect until interrupted
    Watch,
    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// Field values for `add` and `update`
#[derive(clap::Args, Debug, Default)]
pub struct RecordValues {
    /// Field values as a JSON object, e.g. '{"name":"North","area":4}'
    #[arg(long, value_name = "JSON")]
    pub data: Option<String>,
    /// Single field assignment, e.g. --set cropType=maize (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub assignments: Vec<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum EntityKind {
    Field,
    Expense,
    Task,
    Income,
    #[value(alias = "inventory")]
    InventoryItem,
    #[value(alias = "bin")]
    StorageBin,
}

impl EntityKind {
    pub const fn entity_type(self) -> EntityType {
        match self {
            Self::Field => EntityType::Field,
            Self::Expense => EntityType::Expense,
            Self::Task => EntityType::Task,
            Self::Income => EntityType::Income,
            Self::InventoryItem => EntityType::InventoryItem,
            Self::StorageBin => EntityType::StorageBin,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Create or update the config file
    Init {
        /// Supabase project URL
        #[arg(long, value_name = "URL")]
        supabase_url: Option<String>,
        /// Supabase anon/public key
        #[arg(long, value_name = "KEY")]
        supabase_anon_key: Option<String>,
        /// Access token of a signed-in user
        #[arg(long, value_name = "TOKEN")]
        access_token: Option<String>,
        /// Delay between reconnecting and syncing
        #[arg(long, value_name = "MS")]
        settle_delay_ms: Option<u64>,
        /// Seconds between connectivity checks in `farm watch`
        #[arg(long, value_name = "SECS")]
        probe_interval_secs: Option<u64>,
        /// HTTP timeout for remote requests
        #[arg(long, value_name = "SECS")]
        request_timeout_secs: Option<u64>,
    },
    /// Print the effective config with secrets redacted
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
