use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use farm_core::config::FarmConfig;
use farm_core::models::{
    Expense, Field, Income, InventoryItem, OperationQueueItem, StorageBin, Task, TaskPriority,
    TaskStatus,
};
use farm_core::services::DatabaseService;
use farm_core::sync::{
    Connectivity, ConnectivityProbe, PostgrestRemoteStore, SyncEngine, SyncReport,
};
use farm_core::util::compact_text;
use farm_core::{Entity, EntityId};
use serde_json::{Map, Value};

use crate::cli::RecordValues;
use crate::error::CliError;

const DB_PATH_ENV: &str = "FARM_DB_PATH";
const APP_DIR: &str = "farm";

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os(DB_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("farm.db")
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.json")
}

pub fn resolve_config_path(cli_config_path: Option<PathBuf>) -> PathBuf {
    cli_config_path.unwrap_or_else(default_config_path)
}

/// Config file contents with `FARM_*` environment overrides applied
pub fn load_config(path: &Path) -> Result<FarmConfig, CliError> {
    Ok(FarmConfig::load_from_path(path)?.with_env_overrides(|name| env::var(name).ok()))
}

pub fn open_service(db_path: &Path) -> Result<DatabaseService, CliError> {
    Ok(DatabaseService::open_path(db_path)?)
}

pub fn normalize_record_id(id: &str) -> Result<EntityId, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(CliError::EmptyId);
    }
    Ok(EntityId::from(trimmed))
}

/// Merge `--data` and `--set` into one JSON object; `--set` wins on conflicts.
pub fn collect_values(values: &RecordValues) -> Result<Map<String, Value>, CliError> {
    let mut fields = match values.data.as_deref().map(str::trim) {
        None | Some("") => Map::new(),
        Some(raw) => match serde_json::from_str::<Value>(raw)? {
            Value::Object(fields) => fields,
            _ => return Err(CliError::DataNotObject),
        },
    };

    for assignment in &values.assignments {
        let (key, value) = parse_assignment(assignment)?;
        fields.insert(key, value);
    }

    if fields.is_empty() {
        return Err(CliError::NoValues);
    }
    Ok(fields)
}

/// `key=value`. The value is read as JSON when it parses (numbers, booleans,
/// null, quoted strings) and as a plain string otherwise.
pub fn parse_assignment(assignment: &str) -> Result<(String, Value), CliError> {
    let (key, raw) = assignment
        .split_once('=')
        .ok_or_else(|| CliError::InvalidAssignment(assignment.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::InvalidAssignment(assignment.to_string()));
    }

    let raw = raw.trim();
    let value =
        serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// One-line description of a record for list output
pub trait RecordSummary {
    fn summary(&self) -> String;
}

impl RecordSummary for Field {
    fn summary(&self) -> String {
        let mut line = format!("{} · {} {}", self.name, format_amount(self.area), self.area_unit);
        if let Some(crop) = &self.crop_type {
            line.push_str(&format!(" · {crop}"));
        }
        line
    }
}

impl RecordSummary for Expense {
    fn summary(&self) -> String {
        let mut line = format!(
            "{} · {} · {:.2}",
            self.date, self.category, self.amount
        );
        if !self.description.trim().is_empty() {
            line.push_str(&format!(" · {}", self.description.trim()));
        }
        line
    }
}

impl RecordSummary for Task {
    fn summary(&self) -> String {
        format!(
            "{} · [{}/{}] {}",
            self.due_date,
            priority_label(self.priority),
            status_label(self.status),
            self.title
        )
    }
}

impl RecordSummary for Income {
    fn summary(&self) -> String {
        format!("{} · {} · {:.2}", self.date, self.source, self.amount)
    }
}

impl RecordSummary for InventoryItem {
    fn summary(&self) -> String {
        let mut line = format!(
            "{} · {} {} · {}",
            self.name,
            format_amount(self.quantity),
            self.unit,
            self.category
        );
        if self.is_low_stock() {
            line.push_str(" (low stock)");
        }
        line
    }
}

impl RecordSummary for StorageBin {
    fn summary(&self) -> String {
        let mut line = format!(
            "{} · {}/{} {}",
            self.name,
            format_amount(self.current_level),
            format_amount(self.capacity),
            self.unit
        );
        if let Some(ratio) = self.fill_ratio() {
            line.push_str(&format!(" ({:.0}%)", ratio * 100.0));
        }
        line
    }
}

pub fn format_record_lines<E: Entity + RecordSummary>(records: &[E]) -> Vec<String> {
    records
        .iter()
        .map(|record| format!("{}  {}", record.id(), compact_text(&record.summary())))
        .collect()
}

pub fn format_queue_line(item: &OperationQueueItem) -> String {
    let queued_at = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(item.timestamp).map_or_else(
        || item.timestamp.to_string(),
        |time| time.format("%Y-%m-%d %H:%M:%S").to_string(),
    );
    format!(
        "#{:<5} {:<6} {:<14} {}  {}",
        item.id, item.operation, item.entity_type, item.entity_id, queued_at
    )
}

/// Summary after a pass: counts when anything was applied, otherwise only
/// what is still waiting.
pub fn format_sync_summary(report: &SyncReport, pending_count: usize) -> String {
    if report.synced_count > 0 {
        let mut line = format!("Synced {} change(s)", report.synced_count);
        if report.error_count > 0 {
            line.push_str(&format!(", {} failed", report.error_count));
        }
        line.push_str(&format!("; {pending_count} pending"));
        line
    } else {
        format!("{pending_count} pending change(s)")
    }
}

fn format_amount(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

const fn priority_label(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::Low => "low",
        TaskPriority::Medium => "medium",
        TaskPriority::High => "high",
    }
}

const fn status_label(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::InProgress => "in progress",
        TaskStatus::Completed => "completed",
    }
}

/// Engine plus the probe used to decide whether it may run
pub struct RemoteSetup {
    pub engine: Arc<SyncEngine>,
    pub connectivity: Connectivity,
    pub probe: ConnectivityProbe,
}

impl RemoteSetup {
    /// Check reachability once and record the result.
    pub async fn refresh_connectivity(&self) -> bool {
        let online = self.probe.check().await;
        self.connectivity.set_online(online);
        online
    }
}

pub fn connect_remote(
    db: DatabaseService,
    config: &FarmConfig,
) -> Result<Option<RemoteSetup>, CliError> {
    let Some(settings) = config.remote_settings()? else {
        return Ok(None);
    };

    let remote = PostgrestRemoteStore::new(
        &settings.url,
        settings.anon_key,
        config.request_timeout(),
    )?
    .with_access_token(settings.access_token);
    let probe = ConnectivityProbe::new(
        remote.rest_url(),
        config.probe_interval(),
        config.request_timeout(),
    )?;
    let connectivity = Connectivity::new(false);
    let engine = Arc::new(SyncEngine::new(db, Arc::new(remote), connectivity.clone()));

    Ok(Some(RemoteSetup {
        engine,
        connectivity,
        probe,
    }))
}

pub fn require_remote(setup: Option<RemoteSetup>) -> Result<RemoteSetup, CliError> {
    setup.ok_or(CliError::SyncNotConfigured)
}
