use std::path::Path;

use farm_core::config::FarmConfig;
use farm_core::util::normalize_text_option;
use serde_json::{json, Value};

use crate::commands::common::load_config;
use crate::error::CliError;

/// Values supplied to `farm config init`; `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct ConfigInitArgs {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub access_token: Option<String>,
    pub settle_delay_ms: Option<u64>,
    pub probe_interval_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

pub fn run_config_init(args: ConfigInitArgs, config_path: &Path) -> Result<(), CliError> {
    let existing = FarmConfig::load_from_path(config_path)?;
    let config = merge_config(existing, args);
    config.remote_settings()?;

    config.save_to_path(config_path)?;
    println!("Saved config to {}", config_path.display());
    Ok(())
}

pub fn run_config_show(as_json: bool, config_path: &Path) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let rendered = redacted_config(&config);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        println!("Config file: {}", config_path.display());
        if let Value::Object(fields) = &rendered {
            for (key, value) in fields {
                let value = match value {
                    Value::Null => "(unset)".to_string(),
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                println!("  {key}: {value}");
            }
        }
    }
    Ok(())
}

pub fn merge_config(mut config: FarmConfig, args: ConfigInitArgs) -> FarmConfig {
    if let Some(url) = normalize_text_option(args.supabase_url) {
        config.supabase_url = Some(url);
    }
    if let Some(key) = normalize_text_option(args.supabase_anon_key) {
        config.supabase_anon_key = Some(key);
    }
    if let Some(token) = normalize_text_option(args.access_token) {
        config.access_token = Some(token);
    }
    if args.settle_delay_ms.is_some() {
        config.settle_delay_ms = args.settle_delay_ms;
    }
    if args.probe_interval_secs.is_some() {
        config.probe_interval_secs = args.probe_interval_secs;
    }
    if args.request_timeout_secs.is_some() {
        config.request_timeout_secs = args.request_timeout_secs;
    }
    config.normalize();
    config
}

/// Effective settings with secrets masked
pub fn redacted_config(config: &FarmConfig) -> Value {
    json!({
        "supabase_url": config.supabase_url,
        "supabase_anon_key": config.supabase_anon_key.as_deref().map(mask_secret),
        "access_token": config.access_token.as_deref().map(mask_secret),
        "settle_delay_ms": u64::try_from(config.settle_delay().as_millis()).unwrap_or(u64::MAX),
        "probe_interval_secs": config.probe_interval().as_secs(),
        "request_timeout_secs": config.request_timeout().as_secs(),
    })
}

/// Keep the first four characters of long secrets so keys can be told apart.
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= 8 {
        return "****".to_string();
    }
    let prefix = secret.chars().take(4).collect::<String>();
    format!("{prefix}****")
}
