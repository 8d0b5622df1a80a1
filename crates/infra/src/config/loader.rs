//! Configuration loader
//!
//! Loads application configuration from an optional file and environment
//! variables.
//!
//! ## Loading Strategy
//! 1. Search the standard locations for a config file (JSON or TOML)
//! 2. Start from that file, or from defaults when none is found
//! 3. Apply environment variable overrides
//! 4. Validate the result
//!
//! ## Environment Variables
//! - `PORT`, `CALNOTIFY_HOST`: HTTP listener
//! - `CALNOTIFY_DB_PATH`, `CALNOTIFY_DB_POOL_SIZE`: SQLite database
//! - `CALNOTIFY_SCHEDULER_ENABLED`, `CALNOTIFY_SCHEDULER_INTERVAL` (seconds),
//!   `CALNOTIFY_TIMEZONE` (IANA name), `CALNOTIFY_DEDUPE`: reminder loop
//! - `SENDGRID_API_KEY`, `FROM_EMAIL`, `FROM_NAME`, `SENDGRID_BASE_URL`: email
//! - `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`, `TWILIO_PHONE_NUMBER`,
//!   `TWILIO_ADDRESS_PREFIX`, `TWILIO_BASE_URL`: messaging
//!
//! Empty variables are treated as unset.
//!
//! ## File Locations
//! The loader checks the following paths (in order):
//! 1. `./config.{json,toml}` and `./calnotify.{json,toml}`
//! 2. The same names in the parent and grandparent directories
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use calnotify_domain::{CalNotifyError, Config, Result};
use chrono_tz::Tz;

const CONFIG_FILE_NAMES: [&str; 4] =
    ["config.json", "config.toml", "calnotify.json", "calnotify.toml"];

/// Load configuration: optional file, then environment overrides
///
/// # Errors
/// Returns `CalNotifyError::Config` if a config file exists but cannot be
/// parsed, an environment value is malformed, or validation fails.
pub fn load() -> Result<Config> {
    let mut config = match find_config_path() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found; starting from defaults");
            Config::default()
        }
    };

    apply_env_overrides(&mut config)?;
    validate(&config)?;
    Ok(config)
}

/// Load configuration from defaults and environment variables only
///
/// # Errors
/// Returns `CalNotifyError::Config` if a variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();
    apply_env_overrides(&mut config)?;
    validate(&config)?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations. Format is chosen by
/// file extension. Missing sections fall back to defaults.
///
/// # Errors
/// Returns `CalNotifyError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CalNotifyError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_path().ok_or_else(|| {
            CalNotifyError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CalNotifyError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, by the extension of `path`
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CalNotifyError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CalNotifyError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(CalNotifyError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// First existing configuration file among the standard paths
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_path() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.extend([exe_dir.to_path_buf(), exe_dir.join(".."), exe_dir.join("../..")]);
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Overlay environment variables onto `config`
///
/// # Errors
/// Returns `CalNotifyError::Config` for unparsable numbers.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(port) = env_parse::<u16>("PORT")? {
        config.server.port = port;
    }
    if let Some(host) = env_var("CALNOTIFY_HOST") {
        config.server.host = host;
    }

    if let Some(path) = env_var("CALNOTIFY_DB_PATH") {
        config.database.path = path;
    }
    if let Some(pool_size) = env_parse::<u32>("CALNOTIFY_DB_POOL_SIZE")? {
        config.database.pool_size = pool_size;
    }

    let scheduler = &mut config.scheduler;
    scheduler.enabled = env_bool("CALNOTIFY_SCHEDULER_ENABLED", scheduler.enabled);
    if let Some(interval) = env_parse::<u64>("CALNOTIFY_SCHEDULER_INTERVAL")? {
        scheduler.interval_seconds = interval;
    }
    if let Some(timezone) = env_var("CALNOTIFY_TIMEZONE") {
        scheduler.timezone = timezone;
    }
    scheduler.dedupe = env_bool("CALNOTIFY_DEDUPE", scheduler.dedupe);

    let email = &mut config.email;
    if let Some(api_key) = env_var("SENDGRID_API_KEY") {
        email.api_key = Some(api_key);
    }
    if let Some(from_email) = env_var("FROM_EMAIL") {
        email.from_email = from_email;
    }
    if let Some(from_name) = env_var("FROM_NAME") {
        email.from_name = from_name;
    }
    if let Some(base_url) = env_var("SENDGRID_BASE_URL") {
        email.base_url = base_url;
    }

    let messaging = &mut config.messaging;
    if let Some(sid) = env_var("TWILIO_ACCOUNT_SID") {
        messaging.account_sid = Some(sid);
    }
    if let Some(token) = env_var("TWILIO_AUTH_TOKEN") {
        messaging.auth_token = Some(token);
    }
    if let Some(number) = env_var("TWILIO_PHONE_NUMBER") {
        messaging.from_number = number;
    }
    // An explicitly empty prefix disables prefixing, so presence matters here
    if let Ok(prefix) = std::env::var("TWILIO_ADDRESS_PREFIX") {
        messaging.address_prefix = prefix.trim().to_string();
    }
    if let Some(base_url) = env_var("TWILIO_BASE_URL") {
        messaging.base_url = base_url;
    }

    Ok(())
}

/// Reject configurations the service cannot run with
///
/// # Errors
/// Returns `CalNotifyError::Config` naming the offending setting.
pub fn validate(config: &Config) -> Result<()> {
    Tz::from_str(config.scheduler.timezone.trim()).map_err(|_| {
        CalNotifyError::Config(format!("Unknown time zone: {}", config.scheduler.timezone))
    })?;

    if config.scheduler.interval_seconds == 0 {
        return Err(CalNotifyError::Config("Scheduler interval must be positive".into()));
    }
    if config.database.pool_size == 0 {
        return Err(CalNotifyError::Config("Database pool size must be positive".into()));
    }
    if config.database.path.trim().is_empty() {
        return Err(CalNotifyError::Config("Database path must not be empty".into()));
    }

    Ok(())
}

/// Non-empty environment variable
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| CalNotifyError::Config(format!("Invalid value for {}: {}", key, e)))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
/// Unset or empty yields `default`.
fn env_bool(key: &str, default: bool) -> bool {
    env_var(key)
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
