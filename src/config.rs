use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::Duration;
use clap::{Parser, ValueEnum};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::admin::FixedCredentials;

const MAX_SESSION_TTL_HOURS: u64 = 24 * 365 * 100;

/// Which store backs the repositories
///
/// There is no fallback between the two: a deployment runs on exactly the
/// store it was configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Persistent SQLite database at `database_url`
    #[default]
    Sqlite,
    /// In-memory demo data, reset on restart
    Sample,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Sqlite => f.write_str("sqlite"),
            DataSource::Sample => f.write_str("sample"),
        }
    }
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(DataSource::Sqlite),
            "sample" => Ok(DataSource::Sample),
            other => Err(format!("Unknown data source: {} (expected \"sqlite\" or \"sample\")", other)),
        }
    }
}

/// Configuration for the Evento server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Store backing the event, booking, enquiry and user data
    pub data_source: DataSource,
    /// Address the HTTP server binds to
    pub bind_address: String,
    pub port: u16,
    /// Admin dashboard username
    pub admin_username: String,
    /// Admin dashboard password
    pub admin_password: String,
    /// Lifetime of a user session in hours
    pub session_ttl_hours: u64,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub data_source: Option<DataSource>,
    #[serde(default)]
    pub bind_address: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub admin_username: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
    #[serde(default)]
    pub session_ttl_hours: Option<u64>,
    #[serde(default)]
    pub log_json: Option<bool>,
    /// Server URL used by the CLI; the server itself ignores it
    #[serde(default)]
    pub server_url: Option<String>,
}

/// Command line arguments for the server
#[derive(Parser, Debug)]
#[clap(name = "evento", about = "Event listing and booking server")]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Backing store for the data
    #[clap(long, env = "EVENTO_DATA_SOURCE", value_enum)]
    pub data_source: Option<DataSource>,

    /// Address to bind to
    #[clap(long, env = "EVENTO_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Port to listen on
    #[clap(long, env = "EVENTO_PORT")]
    pub port: Option<u16>,

    /// Admin dashboard username
    #[clap(long, env = "EVENTO_ADMIN_USERNAME")]
    pub admin_username: Option<String>,

    /// Admin dashboard password
    #[clap(long, env = "EVENTO_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Session lifetime in hours
    #[clap(long, env = "EVENTO_SESSION_TTL_HOURS")]
    pub session_ttl_hours: Option<u64>,

    /// Log as JSON lines
    #[clap(long, env = "EVENTO_LOG_JSON", default_value_t = false)]
    pub log_json: bool,

    /// Debug mode
    #[clap(long, env = "EVENTO_DEBUG", default_value_t = false)]
    pub debug: bool,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            data_source: update.data_source.unwrap_or(self.data_source),
            bind_address: update.bind_address.unwrap_or(self.bind_address),
            port: update.port.unwrap_or(self.port),
            admin_username: update.admin_username.unwrap_or(self.admin_username),
            admin_password: update.admin_password.unwrap_or(self.admin_password),
            session_ttl_hours: update.session_ttl_hours.unwrap_or(self.session_ttl_hours),
            log_json: update.log_json.unwrap_or(self.log_json),
        }
    }

    /// Returns the session lifetime as a Duration, capped at a century
    pub fn session_ttl(&self) -> Duration {
        Duration::hours(self.session_ttl_hours.min(MAX_SESSION_TTL_HOURS) as i64)
    }

    /// The admin credential pair as a verifier
    pub fn admin_credentials(&self) -> FixedCredentials {
        FixedCredentials::new(self.admin_username.clone(), self.admin_password.clone())
    }

    /// `bind_address:port`
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Returns the base (default) configuration
pub fn base_config(config_path: Option<PathBuf>) -> Config {
    let database_url = config_path.map_or("evento.db".to_string(), |path| path.join("evento.db").to_string_lossy().to_string());

    Config {
        database_url,
        data_source: DataSource::Sqlite,
        bind_address: "127.0.0.1".to_string(),
        port: 3000,
        admin_username: "admin".to_string(),
        admin_password: "admin".to_string(),
        session_ttl_hours: 24 * 7,
        log_json: false,
    }
}

/// Loads configuration from a TOML file
///
/// A missing file is not an error; an unreadable or malformed one is.
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            },
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url,
        data_source: args.data_source,
        bind_address: args.bind_address,
        port: args.port,
        admin_username: args.admin_username,
        admin_password: args.admin_password,
        session_ttl_hours: args.session_ttl_hours,
        log_json: args.log_json.then_some(true),
        server_url: None,
    }
}

/// Returns the XDG config directory for evento, if it exists
pub fn get_config_dir_path() -> Option<PathBuf> {
    let Some(proj_dirs) = ProjectDirs::from("com", "evento", "evento") else {
        warn!("Could not determine XDG config directory, skipping config file");
        return None;
    };

    let path = proj_dirs.config_dir().to_path_buf();
    if path.exists() {
        Some(path)
    } else {
        info!("Config path not found at {:?}, using defaults", path);
        None
    }
}

/// Returns the XDG data directory for evento (logs, token file)
pub fn get_data_dir_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "evento", "evento").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
///
/// ### Errors
///
/// Returns an error if the config file exists but cannot be read or parsed,
/// including an unknown `data_source` value
pub fn get_config(args: CliArgs) -> Result<Config, String> {
    let config_path = get_config_dir_path();

    let base = base_config(config_path.clone());
    let file = config_from_file(config_path.map(|dir| dir.join("config.toml")))?;

    // Apply updates in order of increasing precedence
    let config = base
        .apply_update(file)
        .apply_update(config_from_args(args));

    info!(
        "Final configuration: database_url={}, data_source={}, listen={}, session_ttl={}h",
        config.database_url, config.data_source, config.listen_addr(), config.session_ttl_hours
    );

    Ok(config)
}

#[cfg(test)]
mod tests;
