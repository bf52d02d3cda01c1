//! Configuration module for the ABS backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Default chat completions endpoint.
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
/// Default completion model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
/// Default sign-off used in offer drafts.
pub const DEFAULT_SENDER_NAME: &str = "ABS – AI Business Services";

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid ABS_BIND_ADDR '{value}': {reason}")]
    BindAddr { value: String, reason: String },

    #[error("Invalid ABS_STORAGE '{0}' (expected 'sqlite' or 'json')")]
    Storage(String),
}

/// Which Lead Store backend to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Embedded SQLite database
    Sqlite,
    /// Single JSON array file
    JsonFile,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Sqlite => "sqlite",
            StorageBackend::JsonFile => "json",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sql" => Ok(StorageBackend::Sqlite),
            "json" | "file" => Ok(StorageBackend::JsonFile),
            _ => Err(ConfigError::Storage(s.to_string())),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (optional in development)
    pub api_psk: Option<String>,
    /// Selected storage backend
    pub storage: StorageBackend,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Path to the JSON leads file
    pub leads_file: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Name used to sign offer drafts
    pub sender_name: String,
    /// API key for the completion service; `None` yields placeholder replies
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_psk = non_blank_var("ABS_API_PSK");

        let storage = match env::var("ABS_STORAGE") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::Sqlite,
        };

        let db_path = env::var("ABS_DB_PATH")
            .unwrap_or_else(|_| "./data/leads.sqlite".to_string())
            .into();

        let leads_file = env::var("ABS_LEADS_FILE")
            .unwrap_or_else(|_| "./data/leads.json".to_string())
            .into();

        let bind_value =
            env::var("ABS_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:10000".to_string());
        let bind_addr = bind_value
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::BindAddr {
                value: bind_value.clone(),
                reason: e.to_string(),
            })?;

        let log_level = env::var("ABS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let sender_name =
            env::var("ABS_SENDER_NAME").unwrap_or_else(|_| DEFAULT_SENDER_NAME.to_string());

        let openai_api_key = non_blank_var("OPENAI_API_KEY");
        let openai_model =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string());
        let openai_api_url =
            env::var("OPENAI_API_URL").unwrap_or_else(|_| DEFAULT_OPENAI_API_URL.to_string());

        Ok(Self {
            api_psk,
            storage,
            db_path,
            leads_file,
            bind_addr,
            log_level,
            sender_name,
            openai_api_key,
            openai_model,
            openai_api_url,
        })
    }
}

/// Read an env var, treating blank values as unset.
fn non_blank_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
