use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub database_path: PathBuf,
    pub generate_timeout_seconds: u64,
    pub request_timeout_seconds: u64,
    pub max_history_turns: usize,
    pub dashboard_window_days: i64,
    pub lexicon_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

/// Outcome of loading `.env`, held until a subscriber can record it.
pub struct DotenvStatus(std::result::Result<PathBuf, dotenvy::Error>);

impl DotenvStatus {
    /// Load `.env` into the process environment. Runs before tracing is set
    /// up so `RUST_LOG` and `LOG_FILE` from the file apply.
    pub fn load() -> Self {
        Self(dotenvy::dotenv())
    }

    pub fn report(&self) {
        match &self.0 {
            Ok(path) => info!("Loaded environment variables from {}", path.display()),
            Err(e) => warn!(
                "Failed to load .env file: {}. Using system environment variables.",
                e
            ),
        }
    }
}

impl Config {
    /// Read the process environment. Load `.env` first with [`DotenvStatus::load`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let google_api_key = lookup("GOOGLE_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .context("GOOGLE_API_KEY environment variable not set. Please set it in your .env file")?;

        let optional_path = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        };

        Ok(Self {
            google_api_key,
            gemini_model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into()),
            gemini_base_url: lookup("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.into()),
            api_host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            api_port: parse_or(&lookup, "API_PORT", 5001)?,
            database_path: lookup("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data/depression_support.db")),
            generate_timeout_seconds: parse_or(&lookup, "GENERATE_TIMEOUT_SECONDS", 60)?,
            request_timeout_seconds: parse_or(&lookup, "REQUEST_TIMEOUT_SECONDS", 120)?,
            max_history_turns: parse_or(&lookup, "MAX_HISTORY_TURNS", 30)?,
            dashboard_window_days: parse_or(&lookup, "DASHBOARD_WINDOW_DAYS", 30)?,
            lexicon_path: optional_path("LEXICON_PATH"),
            catalog_path: optional_path("CATALOG_PATH"),
            log_file: optional_path("LOG_FILE"),
        })
    }

    pub fn print_config(&self) {
        info!("Current Configuration:");
        info!("- Model: {} at {}", self.gemini_model, self.gemini_base_url);
        info!("- API Key: {}", redact(&self.google_api_key));
        info!("- API: {}:{}", self.api_host, self.api_port);
        info!("- Database: {}", self.database_path.display());
        info!("- Generate Timeout: {}s", self.generate_timeout_seconds);
        info!("- Request Timeout: {}s", self.request_timeout_seconds);
        info!("- Max History Turns: {}", self.max_history_turns);
        info!("- Dashboard Window: {} days", self.dashboard_window_days);
        info!(
            "- Lexicon: {}",
            self.lexicon_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "embedded".into())
        );
        info!(
            "- Catalog: {}",
            self.catalog_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "embedded".into())
        );
        info!(
            "- Log File: {}",
            self.log_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "stdout only".into())
        );
    }

    pub fn api_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.api_host, self.api_port)
            .parse()
            .with_context(|| format!("Invalid API address {}:{}", self.api_host, self.api_port))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {}", key, raw)),
        None => Ok(default),
    }
}

fn redact(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}
