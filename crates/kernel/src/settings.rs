use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "BOOKSHELF_ENV";
const CONFIG_DIR_ENV: &str = "BOOKSHELF_CONFIG_DIR";
const ENV_PREFIX: &str = "BOOKSHELF";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub pagination: PaginationSettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay,
    /// and `BOOKSHELF_*` variables (`__` separates nested keys).
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .map(|cwd| cwd.join("config"))
                .context("unable to resolve current directory")?,
        };

        Self::load_from(&config_dir, &environment)
    }

    /// Load configuration from an explicit directory and environment name.
    pub fn load_from(config_dir: &std::path::Path, environment: &str) -> anyhow::Result<Self> {
        let environment: Environment = environment.parse()?;

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment_name(&environment)));

        let cfg = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = environment;
        Ok(settings)
    }
}

fn environment_name(environment: &Environment) -> &'static str {
    match environment {
        Environment::Local => "local",
        Environment::Staging => "staging",
        Environment::Production => "production",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Base used for absolute `Location` headers, e.g. `https://books.example.com`.
    /// When unset the request `Host` header is used.
    #[serde(default)]
    pub public_base_url: Option<String>,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
            public_base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    /// Fallback filter directive when `RUST_LOG` is not set.
    #[serde(default = "TelemetrySettings::default_log_filter")]
    pub log_filter: String,
}

impl TelemetrySettings {
    fn default_log_filter() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_filter: Self::default_log_filter(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Role required for every write on the catalog.
    #[serde(default = "AuthSettings::default_admin_role")]
    pub admin_role: String,
}

impl AuthSettings {
    fn default_admin_role() -> String {
        "ROLE_ADMIN".to_string()
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            admin_role: Self::default_admin_role(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "CacheSettings::default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "CacheSettings::default_authors_tag")]
    pub authors_tag: String,
    #[serde(default = "CacheSettings::default_books_tag")]
    pub books_tag: String,
    #[serde(default = "CacheSettings::default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Upper bound on cached pages; the oldest are evicted first.
    #[serde(default = "CacheSettings::default_max_entries")]
    pub max_entries: usize,
}

impl CacheSettings {
    fn default_ttl_secs() -> u64 {
        1800
    }

    fn default_authors_tag() -> String {
        "authorsCache".to_string()
    }

    fn default_books_tag() -> String {
        "booksCache".to_string()
    }

    fn default_sweep_interval_secs() -> u64 {
        60
    }

    fn default_max_entries() -> usize {
        10_000
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: Self::default_ttl_secs(),
            authors_tag: Self::default_authors_tag(),
            books_tag: Self::default_books_tag(),
            sweep_interval_secs: Self::default_sweep_interval_secs(),
            max_entries: Self::default_max_entries(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationSettings {
    #[serde(default = "PaginationSettings::default_page")]
    pub default_page: u32,
    #[serde(default = "PaginationSettings::default_limit")]
    pub default_limit: u32,
}

impl PaginationSettings {
    fn default_page() -> u32 {
        1
    }

    fn default_limit() -> u32 {
        3
    }
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_page: Self::default_page(),
            default_limit: Self::default_limit(),
        }
    }
}
