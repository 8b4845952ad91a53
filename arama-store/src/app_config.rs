use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub pricing: PricingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// `*` or empty allows any origin.
    #[serde(default)]
    pub allowed_origin: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Empty runs against the seeded in-memory store.
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// 0 disables the periodic sync.
    #[serde(default)]
    pub schedule_interval_seconds: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_seconds: default_fetch_timeout(),
            max_concurrent: default_max_concurrent(),
            schedule_interval_seconds: 0,
        }
    }
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_max_concurrent() -> usize {
    4
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct NotifyConfig {
    #[serde(default)]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub admin_email: String,
}

fn default_smtp_port() -> u16 {
    587
}

impl NotifyConfig {
    pub fn is_configured(&self) -> bool {
        !self.smtp_host.trim().is_empty() && !self.username.trim().is_empty()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingSettings {
    #[serde(default = "default_baseline_rate")]
    pub baseline_rate: Decimal,
    #[serde(default = "default_baseline_label")]
    pub baseline_label: String,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            baseline_rate: default_baseline_rate(),
            baseline_label: default_baseline_label(),
        }
    }
}

fn default_baseline_rate() -> Decimal {
    Decimal::from(200)
}

fn default_baseline_label() -> String {
    "Regular Season".to_string()
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Untracked per-machine overrides
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. ARAMA__SERVER__PORT=8080
            .add_source(config::Environment::with_prefix("ARAMA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
