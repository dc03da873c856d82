use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::global::error::ConfigError;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppSettings {
    pub log_level: String,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_to_file")]
    pub log_to_file: bool,
    #[serde(default = "default_log_directory")]
    pub log_directory: String,
    #[serde(default = "default_log_file_prefix")]
    pub log_file_prefix: String,
    #[serde(default = "default_log_rotation")]
    pub log_rotation: LogRotation,
    #[serde(default = "default_log_to_console")]
    pub log_to_console: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Daily,
    Hourly,
    Never,
}

fn default_log_to_file() -> bool {
    false
}

fn default_log_directory() -> String {
    "./logs".to_string()
}

fn default_log_file_prefix() -> String {
    "anime-gateway".to_string()
}

fn default_log_rotation() -> LogRotation {
    LogRotation::Daily
}

fn default_log_to_console() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_to_file: default_log_to_file(),
            log_directory: default_log_directory(),
            log_file_prefix: default_log_file_prefix(),
            log_rotation: default_log_rotation(),
            log_to_console: default_log_to_console(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Externally reachable base URL of this gateway, used when rewriting
    /// poster URLs into relay form.
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Base URL of the anime metadata API. Read once at startup and
    /// injected into the data client.
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
    /// Hosts the relay may forward to. A target matches on equality or as
    /// a subdomain of a listed host. Empty means unrestricted.
    #[serde(default)]
    pub allowed_hosts: Vec<String>,
    #[serde(default = "default_cache_max_age")]
    pub cache_max_age: u64,
    #[serde(default = "default_rewrite_poster_urls")]
    pub rewrite_poster_urls: bool,
}

fn default_cache_max_age() -> u64 {
    86_400
}

fn default_rewrite_poster_urls() -> bool {
    true
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: Vec::new(),
            cache_max_age: default_cache_max_age(),
            rewrite_poster_urls: default_rewrite_poster_urls(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl AppConfig {
    /// Load configuration from config.toml file
    pub fn load() -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config"))
            .build()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        let app_config: AppConfig = config
            .try_deserialize()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        Ok(app_config)
    }

    /// Validate the loaded configuration before anything starts using it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let upstream = reqwest::Url::parse(&self.upstream.base_url)
            .map_err(|e| ConfigError::Invalid(format!("upstream.base_url: {}", e)))?;
        if upstream.host_str().is_none() {
            return Err(ConfigError::Invalid(
                "upstream.base_url has no host".to_string(),
            ));
        }

        reqwest::Url::parse(&self.server.public_base_url)
            .map_err(|e| ConfigError::Invalid(format!("server.public_base_url: {}", e)))?;

        if self.relay.allowed_hosts.is_empty() {
            warn!("relay.allowed_hosts is empty, the relay will forward to any host");
        }

        Ok(())
    }
}

impl RelayConfig {
    /// Check whether the relay may forward to the given target host.
    pub fn is_host_allowed(&self, host: &str) -> bool {
        if self.allowed_hosts.is_empty() {
            return true;
        }
        self.allowed_hosts
            .iter()
            .any(|allowed| host == allowed || host.ends_with(&format!(".{}", allowed)))
    }
}
