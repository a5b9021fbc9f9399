//! Configuration types and loading logic.

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use generated_by_tracing::TracingConfig;
use serde::Deserialize;

use crate::params::ParamsSource;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tracing: TracingConfig,
}

/// Server listen and identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Address advertised as `SERVER_ADDR` instead of the socket's local IP.
    #[serde(default)]
    pub server_addr: Option<String>,

    /// Virtual host name advertised as `SERVER_NAME` instead of the request's `Host`.
    #[serde(default)]
    pub server_name: Option<String>,
}

fn default_listen_address() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            server_addr: None,
            server_name: None,
        }
    }
}

impl From<&ServerConfig> for ParamsSource {
    fn from(config: &ServerConfig) -> Self {
        Self {
            server_addr: config.server_addr.clone(),
            server_name: config.server_name.clone(),
        }
    }
}

impl AppConfig {
    /// Providers in priority order (highest last):
    /// 1. Defaults
    /// 2. TOML config file (optional)
    /// 3. Environment variables (GENERATED_BY_ prefix, __ for nesting)
    pub fn figment(config_path: &str) -> Figment {
        Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("GENERATED_BY_").split("__"))
    }

    /// Load configuration from TOML file and environment variables.
    pub fn load(config_path: &str) -> anyhow::Result<Self> {
        let config: AppConfig = Self::figment(config_path).extract()?;
        Ok(config)
    }
}
