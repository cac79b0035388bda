//! Service configuration
//!
//! Loaded once at startup from an optional TOML file, then overridden by
//! `WQ__SECTION__KEY` environment variables. Every field has a default so
//! an empty or missing file still yields a usable configuration.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub models: ModelsConfig,
}

impl Config {
    /// Load configuration from `path` (if present) and the environment
    pub fn load(path: &str) -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(path).required(false))
            .add_source(
                ::config::Environment::with_prefix("WQ")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Telemetry provider (ThingSpeak-compatible last-value endpoint)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_url")]
    pub base_url: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default = "default_field_id")]
    pub field_id: String,
    #[serde(default)]
    pub read_api_key: String,
    /// JSON key holding the reading in the provider response
    #[serde(default = "default_value_field")]
    pub value_field: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            base_url: default_telemetry_url(),
            channel_id: String::new(),
            field_id: default_field_id(),
            read_api_key: String::new(),
            value_field: default_value_field(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Location of the pre-trained classifier artifacts
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelsConfig {
    #[serde(default = "default_models_dir")]
    pub dir: String,
    #[serde(default = "default_decision_tree_file")]
    pub decision_tree_file: String,
    #[serde(default = "default_knn_file")]
    pub knn_file: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            dir: default_models_dir(),
            decision_tree_file: default_decision_tree_file(),
            knn_file: default_knn_file(),
        }
    }
}

impl ModelsConfig {
    /// Model directory with `~` and `$VAR` expanded
    pub fn resolved_dir(&self) -> PathBuf {
        match shellexpand::full(&self.dir) {
            Ok(expanded) => PathBuf::from(expanded.as_ref()),
            Err(e) => {
                tracing::warn!("Cannot expand model dir {}: {}", self.dir, e);
                PathBuf::from(&self.dir)
            }
        }
    }

    pub fn decision_tree_path(&self) -> PathBuf {
        self.resolved_dir().join(&self.decision_tree_file)
    }

    pub fn knn_path(&self) -> PathBuf {
        self.resolved_dir().join(&self.knn_file)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_telemetry_url() -> String {
    "https://api.thingspeak.com".to_string()
}

fn default_field_id() -> String {
    "1".to_string()
}

fn default_value_field() -> String {
    "field1".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_models_dir() -> String {
    "models".to_string()
}

fn default_decision_tree_file() -> String {
    "decision_tree_model.json".to_string()
}

fn default_knn_file() -> String {
    "knn_model.json".to_string()
}
