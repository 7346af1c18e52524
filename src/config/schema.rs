//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::managed::{CommandReload, HttpReload, NoReload, ReloadCoordinator};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// REST listener settings.
    pub listener: ListenerConfig,

    /// Access control for the REST surface.
    pub admin: AdminConfig,

    /// Reverse-proxy route management.
    pub routes: RoutesConfig,

    /// Log source management.
    pub log_sources: LogSourcesConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds. Covers the reload call.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 60,
            max_body_bytes: 1 << 20,
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Bearer token required on every call when set.
    pub api_key: Option<String>,
}

/// Route manager configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Persisted routes (YAML).
    pub state_path: PathBuf,

    /// Generated nginx include file.
    pub artifact_path: PathBuf,

    /// Re-render the artifact from the state file at startup.
    pub render_on_start: bool,

    /// How nginx is told to reload.
    pub reload: ReloadConfig,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("data/routes.yaml"),
            artifact_path: PathBuf::from("data/nginx/routes.conf"),
            render_on_start: true,
            reload: ReloadConfig::Command {
                program: "docker".to_string(),
                args: ["exec", "forge-nginx", "nginx", "-s", "reload"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
        }
    }
}

/// Log source manager configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSourcesConfig {
    /// Persisted log sources (YAML).
    pub state_path: PathBuf,

    /// Generated promtail config file.
    pub artifact_path: PathBuf,

    /// Re-render the artifact from the state file at startup.
    pub render_on_start: bool,

    /// How promtail is told to reload.
    pub reload: ReloadConfig,

    /// Static parts of the generated promtail config.
    pub promtail: PromtailConfig,
}

impl Default for LogSourcesConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("data/logsources.yaml"),
            artifact_path: PathBuf::from("data/promtail/promtail.yaml"),
            render_on_start: true,
            reload: ReloadConfig::Http {
                url: "http://promtail:9080/reload".to_string(),
                method: default_reload_method(),
                timeout_secs: default_reload_timeout_secs(),
            },
            promtail: PromtailConfig::default(),
        }
    }
}

/// Promtail settings that are not per-source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PromtailConfig {
    pub http_listen_port: u16,
    pub grpc_listen_port: u16,
    pub positions_file: String,
    /// Loki push endpoint.
    pub client_url: String,
}

impl Default for PromtailConfig {
    fn default() -> Self {
        Self {
            http_listen_port: 9080,
            grpc_listen_port: 0,
            positions_file: "/tmp/positions.yaml".to_string(),
            client_url: "http://loki:3100/loki/api/v1/push".to_string(),
        }
    }
}

/// Reload action for an external process.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReloadConfig {
    /// Run a local command.
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },

    /// Call an administrative HTTP endpoint.
    Http {
        url: String,
        #[serde(default = "default_reload_method")]
        method: String,
        #[serde(default = "default_reload_timeout_secs")]
        timeout_secs: u64,
    },

    /// Do not reload.
    None,
}

fn default_reload_method() -> String {
    "POST".to_string()
}

fn default_reload_timeout_secs() -> u64 {
    10
}

impl ReloadConfig {
    /// Build the coordinator. Assumes the config passed validation.
    pub fn coordinator(&self) -> Arc<dyn ReloadCoordinator> {
        match self {
            ReloadConfig::Command { program, args } => {
                Arc::new(CommandReload::new(program.clone(), args.clone()))
            }
            ReloadConfig::Http {
                url,
                method,
                timeout_secs,
            } => {
                let method = reqwest::Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                    .unwrap_or(reqwest::Method::POST);
                Arc::new(HttpReload::new(
                    url.clone(),
                    method,
                    Duration::from_secs(*timeout_secs),
                ))
            }
            ReloadConfig::None => Arc::new(NoReload),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    pub log_level: String,

    /// Emit JSON log lines instead of the human format.
    pub json: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
