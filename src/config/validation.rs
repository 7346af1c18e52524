//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, URLs and reload commands
//! - Detect managers writing over each other's files
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<InvalidSetting>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::config::schema::{AppConfig, ReloadConfig};

/// A single rejected setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSetting {
    pub field: String,
    pub message: String,
}

impl InvalidSetting {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for InvalidSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<InvalidSetting>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(InvalidSetting::new(
            "listener.bind_address",
            format!("not a socket address: {}", config.listener.bind_address),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(InvalidSetting::new("listener.request_timeout_secs", "must be > 0"));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(InvalidSetting::new("listener.max_body_bytes", "must be > 0"));
    }

    if matches!(&config.admin.api_key, Some(key) if key.trim().is_empty()) {
        errors.push(InvalidSetting::new("admin.api_key", "must not be empty when set"));
    }

    let files: [(&str, &PathBuf); 4] = [
        ("routes.state_path", &config.routes.state_path),
        ("routes.artifact_path", &config.routes.artifact_path),
        ("log_sources.state_path", &config.log_sources.state_path),
        ("log_sources.artifact_path", &config.log_sources.artifact_path),
    ];
    for (i, (field, path)) in files.iter().enumerate() {
        if path.as_os_str().is_empty() {
            errors.push(InvalidSetting::new(*field, "must not be empty"));
            continue;
        }
        for (other_field, other) in files.iter().skip(i + 1) {
            if path == other {
                errors.push(InvalidSetting::new(
                    *field,
                    format!("same file as {}", other_field),
                ));
            }
        }
    }

    validate_reload("routes.reload", &config.routes.reload, &mut errors);
    validate_reload("log_sources.reload", &config.log_sources.reload, &mut errors);

    if config.log_sources.promtail.client_url.parse::<url::Url>().is_err() {
        errors.push(InvalidSetting::new(
            "log_sources.promtail.client_url",
            "not a valid URL",
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(InvalidSetting::new(
            "observability.metrics_address",
            format!("not a socket address: {}", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_reload(field: &str, reload: &ReloadConfig, errors: &mut Vec<InvalidSetting>) {
    match reload {
        ReloadConfig::Command { program, .. } => {
            if program.trim().is_empty() {
                errors.push(InvalidSetting::new(
                    format!("{}.program", field),
                    "must not be empty",
                ));
            }
        }
        ReloadConfig::Http {
            url,
            method,
            timeout_secs,
        } => {
            match url.parse::<url::Url>() {
                Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
                _ => errors.push(InvalidSetting::new(
                    format!("{}.url", field),
                    format!("not an http(s) URL: {}", url),
                )),
            }
            if reqwest::Method::from_bytes(method.to_ascii_uppercase().as_bytes()).is_err() {
                errors.push(InvalidSetting::new(
                    format!("{}.method", field),
                    format!("invalid HTTP method: {}", method),
                ));
            }
            if *timeout_secs == 0 {
                errors.push(InvalidSetting::new(
                    format!("{}.timeout_secs", field),
                    "must be > 0",
                ));
            }
        }
        ReloadConfig::None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "nope".into();
        config.log_sources.artifact_path = config.routes.state_path.clone();
        config.routes.reload = ReloadConfig::Command {
            program: "".into(),
            args: vec![],
        };
        config.log_sources.reload = ReloadConfig::Http {
            url: "ftp://promtail/reload".into(),
            method: "POST".into(),
            timeout_secs: 0,
        };

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"listener.bind_address"));
        assert!(fields.contains(&"routes.state_path"));
        assert!(fields.contains(&"routes.reload.program"));
        assert!(fields.contains(&"log_sources.reload.url"));
        assert!(fields.contains(&"log_sources.reload.timeout_secs"));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = AppConfig::default();
        config.observability.metrics_address = "bad".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let mut config = AppConfig::default();
        config.admin.api_key = Some(" ".into());
        assert_eq!(validate_config(&config).unwrap_err()[0].field, "admin.api_key");
    }
}
