//! Reload coordination with external processes.
//!
//! # Responsibilities
//! - Tell the external process to re-read its rendered configuration
//! - Carry the process' diagnostic output back on failure
//!
//! # Design Decisions
//! - One-method capability so tests can substitute a recording fake
//! - Blocking calls; the manager runs them on a blocking thread
//! - No retry and no timeout beyond what the transport enforces

use std::process::Command;
use std::time::Duration;

use crate::managed::error::ReloadError;

/// Capability to trigger a live reload of an external process.
pub trait ReloadCoordinator: Send + Sync {
    fn signal(&self) -> Result<(), ReloadError>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Runs a local administrative command, e.g. `nginx -s reload`.
#[derive(Debug, Clone)]
pub struct CommandReload {
    program: String,
    args: Vec<String>,
}

impl CommandReload {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl ReloadCoordinator for CommandReload {
    fn signal(&self) -> Result<(), ReloadError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|source| ReloadError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Err(ReloadError::Command {
            program: self.program.clone(),
            status: output.status.to_string(),
            output: combined.trim().to_string(),
        })
    }

    fn describe(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Calls an administrative HTTP endpoint, e.g. promtail's `/reload`.
#[derive(Debug, Clone)]
pub struct HttpReload {
    url: String,
    method: reqwest::Method,
    timeout: Duration,
}

impl HttpReload {
    pub fn new(url: impl Into<String>, method: reqwest::Method, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            method,
            timeout,
        }
    }
}

impl ReloadCoordinator for HttpReload {
    fn signal(&self) -> Result<(), ReloadError> {
        // Built per call: a blocking client must not be created or dropped
        // on an async worker thread.
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|source| ReloadError::Request {
                url: self.url.clone(),
                source,
            })?;

        let response = client
            .request(self.method.clone(), &self.url)
            .send()
            .map_err(|source| ReloadError::Request {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        Err(ReloadError::Status {
            url: self.url.clone(),
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }

    fn describe(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

/// Reloading disabled; the external process is expected to pick up changes
/// on its own (or not at all).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReload;

impl ReloadCoordinator for NoReload {
    fn signal(&self) -> Result<(), ReloadError> {
        Ok(())
    }

    fn describe(&self) -> String {
        "disabled".to_string()
    }
}
