//! Error taxonomy for the managed configuration pipeline.

use std::path::PathBuf;
use thiserror::Error;

use crate::managed::manager::Stage;

/// Bad input. Returned before anything is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {reason}")]
pub struct ValidationError {
    /// Offending field (`name`, `path`, `target`, ...).
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn missing(field: &'static str) -> Self {
        Self {
            field,
            reason: "is required".to_string(),
        }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Failure reading or writing the persisted state file.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read state file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse state file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("failed to serialize state: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("failed to write state file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Rendering failed. Well-formed entries never trigger this.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to encode artifact: {0}")]
    Encode(String),

    #[error("render invariant violated: {0}")]
    Invariant(String),
}

/// The external process could not be reloaded.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}: {output}")]
    Command {
        program: String,
        status: String,
        output: String,
    },

    #[error("reload request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("reload endpoint {url} returned {status}: {body}")]
    Status { url: String, status: u16, body: String },
}

/// Errors surfaced by [`Manager`](crate::managed::Manager) mutations.
///
/// Reload failures are not in here: a mutation whose reload fails still
/// succeeds and carries the [`ReloadError`] as a warning.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("invalid {kind}: {source}")]
    Validation {
        kind: &'static str,
        source: ValidationError,
    },

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("persistence failed: {0}")]
    Persistence(#[from] StateError),

    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    #[error("failed to write artifact {path}: {source}")]
    Artifact {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ManagerError {
    /// The pipeline stage that did not complete.
    pub fn stage(&self) -> Stage {
        match self {
            ManagerError::Validation { .. } | ManagerError::NotFound { .. } => Stage::Validated,
            ManagerError::Persistence(_) => Stage::Persisted,
            ManagerError::Render(_) | ManagerError::Artifact { .. } => Stage::Rendered,
        }
    }

    /// Whether the in-memory store already holds the mutation.
    pub fn is_applied(&self) -> bool {
        !matches!(
            self,
            ManagerError::Validation { .. } | ManagerError::NotFound { .. }
        )
    }
}
