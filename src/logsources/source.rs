//! Log source definition.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::managed::entry::{check_name, ManagedEntry};
use crate::managed::error::ValidationError;

/// A set of log files to ship, with the labels attached to their lines.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogSource {
    #[serde(default)]
    pub name: String,

    /// Absolute filesystem glob, e.g. `/var/log/app/*.log`.
    #[serde(default)]
    pub path: String,

    /// `job` label. Defaults to the source name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiline: Option<Multiline>,
}

/// Joins continuation lines onto the line matching `first_line`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Multiline {
    /// Regex matching the first line of an entry.
    pub first_line: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<u32>,
}

impl LogSource {
    /// The `job` label value used when rendering.
    pub fn job_name(&self) -> &str {
        self.job.as_deref().unwrap_or(&self.name)
    }
}

fn is_label_name(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl ManagedEntry for LogSource {
    const KIND: &'static str = "log source";

    fn name(&self) -> &str {
        &self.name
    }

    fn normalize(mut self) -> Result<Self, ValidationError> {
        check_name(&self.name)?;
        if self.path.trim().is_empty() {
            return Err(ValidationError::missing("path"));
        }
        if !self.path.starts_with('/') {
            return Err(ValidationError::invalid("path", "must be an absolute path"));
        }

        if matches!(self.job.as_deref(), Some(j) if j.trim().is_empty()) {
            self.job = None;
        }

        for key in self.labels.keys() {
            if !is_label_name(key) {
                return Err(ValidationError::invalid(
                    "labels",
                    format!("invalid label name {:?}", key),
                ));
            }
            if key.starts_with("__") || key == "job" {
                return Err(ValidationError::invalid(
                    "labels",
                    format!("label {:?} is reserved", key),
                ));
            }
        }

        if let Some(multiline) = &self.multiline {
            if multiline.first_line.is_empty() {
                return Err(ValidationError::missing("multiline.first_line"));
            }
            if multiline.max_lines == Some(0) {
                return Err(ValidationError::invalid(
                    "multiline.max_lines",
                    "must be greater than zero",
                ));
            }
        }

        Ok(self)
    }
}
