//! Route definition.

use serde::{Deserialize, Serialize};

use crate::managed::entry::{check_name, normalize_prefix, ManagedEntry};
use crate::managed::error::ValidationError;

/// A dynamic proxy route.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Route {
    /// Unique route name.
    #[serde(default)]
    pub name: String,

    /// Path prefix to match, e.g. `/myapp/`.
    #[serde(default)]
    pub path: String,

    /// Upstream URI, e.g. `http://service:8000`.
    #[serde(default)]
    pub target: String,

    /// Remove the path prefix before forwarding.
    #[serde(default)]
    pub strip_prefix: bool,
}

impl ManagedEntry for Route {
    const KIND: &'static str = "route";

    fn name(&self) -> &str {
        &self.name
    }

    fn normalize(mut self) -> Result<Self, ValidationError> {
        check_name(&self.name)?;
        if self.path.trim().is_empty() {
            return Err(ValidationError::missing("path"));
        }
        if self.target.trim().is_empty() {
            return Err(ValidationError::missing("target"));
        }
        if self.path.chars().any(|c| c.is_whitespace() || c == '{' || c == '}' || c == ';') {
            return Err(ValidationError::invalid(
                "path",
                "must not contain whitespace, braces or ';'",
            ));
        }
        if self.target.chars().any(|c| c.is_whitespace() || c == ';') {
            return Err(ValidationError::invalid(
                "target",
                "must not contain whitespace or ';'",
            ));
        }

        self.path = normalize_prefix(&self.path);
        Ok(self)
    }
}
