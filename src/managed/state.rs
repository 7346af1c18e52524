//! Durable state file.
//!
//! # Responsibilities
//! - Restore the entry set on startup
//! - Write the full entry set after every mutation
//!
//! # Design Decisions
//! - YAML document shaped `{ entries: [...] }`, entries sorted by name
//! - A missing (or empty) file is an empty store, not an error
//! - Writes go to a sibling temp file which is synced and renamed over the
//!   target, so a crash never leaves a half-written document behind

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::managed::entry::ManagedEntry;
use crate::managed::error::StateError;

#[derive(Debug, Serialize, Deserialize)]
#[serde(bound(deserialize = "E: serde::de::DeserializeOwned"))]
struct StateDocument<E> {
    #[serde(default, alias = "routes", alias = "sources")]
    entries: Vec<E>,
}

/// Handle on the state file of one entry kind.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all persisted entries.
    pub fn load<E: ManagedEntry>(&self) -> Result<Vec<E>, StateError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), kind = E::KIND, "No state file, starting empty");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StateError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let doc: StateDocument<E> =
            serde_yaml::from_str(&content).map_err(|source| StateError::Parse {
                path: self.path.clone(),
                source,
            })?;

        tracing::info!(
            path = %self.path.display(),
            kind = E::KIND,
            count = doc.entries.len(),
            "Loaded state file"
        );
        Ok(doc.entries)
    }

    /// Replace the file with the given entries.
    pub fn save<E: ManagedEntry>(&self, entries: &[E]) -> Result<(), StateError> {
        let mut sorted = entries.to_vec();
        sorted.sort_by(|a, b| a.name().cmp(b.name()));

        let doc = StateDocument { entries: sorted };
        let data = serde_yaml::to_string(&doc)?;

        write_atomic(&self.path, data.as_bytes()).map_err(|source| StateError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), kind = E::KIND, count = entries.len(), "Saved state file");
        Ok(())
    }
}

/// Write `data` to `path` through a temp file and rename.
///
/// Parent directories are created as needed.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let result = (|| {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}
