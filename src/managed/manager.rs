//! Single entry point over store, state file, renderer and reloader.
//!
//! # Responsibilities
//! - Validate and normalize incoming entries
//! - Apply upserts and removals to the store
//! - Run persist → render → reload after every mutation
//!
//! # Design Decisions
//! - `pipeline` is held from mutation through reload, so concurrent callers
//!   reach the disk and the external process in the order they hit memory
//! - `list`/`get` read a store snapshot and never take `pipeline`
//! - A failed stage stops the pipeline; the store keeps the mutation
//! - Reload failure is a warning on a successful result, never an error
//! - All calls are blocking; async callers use `spawn_blocking`

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::managed::entry::ManagedEntry;
use crate::managed::error::{ManagerError, ReloadError, StateError};
use crate::managed::reload::ReloadCoordinator;
use crate::managed::render::{render_sorted, Renderer};
use crate::managed::state::{write_atomic, StateFile};
use crate::managed::store::EntryStore;
use crate::observability::metrics;

/// Progress of a single mutation through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Requested,
    Validated,
    Mutated,
    Persisted,
    Rendered,
    Reloaded,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Requested => "requested",
            Stage::Validated => "validated",
            Stage::Mutated => "mutated",
            Stage::Persisted => "persisted",
            Stage::Rendered => "rendered",
            Stage::Reloaded => "reloaded",
        };
        f.write_str(s)
    }
}

/// A mutation that reached the state file and the artifact.
#[derive(Debug)]
pub struct Applied<E> {
    /// The stored (normalized) entry, or the removed one.
    pub entry: E,
    /// Set when the external process could not be reloaded.
    pub reload_warning: Option<ReloadError>,
}

impl<E> Applied<E> {
    /// Last stage that completed.
    pub fn stage(&self) -> Stage {
        if self.reload_warning.is_some() {
            Stage::Rendered
        } else {
            Stage::Reloaded
        }
    }
}

/// Manages one kind of entry end to end.
pub struct Manager<E: ManagedEntry> {
    store: EntryStore<E>,
    state: StateFile,
    artifact_path: PathBuf,
    renderer: Box<dyn Renderer<E>>,
    reloader: Arc<dyn ReloadCoordinator>,
    pipeline: Mutex<()>,
}

impl<E: ManagedEntry> Manager<E> {
    /// Open a manager, restoring entries from the state file.
    pub fn open(
        state: StateFile,
        artifact_path: impl Into<PathBuf>,
        renderer: impl Renderer<E> + 'static,
        reloader: Arc<dyn ReloadCoordinator>,
    ) -> Result<Self, StateError> {
        let entries: Vec<E> = state.load()?;
        let store = EntryStore::from_entries(entries);
        let artifact_path = artifact_path.into();

        tracing::info!(
            kind = E::KIND,
            entries = store.len(),
            state = %state.path().display(),
            artifact = %artifact_path.display(),
            reload = %reloader.describe(),
            "Manager ready"
        );
        metrics::record_entries(E::KIND, store.len());

        Ok(Self {
            store,
            state,
            artifact_path,
            renderer: Box::new(renderer),
            reloader,
            pipeline: Mutex::new(()),
        })
    }

    /// All entries, sorted by name.
    pub fn list(&self) -> Vec<E> {
        self.store.list()
    }

    pub fn get(&self, name: &str) -> Option<E> {
        self.store.get(name)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    pub fn state_path(&self) -> &Path {
        self.state.path()
    }

    /// Insert or overwrite an entry and push it out.
    pub fn add(&self, entry: E) -> Result<Applied<E>, ManagerError> {
        let entry = entry.normalize().map_err(|source| {
            metrics::record_mutation(E::KIND, "add", "invalid");
            ManagerError::Validation {
                kind: E::KIND,
                source,
            }
        })?;

        let _guard = self.lock_pipeline();

        let replaced = self.store.upsert(entry.clone()).is_some();
        tracing::info!(kind = E::KIND, name = %entry.name(), replaced, stage = %Stage::Mutated, "Entry stored");

        let result = self.run_pipeline(entry.name());
        self.finish("add", entry, result)
    }

    /// Delete an entry by name and push the change out.
    pub fn remove(&self, name: &str) -> Result<Applied<E>, ManagerError> {
        let _guard = self.lock_pipeline();

        let removed = self.store.remove(name).ok_or_else(|| {
            metrics::record_mutation(E::KIND, "remove", "not_found");
            ManagerError::NotFound {
                kind: E::KIND,
                name: name.to_string(),
            }
        })?;
        tracing::info!(kind = E::KIND, name = %name, stage = %Stage::Mutated, "Entry removed");

        let result = self.run_pipeline(name);
        self.finish("remove", removed, result)
    }

    /// Re-trigger only the reload step.
    pub fn reload(&self) -> Result<(), ReloadError> {
        let _guard = self.lock_pipeline();
        self.signal()
    }

    /// Re-render the artifact from the current store without reloading.
    pub fn regenerate(&self) -> Result<(), ManagerError> {
        let _guard = self.lock_pipeline();
        self.write_artifact(&self.store.list())
    }

    fn lock_pipeline(&self) -> MutexGuard<'_, ()> {
        self.pipeline.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persist, render and reload. Caller holds the pipeline lock.
    fn run_pipeline(&self, name: &str) -> Result<Option<ReloadError>, ManagerError> {
        let entries = self.store.list();

        self.state.save(&entries).map_err(|e| {
            tracing::error!(kind = E::KIND, name = %name, stage = %Stage::Persisted, error = %e, "State write failed");
            ManagerError::from(e)
        })?;

        self.write_artifact(&entries)?;

        match self.signal() {
            Ok(()) => Ok(None),
            Err(e) => {
                tracing::warn!(
                    kind = E::KIND,
                    name = %name,
                    stage = %Stage::Reloaded,
                    error = %e,
                    "Reload failed; state and artifact are current, process is stale"
                );
                Ok(Some(e))
            }
        }
    }

    fn write_artifact(&self, entries: &[E]) -> Result<(), ManagerError> {
        let artifact = render_sorted(self.renderer.as_ref(), entries).map_err(|e| {
            tracing::error!(kind = E::KIND, stage = %Stage::Rendered, error = %e, "Render failed");
            ManagerError::from(e)
        })?;

        write_atomic(&self.artifact_path, artifact.as_bytes()).map_err(|source| {
            tracing::error!(
                kind = E::KIND,
                path = %self.artifact_path.display(),
                stage = %Stage::Rendered,
                error = %source,
                "Artifact write failed"
            );
            ManagerError::Artifact {
                path: self.artifact_path.clone(),
                source,
            }
        })?;

        tracing::debug!(kind = E::KIND, entries = entries.len(), bytes = artifact.len(), "Artifact rendered");
        Ok(())
    }

    fn signal(&self) -> Result<(), ReloadError> {
        let result = self.reloader.signal();
        metrics::record_reload(E::KIND, result.is_ok());
        if result.is_ok() {
            tracing::info!(kind = E::KIND, reload = %self.reloader.describe(), "External process reloaded");
        }
        result
    }

    fn finish(
        &self,
        op: &'static str,
        entry: E,
        result: Result<Option<ReloadError>, ManagerError>,
    ) -> Result<Applied<E>, ManagerError> {
        metrics::record_entries(E::KIND, self.store.len());
        match result {
            Ok(reload_warning) => {
                let outcome = if reload_warning.is_some() { "reload_failed" } else { "ok" };
                metrics::record_mutation(E::KIND, op, outcome);
                Ok(Applied {
                    entry,
                    reload_warning,
                })
            }
            Err(e) => {
                metrics::record_mutation(E::KIND, op, "failed");
                Err(e)
            }
        }
    }
}
