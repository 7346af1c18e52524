//! Artifact rendering.
//!
//! # Design Decisions
//! - Renderers are pure: same entry set in, same bytes out
//! - Callers pass entries sorted by name; renderers never reorder
//! - The artifact is regenerated wholesale, never patched
//! - No validation against the external grammar; conflicting paths
//!   are emitted as-is and resolved by the external process

use crate::managed::error::RenderError;

/// Turns an ordered entry list into the external tool's native config.
pub trait Renderer<E>: Send + Sync {
    fn render(&self, entries: &[E]) -> Result<String, RenderError>;
}

/// Renders entries after sorting them by name.
pub fn render_sorted<E, R>(renderer: &R, entries: &[E]) -> Result<String, RenderError>
where
    E: crate::managed::ManagedEntry,
    R: Renderer<E> + ?Sized,
{
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| a.name().cmp(b.name()));
    renderer.render(&sorted)
}
