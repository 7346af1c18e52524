//! Dynamic external configuration subsystem.
//!
//! # Data Flow
//! ```text
//! Add / Remove request
//!     → entry.rs (validate & normalize)
//!     → store.rs (swap in a new snapshot of the entry map)
//!     → state.rs (write the full store to the state file)
//!     → render.rs (regenerate the native artifact, sorted by name)
//!     → reload.rs (ask the external process to re-read it)
//! ```
//!
//! # Design Decisions
//! - One pipeline lock spans mutation, persist, render and reload, so disk
//!   and artifact always follow the order mutations hit memory
//! - Readers load a snapshot and never wait on the pipeline
//! - Earlier stages are authoritative: a failed reload is reported as a
//!   warning on an otherwise applied mutation, never rolled back
//! - The same machinery serves every entry kind (routes, log sources)

pub mod entry;
pub mod error;
pub mod manager;
pub mod reload;
pub mod render;
pub mod state;
pub mod store;

pub use entry::ManagedEntry;
pub use error::{ManagerError, RenderError, ReloadError, StateError, ValidationError};
pub use manager::{Applied, Manager, Stage};
pub use reload::{CommandReload, HttpReload, NoReload, ReloadCoordinator};
pub use render::Renderer;
pub use state::StateFile;
pub use store::EntryStore;
