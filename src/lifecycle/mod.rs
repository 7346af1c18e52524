//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - A mutation already inside the manager pipeline runs to completion;
//!   shutdown only stops new requests from arriving

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
