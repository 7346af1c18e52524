//! Log-ingestion sources.
//!
//! # Data Flow
//! ```text
//! LogSource { name, path (glob), job, labels, multiline }
//!     → source.rs (validate)
//!     → managed::Manager (store, state file)
//!     → promtail.rs (complete promtail config, one scrape config per source)
//!     → promtail reload endpoint
//! ```

pub mod promtail;
pub mod source;

pub use promtail::PromtailRenderer;
pub use source::{LogSource, Multiline};
