//! Reverse-proxy routes.
//!
//! # Data Flow
//! ```text
//! Route { name, path, target, strip_prefix }
//!     → route.rs (validate, normalize path to /…/)
//!     → managed::Manager (store, state file)
//!     → nginx.rs (one `location` block per route)
//!     → nginx reload
//! ```

pub mod nginx;
pub mod route;

pub use nginx::NginxRenderer;
pub use route::Route;
