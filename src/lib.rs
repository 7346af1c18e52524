//! Dynamic external configuration manager.
//!
//! Keeps named reverse-proxy routes and log-ingestion sources, persists them,
//! renders them into nginx and promtail configuration, and reloads those
//! processes after every change.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod logsources;
pub mod managed;
pub mod observability;
pub mod routes;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use logsources::LogSource;
pub use managed::{Applied, Manager, ManagerError};
pub use routes::Route;
