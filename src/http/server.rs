//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the admin handlers
//! - Wire up middleware (tracing, timeout, body limit, request ID, metrics)
//! - Bind server to listener and shut down gracefully

use axum::{
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::ListenerConfig;
use crate::http::request::{MakeForgeRequestId, X_REQUEST_ID};
use crate::lifecycle::Shutdown;
use crate::logsources::LogSource;
use crate::managed::Manager;
use crate::observability::metrics;
use crate::routes::Route;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<Manager<Route>>,
    pub sources: Arc<Manager<LogSource>>,
    /// Bearer token required on `/api/v1` calls when set.
    pub api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        routes: Arc<Manager<Route>>,
        sources: Arc<Manager<LogSource>>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            routes,
            sources,
            api_key: api_key.map(Arc::from),
        }
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &ListenerConfig, state: AppState) -> Router {
    setup_admin_router(state)
        .layer(middleware::from_fn(track_requests))
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeForgeRequestId))
}

async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16());
    response
}

/// HTTP server for the management API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &ListenerConfig, state: AppState) -> Self {
        Self {
            router: build_router(config, state),
        }
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(Shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
