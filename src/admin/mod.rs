//! REST surface for the managers.
//!
//! # Endpoints
//! ```text
//! GET    /api/v1/health
//! GET    /api/v1/routes                 POST /api/v1/routes
//! GET    /api/v1/routes/{name}          DELETE /api/v1/routes/{name}
//! POST   /api/v1/routes/reload
//! GET    /api/v1/logs/sources           POST /api/v1/logs/sources
//! GET    /api/v1/logs/sources/{name}    DELETE /api/v1/logs/sources/{name}
//! POST   /api/v1/logs/sources/reload
//! ```

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;
use crate::logsources::LogSource;
use crate::routes::Route;

pub fn setup_admin_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/v1/routes", get(list_entries::<Route>).post(add_entry::<Route>))
        .route("/api/v1/routes/reload", post(reload_process::<Route>))
        .route(
            "/api/v1/routes/{name}",
            get(get_entry::<Route>).delete(remove_entry::<Route>),
        )
        .route(
            "/api/v1/logs/sources",
            get(list_entries::<LogSource>).post(add_entry::<LogSource>),
        )
        .route("/api/v1/logs/sources/reload", post(reload_process::<LogSource>))
        .route(
            "/api/v1/logs/sources/{name}",
            get(get_entry::<LogSource>).delete(remove_entry::<LogSource>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    Router::new()
        .route("/api/v1/health", get(get_health))
        .merge(api)
        .with_state(state)
}
