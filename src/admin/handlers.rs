use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::logsources::LogSource;
use crate::managed::{Applied, ManagedEntry, Manager};
use crate::routes::Route;

/// Naming and wiring of an entry kind on the REST surface.
pub trait ApiEntry: ManagedEntry {
    /// Key of the list in collection responses.
    const COLLECTION: &'static str;
    /// Key of a single entry in mutation responses.
    const SINGULAR: &'static str;
    /// Capitalized kind for messages.
    const LABEL: &'static str;
    /// External process that gets reloaded.
    const PROCESS: &'static str;

    fn manager(state: &AppState) -> Arc<Manager<Self>>;
}

impl ApiEntry for Route {
    const COLLECTION: &'static str = "routes";
    const SINGULAR: &'static str = "route";
    const LABEL: &'static str = "Route";
    const PROCESS: &'static str = "nginx";

    fn manager(state: &AppState) -> Arc<Manager<Self>> {
        state.routes.clone()
    }
}

impl ApiEntry for LogSource {
    const COLLECTION: &'static str = "sources";
    const SINGULAR: &'static str = "source";
    const LABEL: &'static str = "Log source";
    const PROCESS: &'static str = "promtail";

    fn manager(state: &AppState) -> Arc<Manager<Self>> {
        state.sources.clone()
    }
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub routes: usize,
    pub sources: usize,
}

pub async fn get_health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        routes: state.routes.len(),
        sources: state.sources.len(),
    })
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Internal(e.to_string()))
}

/// Success body for a mutation, with the reload warning if any.
fn applied_body<E: ApiEntry>(
    applied: &Applied<E>,
    done: &str,
    extra: (&str, Value),
) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("ok".into(), Value::Bool(true));
    match &applied.reload_warning {
        None => {
            body.insert(
                "message".into(),
                Value::String(format!("{} {} and {} reloaded", E::LABEL, done, E::PROCESS)),
            );
        }
        Some(e) => {
            body.insert(
                "message".into(),
                Value::String(format!("{} {}", E::LABEL, done)),
            );
            body.insert(
                "warning".into(),
                Value::String(format!(
                    "Config saved but {} reload failed: {}",
                    E::PROCESS,
                    e
                )),
            );
        }
    }
    body.insert(extra.0.into(), extra.1);
    body
}

pub async fn list_entries<E: ApiEntry>(
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let entries = E::manager(&state).list();
    let mut body = Map::new();
    body.insert("count".into(), Value::from(entries.len()));
    body.insert(E::COLLECTION.into(), to_value(&entries)?);
    Ok(Json(Value::Object(body)))
}

pub async fn get_entry<E: ApiEntry>(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<E>, ApiError> {
    E::manager(&state)
        .get(&name)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("{} not found: {}", E::LABEL, name)))
}

pub async fn add_entry<E: ApiEntry>(
    State(state): State<AppState>,
    payload: Result<Json<E>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(entry) = payload?;
    let manager = E::manager(&state);

    let applied = tokio::task::spawn_blocking(move || manager.add(entry)).await??;

    let entry = to_value(&applied.entry)?;
    let body = applied_body(&applied, "added", (E::SINGULAR, entry));
    Ok((StatusCode::CREATED, Json(Value::Object(body))))
}

pub async fn remove_entry<E: ApiEntry>(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let manager = E::manager(&state);
    let applied = tokio::task::spawn_blocking(move || manager.remove(&name)).await??;

    let deleted = Value::String(applied.entry.name().to_string());
    let body = applied_body(&applied, "deleted", ("deleted", deleted));
    Ok(Json(Value::Object(body)))
}

pub async fn reload_process<E: ApiEntry>(
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let manager = E::manager(&state);
    tokio::task::spawn_blocking(move || manager.reload()).await??;

    Ok(Json(json!({
        "ok": true,
        "message": format!("{} reloaded", E::PROCESS),
    })))
}
