//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use forge_confd::config::{ListenerConfig, PromtailConfig};
use forge_confd::http::{build_router, AppState};
use forge_confd::logsources::{LogSource, PromtailRenderer};
use forge_confd::managed::{Manager, ReloadCoordinator, ReloadError, StateFile};
use forge_confd::routes::{NginxRenderer, Route};

/// Reload fake that counts invocations and can be told to fail.
#[derive(Default)]
pub struct RecordingReload {
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl RecordingReload {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl ReloadCoordinator for RecordingReload {
    fn signal(&self) -> Result<(), ReloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ReloadError::Status {
                url: "http://fake/reload".into(),
                status: 503,
                body: "reload rejected".into(),
            });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "recording".into()
    }
}

pub fn route(name: &str, path: &str, target: &str, strip_prefix: bool) -> Route {
    Route {
        name: name.into(),
        path: path.into(),
        target: target.into(),
        strip_prefix,
    }
}

pub fn source(name: &str, path: &str) -> LogSource {
    LogSource {
        name: name.into(),
        path: path.into(),
        job: None,
        labels: Default::default(),
        multiline: None,
    }
}

pub fn route_manager(dir: &Path, reload: Arc<RecordingReload>) -> Manager<Route> {
    Manager::open(
        StateFile::new(dir.join("routes.yaml")),
        dir.join("nginx/routes.conf"),
        NginxRenderer,
        reload,
    )
    .unwrap()
}

pub fn source_manager(dir: &Path, reload: Arc<RecordingReload>) -> Manager<LogSource> {
    Manager::open(
        StateFile::new(dir.join("logsources.yaml")),
        dir.join("promtail/promtail.yaml"),
        PromtailRenderer::new(PromtailConfig::default()),
        reload,
    )
    .unwrap()
}

pub struct TestApp {
    pub router: axum::Router,
    pub state: AppState,
    pub route_reload: Arc<RecordingReload>,
    pub source_reload: Arc<RecordingReload>,
}

pub fn test_app(dir: &Path, api_key: Option<&str>) -> TestApp {
    let route_reload = Arc::new(RecordingReload::default());
    let source_reload = Arc::new(RecordingReload::default());
    let state = AppState::new(
        Arc::new(route_manager(dir, route_reload.clone())),
        Arc::new(source_manager(dir, source_reload.clone())),
        api_key.map(str::to_string),
    );
    let router = build_router(&ListenerConfig::default(), state.clone());
    TestApp {
        router,
        state,
        route_reload,
        source_reload,
    }
}
