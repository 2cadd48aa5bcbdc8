use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use app_exporter_collector::CollectorSet;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

mod server_bootstrap;
mod types;

pub use server_bootstrap::{build_exporter_router, run_exporter_server};
use types::ExporterApiError;

pub const METRICS_ENDPOINT: &str = "/metrics";
pub const HEALTHZ_ENDPOINT: &str = "/healthz";
pub const VERSION_ENDPOINT: &str = "/";
pub const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Static identity served on the version endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDocument {
    pub name: String,
    pub description: String,
    pub source: String,
    pub version: String,
    pub git_sha: String,
}

impl Default for VersionDocument {
    fn default() -> Self {
        Self {
            name: "app-exporter".to_string(),
            description: "Exports status metrics for managed apps and app-operator readiness."
                .to_string(),
            source: "https://github.com/giantswarm/app-exporter".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            git_sha: option_env!("APP_EXPORTER_GIT_SHA")
                .unwrap_or("n/a")
                .to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExporterServerConfig {
    pub bind: String,
    pub version: VersionDocument,
}

/// Shared, read-only state behind every request.
pub struct ExporterServerState {
    collectors: CollectorSet,
    version: VersionDocument,
}

impl ExporterServerState {
    pub fn new(collectors: CollectorSet, version: VersionDocument) -> Self {
        Self {
            collectors,
            version,
        }
    }
}

async fn handle_metrics(
    State(state): State<Arc<ExporterServerState>>,
) -> Result<Response, ExporterApiError> {
    let collection = state
        .collectors
        .collect()
        .await
        .map_err(ExporterApiError::collection)?;
    let body = collection.render().map_err(ExporterApiError::collection)?;
    Ok(([(CONTENT_TYPE, METRICS_CONTENT_TYPE)], body).into_response())
}

async fn handle_healthz() -> &'static str {
    "ok"
}

async fn handle_version(State(state): State<Arc<ExporterServerState>>) -> Json<VersionDocument> {
    Json(state.version.clone())
}
