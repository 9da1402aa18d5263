use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use daylog_core::CommitError;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{settings::ServerSettings, TriggerService};

#[derive(Debug)]
enum TriggerError {
    Commit(CommitError),
}

impl IntoResponse for TriggerError {
    fn into_response(self) -> Response {
        match self {
            TriggerError::Commit(err) => {
                let upstream = match &err {
                    CommitError::Remote(remote) => remote.status().map(|s| s.as_u16()),
                    CommitError::Config(_) => None,
                };
                tracing::error!(upstream_status = ?upstream, "log commit failed: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {err}")).into_response()
            }
        }
    }
}

pub fn router(service: TriggerService) -> Router {
    Router::new()
        .route("/", any(trigger))
        .route("/health", get(health))
        .layer(Extension(service))
        .layer(TraceLayer::new_for_http().on_failure(()))
}

pub async fn serve(service: TriggerService, settings: &ServerSettings) -> Result<()> {
    let ServerSettings { host, port, .. } = settings;

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid bind address {host}:{port}"))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind trigger endpoint to {addr}"))?;

    tracing::info!("daylog trigger listening on {addr}");

    axum::serve(listener, router(service).into_make_service())
        .await
        .context("HTTP server encountered an unrecoverable error")?;

    Ok(())
}

/// Any request to `/` is one invocation; method and body are ignored.
async fn trigger(Extension(service): Extension<TriggerService>) -> Result<Response, TriggerError> {
    let report = service.run_once().await.map_err(TriggerError::Commit)?;

    tracing::info!(
        commit = report.commit_sha.as_deref().unwrap_or("-"),
        "Successfully {} {} at {}.",
        report.action,
        report.path,
        report.timestamp
    );

    Ok((StatusCode::OK, report.to_string()).into_response())
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
    }))
}
