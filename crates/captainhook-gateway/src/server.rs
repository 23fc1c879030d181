use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use captainhook_runtime::{ErrorCategory, HookError, HookOutcome, HookRequest, HookService};
use futures_util::TryStreamExt;
use tokio_util::io::StreamReader;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::auth::extract_credential;
use crate::types::{HealthResponse, UNAUTHORIZED_BODY};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<HookService>,
}

impl AppState {
    pub fn new(service: HookService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // A runbook may itself be called "health"; only GET is reserved
        .route("/health", get(health_check).post(health_hook_handler))
        .route("/{id}", post(hook_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve hooks on `listen_addr` until Ctrl+C
pub async fn start_server(state: AppState, listen_addr: &str) -> anyhow::Result<()> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!(addr = %listener.local_addr()?, "Listening for webhooks");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C, running until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections...");
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn hook_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
) -> Response {
    run_hook(state, id, addr, request).await
}

async fn health_hook_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
) -> Response {
    run_hook(state, "health".to_string(), addr, request).await
}

async fn run_hook(state: AppState, id: String, addr: SocketAddr, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let credential = extract_credential(&parts.headers);
    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| (name.as_str().to_string(), value.as_bytes().to_vec()))
        .collect();
    let body = StreamReader::new(body.into_data_stream().map_err(io::Error::other));

    let outcome = state
        .service
        .handle(HookRequest {
            id: id.clone(),
            remote: addr.ip().to_canonical(),
            headers,
            credential,
            body,
        })
        .await;

    match outcome {
        Ok(HookOutcome::Detached) => StatusCode::OK.into_response(),
        Ok(HookOutcome::Completed { .. }) if !state.service.echo() => StatusCode::OK.into_response(),
        Ok(HookOutcome::Completed { response, .. }) => {
            info!(hook = %id, address = %addr, "Writing hook response");
            match serde_json::to_string_pretty(&response) {
                Ok(json) => (StatusCode::OK, [(CONTENT_TYPE, "application/json")], json).into_response(),
                Err(e) => {
                    error!(hook = %id, error = %e, "Error generating response json");
                    StatusCode::OK.into_response()
                }
            }
        }
        Err(e) => error_response(&e),
    }
}

fn error_response(err: &HookError) -> Response {
    match err.category() {
        ErrorCategory::Unauthorized => (StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY).into_response(),
        ErrorCategory::ServerError => {
            (StatusCode::INTERNAL_SERVER_ERROR, format!("{err}\n")).into_response()
        }
    }
}
