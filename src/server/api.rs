use crate::cli::Args;
use crate::models::api::{ ChatRequest, ChatResponse, ErrorResponse, HealthResponse };
use crate::rag::{ RagEngine, RagEngineError };
use std::any::Any;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use axum::{
    routing::{ get, post },
    Router,
    Json,
    body::Bytes,
    extract::State,
    response::{ IntoResponse, Response },
    http::StatusCode,
};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{ Any as AnyOrigin, CorsLayer };
use log::{ info, warn, error };

pub const MESSAGE_REQUIRED: &str = "Message is required";
pub const INVALID_BODY: &str = "Invalid request body";
pub const PROCESSING_FAILED: &str = "Failed to process your request";

#[derive(Clone)]
pub struct AppState {
    pub rag: Arc<RagEngine>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(&'static str),

    #[error(transparent)]
    Rag(#[from] RagEngineError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                warn!("Rejected chat request: {}", msg);
                error_response(StatusCode::BAD_REQUEST, msg)
            }
            ApiError::Rag(e) => {
                error!("Chat API error: {}", e);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED)
            }
        }
    }
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    (status, Json(ErrorResponse { error: msg.to_string() })).into_response()
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Chat API panicked: {}", detail);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED)
}

/// CORS outermost so panic responses carry the allow-origin headers too.
fn with_layers<S: Clone + Send + Sync + 'static>(router: Router<S>) -> Router<S> {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    router.layer(ServiceBuilder::new().layer(cors).layer(CatchPanicLayer::custom(handle_panic)))
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/health", get(health_handler));

    with_layers(router).with_state(state)
}

pub async fn start_http_server(
    addr: &str,
    rag: Arc<RagEngine>,
    args: Args,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    let app = build_router(AppState { rag });

    match (args.enable_tls, args.tls_cert_path.as_deref(), args.tls_key_path.as_deref()) {
        (true, Some(cert_path), Some(key_path)) => {
            let _ = rustls::crypto::ring::default_provider().install_default();
            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                cert_path,
                key_path
            ).await?;

            let handle = axum_server::Handle::new();
            let shutdown = handle.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                shutdown.graceful_shutdown(Some(Duration::from_secs(10)));
            });

            info!("Starting HTTPS API server on: https://{}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service()).await?;
        }
        (true, _, _) => {
            return Err("ENABLE_TLS requires both TLS_CERT_PATH and TLS_KEY_PATH".into());
        }
        _ => {
            let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
                format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e)
            })?;
            info!("Starting HTTP API server on: http://{}", addr);
            axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
        }
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok".into() })
}

async fn chat_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    // Decoded regardless of Content-Type; browsers and curl often send text/plain.
    let req = serde_json::from_slice::<ChatRequest>(&body).map_err(|e| {
        warn!("Unreadable chat request body: {}", e);
        ApiError::BadRequest(INVALID_BODY)
    })?;

    let message = match req.message {
        Some(m) if !m.trim().is_empty() => m,
        _ => return Err(ApiError::BadRequest(MESSAGE_REQUIRED)),
    };

    let answer = state.rag.query_and_answer(&message).await?;
    Ok(Json(ChatResponse { answer }))
}
