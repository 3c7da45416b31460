//! Application startup and lifecycle management.

use crate::config::BfhlConfig;
use crate::dtos::Envelope;
use crate::handlers::{bfhl, health_check, metrics::metrics as metrics_handler, not_found};
use crate::services::providers::gemini::GeminiTextProvider;
use crate::services::providers::TextProvider;
use crate::services::{AiDelegate, Dispatcher};
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BfhlConfig>,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(config: BfhlConfig, provider: Arc<dyn TextProvider>) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher: Dispatcher::new(AiDelegate::new(provider)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(health_check).fallback(not_found))
        .route("/bfhl", post(bfhl).fallback(not_found))
        .route("/metrics", get(metrics_handler).fallback(not_found))
        .fallback(not_found);

    with_service_layers(routes, state)
}

/// Body limit, panic recovery, metrics, tracing and request ids around `routes`.
fn with_service_layers(routes: Router<AppState>, state: AppState) -> Router {
    let email = state.config.official_email.clone();

    routes
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(
            move |panic: Box<dyn Any + Send + 'static>| panic_response(&email, panic),
        ))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

fn panic_response(official_email: &str, panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Handler panicked");

    let body: Envelope<()> = Envelope::failure(official_email, "Internal server error");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the Gemini provider.
    pub async fn build(config: BfhlConfig) -> Result<Self, AppError> {
        let provider = GeminiTextProvider::new(config.gemini_provider_config())
            .map_err(|e| AppError::InternalError(anyhow::Error::new(e)))?;

        tracing::info!(model = %config.gemini.model, "Initialized Gemini text provider");

        Self::build_with_provider(config, Arc::new(provider)).await
    }

    /// Build the application around an arbitrary text provider.
    pub async fn build_with_provider(
        config: BfhlConfig,
        provider: Arc<dyn TextProvider>,
    ) -> Result<Self, AppError> {
        // port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        let router = build_router(AppState::new(config, provider));

        tracing::info!("bfhl service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl-C or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeminiSettings;
    use crate::services::providers::mock::MockTextProvider;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn state() -> AppState {
        let config = BfhlConfig {
            common: service_core::config::Config { port: 0 },
            official_email: "ops@example.com".to_string(),
            gemini: GeminiSettings {
                api_key: None,
                model: "gemini-pro".to_string(),
                api_base: "http://127.0.0.1:9".to_string(),
            },
        };
        AppState::new(config, Arc::new(MockTextProvider::replying("ok")))
    }

    async fn failing_handler() -> &'static str {
        panic!("handler failure")
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_internal_error_envelope() {
        let routes = Router::new().route("/fail", get(failing_handler));
        let app = with_service_layers(routes, state());

        let response = app
            .oneshot(Request::builder().uri("/fail").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({
                "is_success": false,
                "official_email": "ops@example.com",
                "error": "Internal server error"
            })
        );
    }
}
