//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router routing every path to the pipeline handler
//! - Wire up middleware (timeout, request ID, tracing)
//! - Bind server to listener and serve until shutdown
//! - Swap in a new pipeline when the configuration is reloaded
//!
//! # Design Decisions
//! - The pipeline is synchronous; it runs on the blocking pool
//! - One request at a time per pipeline (the host sits behind a mutex)
//! - Request bodies are buffered up to `max_body_bytes` before the pipeline
//!   sees them

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    extract::{Request as AxumRequest, State},
    http::StatusCode,
    response::{IntoResponse, Response as AxumResponse},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use uuid::Uuid;

use crate::application::Host;
use crate::config::loader::ConfigError;
use crate::config::schema::ServerConfig;
use crate::http::{attributes, Request};
use crate::registry::Registry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub host: Arc<Mutex<Host>>,
    pub max_body_bytes: usize,
}

/// HTTP front-end for the servlet pipeline.
pub struct HttpServer {
    router: Router,
    host: Arc<Mutex<Host>>,
    registry: Arc<Registry>,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and component
    /// registry.
    pub fn new(config: ServerConfig, registry: Registry) -> Result<Self, ConfigError> {
        let registry = Arc::new(registry);
        let host = Arc::new(Mutex::new(Host::from_config(
            &config.application,
            Arc::clone(&registry),
        )?));

        let state = AppState {
            host: Arc::clone(&host),
            max_body_bytes: config.application.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            host,
            registry,
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(servlet_handler))
            .route("/", any(servlet_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// Run the server, accepting connections on the given listener until the
    /// shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ServerConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            servlets = self.config.application.servlets.len(),
            filters = self.config.application.filters.len(),
            "HTTP server starting"
        );

        let host = Arc::clone(&self.host);
        let registry = Arc::clone(&self.registry);
        let reloader = tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                match Host::from_config(&new_config.application, Arc::clone(&registry)) {
                    Ok(new_host) => {
                        let host = Arc::clone(&host);
                        // Waits for the in-flight request, off the async workers.
                        let swapped = tokio::task::spawn_blocking(move || {
                            let mut guard = host.lock().unwrap_or_else(PoisonError::into_inner);
                            *guard = new_host;
                        })
                        .await;
                        match swapped {
                            Ok(()) => tracing::info!("Application configuration reloaded"),
                            Err(e) => tracing::error!(error = %e, "Failed to swap application"),
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Rejected reloaded configuration");
                    }
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Runs every request through the servlet pipeline.
async fn servlet_handler(State(state): State<AppState>, request: AxumRequest) -> AxumResponse {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Request body rejected");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let mut request = Request::from_parts(parts, body);
    request.set_attribute(attributes::REQUEST_ID, request_id.clone());

    let host = Arc::clone(&state.host);
    let result = tokio::task::spawn_blocking(move || {
        // A panic in an earlier request poisons the lock; every request
        // restarts the filters, so the host is still usable.
        let mut host = host.lock().unwrap_or_else(PoisonError::into_inner);
        host.process(request)
    })
    .await;

    match result {
        Ok(response) => response.into_http(),
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Pipeline task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}
