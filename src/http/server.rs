//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router that hosts the compiled dispatch table
//! - Wire up middleware (request ID, tracing, timeout, panic containment)
//! - Bind server to listener and serve until shutdown
//! - Look up the route for each request and hand it to the dispatcher

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::dispatch::{DispatchTable, Dispatcher};
use crate::http::request::UuidRequestId;

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<DispatchTable>,
    pub dispatcher: Dispatcher,
}

/// HTTP server hosting a compiled dispatch table.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server for an already compiled table.
    pub fn new(table: DispatchTable, config: ServerConfig) -> Self {
        let state = AppState {
            table: Arc::new(table),
            dispatcher: Dispatcher::new(config.limits.max_body_size),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(CatchPanicLayer::new())
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// A clone of the fully layered router, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on the given listener until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Looks up the compiled route for the exact request path and runs it.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let path = request.uri().path();

    match state.table.get(path) {
        Some(route) => state.dispatcher.dispatch(route, request).await,
        None => {
            tracing::debug!(path = %path, method = %request.method(), "No route matched");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
