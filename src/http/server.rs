//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router around the dispatch table
//! - Wire up middleware (tracing, request ID, write timeout, in-flight tracking)
//! - Bind server to listener
//! - Swap the dispatch table when the route document is reloaded
//! - Drain in-flight requests on shutdown

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::handler::{DispatchTable, Handler};
use crate::http::inflight::{track_in_flight, InFlight};
use crate::http::request::{
    form_encoding, read_form_fields, RequestContext, UuidRequestId, X_REQUEST_ID,
};
use crate::http::response::not_found;
use crate::routing::{Action, RouteDocument, RouteResolver};
use crate::validation::RequestSnapshot;

/// Application state injected into the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<ArcSwap<DispatchTable>>,
    pub in_flight: InFlight,
    pub max_body_size: usize,
    pub read_timeout: Duration,
}

/// HTTP server dispatching resolved actions.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    handler: Arc<dyn Handler>,
    state: AppState,
}

impl HttpServer {
    /// Build the dispatch table from `actions` and wrap it in a server.
    pub fn new(config: ServerConfig, handler: Arc<dyn Handler>, actions: Vec<Action>) -> Self {
        let table = handler.handle(actions);
        tracing::info!(routes = table.len(), "Dispatch table ready");

        let state = AppState {
            table: Arc::new(ArcSwap::from_pointee(table)),
            in_flight: InFlight::new(),
            max_body_size: config.listener.max_body_size,
            read_timeout: config.timeouts.read(),
        };

        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            config,
            handler,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state.clone())
            .layer(middleware::from_fn_with_state(state.in_flight, track_in_flight))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(config.timeouts.write())),
            )
    }

    /// The router, for driving requests without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Reloaded route documents arriving on `route_updates` are resolved and
    /// swapped in without interrupting requests already being served.
    pub async fn run(
        self,
        listener: TcpListener,
        mut route_updates: mpsc::UnboundedReceiver<RouteDocument>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            server = %self.config.name,
            address = %addr,
            "HTTP server starting"
        );

        let reload_state = self.state.clone();
        let handler = self.handler.clone();
        let reloader = tokio::spawn(async move {
            while let Some(document) = route_updates.recv().await {
                let declared = document.action.len();
                let actions = RouteResolver::from_document(document).resolve().await;
                let dropped = declared.saturating_sub(actions.len());
                if dropped > 0 {
                    tracing::warn!(dropped, "Reloaded route document has malformed entries");
                }
                let table = handler.handle(actions);
                tracing::info!(routes = table.len(), dropped, "Dispatch table reloaded");
                reload_state.table.store(Arc::new(table));
            }
        });

        let in_flight = self.state.in_flight.clone();
        let drain_timeout = self.config.timeouts.shutdown();
        let shutdown_signal = async move {
            let _ = shutdown.recv().await;
            tracing::info!(in_flight = in_flight.current(), "Shutdown signal received, draining requests");
            if tokio::time::timeout(drain_timeout, in_flight.wait_idle()).await.is_err() {
                tracing::warn!(
                    in_flight = in_flight.current(),
                    "Drain timeout elapsed, closing listener"
                );
            }
        };

        let result = axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal)
            .await;
        reloader.abort();
        result?;

        tracing::info!(server = %self.config.name, "HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Shared state, for inspecting the live table and in-flight count.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Fallback handler: exact-match lookup, snapshot, then the endpoint.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let Some(route) = state.table.load().lookup(&method, &path).cloned() else {
        tracing::debug!(request_id = %request_id, method = %method, path = %path, "No route matched");
        return not_found();
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        target = %route.action.target(),
        "Dispatching request"
    );

    let (parts, body) = request.into_parts();
    let body_fields = match form_encoding(&parts.method, parts.headers.get(header::CONTENT_TYPE)) {
        Some(encoding) => {
            let read = axum::body::to_bytes(body, state.max_body_size);
            let bytes = match tokio::time::timeout(state.read_timeout, read).await {
                Ok(Ok(bytes)) => bytes,
                Ok(Err(e)) => {
                    tracing::debug!(request_id = %request_id, error = %e, "Failed to read request body");
                    return (StatusCode::BAD_REQUEST, "Invalid request body").into_response();
                }
                Err(_) => {
                    return (StatusCode::REQUEST_TIMEOUT, "Request body read timed out").into_response();
                }
            };
            match read_form_fields(&encoding, bytes).await {
                Ok(fields) => fields,
                Err(e) => {
                    tracing::debug!(request_id = %request_id, error = %e, "Failed to decode form body");
                    return (StatusCode::BAD_REQUEST, "Invalid form body").into_response();
                }
            }
        }
        None => Vec::new(),
    };

    let snapshot = RequestSnapshot::from_fields(parts.uri.query(), body_fields, parts.headers);
    let ctx = RequestContext {
        request_id,
        method,
        action: route.action.clone(),
        snapshot: Arc::new(snapshot),
    };

    (route.endpoint)(ctx).await
}
