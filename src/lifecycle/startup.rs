//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the route document and resolve actions
//! - Build the dispatch table through the configured handler
//! - Start the route watcher when enabled
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when routes are ready)

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::{RouteWatcher, ServerConfig};
use crate::http::{Handler, HttpServer};
use crate::lifecycle::shutdown::Shutdown;
use crate::routing::{RouteError, RouteResolver};

/// Error type for startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Routes(#[from] RouteError),

    #[error("failed to watch route document: {0}")]
    Watch(#[from] notify::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Load routes, bind, and serve until `shutdown` fires.
pub async fn start(
    config: ServerConfig,
    handler: Arc<dyn Handler>,
    shutdown: &Shutdown,
) -> Result<(), StartupError> {
    let resolver = RouteResolver::init(&config.routes.path)?;
    let actions = resolver.resolve().await;
    tracing::info!(
        path = %config.routes.path.display(),
        actions = actions.len(),
        "Routes resolved"
    );

    // Keep the watcher handle alive for the server's lifetime.
    let (_watcher, route_updates) = if config.routes.watch {
        let (watcher, updates) = RouteWatcher::new(&config.routes.path);
        let watch = watcher.starting_from(resolver.document().clone()).run()?;
        (Some(watch), updates)
    } else {
        let (_, updates) = mpsc::unbounded_channel();
        (None, updates)
    };

    let address = config.listener.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    let server = HttpServer::new(config, handler, actions);
    server
        .run(listener, route_updates, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}
