//! Shared utilities for integration tests.

use std::io::Write;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tempfile::NamedTempFile;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use routekit::config::ServerConfig;
use routekit::http::{Controllers, DispatchHandler, HttpServer};
use routekit::lifecycle::Shutdown;
use routekit::routing::{RouteDocument, RouteResolver};

/// Write a route document to a temporary file.
#[allow(dead_code)]
pub fn write_routes(yaml: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// A server running on an ephemeral port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub route_updates: mpsc::UnboundedSender<RouteDocument>,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Resolve `yaml` and serve it with `controllers`.
#[allow(dead_code)]
pub async fn start_server(yaml: &str, controllers: Controllers) -> TestServer {
    let document = RouteDocument::from_yaml(yaml, Path::new("test.yml")).unwrap();
    let actions = RouteResolver::from_document(document).resolve().await;

    let mut config = ServerConfig::default();
    config.timeouts.shutdown_secs = 5;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (route_updates, updates_rx) = mpsc::unbounded_channel();
    let server = HttpServer::new(config, Arc::new(DispatchHandler::new(controllers)), actions);
    let server_shutdown = shutdown.subscribe();

    let handle = tokio::spawn(async move { server.run(listener, updates_rx, server_shutdown).await });

    TestServer {
        addr,
        shutdown,
        route_updates,
        handle,
    }
}

/// HTTP client without connection pooling, so shutdown is not held up by idle sockets.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
