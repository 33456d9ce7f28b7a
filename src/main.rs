//! routekit server binary.
//!
//! ```text
//! routekit serve  --config server.toml   # resolve routes and serve them
//! routekit routes --config server.toml   # print resolved actions as JSON
//! ```
//!
//! Without application controllers every route is served by the `describe`
//! endpoint, which echoes the matched action.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use routekit::config::{load_config, ServerConfig};
use routekit::http::response::describe;
use routekit::http::{Controllers, DispatchHandler};
use routekit::lifecycle::{signals, start, Shutdown};
use routekit::observability::logging;
use routekit::routing::RouteResolver;

#[derive(Parser)]
#[command(name = "routekit")]
#[command(about = "Serve a declarative route document", long_about = None)]
struct Cli {
    /// Server configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the route document path from the configuration.
    #[arg(short, long, global = true)]
    routes: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve routes and start the HTTP server
    Serve,
    /// Print the resolved actions as JSON
    Routes,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => ServerConfig::default(),
    };
    if let Some(routes) = cli.routes {
        config.routes.path = routes;
    }

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Routes => print_routes(&config).await,
    }
}

async fn serve(config: ServerConfig) -> ExitCode {
    if let Err(e) = logging::init(&config.observability) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    tracing::info!(
        server = %config.name,
        bind_address = %config.listener.bind_address(),
        routes = %config.routes.path.display(),
        "routekit v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let handler = Arc::new(DispatchHandler::new(Controllers::new()).with_fallback(describe));
    match start(config, handler, &shutdown).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal startup error");
            ExitCode::FAILURE
        }
    }
}

async fn print_routes(config: &ServerConfig) -> ExitCode {
    let resolver = match RouteResolver::init(&config.routes.path) {
        Ok(resolver) => resolver,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let actions = resolver.resolve_sorted().await;
    match serde_json::to_string_pretty(&actions) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to encode routes: {}", e);
            ExitCode::FAILURE
        }
    }
}
