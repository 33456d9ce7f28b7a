//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! server config (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!
//! route document (YAML, see routing::document)
//!     → watcher.rs detects change
//!     → routing::document reloads
//!     → http::server re-resolves and swaps the dispatch table
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{ListenerConfig, LogFormat, ObservabilityConfig, RoutesConfig, ServerConfig, TimeoutConfig};
pub use validation::ConfigIssue;
pub use watcher::{RouteWatch, RouteWatcher};
