//! routekit: declarative routes and request validation over Axum.
//!
//! - [`routing`] resolves a YAML route document (groups + actions) into a flat
//!   list of [`Action`]s, one task per entry.
//! - [`validation`] checks request parameters against declarative [`Rule`]s,
//!   one task per rule, returning typed [`Params`] or one aggregated error.
//! - [`http`], [`config`], [`lifecycle`] and [`observability`] are the server
//!   glue around them.

// Core
pub mod routing;
pub mod validation;

// Server glue
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Action, RouteResolver};
pub use validation::{validate, Params, Rule, ValidationError, Value};
