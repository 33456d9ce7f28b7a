//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route document (YAML)
//!     → document.rs (load & deserialize)
//!     → resolver.rs (group table, one task per entry)
//!     → action.rs (split uses / route key, merge groups)
//!     → Vec<Action> (unordered)
//!     → http::handler builds the dispatch table
//! ```
//!
//! # Design Decisions
//! - Document is immutable once loaded; reload means load + resolve again
//! - Malformed entries are dropped silently, never reported as errors
//! - No request matching here; that belongs to the handler's dispatch table

pub mod action;
pub mod document;
pub mod resolver;

pub use action::Action;
pub use document::{load_routes, GroupConfig, RawActionConfig, RouteDocument, RouteError};
pub use resolver::RouteResolver;
