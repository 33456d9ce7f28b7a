//! Request parameter validation.
//!
//! # Data Flow
//! ```text
//! Request snapshot (form/query + headers) + Vec<Rule>
//!     → engine.rs (one task per rule, bounded fan-in channel)
//!     → source.rs (resolve `key` / `key|header`)
//!     → value.rs (coerce per declared type)
//!     → rule.rs (required / include / unknown)
//!     → Params or ValidationError
//! ```
//!
//! # Design Decisions
//! - All-or-nothing: one failing rule returns only the aggregated error
//! - Values are a closed sum type; accessors fall back to zero values
//! - Unknown rule names fail validation instead of being ignored

pub mod engine;
pub mod params;
pub mod rule;
pub mod source;
pub mod value;

pub use engine::{evaluate, validate, Outcome, ValidationError};
pub use params::Params;
pub use rule::{Check, Rule};
pub use source::{MapSource, RequestSnapshot, RequestSource};
pub use value::{Value, ValueType};
