//! Observability subsystem.
//!
//! Every subsystem logs through `tracing` macros with structured fields;
//! `logging.rs` installs the subscriber at startup.

pub mod logging;
