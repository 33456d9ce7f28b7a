//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load routes → Resolve → Build dispatch table → Bind → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Drain in-flight requests → Close listener → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: routes first, then listener
//! - Ordered shutdown: drain, then close
//! - Shutdown has timeout: listener closes after the drain deadline

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{start, StartupError};
