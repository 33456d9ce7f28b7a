//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeouts, in-flight tracking)
//!     → handler.rs (dispatch table: (METHOD, uri) → endpoint)
//!     → request.rs (decode urlencoded/multipart forms, snapshot into RequestContext)
//!     → endpoint (controller@action), may call validation::validate
//!     → response.rs helpers
//! ```

pub mod handler;
pub mod inflight;
pub mod request;
pub mod response;
pub mod server;

pub use handler::{Controllers, DispatchHandler, DispatchTable, Endpoint, Handler, Route};
pub use inflight::InFlight;
pub use request::{FormEncoding, RequestContext, UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
