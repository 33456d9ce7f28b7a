//! Response helpers for endpoints.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::http::request::RequestContext;
use crate::validation::ValidationError;

/// 422 response listing every failed parameter.
pub fn validation_failed(err: &ValidationError) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "error": err.to_string(),
            "failures": err.failures(),
        })),
    )
        .into_response()
}

/// 404 for requests with no matching route.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "No matching route found").into_response()
}

/// Describe the matched route and the request parameters as JSON.
///
/// Used as the fallback endpoint by the `serve` command so a route document
/// can be exercised before any controller exists.
pub async fn describe(ctx: RequestContext) -> Response {
    Json(json!({
        "request_id": ctx.request_id,
        "method": ctx.method.as_str(),
        "uri": ctx.action.uri,
        "controller": ctx.action.controller,
        "action": ctx.action.action,
        "middleware": ctx.action.middleware,
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        assert_eq!(not_found().status(), StatusCode::NOT_FOUND);
    }
}
