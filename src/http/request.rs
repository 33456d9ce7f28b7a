//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Capture a read-only snapshot of query, form body and headers
//! - Decode urlencoded and multipart form bodies
//! - Hand endpoints their matched action and snapshot

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{HeaderValue, Method, Request};
use futures_util::stream;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::routing::Action;
use crate::validation::{validate, Params, RequestSnapshot, Rule, ValidationError};

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Everything an endpoint gets to see about one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub method: Method,
    pub action: Arc<Action>,
    pub snapshot: Arc<RequestSnapshot>,
}

impl RequestContext {
    /// Validate this request's parameters.
    pub async fn validate(&self, rules: &[Rule]) -> Result<Params, ValidationError> {
        validate(self.snapshot.clone(), rules).await
    }

    /// Middleware names declared for the matched route.
    pub fn middleware(&self) -> &[String] {
        &self.action.middleware
    }
}

/// How a request body carries form parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEncoding {
    Urlencoded,
    Multipart { boundary: String },
}

/// Form encoding of the body, or `None` when the body holds no form parameters.
pub fn form_encoding(method: &Method, content_type: Option<&HeaderValue>) -> Option<FormEncoding> {
    if !matches!(*method, Method::POST | Method::PUT | Method::PATCH) {
        return None;
    }
    let content_type = content_type?.to_str().ok()?;
    if content_type.starts_with("application/x-www-form-urlencoded") {
        return Some(FormEncoding::Urlencoded);
    }
    multer::parse_boundary(content_type)
        .ok()
        .map(|boundary| FormEncoding::Multipart { boundary })
}

/// Decode the form fields of a fully read body, in body order.
///
/// Multipart file parts are skipped.
pub async fn read_form_fields(
    encoding: &FormEncoding,
    body: Bytes,
) -> Result<Vec<(String, String)>, multer::Error> {
    match encoding {
        FormEncoding::Urlencoded => Ok(url::form_urlencoded::parse(&body).into_owned().collect()),
        FormEncoding::Multipart { boundary } => {
            let body = stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
            let mut multipart = multer::Multipart::new(body, boundary.as_str());
            let mut fields = Vec::new();

            while let Some(field) = multipart.next_field().await? {
                if field.file_name().is_some() {
                    continue;
                }
                let Some(name) = field.name().map(String::from) else {
                    continue;
                };
                fields.push((name, field.text().await?));
            }

            Ok(fields)
        }
    }
}
