//! Dispatch table construction.
//!
//! # Responsibilities
//! - Bind `controller@action` targets to registered endpoints
//! - Build an exact-match `(METHOD, uri)` table from resolved actions
//!
//! # Design Decisions
//! - Unbound targets use the fallback endpoint if set, else are skipped with a warning
//! - Invalid methods are skipped with a warning
//! - Duplicate `(METHOD, uri)` pairs: the last one wins
//! - Middleware names travel with the matched action; nothing executes them here

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use axum::http::Method;
use axum::response::{IntoResponse, Response};
use futures_util::future::{BoxFuture, FutureExt};

use crate::http::request::RequestContext;
use crate::routing::Action;

/// An async controller action.
pub type Endpoint = Arc<dyn Fn(RequestContext) -> BoxFuture<'static, Response> + Send + Sync>;

/// Registry of endpoints keyed by `controller@action`.
#[derive(Clone, Default)]
pub struct Controllers {
    endpoints: HashMap<String, Endpoint>,
}

impl Controllers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `endpoint` under `target` (`controller@action`).
    pub fn register<F, Fut, R>(mut self, target: impl Into<String>, handler: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + 'static,
    {
        let endpoint: Endpoint =
            Arc::new(move |ctx| handler(ctx).map(IntoResponse::into_response).boxed());
        self.endpoints.insert(target.into(), endpoint);
        self
    }

    pub fn get(&self, target: &str) -> Option<Endpoint> {
        self.endpoints.get(target).cloned()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

impl std::fmt::Debug for Controllers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut targets: Vec<_> = self.endpoints.keys().collect();
        targets.sort();
        f.debug_struct("Controllers").field("targets", &targets).finish()
    }
}

/// A dispatchable route: the resolved action plus its endpoint.
#[derive(Clone)]
pub struct Route {
    pub action: Arc<Action>,
    pub endpoint: Endpoint,
}

/// Exact-match `(METHOD, uri)` lookup table.
#[derive(Clone, Default)]
pub struct DispatchTable {
    routes: HashMap<(Method, String), Route>,
}

impl DispatchTable {
    pub fn insert(&mut self, method: Method, uri: String, route: Route) -> Option<Route> {
        self.routes.insert((method, uri), route)
    }

    pub fn lookup(&self, method: &Method, uri: &str) -> Option<&Route> {
        self.routes.get(&(method.clone(), uri.to_string()))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.routes.values().map(|route| route.action.as_ref())
    }
}

/// Turns resolved actions into a dispatch table.
pub trait Handler: Send + Sync {
    fn handle(&self, actions: Vec<Action>) -> DispatchTable;
}

/// Default handler backed by a [`Controllers`] registry.
#[derive(Clone, Default)]
pub struct DispatchHandler {
    controllers: Controllers,
    fallback: Option<Endpoint>,
}

impl DispatchHandler {
    pub fn new(controllers: Controllers) -> Self {
        Self {
            controllers,
            fallback: None,
        }
    }

    /// Serve targets missing from the registry with `handler`.
    pub fn with_fallback<F, Fut, R>(mut self, handler: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + 'static,
    {
        let endpoint: Endpoint =
            Arc::new(move |ctx| handler(ctx).map(IntoResponse::into_response).boxed());
        self.fallback = Some(endpoint);
        self
    }
}

impl std::fmt::Debug for DispatchHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchHandler")
            .field("controllers", &self.controllers)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl Handler for DispatchHandler {
    fn handle(&self, actions: Vec<Action>) -> DispatchTable {
        let mut table = DispatchTable::default();

        for action in actions {
            let target = action.target();
            let Some(endpoint) = self.controllers.get(&target).or_else(|| self.fallback.clone()) else {
                tracing::warn!(uri = %action.uri, target = %target, "No controller registered, skipping route");
                continue;
            };
            let method = match Method::from_bytes(action.method.to_ascii_uppercase().as_bytes()) {
                Ok(method) => method,
                Err(_) => {
                    tracing::warn!(uri = %action.uri, method = %action.method, "Invalid HTTP method, skipping route");
                    continue;
                }
            };

            let uri = action.uri.clone();
            let route = Route {
                action: Arc::new(action),
                endpoint,
            };
            if table.insert(method.clone(), uri.clone(), route).is_some() {
                tracing::warn!(uri = %uri, method = %method, "Duplicate route, last declaration wins");
            }
        }

        tracing::debug!(routes = table.len(), "Dispatch table built");
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::RequestSnapshot;
    use axum::http::StatusCode;

    fn action(method: &str, uri: &str, uses: &str) -> Action {
        let (controller, name) = uses.split_once('@').unwrap();
        Action {
            uri: uri.into(),
            method: method.into(),
            controller: controller.into(),
            action: name.into(),
            middleware: vec!["auth".into()],
        }
    }

    fn controllers() -> Controllers {
        Controllers::new()
            .register("user@list", |_ctx| async { "users" })
            .register("user@create", |_ctx| async { "created" })
    }

    #[test]
    fn test_builds_table_with_uppercased_methods() {
        let handler = DispatchHandler::new(controllers());
        let table = handler.handle(vec![
            action("get", "/users", "user@list"),
            action("Post", "/users", "user@create"),
        ]);

        assert_eq!(table.len(), 2);
        let route = table.lookup(&Method::POST, "/users").unwrap();
        assert_eq!(route.action.target(), "user@create");
        assert_eq!(route.action.middleware, vec!["auth"]);
        assert!(table.lookup(&Method::DELETE, "/users").is_none());
    }

    #[test]
    fn test_skips_unbound_and_invalid_routes() {
        let handler = DispatchHandler::new(controllers());
        let table = handler.handle(vec![
            action("get", "/missing", "ghost@list"),
            action("ge t", "/users", "user@list"),
        ]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_fallback_serves_unbound_targets() {
        let handler = DispatchHandler::new(Controllers::new()).with_fallback(|_ctx| async { "fallback" });
        let table = handler.handle(vec![action("get", "/anything", "ghost@list")]);
        assert_eq!(table.len(), 1);
        assert!(table.lookup(&Method::GET, "/anything").is_some());
    }

    #[test]
    fn test_duplicate_route_last_wins() {
        let handler = DispatchHandler::new(controllers());
        let table = handler.handle(vec![
            action("get", "/users", "user@list"),
            action("get", "/users", "user@create"),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.lookup(&Method::GET, "/users").unwrap().action.action,
            "create"
        );
    }

    async fn call(table: &DispatchTable, uri: &str) -> (StatusCode, String) {
        let route = table.lookup(&Method::GET, uri).unwrap();
        let ctx = RequestContext {
            request_id: "req-1".into(),
            method: Method::GET,
            action: route.action.clone(),
            snapshot: Arc::new(RequestSnapshot::default()),
        };
        let response = (route.endpoint)(ctx).await;
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_endpoints_with_owned_responses() {
        let controllers = Controllers::new().register("user@show", |ctx: RequestContext| async move {
            (StatusCode::ACCEPTED, format!("{}:{}", ctx.request_id, ctx.action.target()))
        });
        let handler = DispatchHandler::new(controllers)
            .with_fallback(|ctx: RequestContext| async move { (StatusCode::GONE, ctx.action.uri.clone()) });
        let table = handler.handle(vec![
            action("get", "/users/me", "user@show"),
            action("get", "/legacy", "old@show"),
        ]);

        assert_eq!(call(&table, "/users/me").await, (StatusCode::ACCEPTED, "req-1:user@show".into()));
        assert_eq!(call(&table, "/legacy").await, (StatusCode::GONE, "/legacy".into()));
    }
}
