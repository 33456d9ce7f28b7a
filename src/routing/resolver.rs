//! Route resolution.
//!
//! # Responsibilities
//! - Hold the loaded route document
//! - Fan out one task per action entry against a shared group table
//! - Join all tasks and return the flat action list
//!
//! # Design Decisions
//! - Every `resolve` call recomputes from the document (no caching)
//! - Result order is unspecified; use `resolve_sorted` when it matters
//! - A failed entry task is logged and counted as a dropped entry

use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::routing::action::{extract, group_map, Action};
use crate::routing::document::{load_routes, RouteDocument, RouteError};

/// Turns a route document into resolved [`Action`]s.
#[derive(Debug, Clone)]
pub struct RouteResolver {
    document: Arc<RouteDocument>,
}

impl RouteResolver {
    /// Load the route document at `path`.
    ///
    /// Callers treat an error here as fatal: there is no partially loaded state.
    pub fn init(path: &Path) -> Result<Self, RouteError> {
        let document = load_routes(path)?;
        Ok(Self::from_document(document))
    }

    /// Build a resolver over an already parsed document.
    pub fn from_document(document: RouteDocument) -> Self {
        Self {
            document: Arc::new(document),
        }
    }

    /// The loaded document.
    pub fn document(&self) -> &RouteDocument {
        &self.document
    }

    /// Resolve every action entry concurrently.
    pub async fn resolve(&self) -> Vec<Action> {
        let groups = Arc::new(group_map(&self.document.groups));
        let mut tasks = JoinSet::new();

        for (route_key, raw) in &self.document.action {
            let groups = groups.clone();
            let route_key = route_key.clone();
            let raw = raw.clone();

            tasks.spawn(async move {
                let action = extract(&route_key, &raw, &groups);
                if action.is_none() {
                    tracing::debug!(route = %route_key, uses = %raw.uses, "Dropping malformed action entry");
                }
                action
            });
        }

        let mut actions = Vec::with_capacity(self.document.action.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(action)) => actions.push(action),
                Ok(None) => {}
                Err(e) => tracing::error!(error = %e, "Action resolution task failed"),
            }
        }

        tracing::debug!(
            declared = self.document.action.len(),
            resolved = actions.len(),
            "Routes resolved"
        );

        actions
    }

    /// Resolve and sort (uri first, then method) for stable output.
    pub async fn resolve_sorted(&self) -> Vec<Action> {
        let mut actions = self.resolve().await;
        actions.sort();
        actions
    }
}
