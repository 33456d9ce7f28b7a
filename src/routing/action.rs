//! Resolved actions and the per-entry extraction step.
//!
//! # Responsibilities
//! - Split `controller@action` targets
//! - Split `[METHOD ]URI` route keys
//! - Merge group prefixes and middleware in group-list order
//!
//! # Design Decisions
//! - Malformed entries yield `None`, never an error
//! - Unknown group names contribute nothing
//! - Methods are kept as declared; normalisation belongs to the handler

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::routing::document::{GroupConfig, RawActionConfig};

/// Method used when neither the route key nor the declaration names one.
pub const DEFAULT_METHOD: &str = "get";

/// Separator for middleware and group lists.
pub const LIST_SEPARATOR: char = '|';

/// One resolved, dispatchable route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Action {
    pub uri: String,
    pub method: String,
    pub controller: String,
    pub action: String,
    pub middleware: Vec<String>,
}

impl Action {
    /// The `controller@action` target this action dispatches to.
    pub fn target(&self) -> String {
        format!("{}@{}", self.controller, self.action)
    }
}

/// Group lookup table keyed by group name.
pub type GroupMap = HashMap<String, GroupConfig>;

/// Index groups by name. Later duplicates replace earlier ones.
pub fn group_map(groups: &[GroupConfig]) -> GroupMap {
    groups
        .iter()
        .map(|group| (group.name.clone(), group.clone()))
        .collect()
}

/// Resolve a single raw entry against the group table.
pub fn extract(route_key: &str, raw: &RawActionConfig, groups: &GroupMap) -> Option<Action> {
    let (controller, action) = split_uses(&raw.uses)?;
    let (key_method, suffix) = split_route_key(route_key)?;

    let method = if raw.method.is_empty() {
        key_method
    } else {
        raw.method.as_str()
    };

    let mut uri = String::new();
    let mut middleware = Vec::new();

    if !raw.group.is_empty() {
        for name in raw.group.split(LIST_SEPARATOR) {
            let Some(group) = groups.get(name) else {
                continue;
            };
            uri.push_str(&group.prefix);
            middleware.extend(split_list(&group.middleware));
        }
    }
    uri.push_str(suffix);
    middleware.extend(split_list(&raw.middleware));

    Some(Action {
        uri,
        method: method.to_string(),
        controller: controller.to_string(),
        action: action.to_string(),
        middleware,
    })
}

/// Split `controller@action`. Requires exactly one `@`.
fn split_uses(uses: &str) -> Option<(&str, &str)> {
    if uses.is_empty() {
        return None;
    }
    let mut parts = uses.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(controller), Some(action), None) => Some((controller, action)),
        _ => None,
    }
}

/// Split `"[METHOD ]URI"` into `(method, uri)`.
fn split_route_key(route_key: &str) -> Option<(&str, &str)> {
    let tokens: Vec<&str> = route_key.split_whitespace().collect();
    match tokens.as_slice() {
        [uri] => Some((DEFAULT_METHOD, *uri)),
        [method, uri] => Some((*method, *uri)),
        _ => None,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(LIST_SEPARATOR).map(str::to_string).collect()
}
