//! Route document loading and resolution.

use std::collections::HashSet;
use std::path::Path;

use routekit::routing::{Action, RouteError, RouteResolver};

mod common;

const ROUTES: &str = r#"
groups:
  - name: api
    prefix: /api
    middleware: cors|auth
  - name: v2
    prefix: /v2
    middleware: deprecation
action:
  "/users":
    uses: user@list
    group: api
    middleware: paginate
  "post /users":
    uses: user@create
    group: api|v2
  "put /users/profile":
    uses: user@update
    method: patch
  "/orphan":
    uses: orphan@index
    group: nowhere
  "/no-target":
    uses: userlist
  "/too-many":
    uses: a@b@c
  "get /three tokens":
    uses: x@y
  "/empty-uses":
    method: post
"#;

fn find<'a>(actions: &'a [Action], method: &str, uri: &str) -> Option<&'a Action> {
    actions.iter().find(|a| a.method == method && a.uri == uri)
}

#[tokio::test]
async fn test_resolve_from_file() {
    let file = common::write_routes(ROUTES);
    let resolver = RouteResolver::init(file.path()).unwrap();
    let actions = resolver.resolve_sorted().await;

    assert_eq!(actions.len(), 4, "malformed entries must be dropped: {actions:?}");

    let list = find(&actions, "get", "/api/users").unwrap();
    assert_eq!((list.controller.as_str(), list.action.as_str()), ("user", "list"));
    assert_eq!(list.middleware, vec!["cors", "auth", "paginate"]);

    let create = find(&actions, "post", "/api/v2/users").unwrap();
    assert_eq!(create.middleware, vec!["cors", "auth", "deprecation"]);

    let update = find(&actions, "patch", "/users/profile").unwrap();
    assert_eq!(update.action, "update");
    assert!(update.middleware.is_empty());

    let orphan = find(&actions, "get", "/orphan").unwrap();
    assert!(orphan.middleware.is_empty());
}

#[tokio::test]
async fn test_malformed_entries_never_appear() {
    let file = common::write_routes(ROUTES);
    let actions = RouteResolver::init(file.path()).unwrap().resolve().await;

    for action in &actions {
        assert_ne!(action.uri, "/no-target");
        assert_ne!(action.uri, "/too-many");
        assert_ne!(action.uri, "/empty-uses");
        assert!(!action.uri.contains("three"));
    }
}

#[tokio::test]
async fn test_resolve_twice_yields_same_set() {
    let file = common::write_routes(ROUTES);
    let resolver = RouteResolver::init(file.path()).unwrap();

    let first: HashSet<Action> = resolver.resolve().await.into_iter().collect();
    let second: HashSet<Action> = resolver.resolve().await.into_iter().collect();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_reload_picks_up_changes() {
    let file = common::write_routes("action:\n  /a:\n    uses: a@index\n");
    let before = RouteResolver::init(file.path()).unwrap().resolve().await;
    assert_eq!(before.len(), 1);

    std::fs::write(
        file.path(),
        "action:\n  /a:\n    uses: a@index\n  /b:\n    uses: b@index\n",
    )
    .unwrap();
    let after = RouteResolver::init(file.path()).unwrap().resolve().await;
    assert_eq!(after.len(), 2);
}

#[test]
fn test_missing_document_is_fatal_error() {
    let err = RouteResolver::init(Path::new("/no/such/routes.yml")).unwrap_err();
    assert!(matches!(err, RouteError::Io { .. }));
}

#[test]
fn test_malformed_document_is_fatal_error() {
    let file = common::write_routes("action: [not, a, mapping");
    let err = RouteResolver::init(file.path()).unwrap_err();
    assert!(matches!(err, RouteError::Parse { .. }));
}
