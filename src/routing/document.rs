//! Route document schema and loading.
//!
//! The route document is YAML with two top-level sections:
//!
//! ```yaml
//! groups:
//!   - name: api
//!     prefix: /api
//!     middleware: auth|log
//! action:
//!   "post /users":
//!     uses: user@create
//!     group: api
//!     middleware: csrf
//!   "/health":
//!     uses: health@index
//! ```
//!
//! Missing fields (and explicit YAML nulls) are treated as empty strings.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

/// Error type for route document loading.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("failed to read route document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse route document {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Parsed route declarations, read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteDocument {
    /// Named groups contributing URI prefixes and middleware.
    pub groups: Vec<GroupConfig>,

    /// Route key (`"[METHOD ]URI"`) to action declaration.
    pub action: BTreeMap<String, RawActionConfig>,
}

/// A reusable bundle of URI prefix and middleware.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GroupConfig {
    #[serde(deserialize_with = "nullable_string")]
    pub name: String,

    #[serde(deserialize_with = "nullable_string")]
    pub prefix: String,

    /// `|`-joined middleware identifiers.
    #[serde(deserialize_with = "nullable_string")]
    pub middleware: String,
}

/// One action declaration as written in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RawActionConfig {
    /// Explicit method; overrides the method in the route key.
    #[serde(deserialize_with = "nullable_string")]
    pub method: String,

    /// `controller@action` target.
    #[serde(deserialize_with = "nullable_string")]
    pub uses: String,

    /// `|`-joined middleware identifiers, appended after group middleware.
    #[serde(deserialize_with = "nullable_string")]
    pub middleware: String,

    /// `|`-joined group names.
    #[serde(deserialize_with = "nullable_string")]
    pub group: String,
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl RouteDocument {
    /// Parse a document from YAML text. `origin` is only used for error context.
    pub fn from_yaml(content: &str, origin: &Path) -> Result<Self, RouteError> {
        serde_yaml::from_str(content).map_err(|source| RouteError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }
}

/// Load a route document from disk.
pub fn load_routes(path: &Path) -> Result<RouteDocument, RouteError> {
    let content = fs::read_to_string(path).map_err(|source| RouteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document = RouteDocument::from_yaml(&content, path)?;

    tracing::debug!(
        path = %path.display(),
        groups = document.groups.len(),
        actions = document.action.len(),
        "Route document loaded"
    );

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
groups:
  - name: api
    prefix: /api
    middleware: auth|log
  - name: v1
    prefix: /v1
action:
  "post /users":
    uses: user@create
    group: api|v1
    middleware: csrf
  "/health":
    uses: health@index
    middleware:
"#;

    #[test]
    fn test_parse_sample_document() {
        let doc = RouteDocument::from_yaml(SAMPLE, Path::new("routes.yml")).unwrap();

        assert_eq!(doc.groups.len(), 2);
        assert_eq!(doc.groups[0].name, "api");
        assert_eq!(doc.groups[0].middleware, "auth|log");
        assert_eq!(doc.groups[1].middleware, "");

        let users = &doc.action["post /users"];
        assert_eq!(users.uses, "user@create");
        assert_eq!(users.group, "api|v1");
        assert_eq!(users.method, "");

        // Explicit null collapses to empty.
        assert_eq!(doc.action["/health"].middleware, "");
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let doc = RouteDocument::from_yaml("groups: []\n", Path::new("r.yml")).unwrap();
        assert!(doc.groups.is_empty());
        assert!(doc.action.is_empty());
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        let err = RouteDocument::from_yaml("groups: [", Path::new("bad.yml")).unwrap_err();
        assert!(matches!(err, RouteError::Parse { .. }));
        assert!(err.to_string().contains("bad.yml"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_routes(Path::new("/definitely/not/here.yml")).unwrap_err();
        assert!(matches!(err, RouteError::Io { .. }));
    }
}
