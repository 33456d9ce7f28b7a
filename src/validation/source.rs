//! Request snapshots the validation engine reads from.

use std::collections::HashMap;

use axum::http::HeaderMap;

use crate::validation::rule::{HEADER_SELECTOR, SELECTOR_SEPARATOR};

/// Key/value view of one inbound request.
///
/// Both lookups return `""` when the key is absent.
pub trait RequestSource: Send + Sync {
    /// Form body or query string value.
    fn form_value(&self, key: &str) -> &str;

    /// Header value, case-insensitive.
    fn header(&self, key: &str) -> &str;

    /// Resolve a rule key (`name` or `name|selector`) to `(name, raw value)`.
    ///
    /// Only the first selector counts; `header` matches in any case.
    fn lookup<'a>(&'a self, key: &'a str) -> (&'a str, &'a str) {
        let mut parts = key.split(SELECTOR_SEPARATOR);
        let name = parts.next().unwrap_or(key);
        match parts.next() {
            None => (name, self.form_value(key)),
            Some(selector) if selector.eq_ignore_ascii_case(HEADER_SELECTOR) => {
                (name, self.header(name))
            }
            Some(_) => (name, ""),
        }
    }
}

/// Immutable copy of a request's parameters and headers.
#[derive(Debug, Clone, Default)]
pub struct RequestSnapshot {
    form: HashMap<String, String>,
    headers: HeaderMap,
}

impl RequestSnapshot {
    /// Build a snapshot from a raw query string, an optional urlencoded body
    /// and the request headers.
    pub fn new(query: Option<&str>, form_body: Option<&[u8]>, headers: HeaderMap) -> Self {
        let fields = form_body
            .map(|body| {
                url::form_urlencoded::parse(body)
                    .into_owned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        Self::from_fields(query, fields, headers)
    }

    /// Build a snapshot from already decoded body fields.
    ///
    /// Body values shadow query values; the first occurrence of a repeated key wins.
    pub fn from_fields<I>(query: Option<&str>, body_fields: I, headers: HeaderMap) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut form = HashMap::new();

        for (k, v) in body_fields {
            form.entry(k).or_insert(v);
        }
        if let Some(query) = query {
            for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
                form.entry(k.into_owned()).or_insert_with(|| v.into_owned());
            }
        }

        Self { form, headers }
    }

    /// Snapshot from a query string only.
    pub fn from_query(query: &str) -> Self {
        Self::new(Some(query), None, HeaderMap::new())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl RequestSource for RequestSnapshot {
    fn form_value(&self, key: &str) -> &str {
        self.form.get(key).map(String::as_str).unwrap_or("")
    }

    fn header(&self, key: &str) -> &str {
        self.headers
            .get(key)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }
}

/// Plain map source, handy for tests and non-HTTP callers.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    pub form: HashMap<String, String>,
    pub headers: HashMap<String, String>,
}

impl MapSource {
    pub fn with_form<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            form: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.insert(key.to_ascii_lowercase(), value.into());
        self
    }
}

impl RequestSource for MapSource {
    fn form_value(&self, key: &str) -> &str {
        self.form.get(key).map(String::as_str).unwrap_or("")
    }

    fn header(&self, key: &str) -> &str {
        self.headers
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
            .unwrap_or("")
    }
}
