//! Route document hot reload.
//!
//! # Responsibilities
//! - Watch the directory holding the route document so rename-replaced
//!   files are seen
//! - Collapse bursts of change events into one reload
//! - Forward documents that parsed and differ from the last one sent
//!
//! Invalid documents are logged and skipped; the current table stays live.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::routing::document::{load_routes, RouteDocument};

/// Quiet period after the last change event before reloading.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Watches one route document and emits reloaded documents.
pub struct RouteWatcher {
    path: PathBuf,
    debounce: Duration,
    current: Option<RouteDocument>,
    update_tx: mpsc::UnboundedSender<RouteDocument>,
}

/// Live watch. Dropping it stops reloads.
pub struct RouteWatch {
    _watcher: RecommendedWatcher,
    reloader: JoinHandle<()>,
}

impl Drop for RouteWatch {
    fn drop(&mut self) {
        self.reloader.abort();
    }
}

impl RouteWatcher {
    /// Returns the watcher and the receiver reloaded documents arrive on.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RouteDocument>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            debounce: DEFAULT_DEBOUNCE,
            current: None,
            update_tx,
        };
        (watcher, update_rx)
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// The document already being served; an identical reload is not forwarded.
    pub fn starting_from(mut self, document: RouteDocument) -> Self {
        self.current = Some(document);
        self
    }

    /// Start watching. Must be called inside a Tokio runtime.
    pub fn run(self) -> Result<RouteWatch, notify::Error> {
        let Some(file_name) = self.path.file_name().map(OsString::from) else {
            return Err(notify::Error::generic("route path has no file name")
                .add_path(self.path.clone()));
        };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (change_tx, change_rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let relevant = (event.kind.is_modify() || event.kind.is_create())
                    && event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == Some(file_name.as_os_str()));
                if relevant {
                    let _ = change_tx.send(());
                }
            }
            Err(e) => tracing::error!(error = %e, "Route watch error"),
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %self.path.display(), debounce_ms = self.debounce.as_millis() as u64, "Route watcher started");

        let reloader = tokio::spawn(reload_loop(
            self.path,
            self.debounce,
            self.current,
            change_rx,
            self.update_tx,
        ));

        Ok(RouteWatch {
            _watcher: watcher,
            reloader,
        })
    }
}

async fn reload_loop(
    path: PathBuf,
    debounce: Duration,
    mut current: Option<RouteDocument>,
    mut changes: mpsc::UnboundedReceiver<()>,
    updates: mpsc::UnboundedSender<RouteDocument>,
) {
    while changes.recv().await.is_some() {
        // Wait for the burst to settle.
        loop {
            match tokio::time::timeout(debounce, changes.recv()).await {
                Ok(Some(())) => continue,
                Ok(None) => return,
                Err(_) => break,
            }
        }

        let document = match load_routes(&path) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to reload routes, keeping current table");
                continue;
            }
        };
        if current.as_ref() == Some(&document) {
            tracing::debug!(path = %path.display(), "Route document unchanged");
            continue;
        }

        tracing::info!(
            path = %path.display(),
            groups = document.groups.len(),
            entries = document.action.len(),
            "Route document reloaded"
        );
        current = Some(document.clone());
        if updates.send(document).is_err() {
            tracing::debug!("Route update receiver dropped, stopping reloads");
            return;
        }
    }
}
