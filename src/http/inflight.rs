//! In-flight request tracking for graceful shutdown.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Counter {
    active: AtomicUsize,
    idle: Notify,
}

/// Shared count of requests currently being served.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    inner: Arc<Counter>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests currently in flight.
    pub fn current(&self) -> usize {
        self.inner.active.load(Ordering::Acquire)
    }

    /// Register a request. The slot is released when the guard drops.
    pub fn enter(&self) -> InFlightGuard {
        self.inner.active.fetch_add(1, Ordering::AcqRel);
        InFlightGuard {
            inner: self.inner.clone(),
        }
    }

    /// Wait until no request is in flight.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.current() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Holds one in-flight slot; released on drop, including on panic.
#[derive(Debug)]
pub struct InFlightGuard {
    inner: Arc<Counter>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.inner.active.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}

/// Middleware counting every request for the duration of its handler.
pub async fn track_in_flight(
    State(in_flight): State<InFlight>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let _guard = in_flight.enter();
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_idle_returns_immediately_when_idle() {
        let in_flight = InFlight::new();
        tokio::time::timeout(Duration::from_millis(100), in_flight.wait_idle())
            .await
            .expect("idle counter should not block");
    }

    #[tokio::test]
    async fn test_wait_idle_waits_for_guards() {
        let in_flight = InFlight::new();
        let guard = in_flight.enter();
        let second = in_flight.enter();
        assert_eq!(in_flight.current(), 2);

        let waiter = {
            let in_flight = in_flight.clone();
            tokio::spawn(async move { in_flight.wait_idle().await })
        };

        drop(guard);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(second);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish")
            .unwrap();
        assert_eq!(in_flight.current(), 0);
    }
}
