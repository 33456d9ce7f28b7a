//! Concurrent rule evaluation.
//!
//! # Responsibilities
//! - Spawn one task per rule against a shared request snapshot
//! - Fan results in through a channel sized to the rule count
//! - Merge successes or aggregate failures
//!
//! # Design Decisions
//! - Any failure discards every successful value
//! - Failure messages are joined in completion order
//! - Coercion never fails a rule; only the named check does

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::validation::params::Params;
use crate::validation::rule::{Check, Rule};
use crate::validation::source::RequestSource;
use crate::validation::value::Value;

/// Separator between aggregated failure messages.
pub const MESSAGE_SEPARATOR: &str = "; ";

/// Aggregated validation failure for one request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .failures.join(MESSAGE_SEPARATOR))]
pub struct ValidationError {
    failures: Vec<String>,
}

impl ValidationError {
    /// Individual failure messages in completion order.
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

/// Result of evaluating a single rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Empty key; contributes nothing.
    Skipped,
    Accepted { key: String, value: Value },
    Rejected { key: String, message: String },
}

/// Evaluate one rule against a request.
pub fn evaluate<S>(rule: &Rule, source: &S) -> Outcome
where
    S: RequestSource + ?Sized,
{
    if rule.key.is_empty() {
        return Outcome::Skipped;
    }

    let (key, raw) = source.lookup(&rule.key);
    let value = if raw.is_empty() {
        rule.default.clone().unwrap_or(Value::Absent)
    } else {
        rule.value_type.coerce(raw)
    };

    if let Check::Unknown(name) = &rule.check {
        tracing::warn!(key = %key, rule = %name, "Unknown validation rule, failing parameter");
    }

    if rule.accepts(&value) {
        Outcome::Accepted {
            key: key.to_string(),
            value,
        }
    } else {
        Outcome::Rejected {
            key: key.to_string(),
            message: rule.failure_message(key),
        }
    }
}

/// Validate `rules` against one request snapshot.
///
/// Returns every produced value, or a single error combining all failures.
pub async fn validate<S>(source: Arc<S>, rules: &[Rule]) -> Result<Params, ValidationError>
where
    S: RequestSource + 'static,
{
    let mut params = Params::default();
    if rules.is_empty() {
        return Ok(params);
    }

    let (tx, mut rx) = mpsc::channel(rules.len());
    for rule in rules {
        let tx = tx.clone();
        let source = source.clone();
        let rule = rule.clone();
        tokio::spawn(async move {
            let outcome = evaluate(&rule, &*source);
            // Capacity equals the rule count, so this never waits.
            let _ = tx.send(outcome).await;
        });
    }
    drop(tx);

    let mut failures = Vec::new();
    let mut received = 0;
    while received < rules.len() {
        let Some(outcome) = rx.recv().await else {
            break;
        };
        received += 1;
        match outcome {
            Outcome::Skipped => {}
            Outcome::Accepted { key, value } => params.set(key, value),
            Outcome::Rejected { key, message } => {
                tracing::debug!(key = %key, message = %message, "Parameter rejected");
                failures.push(message);
            }
        }
    }

    if received < rules.len() {
        tracing::error!(
            expected = rules.len(),
            received,
            "Validation tasks exited without reporting"
        );
        failures.push("Parameter validation interrupted".to_string());
    }

    if failures.is_empty() {
        Ok(params)
    } else {
        Err(ValidationError { failures })
    }
}
