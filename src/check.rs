//! The two health checks run on every poll.

use chrono::{DateTime, Duration, Utc};
use k8s_openapi::api::core::v1::Event;
use tracing::{debug, warn};

use crate::error::AuditError;
use crate::selector::{FieldSelector, GENERAL_SELECTOR, NODE_SELECTOR};
use crate::source::EventSource;

#[derive(Debug)]
pub enum CheckOutcome {
    Healthy,
    Troubled(Vec<Event>),
    /// The check could not complete; counts as unhealthy.
    Failed(AuditError),
}

impl CheckOutcome {
    pub fn is_healthy(&self) -> bool {
        matches!(self, CheckOutcome::Healthy)
    }

    fn from_events(events: Vec<Event>) -> Self {
        if events.is_empty() {
            CheckOutcome::Healthy
        } else {
            CheckOutcome::Troubled(events)
        }
    }
}

async fn query<S: EventSource>(source: &S, expr: &str) -> Result<Vec<Event>, AuditError> {
    let selector = FieldSelector::parse(expr)?;
    source.list(&selector).await
}

/// Events of any type other than `Normal` or `Warning`, in any namespace.
pub async fn general_check<S: EventSource>(source: &S) -> CheckOutcome {
    match query(source, GENERAL_SELECTOR).await {
        Ok(events) => {
            debug!(count = events.len(), "general check");
            CheckOutcome::from_events(events)
        }
        Err(err) => {
            warn!(error = %err, "general event check failed");
            CheckOutcome::Failed(err)
        }
    }
}

/// Non-`Normal` Node events last seen within `lookback` of `now`.
pub async fn node_check<S: EventSource>(
    source: &S,
    lookback: Duration,
    now: DateTime<Utc>,
) -> CheckOutcome {
    let events = match query(source, NODE_SELECTOR).await {
        Ok(events) => events,
        Err(err) => {
            warn!(error = %err, "node event check failed");
            return CheckOutcome::Failed(err);
        }
    };

    let cutoff = now - lookback;
    let total = events.len();
    let recent: Vec<Event> = events
        .into_iter()
        .filter(|ev| is_recent(ev, cutoff))
        .collect();
    debug!(total, recent = recent.len(), %cutoff, "node check");
    CheckOutcome::from_events(recent)
}

/// Strictly after `cutoff`; events without a last timestamp never qualify.
pub fn is_recent(event: &Event, cutoff: DateTime<Utc>) -> bool {
    event
        .last_timestamp
        .as_ref()
        .is_some_and(|ts| ts.0 > cutoff)
}
