use std::io::{self, Write};

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::check::{general_check, node_check, CheckOutcome};
use crate::report::Reporter;
use crate::source::EventSource;

/// Result of one poll: both checks, each healthy or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub general: bool,
    pub node: bool,
}

impl Verdict {
    pub fn is_healthy(&self) -> bool {
        self.general && self.node
    }
}

/// Runs both checks against an injected event source and reports the
/// findings. Both checks always run, so a failing general check never hides
/// node trouble.
pub struct Auditor<S, W> {
    source: S,
    lookback_minutes: u32,
    reporter: Reporter<W>,
}

impl<S: EventSource, W: Write> Auditor<S, W> {
    pub fn new(source: S, lookback_minutes: u32, reporter: Reporter<W>) -> Self {
        Self {
            source,
            lookback_minutes,
            reporter,
        }
    }

    pub fn reporter(&mut self) -> &mut Reporter<W> {
        &mut self.reporter
    }

    pub fn into_parts(self) -> (S, Reporter<W>) {
        (self.source, self.reporter)
    }

    pub async fn audit_once(&mut self, now: DateTime<Utc>) -> io::Result<Verdict> {
        self.reporter.general_banner()?;
        let general = general_check(&self.source).await;
        let general = self.report(general, "events")?;

        self.reporter.node_banner(self.lookback_minutes)?;
        let lookback = Duration::minutes(i64::from(self.lookback_minutes));
        let node = node_check(&self.source, lookback, now).await;
        let node = self.report(node, "Node events")?;

        let verdict = Verdict { general, node };
        if verdict.is_healthy() {
            self.reporter.healthy()?;
        }
        self.reporter.flush()?;
        info!(general, node, healthy = verdict.is_healthy(), "audit complete");
        Ok(verdict)
    }

    fn report(&mut self, outcome: CheckOutcome, header: &str) -> io::Result<bool> {
        match &outcome {
            CheckOutcome::Healthy => {}
            CheckOutcome::Troubled(events) => self.reporter.troubled(header, events)?,
            CheckOutcome::Failed(err) => self.reporter.failure(err)?,
        }
        Ok(outcome.is_healthy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::tests::{event, now, ScriptedSource};
    use crate::report::OutputFormat;
    use crate::source::FileEventSource;

    fn auditor<S: EventSource>(source: S) -> Auditor<S, Vec<u8>> {
        Auditor::new(source, 10, Reporter::new(Vec::new(), OutputFormat::Text))
    }

    fn output<S: EventSource>(auditor: Auditor<S, Vec<u8>>) -> String {
        let (_, reporter) = auditor.into_parts();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[tokio::test]
    async fn healthy_cluster() {
        let mut auditor = auditor(FileEventSource::new(vec![
            event("Normal", "Pod", Some(now())),
            event("Warning", "Node", Some(now() - Duration::minutes(30))),
        ]));
        let verdict = auditor.audit_once(now()).await.unwrap();
        assert!(verdict.is_healthy());

        let out = output(auditor);
        assert!(!out.contains("🔥"));
        assert!(out.ends_with("No troublesome events found.\n"));
    }

    #[tokio::test]
    async fn error_event_makes_cluster_unhealthy() {
        let mut auditor = auditor(FileEventSource::new(vec![event("Error", "Pod", None)]));
        let verdict = auditor.audit_once(now()).await.unwrap();
        assert_eq!(verdict, Verdict { general: false, node: true });
        assert!(!verdict.is_healthy());

        let out = output(auditor);
        assert_eq!(out.matches("🗒️").count(), 1);
        assert!(!out.contains("No troublesome events found."));
    }

    #[tokio::test]
    async fn both_checks_run_when_general_fails() {
        let mut auditor = auditor(FileEventSource::new(vec![
            event("Error", "Pod", None),
            event("Warning", "Node", Some(now() - Duration::minutes(2))),
        ]));
        let verdict = auditor.audit_once(now()).await.unwrap();
        assert_eq!(verdict, Verdict { general: false, node: false });

        let out = output(auditor);
        assert!(out.contains("🔥 Detected troublesome events:"));
        assert!(out.contains("🔥 Detected troublesome Node events:"));
        assert!(out.contains("(now()-10m)"));
    }

    #[tokio::test]
    async fn query_failure_is_reported_not_raised() {
        let source = ScriptedSource::new(vec![None]);
        let mut auditor = auditor(source);
        let verdict = auditor.audit_once(now()).await.unwrap();
        assert_eq!(verdict, Verdict { general: false, node: false });

        let (source, reporter) = auditor.into_parts();
        assert_eq!(source.calls(), 2);
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(out.matches("Unable to retrieve events").count(), 2);
    }
}
