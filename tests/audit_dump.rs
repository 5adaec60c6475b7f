use std::io::Write;

use chrono::{Duration, SecondsFormat, Utc};
use kube_event_audit::{run, Auditor, Exit, FileEventSource, OutputFormat, Reporter, RunMode};
use serde_json::json;

fn dump(items: serde_json::Value) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    let list = json!({ "apiVersion": "v1", "kind": "List", "items": items });
    write!(file, "{list}").unwrap();
    file
}

fn event(name: &str, type_: &str, kind: &str, minutes_ago: i64) -> serde_json::Value {
    let last = (Utc::now() - Duration::minutes(minutes_ago)).to_rfc3339_opts(SecondsFormat::Secs, true);
    json!({
        "metadata": { "name": name, "namespace": "default" },
        "type": type_,
        "reason": format!("{type_}Reason"),
        "message": format!("{name} happened"),
        "lastTimestamp": last,
        "involvedObject": { "kind": kind, "name": name, "namespace": "default" }
    })
}

async fn audit(file: &tempfile::NamedTempFile, format: OutputFormat) -> (Exit, String) {
    let source = FileEventSource::load(file.path()).unwrap();
    let mut auditor = Auditor::new(source, 10, Reporter::new(Vec::new(), format));
    let exit = run(&mut auditor, RunMode::Once, std::future::pending())
        .await
        .unwrap();
    let (_, reporter) = auditor.into_parts();
    (exit, String::from_utf8(reporter.into_inner()).unwrap())
}

#[tokio::test]
async fn clean_dump_is_healthy() {
    let file = dump(json!([
        event("scheduled", "Normal", "Pod", 1),
        event("backoff", "Warning", "Pod", 1),
        event("old-node", "Warning", "Node", 60),
    ]));

    let (exit, out) = audit(&file, OutputFormat::Text).await;

    assert_eq!(exit, Exit::Healthy);
    assert!(out.contains("No troublesome events found."));
}

#[tokio::test]
async fn recent_node_warning_is_unhealthy() {
    let file = dump(json!([
        event("scheduled", "Normal", "Pod", 1),
        event("not-ready", "Warning", "Node", 2),
    ]));

    let (exit, out) = audit(&file, OutputFormat::Brief).await;

    assert_eq!(exit, Exit::Unhealthy);
    assert!(out.contains("🔥 Detected troublesome Node events:"));
    assert!(out.contains("WarningReason"));
    assert!(!out.contains("Message:"));
}

#[tokio::test]
async fn json_output_lists_every_offender() {
    let file = dump(json!([
        event("crash", "Error", "Pod", 90),
        event("disk", "Error", "Node", 1),
    ]));

    let (exit, out) = audit(&file, OutputFormat::Json).await;

    assert_eq!(exit, Exit::Unhealthy);
    let lines: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    // both show up in the general check, the Node one again in the node check
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|v| v["type"] == "Error"));
}
