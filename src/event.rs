use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Event;
use serde::Serialize;

/// The slice of an [`Event`] the auditor reports on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(rename = "type")]
    pub type_: String,
    pub reason: String,
    pub message: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
    pub last_timestamp: Option<DateTime<Utc>>,
    pub first_timestamp: Option<DateTime<Utc>>,
    pub event_time: Option<DateTime<Utc>>,
    pub count: Option<i32>,
}

impl From<&Event> for EventRecord {
    fn from(ev: &Event) -> Self {
        let obj = &ev.involved_object;
        let text = |s: &Option<String>| s.clone().unwrap_or_default();
        Self {
            type_: text(&ev.type_),
            reason: text(&ev.reason),
            message: text(&ev.message),
            kind: text(&obj.kind),
            namespace: text(&obj.namespace),
            name: text(&obj.name),
            last_timestamp: ev.last_timestamp.as_ref().map(|t| t.0),
            first_timestamp: ev.first_timestamp.as_ref().map(|t| t.0),
            event_time: ev.event_time.as_ref().map(|t| t.0),
            count: ev.count,
        }
    }
}

/// Renders an optional timestamp the way the text report shows it.
pub fn display_time(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        None => "<unknown>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use k8s_openapi::api::core::v1::ObjectReference;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

    use super::*;

    #[test]
    fn record_from_event() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let ev = Event {
            type_: Some("Error".into()),
            reason: Some("FailedMount".into()),
            involved_object: ObjectReference {
                kind: Some("Pod".into()),
                namespace: Some("kube-system".into()),
                name: Some("coredns-0".into()),
                ..Default::default()
            },
            last_timestamp: Some(Time(ts)),
            ..Default::default()
        };

        let rec = EventRecord::from(&ev);
        assert_eq!(rec.type_, "Error");
        assert_eq!(rec.namespace, "kube-system");
        assert_eq!(rec.message, "");
        assert_eq!(rec.last_timestamp, Some(ts));
        assert_eq!(display_time(rec.last_timestamp), "2024-03-01T12:00:00Z");
        assert_eq!(display_time(rec.event_time), "<unknown>");

        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["type"], "Error");
        assert_eq!(json["lastTimestamp"], "2024-03-01T12:00:00Z");
    }
}
