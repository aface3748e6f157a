//! Tests for gauge snapshots and suffix resolution.

use jobwatch::error::Error;
use jobwatch::gauges::{ABSENT, GaugeSnapshot};
use jobwatch::source::http::snapshot_from_json;
use serde_json::json;

#[test]
fn resolves_by_suffix_through_unknown_prefixes() {
    let snapshot: GaugeSnapshot = [("app123.allJobs".to_string(), json!(7))]
        .into_iter()
        .collect();

    assert_eq!(snapshot.resolve("allJobs").unwrap(), 7);
}

#[test]
fn missing_suffix_resolves_to_absent() {
    let snapshot: GaugeSnapshot = [("app123.allJobs".to_string(), json!(7))]
        .into_iter()
        .collect();

    assert_eq!(snapshot.resolve("activeJobs").unwrap(), ABSENT);
}

#[test]
fn empty_snapshot_resolves_to_absent_without_fault() {
    let snapshot = GaugeSnapshot::default();
    assert_eq!(snapshot.resolve("allJobs").unwrap(), ABSENT);
    assert_eq!(snapshot.resolve("anything").unwrap(), ABSENT);
}

#[test]
fn suffix_collision_picks_lexicographically_smallest_key() {
    let snapshot: GaugeSnapshot = [
        ("zzz.activeJobs".to_string(), json!(9)),
        ("aaa.activeJobs".to_string(), json!(3)),
        ("mmm.activeJobs".to_string(), json!(5)),
    ]
    .into_iter()
    .collect();

    assert_eq!(snapshot.resolve("activeJobs").unwrap(), 3);
}

#[test]
fn string_values_parse_as_integers() {
    let snapshot: GaugeSnapshot = [("app.failedStages".to_string(), json!("4"))]
        .into_iter()
        .collect();

    assert_eq!(snapshot.resolve("failedStages").unwrap(), 4);
}

#[test]
fn non_integer_values_are_malformed() {
    for bad in [json!(1.5), json!(true), json!(null), json!({"v": 1}), json!("4.2")] {
        let snapshot: GaugeSnapshot = [("app.allJobs".to_string(), bad)].into_iter().collect();
        let err = snapshot.resolve("allJobs").unwrap_err();
        assert!(matches!(err, Error::MalformedGauge { .. }));
    }
}

// ---------------------------------------------------------------------------
// Metrics document parsing (HTTP source)
// ---------------------------------------------------------------------------

#[test]
fn parses_dropwizard_metrics_document() {
    let body = r#"{
        "version": "3.0.0",
        "gauges": {
            "app-1.driver.DAGScheduler.job.allJobs": {"value": 3},
            "app-1.driver.DAGScheduler.job.activeJobs": {"value": 1}
        },
        "counters": {"app-1.something.count": {"count": 12}},
        "timers": {}
    }"#;

    let snapshot = snapshot_from_json(body).unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.resolve("allJobs").unwrap(), 3);
    assert_eq!(snapshot.resolve("activeJobs").unwrap(), 1);
}

#[test]
fn document_without_gauges_yields_empty_snapshot() {
    let snapshot = snapshot_from_json(r#"{"counters": {}}"#).unwrap();
    assert!(snapshot.is_empty());
    assert_eq!(snapshot.resolve("allJobs").unwrap(), ABSENT);
}

#[test]
fn garbage_document_is_an_error() {
    assert!(snapshot_from_json("not json at all").is_err());
}
