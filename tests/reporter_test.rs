//! Integration tests for the reporting loop with fake sources and sinks.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use jobwatch::error::{Error, Result};
use jobwatch::gauges::GaugeSnapshot;
use jobwatch::reporter::{Reporter, ReporterConfig, TickOutcome};
use jobwatch::sink::NotificationSink;
use jobwatch::source::MetricsSource;
use serde_json::json;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Replays a scripted sequence of snapshots, repeating the last one.
#[derive(Clone)]
struct ScriptedSource {
    frames: Arc<Mutex<VecDeque<GaugeSnapshot>>>,
    last: Arc<Mutex<GaugeSnapshot>>,
}

impl ScriptedSource {
    fn new(frames: Vec<GaugeSnapshot>) -> Self {
        Self {
            frames: Arc::new(Mutex::new(frames.into())),
            last: Arc::new(Mutex::new(GaugeSnapshot::default())),
        }
    }
}

impl MetricsSource for ScriptedSource {
    async fn snapshot(&self) -> Result<GaugeSnapshot> {
        let mut frames = self.frames.lock().unwrap();
        if let Some(frame) = frames.pop_front() {
            *self.last.lock().unwrap() = frame.clone();
            Ok(frame)
        } else {
            Ok(self.last.lock().unwrap().clone())
        }
    }
}

/// A source whose endpoint is down.
struct DownSource;

impl MetricsSource for DownSource {
    async fn snapshot(&self) -> Result<GaugeSnapshot> {
        Err(Error::Other("connection refused".to_string()))
    }
}

/// Records every message it delivers.
#[derive(Clone, Default)]
struct RecordingSink {
    sent: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    async fn send(&self, message: &str) -> Result<()> {
        self.sent.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

/// Always fails to deliver.
struct BrokenSink;

impl NotificationSink for BrokenSink {
    async fn send(&self, _message: &str) -> Result<()> {
        Err(Error::Other("queue unreachable".to_string()))
    }
}

fn frame(gauges: &[(&str, i64)]) -> GaugeSnapshot {
    gauges
        .iter()
        .map(|(name, value)| (format!("app-7.driver.DAGScheduler.job.{name}"), json!(value)))
        .collect()
}

fn busy_frame() -> GaugeSnapshot {
    frame(&[
        ("allJobs", 1),
        ("activeJobs", 1),
        ("failedStages", 0),
        ("runningStages", 1),
        ("waitingStages", 0),
    ])
}

fn idle_frame(failed: i64) -> GaugeSnapshot {
    frame(&[
        ("allJobs", 1),
        ("activeJobs", 0),
        ("failedStages", failed),
        ("runningStages", 0),
        ("waitingStages", 0),
    ])
}

fn config(cluster: &str) -> ReporterConfig {
    ReporterConfig {
        cluster: cluster.to_string(),
        ..ReporterConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Tick behavior
// ---------------------------------------------------------------------------

#[tokio::test]
async fn quiet_until_job_finishes_then_notifies_once() {
    let source = ScriptedSource::new(vec![busy_frame(), idle_frame(0)]);
    let sink = RecordingSink::default();
    let mut reporter = Reporter::new(source, sink.clone(), config("cluster-a"));

    assert_eq!(reporter.tick().await, TickOutcome::Quiet);
    assert_eq!(
        reporter.tick().await,
        TickOutcome::Notified { succeeded: true }
    );
    // The idle frame repeats forever; no further notifications.
    assert_eq!(reporter.tick().await, TickOutcome::Quiet);
    assert_eq!(reporter.tick().await, TickOutcome::Quiet);

    assert_eq!(sink.messages(), vec!["cluster-a,true".to_string()]);
}

#[tokio::test]
async fn failed_stages_produce_failure_message() {
    let source = ScriptedSource::new(vec![busy_frame(), idle_frame(3)]);
    let sink = RecordingSink::default();
    let mut reporter = Reporter::new(source, sink.clone(), config("cluster-b"));

    reporter.tick().await;
    assert_eq!(
        reporter.tick().await,
        TickOutcome::Notified { succeeded: false }
    );
    assert_eq!(sink.messages(), vec!["cluster-b,false".to_string()]);
}

#[tokio::test]
async fn delivery_failure_is_swallowed_and_not_retried() {
    let source = ScriptedSource::new(vec![busy_frame(), idle_frame(0)]);
    let mut reporter = Reporter::new(source, BrokenSink, config("cluster-c"));

    assert_eq!(reporter.tick().await, TickOutcome::Quiet);
    assert_eq!(
        reporter.tick().await,
        TickOutcome::NotificationLost { succeeded: true }
    );
    // Detector reset despite the lost message: later idle ticks stay quiet
    // instead of re-firing into the broken sink.
    assert_eq!(reporter.tick().await, TickOutcome::Quiet);
}

#[tokio::test]
async fn unreachable_source_skips_ticks_forever() {
    let mut reporter = Reporter::new(DownSource, RecordingSink::default(), config("cluster-d"));

    for _ in 0..3 {
        assert_eq!(reporter.tick().await, TickOutcome::Skipped);
    }
}

#[tokio::test]
async fn malformed_gauge_skips_the_tick_but_detection_recovers() {
    let bad: GaugeSnapshot = [
        ("app.allJobs".to_string(), json!(1)),
        ("app.activeJobs".to_string(), json!(false)),
        ("app.failedStages".to_string(), json!(0)),
        ("app.runningStages".to_string(), json!(0)),
        ("app.waitingStages".to_string(), json!(0)),
    ]
    .into_iter()
    .collect();

    let source = ScriptedSource::new(vec![busy_frame(), bad, idle_frame(0)]);
    let sink = RecordingSink::default();
    let mut reporter = Reporter::new(source, sink.clone(), config("cluster-e"));

    assert_eq!(reporter.tick().await, TickOutcome::Quiet);
    assert_eq!(reporter.tick().await, TickOutcome::Skipped);
    assert_eq!(
        reporter.tick().await,
        TickOutcome::Notified { succeeded: true }
    );
    assert_eq!(sink.messages(), vec!["cluster-e,true".to_string()]);
}

#[tokio::test]
async fn two_job_cycles_produce_two_notifications() {
    let source = ScriptedSource::new(vec![
        busy_frame(),
        idle_frame(0),
        busy_frame(),
        idle_frame(2),
    ]);
    let sink = RecordingSink::default();
    let mut reporter = Reporter::new(source, sink.clone(), config("cluster-f"));

    for _ in 0..4 {
        reporter.tick().await;
    }

    assert_eq!(
        sink.messages(),
        vec!["cluster-f,true".to_string(), "cluster-f,false".to_string()]
    );
}

// ---------------------------------------------------------------------------
// Loop lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_stops_on_shutdown_signal() {
    let source = ScriptedSource::new(vec![]);
    let mut reporter = Reporter::new(
        source,
        RecordingSink::default(),
        ReporterConfig {
            interval: std::time::Duration::from_millis(5),
            cluster: "cluster-g".to_string(),
        },
    );

    let shutdown = reporter.shutdown_handle();
    let handle = tokio::spawn(async move {
        reporter.run().await;
    });

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    shutdown.notify_one();

    tokio::time::timeout(std::time::Duration::from_secs(1), handle)
        .await
        .expect("reporter loop should stop after shutdown")
        .unwrap();
}
