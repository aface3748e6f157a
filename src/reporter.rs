//! The reporting loop: poll gauges, evaluate the detector, notify the sink.
//!
//! Single task, strictly serialized ticks — the next tick is not scheduled
//! until snapshot, evaluation, and any send have all finished, so the
//! detector's latch is never touched concurrently.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{error, info, warn};

use crate::detector::CompletionDetector;
use crate::sink::NotificationSink;
use crate::source::MetricsSource;
use crate::telemetry::metrics;

/// Configuration for the reporting loop.
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// Time between reporting ticks.
    pub interval: Duration,
    /// Cluster identifier carried in completion messages.
    pub cluster: String,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            cluster: "unknown-cluster".to_string(),
        }
    }
}

/// What one tick did. Returned by [`Reporter::tick`] so tests and callers
/// can observe the loop's decisions without parsing logs.
#[derive(Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Gauges evaluated, no completion detected.
    Quiet,
    /// Completion detected and the notification was delivered.
    Notified { succeeded: bool },
    /// Completion detected but delivery failed. Not retried: the detector
    /// already reset, so the next cycle starts clean.
    NotificationLost { succeeded: bool },
    /// The tick was skipped (source unreachable or a malformed gauge).
    Skipped,
}

/// Drives a [`CompletionDetector`] on a fixed interval and hands events to
/// the sink. One instance per observed job run.
pub struct Reporter<M, S> {
    source: M,
    sink: S,
    detector: CompletionDetector,
    interval: Duration,
    shutdown: Arc<Notify>,
}

impl<M: MetricsSource, S: NotificationSink> Reporter<M, S> {
    pub fn new(source: M, sink: S, config: ReporterConfig) -> Self {
        Self {
            source,
            sink,
            detector: CompletionDetector::new(config.cluster),
            interval: config.interval,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Handle for signalling the loop to stop. The current tick finishes
    /// before the loop exits.
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    /// Run ticks until shutdown. Never returns an error: per-tick faults are
    /// logged and counted, and the loop carries on — a background reporter
    /// must not crash its host job.
    pub async fn run(&mut self) {
        let mut timer = tokio::time::interval(self.interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(interval = ?self.interval, "reporter started");

        loop {
            tokio::select! {
                _ = self.shutdown.notified() => {
                    info!("reporter shutting down");
                    return;
                }
                _ = timer.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    /// Evaluate one tick. All faults stay local to the tick.
    pub async fn tick(&mut self) -> TickOutcome {
        let snapshot = match self.source.snapshot().await {
            Ok(s) => s,
            Err(e) => {
                warn!("metrics source unavailable, skipping tick: {e}");
                metrics::report_ticks().add(1, &[kv("result", "source_error")]);
                return TickOutcome::Skipped;
            }
        };

        let event = match self.detector.observe(&snapshot) {
            Ok(event) => event,
            Err(e) => {
                // Bad external data could flip the completion decision, so
                // the whole tick is discarded. The latch is untouched.
                warn!("skipping tick: {e}");
                metrics::report_ticks().add(1, &[kv("result", "malformed_gauge")]);
                return TickOutcome::Skipped;
            }
        };

        metrics::report_ticks().add(1, &[kv("result", "ok")]);

        let Some(event) = event else {
            return TickOutcome::Quiet;
        };

        let outcome = if event.succeeded { "success" } else { "failure" };
        metrics::completions_detected().add(1, &[kv("outcome", outcome)]);

        // At-most-once: a failed send is reported and dropped. The detector
        // reset when it fired, so no double notification on later ticks.
        match self.sink.send(&event.message()).await {
            Ok(()) => TickOutcome::Notified {
                succeeded: event.succeeded,
            },
            Err(e) => {
                error!(message = %event.message(), "notification delivery failed: {e}");
                metrics::delivery_failures().add(1, &[]);
                TickOutcome::NotificationLost {
                    succeeded: event.succeeded,
                }
            }
        }
    }
}

fn kv(key: &'static str, value: &'static str) -> opentelemetry::KeyValue {
    opentelemetry::KeyValue::new(key, value)
}
