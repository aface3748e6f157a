//! Completion detection. The one piece of real logic in this crate.
//!
//! An edge-triggered latch over a noisy gauge bundle: `allJobs` can read 1
//! before any job has actually been submitted, so a bare "everything is idle"
//! snapshot is not enough to conclude the run finished. The detector arms a
//! latch the first time it sees activity and only fires once the armed run
//! drains back to fully idle. One event per job lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::gauges::{
    ACTIVE_JOBS, ALL_JOBS, FAILED_STAGES, GaugeSnapshot, RUNNING_STAGES, WAITING_STAGES,
};

/// The single output signal: "the observed job run has just ended."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    /// Identifier of the cluster the run executed on.
    pub cluster: String,
    /// False when any stage failed during the run.
    pub succeeded: bool,
    pub detected_at: DateTime<Utc>,
}

impl CompletionEvent {
    /// The literal wire message consumers expect: `"<cluster>,<true|false>"`.
    pub fn message(&self) -> String {
        format!("{},{}", self.cluster, self.succeeded)
    }
}

/// Stateful completion detector. Owns the latch; one instance per observed
/// job run. Evaluated once per tick by the reporter loop — ticks must never
/// overlap (the loop awaits each evaluation before scheduling the next).
#[derive(Debug)]
pub struct CompletionDetector {
    cluster: String,
    has_had_active_stages: bool,
}

impl CompletionDetector {
    pub fn new(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            has_had_active_stages: false,
        }
    }

    /// Whether the latch is armed (activity has been observed this cycle).
    pub fn armed(&self) -> bool {
        self.has_had_active_stages
    }

    /// Evaluate one tick. Returns an event at most once per job cycle.
    ///
    /// Pure transition over (state, snapshot) — no I/O. A malformed gauge
    /// value aborts the tick with an error and leaves the latch untouched;
    /// the caller skips the tick and continues.
    pub fn observe(&mut self, snapshot: &GaugeSnapshot) -> Result<Option<CompletionEvent>> {
        let all_jobs = snapshot.resolve(ALL_JOBS)?;
        let active_jobs = snapshot.resolve(ACTIVE_JOBS)?;
        let failed_stages = snapshot.resolve(FAILED_STAGES)?;
        let running_stages = snapshot.resolve(RUNNING_STAGES)?;
        let waiting_stages = snapshot.resolve(WAITING_STAGES)?;

        // One-way latch per cycle: any observed activity arms it.
        if active_jobs > 0 {
            self.has_had_active_stages = true;
        }

        // Fire only when an armed run has fully drained. The latch guards
        // against the pre-initialized allJobs=1 snapshot at startup.
        let finished = self.has_had_active_stages
            && all_jobs > 0
            && active_jobs == 0
            && running_stages == 0
            && waiting_stages == 0;

        if !finished {
            return Ok(None);
        }

        let succeeded = failed_stages <= 0;
        info!(
            cluster = %self.cluster,
            succeeded,
            failed_stages,
            "detected finished job"
        );

        // Reset regardless of what the caller does with the event. Delivery
        // failure must not re-arm the latch, or the next tick double-fires.
        self.has_had_active_stages = false;

        Ok(Some(CompletionEvent {
            cluster: self.cluster.clone(),
            succeeded,
            detected_at: Utc::now(),
        }))
    }
}
