//! Gauge snapshots and logical-name resolution.
//!
//! The producing metrics system prefixes gauge names with a namespace or
//! application identifier that is not known in advance (e.g.
//! `"app-20260829.driver.DAGScheduler.job.activeJobs"`), so lookups match on
//! the suffix of the key rather than the full name.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{Error, Result};

/// Sentinel for a gauge that is absent from the snapshot. Absence is normal
/// input ("no info"), distinct from an observed zero.
pub const ABSENT: i64 = -1;

/// Logical names of the five gauges the detector reads each tick.
pub const ALL_JOBS: &str = "allJobs";
pub const ACTIVE_JOBS: &str = "activeJobs";
pub const FAILED_STAGES: &str = "failedStages";
pub const RUNNING_STAGES: &str = "runningStages";
pub const WAITING_STAGES: &str = "waitingStages";

/// An immutable point-in-time reading of named gauges.
///
/// Backed by a `BTreeMap` so key iteration order is defined: when several
/// keys share a suffix, [`GaugeSnapshot::resolve`] always picks the
/// lexicographically smallest match.
#[derive(Debug, Clone, Default)]
pub struct GaugeSnapshot {
    gauges: BTreeMap<String, Value>,
}

impl GaugeSnapshot {
    pub fn new(gauges: BTreeMap<String, Value>) -> Self {
        Self { gauges }
    }

    pub fn is_empty(&self) -> bool {
        self.gauges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.gauges.len()
    }

    /// Resolve a logical gauge name to its integer value.
    ///
    /// Scans keys in lexicographic order for the first one ending with
    /// `logical_name`. A missing gauge (or an empty snapshot) resolves to
    /// [`ABSENT`]; a matching key whose value is not an integer is an
    /// external data-integrity fault and returns [`Error::MalformedGauge`].
    pub fn resolve(&self, logical_name: &str) -> Result<i64> {
        let Some((key, value)) = self
            .gauges
            .iter()
            .find(|(key, _)| key.ends_with(logical_name))
        else {
            return Ok(ABSENT);
        };

        coerce_i64(value).ok_or_else(|| Error::MalformedGauge {
            key: key.clone(),
            value: value.to_string(),
        })
    }
}

impl FromIterator<(String, Value)> for GaugeSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            gauges: iter.into_iter().collect(),
        }
    }
}

/// Coerce a JSON gauge value to i64. Integers pass through; strings are
/// parsed base-10. Floats, bools, nulls, and structured values are rejected.
fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
