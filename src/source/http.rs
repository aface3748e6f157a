//! Metrics source that polls a job's JSON metrics endpoint.
//!
//! Expects the Dropwizard-style document most batch engines expose at
//! `/metrics/json`:
//!
//! ```json
//! {"gauges": {"app-1.driver.DAGScheduler.job.activeJobs": {"value": 2}, ...}}
//! ```
//!
//! Counters, histograms, meters, and timers in the document are ignored;
//! only gauges feed the detector.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

use crate::error::Result;
use crate::gauges::GaugeSnapshot;

use super::MetricsSource;

#[derive(Debug, Deserialize)]
struct MetricsDocument {
    #[serde(default)]
    gauges: BTreeMap<String, GaugeEntry>,
}

#[derive(Debug, Deserialize)]
struct GaugeEntry {
    value: Value,
}

/// Build a snapshot from a metrics JSON document.
pub fn snapshot_from_json(body: &str) -> Result<GaugeSnapshot> {
    let doc: MetricsDocument = serde_json::from_str(body)
        .map_err(|e| crate::error::Error::Other(format!("bad metrics document: {e}")))?;
    Ok(doc
        .gauges
        .into_iter()
        .map(|(name, entry)| (name, entry.value))
        .collect())
}

/// Polls a metrics endpoint over HTTP each tick.
pub struct HttpMetricsSource {
    client: reqwest::Client,
    url: String,
}

impl HttpMetricsSource {
    /// Create a source for the given endpoint URL.
    ///
    /// The request timeout is kept well under any sane reporting interval so
    /// a stuck endpoint degrades into skipped ticks, not a stalled loop.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl MetricsSource for HttpMetricsSource {
    async fn snapshot(&self) -> Result<GaugeSnapshot> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let snapshot = snapshot_from_json(&body)?;
        trace!(url = %self.url, gauges = snapshot.len(), "polled metrics endpoint");
        Ok(snapshot)
    }
}
