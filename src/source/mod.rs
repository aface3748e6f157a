//! Metrics sources — where gauge snapshots come from.
//!
//! The detector doesn't care who produces the gauges. Hosts embedding
//! jobwatch register gauges on a [`GaugeRegistry`]; the sidecar deployment
//! polls the job's metrics endpoint with [`HttpMetricsSource`].

pub mod http;
pub mod registry;

pub use http::HttpMetricsSource;
pub use registry::{GaugeHandle, GaugeRegistry};

use crate::error::Result;
use crate::gauges::GaugeSnapshot;

/// Supplies a fresh gauge snapshot each reporting tick.
pub trait MetricsSource {
    fn snapshot(&self) -> impl Future<Output = Result<GaugeSnapshot>> + Send;
}
