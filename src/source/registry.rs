//! In-process gauge registry for hosts that embed the reporter.
//!
//! The host registers named gauges once and updates them through cheap
//! atomic handles from its own threads; the reporter snapshots the whole
//! registry each tick.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::error::Result;
use crate::gauges::GaugeSnapshot;

use super::MetricsSource;

/// Writer side of a registered gauge. Clone freely; all clones update the
/// same underlying value.
#[derive(Debug, Clone)]
pub struct GaugeHandle {
    value: Arc<AtomicI64>,
}

impl GaugeHandle {
    pub fn set(&self, value: i64) {
        self.value.store(value, Ordering::Relaxed);
    }

    pub fn add(&self, delta: i64) {
        self.value.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// A registry of named integer gauges. Cloning shares the registry.
#[derive(Debug, Clone, Default)]
pub struct GaugeRegistry {
    gauges: Arc<RwLock<BTreeMap<String, Arc<AtomicI64>>>>,
}

impl GaugeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a gauge under its fully-qualified name, initialized to zero.
    /// Registering the same name twice returns a handle to the same gauge.
    pub fn register(&self, name: impl Into<String>) -> GaugeHandle {
        let mut gauges = self.gauges.write().unwrap_or_else(|e| e.into_inner());
        let value = gauges
            .entry(name.into())
            .or_insert_with(|| Arc::new(AtomicI64::new(0)))
            .clone();
        GaugeHandle { value }
    }

    /// Read every registered gauge into a snapshot.
    pub fn read(&self) -> GaugeSnapshot {
        let gauges = self.gauges.read().unwrap_or_else(|e| e.into_inner());
        gauges
            .iter()
            .map(|(name, value)| {
                (
                    name.clone(),
                    Value::from(value.load(Ordering::Relaxed)),
                )
            })
            .collect()
    }
}

impl MetricsSource for GaugeRegistry {
    async fn snapshot(&self) -> Result<GaugeSnapshot> {
        Ok(self.read())
    }
}
