//! # jobwatch
//!
//! Batch-job completion reporter. Watches a running job's gauges (active
//! jobs, running/waiting/failed stages) on a fixed interval and, when the
//! run drains to idle, sends a single `"<cluster>,<true|false>"` message to
//! a durable pgmq queue so out-of-band consumers learn the job finished
//! without polling the job system themselves.

pub mod config;
pub mod detector;
pub mod error;
pub mod gauges;
pub mod reporter;
pub mod sink;
pub mod source;
pub mod telemetry;
