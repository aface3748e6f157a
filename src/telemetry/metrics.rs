//! Metric instrument factories for jobwatch's own telemetry.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments are created lazily from the `"jobwatch"` meter. These are
//! the reporter's metrics about itself, not the job gauges it observes.

use opentelemetry::metrics::{Counter, Meter};

/// Returns the shared meter for jobwatch instruments.
fn meter() -> Meter {
    opentelemetry::global::meter("jobwatch")
}

/// Counter: reporting ticks evaluated.
/// Labels: `result` ("ok" | "source_error" | "malformed_gauge").
pub fn report_ticks() -> Counter<u64> {
    meter()
        .u64_counter("jobwatch.report.ticks")
        .with_description("Number of reporting ticks evaluated")
        .build()
}

/// Counter: completion events detected.
/// Labels: `outcome` ("success" | "failure").
pub fn completions_detected() -> Counter<u64> {
    meter()
        .u64_counter("jobwatch.completions.detected")
        .with_description("Number of job completions detected")
        .build()
}

/// Counter: notifications successfully handed to the queue.
/// Labels: `queue`.
pub fn notifications_sent() -> Counter<u64> {
    meter()
        .u64_counter("jobwatch.notifications.sent")
        .with_description("Number of completion notifications sent")
        .build()
}

/// Counter: notification sends that failed. Deliveries are at-most-once, so
/// every increment here is a lost message.
pub fn delivery_failures() -> Counter<u64> {
    meter()
        .u64_counter("jobwatch.notifications.delivery_failures")
        .with_description("Number of completion notifications that failed to send")
        .build()
}
