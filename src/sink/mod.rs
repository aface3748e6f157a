//! Notification sinks — where completion messages go.
//!
//! The reporter only needs a send capability; connection parameters and
//! delivery mechanics live entirely behind the trait.

pub mod queue;

pub use queue::QueueSink;

use crate::error::Result;

/// Best-effort delivery of a completion message. At-most-once: callers do
/// not retry a failed send.
pub trait NotificationSink {
    fn send(&self, message: &str) -> impl Future<Output = Result<()>> + Send;
}
