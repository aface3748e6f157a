//! Durable-queue sink backed by Postgres pgmq.
//!
//! Calls pgmq's SQL functions directly via SQLx: pgmq.create on startup,
//! pgmq.send per notification. Consumers read the queue out-of-band.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::trace;

use crate::error::Result;
use crate::telemetry::metrics;

use super::NotificationSink;

/// Writes completion messages to a pgmq queue.
pub struct QueueSink {
    pool: PgPool,
    queue_name: String,
}

impl QueueSink {
    /// Connect to Postgres and prepare the queue.
    ///
    /// Verifies connectivity and creates the queue (idempotent) up front so
    /// a broken connection string fails at startup rather than on the first
    /// completion, which may be hours later.
    pub async fn connect(url: &str, queue_name: impl Into<String>) -> Result<Self> {
        let queue_name = queue_name.into();
        let pool = PgPoolOptions::new().max_connections(2).connect(url).await?;

        sqlx::query("SELECT pgmq.create($1)")
            .bind(&queue_name)
            .execute(&pool)
            .await?;

        Ok(Self { pool, queue_name })
    }

    /// The queue this sink writes to.
    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// Simple health check — run a SELECT 1.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

impl NotificationSink for QueueSink {
    async fn send(&self, message: &str) -> Result<()> {
        // pgmq payloads are jsonb; the wire body stays the literal string.
        let payload = serde_json::Value::String(message.to_string());

        let row: (i64,) = sqlx::query_as("SELECT pgmq.send($1, $2, 0)")
            .bind(&self.queue_name)
            .bind(&payload)
            .fetch_one(&self.pool)
            .await?;

        trace!(queue = %self.queue_name, msg_id = row.0, "sent notification");
        metrics::notifications_sent().add(
            1,
            &[opentelemetry::KeyValue::new(
                "queue",
                self.queue_name.clone(),
            )],
        );
        Ok(())
    }
}
