//! jobwatch CLI — run the completion reporter or poke its queue.

use clap::{Parser, Subcommand};
use jobwatch::config::Config;
use jobwatch::error::Error;
use jobwatch::reporter::{Reporter, ReporterConfig};
use jobwatch::sink::{NotificationSink, QueueSink};
use jobwatch::source::HttpMetricsSource;
use jobwatch::telemetry::{TelemetryConfig, init_telemetry};
use secrecy::ExposeSecret;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "jobwatch", about = "Batch-job completion reporter")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the reporter loop against the configured metrics endpoint
    Serve,
    /// Verify the queue backend is reachable
    Check,
    /// Send an arbitrary message to the notification queue
    Send {
        /// Message body (completion messages look like "my-cluster,true")
        message: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Serve => cmd_serve(config).await,
        Command::Check => {
            let sink = connect_sink(&config).await?;
            sink.health_check().await?;
            println!("queue backend ok (queue: {})", sink.queue_name());
            Ok(())
        }
        Command::Send { message } => {
            let sink = connect_sink(&config).await?;
            sink.send(&message).await?;
            println!("sent to {}: {message}", sink.queue_name());
            Ok(())
        }
    }
}

async fn connect_sink(config: &Config) -> anyhow::Result<QueueSink> {
    Ok(QueueSink::connect(config.database_url.expose_secret(), &config.queue_name).await?)
}

async fn cmd_serve(config: Config) -> anyhow::Result<()> {
    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "jobwatch".to_string(),
    })?;

    let metrics_url = config
        .metrics_url
        .clone()
        .ok_or_else(|| Error::Config("METRICS_URL is required for serve".to_string()))?;

    let source = HttpMetricsSource::new(metrics_url)?;
    let sink = connect_sink(&config).await?;

    let mut reporter = Reporter::new(
        source,
        sink,
        ReporterConfig {
            interval: Duration::from_secs(config.report_interval_secs),
            cluster: config.cluster_name.clone(),
        },
    );

    let shutdown = reporter.shutdown_handle();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        shutdown.notify_one();
    });

    reporter.run().await;
    Ok(())
}
