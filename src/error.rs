//! Error types for jobwatch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("malformed gauge value for {key}: {value}")]
    MalformedGauge { key: String, value: String },

    #[error("queue error: {0}")]
    Queue(#[from] sqlx::Error),

    #[error("metrics source error: {0}")]
    Metrics(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
