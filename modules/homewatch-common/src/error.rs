use thiserror::Error;

use crate::types::StoreKind;

/// Why an inbound payload was rejected at the boundary. A rejected message
/// is dropped: no store writes, no rule evaluation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("payload is not valid UTF-8")]
    MalformedEncoding(#[from] std::str::Utf8Error),

    #[error("payload is not a well-formed sensor message: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("required field `{0}` is missing or null")]
    MissingField(&'static str),
}

/// A single store write failing. Never aborts the sibling writes or the
/// rule stage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} store write timed out")]
    Timeout(StoreKind),

    #[error(transparent)]
    Write(#[from] anyhow::Error),
}

/// Transport failures are fatal to the ingestion loop: the process logs
/// and exits non-zero.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("MQTT connection failed: {0}")]
    Connection(String),

    #[error("MQTT subscribe to `{filter}` failed: {reason}")]
    Subscribe { filter: String, reason: String },
}
