//! Boundary validation: raw bytes in, typed `SensorReading` out.
//!
//! The rest of the pipeline only ever sees validated, typed records; untyped
//! maps stop here.

use serde::Deserialize;

use crate::error::ValidationError;
use crate::topic;
use crate::types::{ReadingValue, SensorReading, SensorType};

/// Wire shape of an inbound payload. Every required key is optional here so
/// that absent and null both land as `None` and get a precise error.
#[derive(Deserialize)]
struct RawPayload {
    #[serde(default)]
    sensor_id: Option<String>,
    #[serde(default, rename = "type")]
    sensor_type: Option<SensorType>,
    #[serde(default)]
    value: Option<ReadingValue>,
    #[serde(default)]
    timestamp: Option<f64>,
}

/// Parse and type-check a raw message. Deterministic, no side effects.
///
/// Fails with `MalformedEncoding` on non-UTF-8 bytes, `MalformedJson` when
/// the text is not a well-formed payload (including wrongly-typed fields),
/// and `MissingField` when a required key is absent or null.
pub fn validate(topic: &str, raw: &[u8]) -> Result<SensorReading, ValidationError> {
    let text = std::str::from_utf8(raw)?;
    let payload: RawPayload = serde_json::from_str(text)?;

    let sensor_id = payload
        .sensor_id
        .ok_or(ValidationError::MissingField("sensor_id"))?;
    let sensor_type = payload
        .sensor_type
        .ok_or(ValidationError::MissingField("type"))?;
    let value = payload.value.ok_or(ValidationError::MissingField("value"))?;
    let timestamp = payload
        .timestamp
        .ok_or(ValidationError::MissingField("timestamp"))?;

    let location = topic::route(topic).location;

    Ok(SensorReading {
        sensor_id,
        sensor_type,
        value,
        timestamp,
        topic: topic.to_string(),
        location,
    })
}
