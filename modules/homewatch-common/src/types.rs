use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Initial status of every claim filed by this pipeline. Terminal states are
/// owned by the downstream reviewer.
pub const CLAIM_STATUS_PENDING: &str = "Pending Automated Review";

// --- Sensor types ---

/// Kind of sensor that produced a reading. Open set: unknown kinds are
/// carried through as `Other` and persisted, they just never trigger rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SensorType {
    Temperature,
    Humidity,
    SmokeDetector,
    WaterLeak,
    StructuralStress,
    DoorContact,
    Other(String),
}

impl SensorType {
    pub fn as_str(&self) -> &str {
        match self {
            SensorType::Temperature => "temperature",
            SensorType::Humidity => "humidity",
            SensorType::SmokeDetector => "smoke_detector",
            SensorType::WaterLeak => "water_leak",
            SensorType::StructuralStress => "structural_stress",
            SensorType::DoorContact => "door_contact",
            SensorType::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for SensorType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "temperature" => SensorType::Temperature,
            "humidity" => SensorType::Humidity,
            "smoke_detector" => SensorType::SmokeDetector,
            "water_leak" => SensorType::WaterLeak,
            "structural_stress" => SensorType::StructuralStress,
            "door_contact" => SensorType::DoorContact,
            _ => SensorType::Other(s),
        }
    }
}

impl From<SensorType> for String {
    fn from(t: SensorType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Reading values ---

/// Polymorphic sensor value: a boolean state, a numeric measurement, or a
/// structured indicator map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadingValue {
    Bool(bool),
    Number(f64),
    Map(Map<String, Value>),
}

impl ReadingValue {
    pub fn is_true(&self) -> bool {
        matches!(self, ReadingValue::Bool(true))
    }

    pub fn as_map(&self) -> Option<&Map<String, Value>> {
        match self {
            ReadingValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ReadingValue::Bool(b) => Value::Bool(*b),
            ReadingValue::Number(n) => serde_json::json!(n),
            ReadingValue::Map(m) => Value::Object(m.clone()),
        }
    }
}

// --- Readings ---

/// One validated sensor message. Constructed per inbound message by the
/// validator, immutable, dropped once the pipeline finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor_id: String,
    pub sensor_type: SensorType,
    pub value: ReadingValue,
    /// Unix epoch seconds as reported by the sensor.
    pub timestamp: f64,
    /// Raw subscription topic the message arrived on.
    pub topic: String,
    /// Derived from topic segment 1; `"unknown"` when the topic is too short.
    pub location: String,
}

impl SensorReading {
    /// Sensor-reported timestamp as an absolute point in time.
    pub fn event_time(&self) -> DateTime<Utc> {
        epoch_to_datetime(self.timestamp)
    }
}

/// Convert epoch seconds (possibly fractional) to a UTC datetime, clamping
/// out-of-range values to the epoch.
pub fn epoch_to_datetime(ts: f64) -> DateTime<Utc> {
    let secs = ts.trunc() as i64;
    let nanos = (ts.fract() * 1e9) as u32;
    DateTime::from_timestamp(secs, nanos).unwrap_or(DateTime::UNIX_EPOCH)
}

// --- Damage verdicts ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    WaterLeak,
    Fire,
    StructuralStress,
}

impl DamageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DamageType::WaterLeak => "water_leak",
            DamageType::Fire => "fire",
            DamageType::StructuralStress => "structural_stress",
        }
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule-engine output for a reading that crossed a damage threshold.
/// Never persisted directly; feeds claim creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageVerdict {
    pub damage_type: DamageType,
    pub severity_indicators: Map<String, Value>,
    pub estimated_cost: Decimal,
    pub classification: String,
    pub description: String,
}

// --- Claims ---

/// An insurance claim record. Created exactly once per triggering reading
/// and never mutated by this pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: Uuid,
    pub sensor_id: String,
    pub location: String,
    pub damage_type: DamageType,
    pub estimated_cost: Decimal,
    pub description: String,
    pub status: String,
    pub timestamp_event: DateTime<Utc>,
    pub timestamp_filed: DateTime<Utc>,
}

// --- Stores ---

/// The three independent persistence targets of the fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Relational,
    Document,
    Graph,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreKind::Relational => "relational",
            StoreKind::Document => "document",
            StoreKind::Graph => "graph",
        })
    }
}
