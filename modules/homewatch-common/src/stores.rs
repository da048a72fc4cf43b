//! Capability traits for the three persistence targets.
//!
//! One trait per store, constructed once at startup and handed into the
//! pipeline as trait objects. The pipeline never sees a concrete driver.

use async_trait::async_trait;

use crate::types::{Claim, SensorReading};

/// Row-oriented store: one row per reading, one row per claim.
#[async_trait]
pub trait RelationalStore: Send + Sync {
    async fn insert_reading(&self, reading: &SensorReading) -> anyhow::Result<()>;
    async fn insert_claim(&self, claim: &Claim) -> anyhow::Result<()>;
}

/// Document store: the full reading as one document.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_reading(&self, reading: &SensorReading) -> anyhow::Result<()>;
}

/// Graph store: idempotent topology upserts plus append-only event nodes.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Merge-on-key upsert of the Sensor/Location/Property nodes and their
    /// edges. Safe to call for every reading.
    async fn upsert_sensor(&self, reading: &SensorReading) -> anyhow::Result<()>;

    /// Append a new SensorEvent node linked from the owning Sensor.
    async fn append_reading_event(&self, reading: &SensorReading) -> anyhow::Result<()>;

    /// Append a new DamageEvent node linked from the triggering Sensor.
    async fn append_damage_event(&self, claim: &Claim) -> anyhow::Result<()>;
}
