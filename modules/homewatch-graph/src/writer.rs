use async_trait::async_trait;
use chrono::{DateTime, Utc};
use neo4rs::query;
use rust_decimal::prelude::ToPrimitive;

use homewatch_common::{property_id, Claim, GraphStore, SensorReading};

use crate::GraphClient;

/// Write-side wrapper for the sensor graph.
///
/// Sensor, Location, and Property nodes are merge-on-key upserts: the same
/// sensor reports repeatedly and must land on one node. SensorEvent and
/// DamageEvent nodes are append-only creates linked from the owning Sensor.
pub struct GraphWriter {
    client: GraphClient,
}

impl GraphWriter {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Upsert the Sensor node and its Location/Property topology.
    pub async fn upsert_sensor_topology(
        &self,
        sensor_id: &str,
        sensor_type: &str,
        location: &str,
        property: &str,
    ) -> Result<(), neo4rs::Error> {
        let q = query(
            "MERGE (loc:Location {name: $location})
             MERGE (prop:Property {property_id: $property_id})
             MERGE (s:Sensor {sensor_id: $sensor_id})
             ON CREATE SET s.type = $sensor_type
             MERGE (s)-[:LOCATED_IN]->(loc)
             MERGE (loc)-[:PART_OF]->(prop)
             RETURN s.sensor_id AS id",
        )
        .param("sensor_id", sensor_id)
        .param("sensor_type", sensor_type)
        .param("location", location)
        .param("property_id", property);

        let mut stream = self.client.graph.execute(q).await?;
        while stream.next().await?.is_some() {}
        Ok(())
    }

    /// Append a SensorEvent node linked from its Sensor via HAS_EVENT.
    /// A missing Sensor node matches nothing and the event is not written.
    pub async fn record_sensor_event(
        &self,
        sensor_id: &str,
        timestamp: DateTime<Utc>,
        value_json: &str,
    ) -> Result<(), neo4rs::Error> {
        let q = query(
            "MATCH (s:Sensor {sensor_id: $sensor_id})
             CREATE (e:SensorEvent {
                 timestamp: datetime($timestamp),
                 value: $value,
                 type: $event_type
             })
             CREATE (s)-[:HAS_EVENT]->(e)
             RETURN e.type AS t",
        )
        .param("sensor_id", sensor_id)
        .param("timestamp", format_datetime(&timestamp))
        .param("value", value_json)
        .param("event_type", "reading");

        let mut stream = self.client.graph.execute(q).await?;
        while stream.next().await?.is_some() {}
        Ok(())
    }

    /// Append a DamageEvent node linked from the triggering Sensor via CAUSED.
    pub async fn record_damage_event(&self, claim: &Claim) -> Result<(), neo4rs::Error> {
        let q = query(
            "MATCH (s:Sensor {sensor_id: $sensor_id})
             CREATE (d:DamageEvent {
                 claim_id: $claim_id,
                 type: $damage_type,
                 estimated_cost: $estimated_cost,
                 description: $description,
                 timestamp: datetime($timestamp)
             })
             CREATE (s)-[:CAUSED]->(d)
             RETURN d.claim_id AS id",
        )
        .param("sensor_id", claim.sensor_id.as_str())
        .param("claim_id", claim.claim_id.to_string())
        .param("damage_type", claim.damage_type.as_str())
        .param(
            "estimated_cost",
            claim.estimated_cost.to_f64().unwrap_or(0.0),
        )
        .param("description", claim.description.as_str())
        .param("timestamp", format_datetime(&claim.timestamp_event));

        let mut stream = self.client.graph.execute(q).await?;
        while stream.next().await?.is_some() {}
        Ok(())
    }
}

#[async_trait]
impl GraphStore for GraphWriter {
    async fn upsert_sensor(&self, reading: &SensorReading) -> anyhow::Result<()> {
        self.upsert_sensor_topology(
            &reading.sensor_id,
            reading.sensor_type.as_str(),
            &reading.location,
            &property_id(&reading.location),
        )
        .await?;
        Ok(())
    }

    async fn append_reading_event(&self, reading: &SensorReading) -> anyhow::Result<()> {
        let value_json = serde_json::to_string(&reading.value)?;
        self.record_sensor_event(&reading.sensor_id, reading.event_time(), &value_json)
            .await?;
        Ok(())
    }

    async fn append_damage_event(&self, claim: &Claim) -> anyhow::Result<()> {
        self.record_damage_event(claim).await?;
        Ok(())
    }
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
