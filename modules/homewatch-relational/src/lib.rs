//! Postgres persistence: one row per sensor reading, one row per claim.
//!
//! Table names come from configuration (they are operator-controlled, never
//! message-derived), so DDL and DML interpolate the table name and bind
//! everything else.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use homewatch_common::{Claim, RelationalStore, SensorReading};

pub struct PgStore {
    pool: PgPool,
    sensor_table: String,
    claims_table: String,
}

impl PgStore {
    pub async fn connect(
        url: &str,
        sensor_table: String,
        claims_table: String,
    ) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
        Ok(Self {
            pool,
            sensor_table,
            claims_table,
        })
    }

    pub fn new(pool: PgPool, sensor_table: String, claims_table: String) -> Self {
        Self {
            pool,
            sensor_table,
            claims_table,
        }
    }

    /// Create the sensor and claims tables if they do not exist. Idempotent.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(&sensor_table_ddl(&self.sensor_table))
            .execute(&self.pool)
            .await?;
        sqlx::query(&claims_table_ddl(&self.claims_table))
            .execute(&self.pool)
            .await?;
        info!(
            sensor_table = %self.sensor_table,
            claims_table = %self.claims_table,
            "Relational schema ready"
        );
        Ok(())
    }
}

#[async_trait]
impl RelationalStore for PgStore {
    async fn insert_reading(&self, reading: &SensorReading) -> anyhow::Result<()> {
        let sql = format!(
            r#"
            INSERT INTO {} (timestamp, topic, sensor_id, sensor_type, value, location)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
            self.sensor_table
        );
        sqlx::query(&sql)
            .bind(reading.event_time())
            .bind(&reading.topic)
            .bind(&reading.sensor_id)
            .bind(reading.sensor_type.as_str())
            .bind(reading.value.to_json())
            .bind(&reading.location)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_claim(&self, claim: &Claim) -> anyhow::Result<()> {
        let sql = format!(
            r#"
            INSERT INTO {}
                (claim_id, timestamp_filed, damage_type, estimated_cost,
                 description, status, sensor_id, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
            self.claims_table
        );
        sqlx::query(&sql)
            .bind(claim.claim_id)
            .bind(claim.timestamp_filed)
            .bind(claim.damage_type.as_str())
            .bind(claim.estimated_cost)
            .bind(&claim.description)
            .bind(&claim.status)
            .bind(&claim.sensor_id)
            .bind(&claim.location)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn sensor_table_ddl(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id BIGSERIAL PRIMARY KEY,
            timestamp TIMESTAMPTZ NOT NULL,
            topic TEXT NOT NULL,
            sensor_id TEXT NOT NULL,
            sensor_type TEXT NOT NULL,
            value JSONB NOT NULL,
            location TEXT NOT NULL,
            received_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#
    )
}

fn claims_table_ddl(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            claim_id UUID PRIMARY KEY,
            timestamp_filed TIMESTAMPTZ NOT NULL,
            damage_type TEXT NOT NULL,
            estimated_cost NUMERIC(10, 2) NOT NULL,
            description TEXT NOT NULL,
            status TEXT NOT NULL,
            sensor_id TEXT NOT NULL,
            location TEXT NOT NULL
        )
        "#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddl_is_idempotent_and_targets_the_configured_tables() {
        let sensor = sensor_table_ddl("sensor_readings");
        assert!(sensor.contains("CREATE TABLE IF NOT EXISTS sensor_readings"));
        assert!(sensor.contains("received_at TIMESTAMPTZ NOT NULL DEFAULT now()"));

        let claims = claims_table_ddl("insurance_claims");
        assert!(claims.contains("CREATE TABLE IF NOT EXISTS insurance_claims"));
        assert!(claims.contains("estimated_cost NUMERIC(10, 2)"));
        assert!(claims.contains("claim_id UUID PRIMARY KEY"));
    }
}
