//! Persistence fan-out: one validated reading, three independent stores.
//!
//! The three writes run concurrently and are joined; failure of one never
//! aborts the others, and partial failure never stops the rule stage.
//! A failed write shouldn't lose the message's other copies.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use homewatch_common::{
    Claim, DocumentStore, GraphStore, RelationalStore, SensorReading, StoreError, StoreKind,
};

/// Per-store write policy: every attempt is bounded by `timeout`, and a
/// failed attempt is retried up to `retries` times with doubling backoff.
#[derive(Debug, Clone, Copy)]
pub struct WritePolicy {
    pub timeout: Duration,
    pub retries: u32,
}

impl Default for WritePolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            retries: 2,
        }
    }
}

/// Per-store outcome of persisting one reading. Aggregated, never
/// short-circuited.
#[derive(Debug)]
pub struct FanoutResult {
    pub relational: Result<(), StoreError>,
    pub document: Result<(), StoreError>,
    pub graph: Result<(), StoreError>,
}

impl FanoutResult {
    pub fn fully_persisted(&self) -> bool {
        self.relational.is_ok() && self.document.is_ok() && self.graph.is_ok()
    }
}

/// Outcome of persisting one claim to its two targets.
#[derive(Debug)]
pub struct ClaimPersistResult {
    pub relational: Result<(), StoreError>,
    pub graph: Result<(), StoreError>,
}

pub struct Fanout {
    relational: Arc<dyn RelationalStore>,
    document: Arc<dyn DocumentStore>,
    graph: Arc<dyn GraphStore>,
    policy: WritePolicy,
}

impl Fanout {
    pub fn new(
        relational: Arc<dyn RelationalStore>,
        document: Arc<dyn DocumentStore>,
        graph: Arc<dyn GraphStore>,
        policy: WritePolicy,
    ) -> Self {
        Self {
            relational,
            document,
            graph,
            policy,
        }
    }

    /// Write one reading to all three stores, independently and concurrently.
    pub async fn persist(&self, reading: &SensorReading) -> FanoutResult {
        let (relational, document, graph) = tokio::join!(
            self.write(StoreKind::Relational, || self
                .relational
                .insert_reading(reading)),
            self.write(StoreKind::Document, || self.document.insert_reading(reading)),
            self.write(StoreKind::Graph, || async {
                self.graph.upsert_sensor(reading).await?;
                self.graph.append_reading_event(reading).await
            }),
        );

        let result = FanoutResult {
            relational,
            document,
            graph,
        };
        for (kind, outcome) in [
            (StoreKind::Relational, &result.relational),
            (StoreKind::Document, &result.document),
            (StoreKind::Graph, &result.graph),
        ] {
            if let Err(e) = outcome {
                warn!(
                    store = %kind,
                    sensor_id = %reading.sensor_id,
                    topic = %reading.topic,
                    error = %e,
                    "Store write failed after retries; reading not persisted there"
                );
            }
        }
        result
    }

    /// Write one claim to the relational and graph stores, concurrently.
    pub async fn persist_claim(&self, claim: &Claim) -> ClaimPersistResult {
        let (relational, graph) = tokio::join!(
            self.write(StoreKind::Relational, || self.relational.insert_claim(claim)),
            self.write(StoreKind::Graph, || self.graph.append_damage_event(claim)),
        );

        let result = ClaimPersistResult { relational, graph };
        for (kind, outcome) in [
            (StoreKind::Relational, &result.relational),
            (StoreKind::Graph, &result.graph),
        ] {
            if let Err(e) = outcome {
                warn!(
                    store = %kind,
                    claim_id = %claim.claim_id,
                    error = %e,
                    "Claim write failed after retries"
                );
            }
        }
        result
    }

    /// One store write under the policy: bounded timeout per attempt,
    /// bounded retries with doubling backoff.
    async fn write<F, Fut>(&self, kind: StoreKind, op: F) -> Result<(), StoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let mut delay = Duration::from_millis(100);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let failure = match tokio::time::timeout(self.policy.timeout, op()).await {
                Ok(Ok(())) => return Ok(()),
                Ok(Err(e)) => StoreError::Write(e),
                Err(_) => StoreError::Timeout(kind),
            };
            if attempt > self.policy.retries {
                return Err(failure);
            }
            warn!(store = %kind, attempt, error = %failure, "Store write failed, retrying");
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }
}
