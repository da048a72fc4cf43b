//! Claim dispatch: turn a damage verdict into an insurance claim record and
//! persist it to the relational and graph stores.
//!
//! No external insurer API is involved; filing a claim is a local
//! record-creation side effect.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use homewatch_common::{Claim, DamageType, DamageVerdict, SensorReading, CLAIM_STATUS_PENDING};

use crate::fanout::Fanout;

pub struct ClaimDispatcher {
    fanout: Arc<Fanout>,
    /// Zero disables suppression: every qualifying reading files a claim.
    suppress_window: Duration,
    recent: Mutex<HashMap<(String, DamageType), DateTime<Utc>>>,
}

impl ClaimDispatcher {
    pub fn new(fanout: Arc<Fanout>, suppress_window: Duration) -> Self {
        Self {
            fanout,
            suppress_window,
            recent: Mutex::new(HashMap::new()),
        }
    }

    /// File a claim for a verdict. Returns `None` when a claim for the same
    /// (sensor, damage type) was filed inside the suppression window.
    pub async fn dispatch(
        &self,
        verdict: &DamageVerdict,
        reading: &SensorReading,
    ) -> Option<Claim> {
        let filed_at = Utc::now();
        if self.suppressed(reading, verdict.damage_type, filed_at) {
            warn!(
                sensor_id = %reading.sensor_id,
                damage_type = %verdict.damage_type,
                "Claim suppressed: duplicate trigger inside suppression window"
            );
            return None;
        }

        let claim = build_claim(verdict, reading, filed_at);
        info!(
            claim_id = %claim.claim_id,
            sensor_id = %claim.sensor_id,
            location = %claim.location,
            damage_type = %claim.damage_type,
            classification = %verdict.classification,
            estimated_cost = %claim.estimated_cost,
            "Filing insurance claim"
        );

        self.fanout.persist_claim(&claim).await;
        Some(claim)
    }

    /// Check-and-record under one lock so concurrent workers cannot both
    /// file for the same sensor inside the window.
    fn suppressed(&self, reading: &SensorReading, damage_type: DamageType, now: DateTime<Utc>) -> bool {
        if self.suppress_window.is_zero() {
            return false;
        }
        let key = (reading.sensor_id.clone(), damage_type);
        let mut recent = self.recent.lock().expect("suppression map poisoned");
        if let Some(last) = recent.get(&key) {
            let elapsed = now.signed_duration_since(*last);
            if elapsed.to_std().map(|e| e < self.suppress_window).unwrap_or(true) {
                return true;
            }
        }
        recent.insert(key, now);
        false
    }
}

/// Build the immutable claim record for a verdict.
pub fn build_claim(
    verdict: &DamageVerdict,
    reading: &SensorReading,
    filed_at: DateTime<Utc>,
) -> Claim {
    Claim {
        claim_id: Uuid::new_v4(),
        sensor_id: reading.sensor_id.clone(),
        location: reading.location.clone(),
        damage_type: verdict.damage_type,
        estimated_cost: verdict.estimated_cost,
        description: verdict.description.clone(),
        status: CLAIM_STATUS_PENDING.to_string(),
        timestamp_event: reading.event_time(),
        timestamp_filed: filed_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rust_decimal::Decimal;

    fn leak_reading() -> SensorReading {
        homewatch_common::validate(
            "home/bathroom/water_leak_001/sensor",
            br#"{"sensor_id":"water_leak_001","type":"water_leak","value":true,"timestamp":1700000000}"#,
        )
        .unwrap()
    }

    #[test]
    fn claim_copies_verdict_and_reading_fields() {
        let reading = leak_reading();
        let verdict = homewatch_rules::classify(&reading).unwrap();
        let filed_at = Utc::now();

        let claim = build_claim(&verdict, &reading, filed_at);

        assert_eq!(claim.sensor_id, "water_leak_001");
        assert_eq!(claim.location, "bathroom");
        assert_eq!(claim.damage_type, DamageType::WaterLeak);
        assert_eq!(claim.estimated_cost, Decimal::new(50_000, 2));
        assert_eq!(claim.status, CLAIM_STATUS_PENDING);
        assert_eq!(claim.timestamp_event.timestamp(), 1700000000);
        assert_eq!(claim.timestamp_filed, filed_at);
    }

    #[test]
    fn each_claim_gets_a_fresh_id() {
        let reading = leak_reading();
        let verdict = homewatch_rules::classify(&reading).unwrap();
        let a = build_claim(&verdict, &reading, Utc::now());
        let b = build_claim(&verdict, &reading, Utc::now());
        assert_ne!(a.claim_id, b.claim_id);
    }
}
