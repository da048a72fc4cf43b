//! Damage rule engine: pure classification of sensor readings into damage
//! verdicts with a cost estimate. No I/O, no shared state, deterministic.
//!
//! All threshold comparisons are strict (`>`): boundary values take the
//! minor branch.

use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

use homewatch_common::{DamageType, DamageVerdict, ReadingValue, SensorReading, SensorType};

/// Cost estimate with a human-readable classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    pub cost: Decimal,
    pub classification: &'static str,
    pub description: &'static str,
}

/// Classify a reading. Returns `None` for readings that cross no damage
/// threshold; those produce no claim.
pub fn classify(reading: &SensorReading) -> Option<DamageVerdict> {
    let (damage_type, severity_indicators) = indicators(reading)?;
    let estimate = estimate(damage_type, &severity_indicators);
    Some(DamageVerdict {
        damage_type,
        severity_indicators,
        estimated_cost: estimate.cost,
        classification: estimate.classification.to_string(),
        description: estimate.description.to_string(),
    })
}

/// Detect a damage condition and extract its severity indicators.
///
/// The fixed maps for water leaks and smoke are placeholders: those sensors
/// report a bare boolean, so real severity is not read from the event.
/// Swapping in a real extractor only touches this function; classification
/// and estimation stay as they are.
fn indicators(reading: &SensorReading) -> Option<(DamageType, Map<String, Value>)> {
    match (&reading.sensor_type, &reading.value) {
        (SensorType::WaterLeak, value) if value.is_true() => {
            let mut m = Map::new();
            m.insert("duration_minutes".to_string(), json!(10));
            m.insert("flow_rate".to_string(), json!(5));
            Some((DamageType::WaterLeak, m))
        }
        (SensorType::SmokeDetector, value) if value.is_true() => {
            let mut m = Map::new();
            m.insert("smoke_density".to_string(), json!(0.9));
            m.insert("temp_peak".to_string(), json!(120));
            Some((DamageType::Fire, m))
        }
        (SensorType::StructuralStress, ReadingValue::Map(m))
            if matches!(m.get("level").and_then(Value::as_str), Some("medium") | Some("high")) =>
        {
            Some((DamageType::StructuralStress, m.clone()))
        }
        _ => None,
    }
}

/// Map a damage type and its severity indicators to a cost estimate.
/// Total over all inputs: unrecognized severity falls back to "Unknown"
/// at zero cost.
pub fn estimate(damage_type: DamageType, indicators: &Map<String, Value>) -> Estimate {
    match damage_type {
        DamageType::WaterLeak => {
            if num(indicators, "duration_minutes") > 60.0 || num(indicators, "flow_rate") > 10.0 {
                Estimate {
                    cost: Decimal::new(500_000, 2),
                    classification: "Water Damage (Major)",
                    description: "Prolonged or high-volume leak causing significant damage.",
                }
            } else {
                Estimate {
                    cost: Decimal::new(50_000, 2),
                    classification: "Water Damage (Minor)",
                    description: "Small, contained leak, likely localized.",
                }
            }
        }
        DamageType::Fire => {
            if num(indicators, "smoke_density") > 0.8 || num(indicators, "temp_peak") > 100.0 {
                Estimate {
                    cost: Decimal::new(2_500_000, 2),
                    classification: "Fire Damage (Significant)",
                    description: "High smoke density or extreme heat, indicating substantial fire.",
                }
            } else {
                Estimate {
                    cost: Decimal::new(500_000, 2),
                    classification: "Fire Damage (Minor)",
                    description: "Smoke detected, potential small fire or smoke-related issue.",
                }
            }
        }
        DamageType::StructuralStress => {
            match indicators.get("level").and_then(Value::as_str) {
                Some("high") => Estimate {
                    cost: Decimal::new(10_000_000, 2),
                    classification: "Structural Damage (Severe)",
                    description: "High stress detected in key structural area, major repair needed.",
                },
                Some("medium") => Estimate {
                    cost: Decimal::new(2_000_000, 2),
                    classification: "Structural Damage (Moderate)",
                    description: "Medium stress detected, potential foundational or load-bearing issue.",
                },
                // Unreachable through classify(), which gates on medium/high,
                // but the estimator stays total.
                _ => unknown(),
            }
        }
    }
}

fn unknown() -> Estimate {
    Estimate {
        cost: Decimal::ZERO,
        classification: "Unknown",
        description: "No defined damage cost for this event type.",
    }
}

fn num(map: &Map<String, Value>, key: &str) -> f64 {
    map.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(sensor_type: &str, value: Value) -> SensorReading {
        let topic = format!("home/basement/{sensor_type}_001/sensor");
        homewatch_common::validate(
            &topic,
            serde_json::to_string(&json!({
                "sensor_id": format!("{sensor_type}_001"),
                "type": sensor_type,
                "value": value,
                "timestamp": 1700000000,
            }))
            .unwrap()
            .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn water_leak_with_placeholder_indicators_is_always_minor() {
        let verdict = classify(&reading("water_leak", json!(true))).unwrap();
        assert_eq!(verdict.damage_type, DamageType::WaterLeak);
        assert_eq!(verdict.classification, "Water Damage (Minor)");
        assert_eq!(verdict.estimated_cost, Decimal::new(50_000, 2));
    }

    #[test]
    fn smoke_with_placeholder_indicators_is_always_significant() {
        let verdict = classify(&reading("smoke_detector", json!(true))).unwrap();
        assert_eq!(verdict.damage_type, DamageType::Fire);
        assert_eq!(verdict.classification, "Fire Damage (Significant)");
        assert_eq!(verdict.estimated_cost, Decimal::new(2_500_000, 2));
    }

    #[test]
    fn structural_levels_map_to_severity_tiers() {
        let high = classify(&reading("structural_stress", json!({"level": "high"}))).unwrap();
        assert_eq!(high.estimated_cost, Decimal::new(10_000_000, 2));
        assert_eq!(high.classification, "Structural Damage (Severe)");

        let medium = classify(&reading("structural_stress", json!({"level": "medium"}))).unwrap();
        assert_eq!(medium.estimated_cost, Decimal::new(2_000_000, 2));
        assert_eq!(medium.classification, "Structural Damage (Moderate)");

        assert!(classify(&reading("structural_stress", json!({"level": "low"}))).is_none());
        assert!(classify(&reading("structural_stress", json!({"vibration_hz": 8.1}))).is_none());
    }

    #[test]
    fn structural_verdict_carries_the_value_map_unchanged() {
        let verdict = classify(&reading(
            "structural_stress",
            json!({"level": "high", "vibration_hz": 8.1}),
        ))
        .unwrap();
        assert_eq!(verdict.severity_indicators["vibration_hz"], json!(8.1));
        assert_eq!(verdict.severity_indicators["level"], json!("high"));
    }

    #[test]
    fn false_values_and_other_sensors_produce_no_verdict() {
        assert!(classify(&reading("water_leak", json!(false))).is_none());
        assert!(classify(&reading("smoke_detector", json!(false))).is_none());
        assert!(classify(&reading("temperature", json!(105.0))).is_none());
        assert!(classify(&reading("door_contact", json!(true))).is_none());
    }

    #[test]
    fn water_boundaries_take_the_minor_branch() {
        let mut m = Map::new();
        m.insert("duration_minutes".to_string(), json!(60));
        m.insert("flow_rate".to_string(), json!(10));
        let est = estimate(DamageType::WaterLeak, &m);
        assert_eq!(est.classification, "Water Damage (Minor)");
        assert_eq!(est.cost, Decimal::new(50_000, 2));

        m.insert("duration_minutes".to_string(), json!(61));
        let est = estimate(DamageType::WaterLeak, &m);
        assert_eq!(est.classification, "Water Damage (Major)");
        assert_eq!(est.cost, Decimal::new(500_000, 2));
    }

    #[test]
    fn fire_boundaries_take_the_minor_branch() {
        let mut m = Map::new();
        m.insert("smoke_density".to_string(), json!(0.8));
        m.insert("temp_peak".to_string(), json!(100));
        let est = estimate(DamageType::Fire, &m);
        assert_eq!(est.classification, "Fire Damage (Minor)");
        assert_eq!(est.cost, Decimal::new(500_000, 2));

        m.insert("smoke_density".to_string(), json!(0.81));
        let est = estimate(DamageType::Fire, &m);
        assert_eq!(est.classification, "Fire Damage (Significant)");
    }

    #[test]
    fn missing_indicators_count_as_zero() {
        let est = estimate(DamageType::WaterLeak, &Map::new());
        assert_eq!(est.classification, "Water Damage (Minor)");

        let est = estimate(DamageType::Fire, &Map::new());
        assert_eq!(est.classification, "Fire Damage (Minor)");
    }

    #[test]
    fn unrecognized_structural_level_is_unknown_at_zero_cost() {
        let mut m = Map::new();
        m.insert("level".to_string(), json!("catastrophic"));
        let est = estimate(DamageType::StructuralStress, &m);
        assert_eq!(est.classification, "Unknown");
        assert_eq!(est.cost, Decimal::ZERO);
    }
}
