//! Topic decomposition for the `<root>/<location>/<sensor_id>/sensor` scheme.
//!
//! Deliberately permissive: a malformed topic degrades to
//! `location = "unknown"` instead of failing, so off-scheme messages are
//! still persisted with a usable location.

/// Decomposed topic path segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicInfo {
    pub root: String,
    pub location: String,
    pub sensor_id: String,
    pub suffix: String,
}

/// Split a topic into its path segments. Missing segments come back empty
/// except `location`, which defaults to `"unknown"`.
pub fn route(topic: &str) -> TopicInfo {
    let mut parts = topic.split('/');
    let root = parts.next().unwrap_or_default().to_string();
    let location = match parts.next() {
        Some(loc) => loc.to_string(),
        None => "unknown".to_string(),
    };
    let sensor_id = parts.next().unwrap_or_default().to_string();
    let suffix = parts.next().unwrap_or_default().to_string();
    TopicInfo {
        root,
        location,
        sensor_id,
        suffix,
    }
}

/// Canonical subscription filter: single-level wildcards for location and
/// sensor id, fixed `sensor` suffix.
pub fn subscription_filter(root: &str) -> String {
    format!("{root}/+/+/sensor")
}

/// Graph property node key for a location.
pub fn property_id(location: &str) -> String {
    format!("property_{}", location.replace(' ', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_topic_decomposes() {
        let info = route("home/bathroom/water_leak_001/sensor");
        assert_eq!(info.root, "home");
        assert_eq!(info.location, "bathroom");
        assert_eq!(info.sensor_id, "water_leak_001");
        assert_eq!(info.suffix, "sensor");
    }

    #[test]
    fn short_topic_degrades_to_unknown_location() {
        let info = route("home");
        assert_eq!(info.root, "home");
        assert_eq!(info.location, "unknown");
        assert_eq!(info.sensor_id, "");
        assert_eq!(info.suffix, "");
    }

    #[test]
    fn filter_uses_single_level_wildcards() {
        assert_eq!(subscription_filter("home"), "home/+/+/sensor");
    }

    #[test]
    fn property_id_replaces_spaces() {
        assert_eq!(property_id("living room"), "property_living_room");
        assert_eq!(property_id("basement"), "property_basement");
    }
}
