//! Vehicle configuration
//!
//! Read-only input to the physics integrator; nothing in the race mutates a
//! vehicle. Records ship in the vehicle store's embedded catalog and are
//! validated on load.

use serde::{Deserialize, Serialize};

/// Headline performance figures used by the physics model
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Performance {
    /// Top speed in km/h
    pub top_speed_kmh: f32,
    /// 0-100 km/h time in seconds
    pub acceleration_secs: f32,
    /// 100-0 km/h braking distance in meters
    pub braking_distance_m: f32,
}

/// A drivable vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub name: String,
    pub performance: Performance,
    /// Curb weight in kg; feeds drag, steering and collision response
    pub weight_kg: f32,
    /// Handling rating 0-100 (cosmetic/garage stat)
    pub handling: f32,
    /// Body color as a hex string, e.g. "#FF0000"
    pub color: String,
    #[serde(default)]
    pub validation_errors: Option<Vec<String>>,
}

impl Vehicle {
    /// Top speed converted to m/s, the unit the simulation runs in
    pub fn top_speed_ms(&self) -> f32 {
        crate::kmh_to_ms(self.performance.top_speed_kmh)
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Check a vehicle record for usable stats
///
/// Accumulates every applicable error; vehicles with errors stay listable
/// in the garage but are excluded from race selection.
pub fn validate_vehicle(vehicle: &Vehicle) -> Vec<String> {
    let mut errors = Vec::new();

    if vehicle.id.is_empty() || vehicle.name.is_empty() {
        errors.push("Vehicle missing required properties (id or name)".to_string());
    }
    if !(vehicle.performance.top_speed_kmh > 0.0) {
        errors.push("Invalid top speed (must be positive)".to_string());
    }
    if !(vehicle.performance.acceleration_secs > 0.0) {
        errors.push("Invalid acceleration time (must be positive)".to_string());
    }
    if !(vehicle.performance.braking_distance_m > 0.0) {
        errors.push("Invalid braking distance (must be positive)".to_string());
    }
    if !(vehicle.weight_kg > 0.0) {
        errors.push("Invalid weight (must be positive)".to_string());
    }
    if !(0.0..=100.0).contains(&vehicle.handling) {
        errors.push("Invalid handling value (must be between 0 and 100)".to_string());
    }
    if !is_hex_color(&vehicle.color) {
        errors.push("Invalid color format (must be hex color, e.g., #FF0000)".to_string());
    }

    if !errors.is_empty() {
        log::warn!(
            "Vehicle validation failed for {}: {} error(s)",
            vehicle.name,
            errors.len()
        );
    }
    errors
}

#[cfg(test)]
pub(crate) fn test_vehicle() -> Vehicle {
    Vehicle {
        id: "test-car".into(),
        name: "Test Car".into(),
        performance: Performance {
            top_speed_kmh: 180.0,
            acceleration_secs: 6.0,
            braking_distance_m: 40.0,
        },
        weight_kg: 1200.0,
        handling: 70.0,
        color: "#FF0000".into(),
        validation_errors: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_vehicle_passes() {
        assert!(validate_vehicle(&test_vehicle()).is_empty());
    }

    #[test]
    fn test_errors_accumulate() {
        let mut vehicle = test_vehicle();
        vehicle.id = String::new();
        vehicle.performance.top_speed_kmh = 0.0;
        vehicle.handling = 150.0;
        vehicle.color = "red".into();

        let errors = validate_vehicle(&vehicle);
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_nan_stats_rejected() {
        let mut vehicle = test_vehicle();
        vehicle.weight_kg = f32::NAN;
        let errors = validate_vehicle(&vehicle);
        assert!(errors.iter().any(|e| e.contains("weight")));
    }

    #[test]
    fn test_top_speed_conversion() {
        let vehicle = test_vehicle();
        assert!((vehicle.top_speed_ms() - 50.0).abs() < 1e-4);
    }
}
