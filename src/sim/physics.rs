//! Vehicle physics math
//!
//! Per-second rates derived from a vehicle's catalog figures; the engine
//! multiplies by the tick delta. Speeds are m/s throughout.

use crate::consts::{BRAKE_SATURATION_KMH, STEERING_FLOOR};
use crate::vehicle::Vehicle;
use crate::{kmh_to_ms, ms_to_kmh};

/// Forward acceleration in m/s²
///
/// Base rate comes from the 0-100 km/h time and tapers linearly to zero as
/// speed approaches top speed (diminishing returns).
pub fn acceleration(vehicle: &Vehicle, speed: f32) -> f32 {
    let top_speed = vehicle.top_speed_ms();
    let base = kmh_to_ms(100.0) / vehicle.performance.acceleration_secs;
    let speed_factor = (1.0 - speed / top_speed).max(0.0);
    base * speed_factor
}

/// Braking deceleration in m/s²
///
/// Base rate from the 100-0 km/h braking distance; effectiveness ramps up
/// with speed and saturates at 50 km/h.
pub fn braking(vehicle: &Vehicle, speed: f32) -> f32 {
    let base = kmh_to_ms(100.0) / (vehicle.performance.braking_distance_m / 100.0);
    let speed_factor = (speed / kmh_to_ms(BRAKE_SATURATION_KMH)).min(1.0);
    base * speed_factor
}

/// Passive drag deceleration in m/s²
///
/// Quadratic in speed, inversely proportional to weight (heavier vehicles
/// carry more momentum).
pub fn drag(vehicle: &Vehicle, speed: f32) -> f32 {
    let coefficient = 0.05 / (vehicle.weight_kg / 1000.0);
    coefficient * speed * speed
}

/// Steering rate in degrees per second
///
/// Lighter vehicles turn faster. Authority is reduced below 10 km/h (hard
/// to turn while barely moving), full between 10 and 50 km/h, and declines
/// above 50 km/h down to [`STEERING_FLOOR`] (simulated understeer).
pub fn steering_rate(vehicle: &Vehicle, speed: f32) -> f32 {
    let base = 150.0 * (1000.0 / vehicle.weight_kg);
    let speed_kmh = ms_to_kmh(speed);

    let speed_factor = if speed_kmh < 10.0 {
        speed_kmh / 10.0
    } else if speed_kmh < 50.0 {
        1.0
    } else {
        1.0 - ((speed_kmh - 50.0) / 100.0).min(1.0 - STEERING_FLOOR)
    };

    base * speed_factor
}

/// One-dimensional elastic collision between two masses
///
/// Returns the post-impact speeds. Momentum and kinetic energy are
/// conserved; the engine applies a restitution factor on top.
pub fn elastic_collision(m1: f32, v1: f32, m2: f32, v2: f32) -> (f32, f32) {
    let total = m1 + m2;
    let new_v1 = ((m1 - m2) * v1 + 2.0 * m2 * v2) / total;
    let new_v2 = ((m2 - m1) * v2 + 2.0 * m1 * v1) / total;
    (new_v1, new_v2)
}
