//! Slipstream - a browser-based 2D circuit racing game
//!
//! Core modules:
//! - `geom`: Pure curve/distance math shared by the builder and the simulation
//! - `track`: Track model, builder (control points -> track) and validator
//! - `vehicle`: Vehicle configuration and validation
//! - `sim`: Deterministic race simulation (physics, checkpoints, power-ups)
//! - `session`: Race session facade exposed to the UI layer
//! - `store`: Track/vehicle stores (embedded official data, LocalStorage customs)

pub mod geom;
pub mod session;
pub mod sim;
pub mod store;
pub mod track;
pub mod vehicle;

pub use session::RaceSession;
pub use sim::{ControlFlags, RaceConfig, RaceState};

use glam::Vec2;

/// Game tuning constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Reference frame rate the per-frame damping factors were tuned at
    pub const DAMPING_REF_HZ: f32 = 60.0;

    /// Lateral grip damping per reference frame (tire friction)
    pub const GRIP: f32 = 0.92;
    /// Speed penalty per reference frame while off track or on an oil slick
    pub const OFF_TRACK_PENALTY: f32 = 0.7;
    /// Extra margin beyond half the segment width before a racer counts as off track
    pub const OFF_TRACK_MARGIN: f32 = 5.0;

    /// Radius around the next expected checkpoint that counts as crossing it
    pub const CHECKPOINT_RADIUS: f32 = 50.0;
    /// Pairwise racer collision radius
    pub const COLLISION_RADIUS: f32 = 20.0;
    /// Speed retained by both racers after a collision response
    pub const COLLISION_RESTITUTION: f32 = 0.8;
    /// Grid stagger between racers on the start line
    pub const GRID_SPACING: f32 = 20.0;

    /// Laps to complete a race
    pub const DEFAULT_LAP_TARGET: u32 = 3;

    /// Braking effectiveness saturates at this speed
    pub const BRAKE_SATURATION_KMH: f32 = 50.0;
    /// Steering authority floor at high speed (simulated understeer)
    pub const STEERING_FLOOR: f32 = 0.3;

    /// Power-up pickup radius
    pub const PICKUP_RADIUS: f32 = 20.0;
    /// Maximum simultaneously active power-ups on the track
    pub const MAX_POWERUPS: usize = 5;
    /// Minimum time between power-up spawns
    pub const SPAWN_INTERVAL_MS: f64 = 10_000.0;
    /// Velocity multiplier while boosted
    pub const BOOST_MULTIPLIER: f32 = 1.5;
    /// Speed multiplier applied to a missile's target
    pub const MISSILE_SLOW: f32 = 0.5;

    /// Segment endpoints closer than this count as connected
    pub const CONNECT_EPSILON: f32 = 0.001;
}

/// Convert km/h to m/s
#[inline]
pub fn kmh_to_ms(kmh: f32) -> f32 {
    kmh / 3.6
}

/// Convert m/s to km/h
#[inline]
pub fn ms_to_kmh(ms: f32) -> f32 {
    ms * 3.6
}

/// Unit direction vector for a heading in degrees (0 = +x, counterclockwise)
#[inline]
pub fn heading_to_dir(heading_deg: f32) -> Vec2 {
    let rad = heading_deg.to_radians();
    Vec2::new(rad.cos(), rad.sin())
}

/// Scale a per-frame damping factor to an arbitrary timestep
///
/// The tuning constants above are "multiply once per 60 Hz frame" factors;
/// raising them to `dt * 60` keeps the decay rate independent of tick rate.
#[inline]
pub fn damping_per_tick(per_frame: f32, dt: f32) -> f32 {
    per_frame.powf(dt * consts::DAMPING_REF_HZ)
}
