//! Race state and per-racer simulation types
//!
//! One `RaceState` per race session; the engine mutates it every tick and
//! the render layer reads it every frame. Racer speed and effect invariants
//! are centralized here behind a narrow mutation interface so the power-up
//! subsystem never pokes fields directly.

use glam::Vec2;
use thiserror::Error;

use super::powerup::PowerUpManager;
use crate::consts::{
    BOOST_MULTIPLIER, DEFAULT_LAP_TARGET, GRID_SPACING, MAX_POWERUPS, MISSILE_SLOW,
    SPAWN_INTERVAL_MS,
};
use crate::track::validate::CHECKPOINT_ORDER_BASE;
use crate::track::Track;
use crate::vehicle::Vehicle;

/// Discrete control intents, read once per tick
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlFlags {
    pub accelerate: bool,
    pub brake: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

/// Power-up effects currently applied to a racer
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveEffects {
    pub shielded: bool,
    pub shield_until_ms: Option<f64>,
    pub boost_until_ms: Option<f64>,
}

/// Mutable per-competitor simulation state
///
/// Created at race start, mutated every tick by the engine, discarded with
/// the session. Speed and velocity are private: all writes go through the
/// methods below, which keep the speed clamp in one place.
#[derive(Debug, Clone)]
pub struct RacerState {
    pub id: u32,
    pub name: String,
    pub vehicle: Vehicle,
    pub controls: ControlFlags,
    pub position: Vec2,
    /// Heading in degrees (0 = +x, counterclockwise)
    pub heading_deg: f32,
    velocity: Vec2,
    speed: f32,
    /// Order of the next checkpoint to cross
    pub current_checkpoint: u32,
    /// Completed laps
    pub lap: u32,
    pub lap_time_ms: f64,
    pub best_lap_time_ms: Option<f64>,
    pub finished: bool,
    pub finish_time_ms: Option<f64>,
    effects: ActiveEffects,
}

impl RacerState {
    pub fn new(id: u32, name: &str, vehicle: Vehicle) -> Self {
        Self {
            id,
            name: name.to_string(),
            vehicle,
            controls: ControlFlags::default(),
            position: Vec2::ZERO,
            heading_deg: 0.0,
            velocity: Vec2::ZERO,
            speed: 0.0,
            current_checkpoint: CHECKPOINT_ORDER_BASE,
            lap: 0,
            lap_time_ms: 0.0,
            best_lap_time_ms: None,
            finished: false,
            finish_time_ms: None,
            effects: ActiveEffects::default(),
        }
    }

    /// Current scalar speed in m/s
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Current velocity vector in m/s
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn effects(&self) -> &ActiveEffects {
        &self.effects
    }

    pub fn is_shielded(&self) -> bool {
        self.effects.shielded
    }

    /// Speed ceiling: top speed, raised while a boost is active
    fn speed_cap(&self) -> f32 {
        let top = self.vehicle.top_speed_ms();
        if self.effects.boost_until_ms.is_some() {
            top * BOOST_MULTIPLIER
        } else {
            top
        }
    }

    /// Set the scalar speed, clamped to `[0, cap]`; velocity follows heading
    pub(crate) fn set_speed(&mut self, speed: f32) {
        self.speed = speed.clamp(0.0, self.speed_cap());
        self.velocity = crate::heading_to_dir(self.heading_deg) * self.speed;
    }

    /// Replace the velocity vector directly (grip damping)
    ///
    /// The scalar speed stays canonical; grip only bleeds off the motion
    /// vector, not the throttle state.
    pub(crate) fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Scale speed by a factor, re-applying the clamp
    pub fn apply_velocity_multiplier(&mut self, factor: f32) {
        self.set_speed(self.speed * factor);
    }

    /// Missile hit: lose half the current speed
    pub fn halve_speed(&mut self) {
        self.apply_velocity_multiplier(MISSILE_SLOW);
    }

    /// Raise the shield until the given timestamp
    pub fn set_shielded(&mut self, until_ms: f64) {
        self.effects.shielded = true;
        self.effects.shield_until_ms = Some(until_ms);
    }

    /// Start a boost: velocity jumps immediately, cap stays raised until expiry
    pub fn begin_boost(&mut self, until_ms: f64) {
        self.effects.boost_until_ms = Some(until_ms);
        self.apply_velocity_multiplier(BOOST_MULTIPLIER);
    }

    /// Expire timed effects; a lapsed boost re-caps speed only if the racer
    /// is still above the normal ceiling
    pub(crate) fn maintain_effects(&mut self, now_ms: f64) {
        if let Some(until) = self.effects.boost_until_ms {
            if now_ms >= until {
                self.effects.boost_until_ms = None;
                let top = self.vehicle.top_speed_ms();
                if self.speed > top {
                    self.set_speed(top);
                }
            }
        }
        if let Some(until) = self.effects.shield_until_ms {
            if now_ms >= until {
                self.effects.shield_until_ms = None;
                self.effects.shielded = false;
            }
        }
    }
}

/// Race-wide configuration, injected at session construction
#[derive(Debug, Clone, Copy)]
pub struct RaceConfig {
    pub lap_target: u32,
    /// Enables the power-up/hazard layer
    pub powerups_enabled: bool,
    pub max_powerups: usize,
    pub spawn_interval_ms: f64,
    /// Seed for the spawn scheduler RNG
    pub seed: u64,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            lap_target: DEFAULT_LAP_TARGET,
            powerups_enabled: true,
            max_powerups: MAX_POWERUPS,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            seed: 0,
        }
    }
}

/// Phase of the race session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RacePhase {
    NotStarted,
    Racing,
    Finished,
}

/// Fatal race configuration errors, surfaced before any racing begins
#[derive(Debug, Error)]
pub enum RaceConfigError {
    #[error("track '{name}' is not race eligible: {}", .errors.join(", "))]
    IneligibleTrack { name: String, errors: Vec<String> },
    #[error("track '{name}' has no segments")]
    NoSegments { name: String },
    #[error("track '{name}' has no start checkpoint (order {})", CHECKPOINT_ORDER_BASE)]
    MissingStartCheckpoint { name: String },
}

/// Complete state of a running race
#[derive(Debug, Clone)]
pub struct RaceState {
    pub track: Track,
    pub config: RaceConfig,
    pub phase: RacePhase,
    pub elapsed_ms: f64,
    pub racers: Vec<RacerState>,
    pub powerups: PowerUpManager,
}

impl RaceState {
    /// Prepare a race on the given track with a single player racer
    ///
    /// Fails fast on configuration defects: an invalid track, a track with
    /// no segments, or one lacking the start checkpoint.
    pub fn new(track: &Track, vehicle: &Vehicle, config: RaceConfig) -> Result<Self, RaceConfigError> {
        if !track.is_race_eligible() {
            return Err(RaceConfigError::IneligibleTrack {
                name: track.name.clone(),
                errors: track.validation_errors.clone().unwrap_or_default(),
            });
        }
        if track.segments.is_empty() {
            return Err(RaceConfigError::NoSegments {
                name: track.name.clone(),
            });
        }
        if track.checkpoint_by_order(CHECKPOINT_ORDER_BASE).is_none() {
            return Err(RaceConfigError::MissingStartCheckpoint {
                name: track.name.clone(),
            });
        }

        let mut state = Self {
            track: track.clone(),
            config,
            phase: RacePhase::NotStarted,
            elapsed_ms: 0.0,
            racers: Vec::new(),
            powerups: PowerUpManager::new(config.seed, config.max_powerups, config.spawn_interval_ms),
        };
        state.add_racer("Player", vehicle.clone());
        Ok(state)
    }

    /// Add a competitor; only meaningful before the race starts
    pub fn add_racer(&mut self, name: &str, vehicle: Vehicle) -> u32 {
        if self.phase != RacePhase::NotStarted {
            log::warn!("Ignoring racer '{}' added after race start", name);
            return u32::MAX;
        }
        let id = self.racers.len() as u32;
        self.racers.push(RacerState::new(id, name, vehicle));
        id
    }

    /// Line the field up on the grid and begin racing
    pub fn start(&mut self) {
        // Eligibility was checked in `new`; the start checkpoint exists
        let (start_position, start_angle) = self
            .track
            .checkpoint_by_order(CHECKPOINT_ORDER_BASE)
            .map(|cp| (cp.position, cp.angle))
            .unwrap_or((self.track.start_position, 0.0));

        for (index, racer) in self.racers.iter_mut().enumerate() {
            racer.position = start_position + Vec2::new(0.0, index as f32 * GRID_SPACING);
            racer.heading_deg = start_angle;
            racer.set_speed(0.0);
            racer.current_checkpoint = CHECKPOINT_ORDER_BASE;
            racer.lap = 0;
            racer.lap_time_ms = 0.0;
            racer.finished = false;
            racer.finish_time_ms = None;
        }

        self.phase = RacePhase::Racing;
        log::info!(
            "Race started on '{}': {} racer(s), {} lap target",
            self.track.name,
            self.racers.len(),
            self.config.lap_target
        );
    }

    /// The player racer (index 0 by construction)
    pub fn player(&self) -> Option<&RacerState> {
        self.racers.first()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::track::{control_points_to_track, ControlPoint, ControlPointKind};
    use std::f32::consts::TAU;

    /// A valid ring track for engine tests
    pub fn ring_track(points: usize, radius: f32, width: f32) -> Track {
        let control_points: Vec<ControlPoint> = (0..points)
            .map(|i| {
                let theta = TAU * i as f32 / points as f32;
                ControlPoint {
                    id: format!("control-{i}"),
                    position: Vec2::new(radius * theta.cos(), radius * theta.sin()),
                    handle_in: None,
                    handle_out: None,
                    kind: ControlPointKind::Normal,
                }
            })
            .collect();
        control_points_to_track(&control_points, width, "Test Ring").unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::ring_track;
    use super::*;
    use crate::track::Classification;
    use crate::vehicle::test_vehicle;

    #[test]
    fn test_start_race_rejects_invalid_track() {
        let mut track = ring_track(6, 200.0, 20.0);
        track.classification = Classification::Invalid;
        track.validation_errors = Some(vec!["broken".into()]);

        let err = RaceState::new(&track, &test_vehicle(), RaceConfig::default()).unwrap_err();
        assert!(matches!(err, RaceConfigError::IneligibleTrack { .. }));
    }

    #[test]
    fn test_start_race_requires_start_checkpoint() {
        let mut track = ring_track(6, 200.0, 20.0);
        // Renumber away the order-1 checkpoint but keep classification intact
        for cp in &mut track.checkpoints {
            cp.order += 10;
        }

        let err = RaceState::new(&track, &test_vehicle(), RaceConfig::default()).unwrap_err();
        assert!(matches!(err, RaceConfigError::MissingStartCheckpoint { .. }));
    }

    #[test]
    fn test_start_lines_up_grid() {
        let track = ring_track(6, 200.0, 20.0);
        let mut state = RaceState::new(&track, &test_vehicle(), RaceConfig::default()).unwrap();
        state.add_racer("Rival", test_vehicle());
        state.start();

        assert_eq!(state.phase, RacePhase::Racing);
        let start = track.start_position;
        assert!(state.racers[0].position.distance(start) < 1e-4);
        assert!((state.racers[1].position.y - start.y - GRID_SPACING).abs() < 1e-4);
    }

    #[test]
    fn test_racers_cannot_join_mid_race() {
        let track = ring_track(6, 200.0, 20.0);
        let mut state = RaceState::new(&track, &test_vehicle(), RaceConfig::default()).unwrap();
        state.start();
        state.add_racer("Late", test_vehicle());
        assert_eq!(state.racers.len(), 1);
    }

    #[test]
    fn test_speed_clamp_and_boost_cap() {
        let mut racer = RacerState::new(0, "r", test_vehicle());
        let top = racer.vehicle.top_speed_ms();

        racer.set_speed(top * 2.0);
        assert!((racer.speed() - top).abs() < 1e-4);

        // Boost raises the cap and multiplies velocity
        racer.begin_boost(3_000.0);
        assert!(racer.speed() > top);
        assert!(racer.speed() <= top * BOOST_MULTIPLIER + 1e-4);

        // After expiry the racer is re-capped (only because still above top)
        racer.maintain_effects(3_000.0);
        assert!(racer.effects().boost_until_ms.is_none());
        assert!((racer.speed() - top).abs() < 1e-4);
    }

    #[test]
    fn test_shield_expires() {
        let mut racer = RacerState::new(0, "r", test_vehicle());
        racer.set_shielded(5_000.0);
        assert!(racer.is_shielded());

        racer.maintain_effects(4_999.0);
        assert!(racer.is_shielded());
        racer.maintain_effects(5_000.0);
        assert!(!racer.is_shielded());
    }

    #[test]
    fn test_halve_speed() {
        let mut racer = RacerState::new(0, "r", test_vehicle());
        racer.set_speed(20.0);
        racer.halve_speed();
        assert!((racer.speed() - 10.0).abs() < 1e-4);
    }
}
