//! Power-up and hazard subsystem
//!
//! Spawn scheduling, collection and effect application. Spawns are driven by
//! a seeded RNG so a race replays identically for a given seed. Effects touch
//! racers only through the narrow mutation interface on `RacerState`.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::state::RacerState;
use crate::consts::{OFF_TRACK_PENALTY, PICKUP_RADIUS};
use crate::damping_per_tick;
use crate::track::Track;

/// Spawn jitter around the chosen segment's midpoint
const SPAWN_SCATTER: f32 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    /// Temporary speed boost
    Boost,
    /// Blocks one missile for the duration
    Shield,
    /// Drops a persistent oil slick on the track
    Oil,
    /// Slows down the racer ahead
    Missile,
}

impl PowerUpKind {
    const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Boost,
        PowerUpKind::Shield,
        PowerUpKind::Oil,
        PowerUpKind::Missile,
    ];

    /// Effect duration; missiles are instant
    pub fn duration_ms(self) -> f64 {
        match self {
            PowerUpKind::Boost => 3_000.0,
            PowerUpKind::Shield => 5_000.0,
            PowerUpKind::Oil => 7_000.0,
            PowerUpKind::Missile => 0.0,
        }
    }
}

/// A power-up sitting on the track
///
/// Collected power-ups are removed, except oil: a collected slick flips to
/// `active = false` and stays in the list as a permanent drive-over hazard.
#[derive(Debug, Clone)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub position: Vec2,
    pub active: bool,
}

/// Spawn scheduler and effect applier
#[derive(Debug, Clone)]
pub struct PowerUpManager {
    powerups: Vec<PowerUp>,
    max_active: usize,
    spawn_interval_ms: f64,
    last_spawn_ms: f64,
    rng: Pcg32,
    next_id: u32,
}

impl PowerUpManager {
    pub fn new(seed: u64, max_active: usize, spawn_interval_ms: f64) -> Self {
        Self {
            powerups: Vec::new(),
            max_active,
            spawn_interval_ms,
            last_spawn_ms: 0.0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// All power-ups currently on the track, spent oil slicks included
    pub fn powerups(&self) -> &[PowerUp] {
        &self.powerups
    }

    /// One scheduler step: spawn if due, then collection and hazard checks
    ///
    /// Runs after movement within the tick, so it reads the positions the
    /// physics step just wrote.
    pub fn update(&mut self, now_ms: f64, dt: f32, track: &Track, racers: &mut [RacerState]) {
        self.maybe_spawn(now_ms, track);
        self.collect(now_ms, racers);
        self.oil_hazard(dt, racers);
    }

    fn maybe_spawn(&mut self, now_ms: f64, track: &Track) {
        if self.powerups.len() >= self.max_active {
            return;
        }
        if now_ms - self.last_spawn_ms <= self.spawn_interval_ms {
            return;
        }
        self.spawn(track);
        self.last_spawn_ms = now_ms;
    }

    /// Drop a random power-up near a random segment
    fn spawn(&mut self, track: &Track) {
        if track.segments.is_empty() {
            return;
        }
        let segment = &track.segments[self.rng.random_range(0..track.segments.len())];
        let position = segment.midpoint()
            + Vec2::new(
                self.rng.random_range(-SPAWN_SCATTER..SPAWN_SCATTER),
                self.rng.random_range(-SPAWN_SCATTER..SPAWN_SCATTER),
            );
        let kind = PowerUpKind::ALL[self.rng.random_range(0..PowerUpKind::ALL.len())];

        let id = self.next_id;
        self.next_id += 1;
        log::debug!("Spawned {:?} power-up at {:?}", kind, position);
        self.powerups.push(PowerUp {
            id,
            kind,
            position,
            active: true,
        });
    }

    /// Hand collected power-ups to the racers that drove over them
    fn collect(&mut self, now_ms: f64, racers: &mut [RacerState]) {
        for racer_index in 0..racers.len() {
            let mut pu_index = 0;
            while pu_index < self.powerups.len() {
                let powerup = &self.powerups[pu_index];
                if !powerup.active
                    || racers[racer_index].position.distance(powerup.position) >= PICKUP_RADIUS
                {
                    pu_index += 1;
                    continue;
                }

                let kind = powerup.kind;
                log::debug!("Racer {} collected {:?}", racers[racer_index].name, kind);
                apply_effect(kind, racer_index, racers, now_ms);

                if kind == PowerUpKind::Oil {
                    // The slick stays on track but can't be collected again
                    self.powerups[pu_index].active = false;
                    pu_index += 1;
                } else {
                    self.powerups.swap_remove(pu_index);
                }
            }
        }
    }

    /// Spent oil slicks slow anyone driving over them, same as running
    /// off track
    fn oil_hazard(&self, dt: f32, racers: &mut [RacerState]) {
        let penalty = damping_per_tick(OFF_TRACK_PENALTY, dt);
        for slick in self
            .powerups
            .iter()
            .filter(|p| p.kind == PowerUpKind::Oil && !p.active)
        {
            for racer in racers.iter_mut() {
                if racer.position.distance(slick.position) < PICKUP_RADIUS {
                    racer.apply_velocity_multiplier(penalty);
                }
            }
        }
    }
}

fn apply_effect(kind: PowerUpKind, collector: usize, racers: &mut [RacerState], now_ms: f64) {
    match kind {
        PowerUpKind::Boost => {
            racers[collector].begin_boost(now_ms + kind.duration_ms());
        }
        PowerUpKind::Shield => {
            racers[collector].set_shielded(now_ms + kind.duration_ms());
        }
        PowerUpKind::Oil => {
            // No effect on the collector; the slick becomes a hazard
        }
        PowerUpKind::Missile => {
            fire_missile(collector, racers);
        }
    }
}

/// Halve the speed of the nearest racer strictly ahead of the shooter
///
/// "Ahead" is by lap first, then by checkpoint progress within the same
/// lap; exactly one lap ahead counts as an immediate target. Shielded
/// targets shrug the hit off.
fn fire_missile(shooter: usize, racers: &mut [RacerState]) {
    let shooter_lap = racers[shooter].lap;
    let shooter_checkpoint = racers[shooter].current_checkpoint;

    let mut target: Option<usize> = None;
    let mut smallest_gap = u32::MAX;

    for (index, other) in racers.iter().enumerate() {
        if index == shooter {
            continue;
        }
        let lap_diff = other.lap as i64 - shooter_lap as i64;
        if lap_diff == 0 {
            if other.current_checkpoint > shooter_checkpoint {
                let gap = other.current_checkpoint - shooter_checkpoint;
                if gap < smallest_gap {
                    smallest_gap = gap;
                    target = Some(index);
                }
            }
        } else if lap_diff == 1 {
            target = Some(index);
            break;
        }
    }

    if let Some(index) = target {
        if racers[index].is_shielded() {
            log::debug!("Missile blocked by {}'s shield", racers[index].name);
        } else {
            racers[index].halve_speed();
            log::debug!("Missile hit {}", racers[index].name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::test_support::ring_track;
    use crate::vehicle::test_vehicle;

    fn manager() -> PowerUpManager {
        PowerUpManager::new(42, 5, 10_000.0)
    }

    fn racer_at(id: u32, position: Vec2) -> RacerState {
        let mut racer = RacerState::new(id, &format!("racer-{id}"), test_vehicle());
        racer.position = position;
        racer
    }

    #[test]
    fn test_spawn_respects_interval_and_cap() {
        let track = ring_track(6, 200.0, 20.0);
        let mut mgr = manager();
        let mut racers: Vec<RacerState> = Vec::new();

        // Nothing before the interval elapses
        mgr.update(5_000.0, 0.016, &track, &mut racers);
        assert!(mgr.powerups().is_empty());

        mgr.update(10_001.0, 0.016, &track, &mut racers);
        assert_eq!(mgr.powerups().len(), 1);

        // Same timestamp again: interval not yet elapsed since last spawn
        mgr.update(10_002.0, 0.016, &track, &mut racers);
        assert_eq!(mgr.powerups().len(), 1);

        // Cap at max_active
        for step in 1..20 {
            mgr.update(10_001.0 + step as f64 * 10_001.0, 0.016, &track, &mut racers);
        }
        assert!(mgr.powerups().len() <= 5);
    }

    #[test]
    fn test_spawns_are_deterministic_for_a_seed() {
        let track = ring_track(6, 200.0, 20.0);
        let mut a = manager();
        let mut b = manager();
        let mut racers: Vec<RacerState> = Vec::new();

        for step in 1..4 {
            let now = step as f64 * 10_001.0;
            a.update(now, 0.016, &track, &mut racers);
            b.update(now, 0.016, &track, &mut racers);
        }

        let positions_a: Vec<Vec2> = a.powerups().iter().map(|p| p.position).collect();
        let positions_b: Vec<Vec2> = b.powerups().iter().map(|p| p.position).collect();
        assert_eq!(positions_a, positions_b);
    }

    #[test]
    fn test_boost_removed_but_oil_persists() {
        let mut mgr = manager();
        mgr.powerups.push(PowerUp {
            id: 1,
            kind: PowerUpKind::Boost,
            position: Vec2::new(0.0, 0.0),
            active: true,
        });
        mgr.powerups.push(PowerUp {
            id: 2,
            kind: PowerUpKind::Oil,
            position: Vec2::new(100.0, 0.0),
            active: true,
        });

        let mut racers = vec![racer_at(0, Vec2::ZERO)];
        mgr.collect(0.0, &mut racers);
        assert_eq!(mgr.powerups().len(), 1);
        assert!(racers[0].effects().boost_until_ms.is_some());

        // Drive over the oil: collected (inactive) but never removed
        racers[0].position = Vec2::new(100.0, 0.0);
        mgr.collect(0.0, &mut racers);
        assert_eq!(mgr.powerups().len(), 1);
        assert!(!mgr.powerups()[0].active);

        // A second pass cannot re-collect it
        mgr.collect(0.0, &mut racers);
        assert_eq!(mgr.powerups().len(), 1);
    }

    #[test]
    fn test_oil_slick_slows_driver_on_it() {
        let mut mgr = manager();
        mgr.powerups.push(PowerUp {
            id: 1,
            kind: PowerUpKind::Oil,
            position: Vec2::ZERO,
            active: false,
        });

        let mut racers = vec![racer_at(0, Vec2::new(5.0, 0.0))];
        racers[0].set_speed(20.0);
        mgr.oil_hazard(1.0 / 60.0, &mut racers);
        assert!(racers[0].speed() < 20.0);

        // Off the slick: unaffected
        let mut clear = vec![racer_at(1, Vec2::new(500.0, 0.0))];
        clear[0].set_speed(20.0);
        mgr.oil_hazard(1.0 / 60.0, &mut clear);
        assert!((clear[0].speed() - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_missile_hits_only_the_racer_ahead() {
        // A fires; B is one checkpoint ahead on the same lap, C is behind
        let mut racers = vec![
            racer_at(0, Vec2::ZERO),
            racer_at(1, Vec2::new(50.0, 0.0)),
            racer_at(2, Vec2::new(-50.0, 0.0)),
        ];
        racers[0].current_checkpoint = 2;
        racers[1].current_checkpoint = 3;
        racers[2].current_checkpoint = 1;
        for racer in &mut racers {
            racer.set_speed(20.0);
        }

        fire_missile(0, &mut racers);
        assert!((racers[1].speed() - 10.0).abs() < 1e-4);
        assert!((racers[0].speed() - 20.0).abs() < 1e-4);
        assert!((racers[2].speed() - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_missile_blocked_by_shield() {
        let mut racers = vec![racer_at(0, Vec2::ZERO), racer_at(1, Vec2::new(50.0, 0.0))];
        racers[0].current_checkpoint = 2;
        racers[1].current_checkpoint = 3;
        racers[1].set_speed(20.0);
        racers[1].set_shielded(f64::MAX);

        fire_missile(0, &mut racers);
        assert!((racers[1].speed() - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_missile_targets_full_lap_ahead() {
        let mut racers = vec![racer_at(0, Vec2::ZERO), racer_at(1, Vec2::new(50.0, 0.0))];
        racers[1].lap = 1; // exactly one lap ahead
        racers[1].set_speed(30.0);

        fire_missile(0, &mut racers);
        assert!((racers[1].speed() - 15.0).abs() < 1e-4);

        // Two laps ahead is out of range
        let mut far = vec![racer_at(0, Vec2::ZERO), racer_at(1, Vec2::new(50.0, 0.0))];
        far[1].lap = 2;
        far[1].set_speed(30.0);
        fire_missile(0, &mut far);
        assert!((far[1].speed() - 30.0).abs() < 1e-4);
    }
}
