//! Per-tick race engine
//!
//! Advances every racer through one fixed ordering: physics integration,
//! track containment, inter-racer collisions, checkpoint/lap bookkeeping,
//! then power-up collection. Later steps read positions written by earlier
//! ones within the same tick, so the ordering is load-bearing.

use glam::Vec2;

use super::physics;
use super::state::{RacePhase, RaceState, RacerState};
use crate::consts::{
    CHECKPOINT_RADIUS, COLLISION_RADIUS, COLLISION_RESTITUTION, GRIP, OFF_TRACK_MARGIN,
    OFF_TRACK_PENALTY,
};
use crate::geom::distance_point_to_segment;
use crate::track::validate::CHECKPOINT_ORDER_BASE;
use crate::track::{Track, TrackSegment};
use crate::{damping_per_tick, heading_to_dir};

/// Advance the race by one timestep (seconds)
pub fn tick(state: &mut RaceState, dt: f32) {
    if state.phase != RacePhase::Racing {
        return;
    }
    state.elapsed_ms += f64::from(dt) * 1000.0;
    let now_ms = state.elapsed_ms;

    for racer in state.racers.iter_mut().filter(|r| !r.finished) {
        integrate(racer, dt, now_ms);
    }

    for racer in state.racers.iter_mut().filter(|r| !r.finished) {
        apply_containment(&state.track, racer, dt);
    }

    resolve_collisions(&mut state.racers);

    let lap_target = state.config.lap_target;
    for racer in state.racers.iter_mut().filter(|r| !r.finished) {
        update_progress(&state.track, racer, lap_target, now_ms);
    }

    if state.config.powerups_enabled {
        state
            .powerups
            .update(now_ms, dt, &state.track, &mut state.racers);
    }

    if !state.racers.is_empty() && state.racers.iter().all(|r| r.finished) {
        state.phase = RacePhase::Finished;
        log::info!("Race finished after {:.1}s", state.elapsed_ms / 1000.0);
    }
}

/// Longitudinal physics, steering and position integration for one racer
fn integrate(racer: &mut RacerState, dt: f32, now_ms: f64) {
    racer.maintain_effects(now_ms);

    let controls = racer.controls;
    let mut speed = racer.speed();
    if controls.accelerate {
        speed += physics::acceleration(&racer.vehicle, speed) * dt;
    } else if controls.brake {
        speed -= physics::braking(&racer.vehicle, speed) * dt;
    } else {
        speed -= physics::drag(&racer.vehicle, speed) * dt;
    }
    racer.set_speed(speed);

    let steer = i32::from(controls.turn_right) - i32::from(controls.turn_left);
    if steer != 0 {
        racer.heading_deg +=
            steer as f32 * physics::steering_rate(&racer.vehicle, racer.speed()) * dt;
    }

    // Grip bleeds off lateral motion; the throttle state (scalar speed)
    // is untouched
    let velocity = heading_to_dir(racer.heading_deg) * racer.speed() * damping_per_tick(GRIP, dt);
    racer.set_velocity(velocity);
    racer.position += velocity * dt;

    racer.lap_time_ms += f64::from(dt) * 1000.0;
}

/// Nearest segment of the loop to a point, with the centerline distance
pub fn nearest_segment<'a>(track: &'a Track, point: Vec2) -> Option<(&'a TrackSegment, f32)> {
    track
        .segments
        .iter()
        .map(|segment| {
            (
                segment,
                distance_point_to_segment(point, segment.start, segment.end),
            )
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Whether a point lies within the drivable surface
pub fn is_on_track(track: &Track, point: Vec2) -> bool {
    nearest_segment(track, point)
        .map(|(segment, distance)| distance <= segment.width / 2.0 + OFF_TRACK_MARGIN)
        .unwrap_or(false)
}

/// Advisory off-track slowdown; never aborts the simulation
fn apply_containment(track: &Track, racer: &mut RacerState, dt: f32) {
    if !is_on_track(track, racer.position) {
        racer.apply_velocity_multiplier(damping_per_tick(OFF_TRACK_PENALTY, dt));
    }
}

/// Pairwise contact response between racers
///
/// Speeds exchange through the mass-weighted elastic formula, then both
/// lose a fixed share to the impact.
fn resolve_collisions(racers: &mut [RacerState]) {
    for i in 0..racers.len() {
        for j in i + 1..racers.len() {
            if racers[i].finished || racers[j].finished {
                continue;
            }
            if racers[i].position.distance(racers[j].position) >= COLLISION_RADIUS {
                continue;
            }

            let (v1, v2) = physics::elastic_collision(
                racers[i].vehicle.weight_kg,
                racers[i].speed(),
                racers[j].vehicle.weight_kg,
                racers[j].speed(),
            );
            racers[i].set_speed(v1.max(0.0) * COLLISION_RESTITUTION);
            racers[j].set_speed(v2.max(0.0) * COLLISION_RESTITUTION);
        }
    }
}

/// Checkpoint crossing and lap completion for one racer
///
/// Checkpoints must be crossed in strict order: only proximity to the next
/// expected order advances progress. Once every gate is passed, reaching
/// the start/finish line closes the lap.
fn update_progress(track: &Track, racer: &mut RacerState, lap_target: u32, now_ms: f64) {
    let total = track.checkpoints.len() as u32;

    if racer.current_checkpoint < CHECKPOINT_ORDER_BASE + total {
        if let Some(checkpoint) = track.checkpoint_by_order(racer.current_checkpoint) {
            if racer.position.distance(checkpoint.position) < CHECKPOINT_RADIUS {
                log::debug!(
                    "{} crossed checkpoint {}",
                    racer.name,
                    racer.current_checkpoint
                );
                racer.current_checkpoint += 1;
            }
        }
    }

    if racer.current_checkpoint >= CHECKPOINT_ORDER_BASE + total
        && racer.position.distance(track.start_position) < CHECKPOINT_RADIUS
    {
        racer.lap += 1;
        racer.best_lap_time_ms = Some(match racer.best_lap_time_ms {
            Some(best) => best.min(racer.lap_time_ms),
            None => racer.lap_time_ms,
        });
        log::info!(
            "{} completed lap {} in {:.2}s",
            racer.name,
            racer.lap,
            racer.lap_time_ms / 1000.0
        );
        racer.lap_time_ms = 0.0;
        racer.current_checkpoint = CHECKPOINT_ORDER_BASE;

        if racer.lap >= lap_target {
            racer.finished = true;
            racer.finish_time_ms = Some(now_ms);
            log::info!("{} finished at {:.2}s", racer.name, now_ms / 1000.0);
        }
    }
}
