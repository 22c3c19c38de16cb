//! Slipstream entry point
//!
//! The browser build exposes the crate through wasm-bindgen and leaves
//! scheduling to the host page. The native build runs a scripted demo race
//! in a fixed-step loop, which doubles as an end-to-end smoke test of the
//! stores, the builder and the engine.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Slipstream core ready");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use slipstream::consts::SIM_DT;
    use slipstream::store::{TrackStore, VehicleStore};
    use slipstream::{RaceConfig, RaceSession};

    env_logger::init();
    log::info!("Slipstream (native demo) starting...");

    let tracks = TrackStore::load();
    let vehicles = VehicleStore::load();

    let Some(track) = tracks.all_tracks().into_iter().next().cloned() else {
        log::error!("No tracks available");
        return;
    };
    let Some(vehicle) = vehicles.race_ready().next().cloned() else {
        log::error!("No race-ready vehicles available");
        return;
    };

    let config = RaceConfig {
        lap_target: 2,
        seed: 7,
        ..RaceConfig::default()
    };
    let mut session = RaceSession::new(config);
    if let Err(err) = session.start_race(&track, &vehicle) {
        log::error!("Could not start race: {err}");
        return;
    }
    log::info!("Racing '{}' on '{}'", vehicle.name, track.name);

    // Drive the demo racer toward its next checkpoint, up to 5 sim-minutes
    let max_ticks = (300.0 / SIM_DT) as u32;
    let mut last_logged_sec = 0_u64;
    for _ in 0..max_ticks {
        let Some(flags) = chase_next_checkpoint(&session) else {
            break;
        };
        session.handle_input(flags);
        session.tick(SIM_DT);

        let Some(state) = session.race_state() else {
            break;
        };
        let second = (state.elapsed_ms / 1000.0) as u64;
        if second > last_logged_sec {
            last_logged_sec = second;
            if let Some(player) = state.player() {
                log::info!(
                    "t={:>3}s lap {} gate {} speed {:>5.1} km/h lap time {:>6.2}s best {}",
                    second,
                    player.lap + 1,
                    player.current_checkpoint,
                    slipstream::ms_to_kmh(player.speed()),
                    player.lap_time_ms / 1000.0,
                    player
                        .best_lap_time_ms
                        .map(|ms| format!("{:.2}s", ms / 1000.0))
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
        }
        if state.phase == slipstream::sim::RacePhase::Finished {
            break;
        }
    }

    if let Some(state) = session.race_state() {
        match state.player().and_then(|p| p.finish_time_ms) {
            Some(finish) => log::info!("Demo race finished in {:.2}s", finish / 1000.0),
            None => log::warn!("Demo race hit the time cap before finishing"),
        }
    }
    session.end_race();
}

/// Point-and-shoot driver: steer toward the next expected checkpoint
#[cfg(not(target_arch = "wasm32"))]
fn chase_next_checkpoint(session: &slipstream::RaceSession) -> Option<slipstream::ControlFlags> {
    use slipstream::ControlFlags;

    let state = session.race_state()?;
    let player = state.player()?;
    let total = state.track.checkpoints.len() as u32;

    // After the last gate the lap closes back at the start line
    let target = if player.current_checkpoint > total {
        state.track.start_position
    } else {
        state
            .track
            .checkpoint_by_order(player.current_checkpoint)?
            .position
    };

    let to_target = target - player.position;
    let desired_deg = to_target.y.atan2(to_target.x).to_degrees();
    let mut diff = desired_deg - player.heading_deg;
    while diff >= 180.0 {
        diff -= 360.0;
    }
    while diff < -180.0 {
        diff += 360.0;
    }

    Some(ControlFlags {
        accelerate: diff.abs() < 60.0,
        brake: diff.abs() > 120.0 && slipstream::ms_to_kmh(player.speed()) > 40.0,
        turn_left: diff < -2.0,
        turn_right: diff > 2.0,
    })
}
