//! Race session facade
//!
//! The surface the UI layer talks to: start/end a race, feed input intents,
//! pull state for rendering. Explicitly constructed and dependency-injected;
//! there is no global engine instance. The session carries no scheduler of
//! its own - the host calls `advance` from its frame callback (or `tick`
//! from a fixed-step harness) and the substep accumulator does the rest.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::sim::{self, ControlFlags, RaceConfig, RaceConfigError, RaceState};
use crate::track::Track;
use crate::vehicle::Vehicle;

/// Longest frame delta the accumulator will absorb (spiral-of-death guard)
const MAX_FRAME_DT: f32 = 0.1;

/// One racing session: at most one race at a time
#[derive(Debug)]
pub struct RaceSession {
    config: RaceConfig,
    state: Option<RaceState>,
    accumulator: f32,
}

impl RaceSession {
    pub fn new(config: RaceConfig) -> Self {
        Self {
            config,
            state: None,
            accumulator: 0.0,
        }
    }

    /// Start a race with a single player racer
    ///
    /// Fails fast on an ineligible track; no engine state is created on
    /// error. Any race already in progress is discarded.
    pub fn start_race(&mut self, track: &Track, vehicle: &Vehicle) -> Result<(), RaceConfigError> {
        self.start_race_with_opponents(track, vehicle, &[])
    }

    /// Start a race against a field of opponents
    pub fn start_race_with_opponents(
        &mut self,
        track: &Track,
        vehicle: &Vehicle,
        opponents: &[(String, Vehicle)],
    ) -> Result<(), RaceConfigError> {
        let mut state = RaceState::new(track, vehicle, self.config)?;
        for (name, opponent) in opponents {
            state.add_racer(name, opponent.clone());
        }
        state.start();
        self.state = Some(state);
        self.accumulator = 0.0;
        Ok(())
    }

    /// Update the player's control intents; read once per tick
    pub fn handle_input(&mut self, flags: ControlFlags) {
        if let Some(state) = self.state.as_mut() {
            if let Some(player) = state.racers.first_mut() {
                player.controls = flags;
            }
        }
    }

    /// Advance by a variable frame delta, substepping at the fixed rate
    pub fn advance(&mut self, frame_dt: f32) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        self.accumulator += frame_dt.min(MAX_FRAME_DT);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            sim::tick(state, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
    }

    /// Advance exactly one step of `dt` seconds (test harnesses)
    pub fn tick(&mut self, dt: f32) {
        if let Some(state) = self.state.as_mut() {
            sim::tick(state, dt);
        }
    }

    /// Current race state, if a race is running; the render layer pulls
    /// this once per animation frame
    pub fn race_state(&self) -> Option<&RaceState> {
        self.state.as_ref()
    }

    /// Drop the in-memory race; cooperative cancellation, nothing to roll back
    pub fn end_race(&mut self) {
        if self.state.take().is_some() {
            log::info!("Race session ended");
        }
        self.accumulator = 0.0;
    }
}

impl Default for RaceSession {
    fn default() -> Self {
        Self::new(RaceConfig::default())
    }
}
