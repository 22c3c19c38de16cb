//! Deterministic race simulation
//!
//! All race logic lives here. The module is scheduler-free: callers drive it
//! through `engine::tick` at whatever cadence they like (frame callback,
//! timer, or a fixed-step test loop). Given the same track, inputs and seed,
//! a race replays identically.

pub mod engine;
pub mod physics;
pub mod powerup;
pub mod state;

pub use engine::{is_on_track, nearest_segment, tick};
pub use powerup::{PowerUp, PowerUpKind, PowerUpManager};
pub use state::{
    ActiveEffects, ControlFlags, RaceConfig, RaceConfigError, RacePhase, RaceState, RacerState,
};
