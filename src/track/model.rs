//! Canonical track model
//!
//! A track is a closed loop of segments plus an ordered set of checkpoints.
//! Checkpoint orders start at 1; the order-1 checkpoint doubles as the
//! start/finish line. Tracks are only mutated by the builder (geometry) and
//! the validator (classification) - the race engine reads them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Geometric flavor of a track segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    Straight,
    Curve,
    Checkpoint,
    Chicane,
}

/// One piece of the track loop
///
/// `end` of segment i coincides with `start` of segment i+1 (cyclically)
/// on a well-formed track; the validator enforces this within epsilon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSegment {
    pub id: String,
    pub kind: SegmentKind,
    pub start: Vec2,
    pub end: Vec2,
    pub width: f32,
    pub length: f32,
    /// Curve radius (curves only)
    #[serde(default)]
    pub radius: Option<f32>,
    /// Chord angle in degrees
    #[serde(default)]
    pub angle: Option<f32>,
    /// Sector tag used for lap-split color coding
    #[serde(default)]
    pub sector_color: Option<String>,
}

impl TrackSegment {
    /// Midpoint of the segment chord
    pub fn midpoint(&self) -> Vec2 {
        (self.start + self.end) * 0.5
    }
}

/// An ordered gate a racer must cross for lap progress to count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackCheckpoint {
    pub id: String,
    pub position: Vec2,
    /// Facing of the gate in degrees (also the start heading for order 1)
    pub angle: f32,
    /// 1-based crossing order; order 1 is the start/finish line
    pub order: u32,
    #[serde(default)]
    pub sector_color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Surface {
    #[default]
    Asphalt,
    Dirt,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Intermediate,
    Hard,
}

/// How a track entered the catalog, or whether it failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Official,
    Custom,
    /// Carries `validation_errors`; listable and inspectable but not raceable
    Invalid,
}

/// A complete track record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub author: String,
    /// Unix timestamp in ms, stamped by the store on save (0 = never saved)
    #[serde(default)]
    pub created_at_ms: f64,
    pub segments: Vec<TrackSegment>,
    pub checkpoints: Vec<TrackCheckpoint>,
    pub start_position: Vec2,
    pub surface: Surface,
    pub difficulty: Difficulty,
    pub classification: Classification,
    #[serde(default)]
    pub validation_errors: Option<Vec<String>>,
}

impl Track {
    /// The start/finish checkpoint (lowest order)
    pub fn start_checkpoint(&self) -> Option<&TrackCheckpoint> {
        self.checkpoints.iter().min_by_key(|cp| cp.order)
    }

    /// Checkpoint with the given crossing order
    pub fn checkpoint_by_order(&self, order: u32) -> Option<&TrackCheckpoint> {
        self.checkpoints.iter().find(|cp| cp.order == order)
    }

    /// Invalid tracks stay loadable for inspection but cannot host a race
    pub fn is_race_eligible(&self) -> bool {
        self.classification != Classification::Invalid
    }
}

/// How an authored point joins its neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ControlPointKind {
    #[default]
    Normal,
    Sharp,
    Smooth,
}

/// An authoring-time point placed by the track designer
///
/// An ordered sequence of at least 3 of these forms a closed polygon (the
/// last point implicitly connects back to the first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlPoint {
    pub id: String,
    pub position: Vec2,
    /// Bezier handle for the incoming span (authoring preview only)
    #[serde(default)]
    pub handle_in: Option<Vec2>,
    /// Bezier handle for the outgoing span (authoring preview only)
    #[serde(default)]
    pub handle_out: Option<Vec2>,
    pub kind: ControlPointKind,
}
