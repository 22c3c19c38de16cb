//! Track domain: canonical model, authoring builder and structural validator

pub mod builder;
pub mod model;
pub mod validate;

pub use builder::{control_points_to_track, track_to_control_points, TrackBuildError};
pub use model::{
    Classification, ControlPoint, ControlPointKind, Difficulty, SegmentKind, Surface, Track,
    TrackCheckpoint, TrackSegment,
};
pub use validate::{validate, ValidationReport};
