//! Track builder: authored control points -> validated track
//!
//! The authoring tool hands over an ordered closed polygon of control points
//! and a width; the builder partitions it into 3 sectors, emits one straight
//! segment per point pair and places the sector checkpoints. A track never
//! leaves the builder unvalidated.

use glam::Vec2;
use thiserror::Error;
use uuid::Uuid;

use super::model::{
    Classification, ControlPoint, ControlPointKind, Difficulty, SegmentKind, Surface, Track,
    TrackCheckpoint, TrackSegment,
};
use super::validate;

/// Fixed sector palette cycled across the loop
pub const SECTOR_COLORS: [&str; 3] = ["#FF0000", "#00FF00", "#0000FF"];

const SECTOR_COUNT: usize = 3;

#[derive(Debug, Error)]
pub enum TrackBuildError {
    #[error("track needs at least 3 control points (got {found})")]
    InsufficientPoints { found: usize },
    #[error("built track failed validation: {}", .errors.join(", "))]
    Invalid { errors: Vec<String> },
}

fn segment_angle(start: Vec2, end: Vec2) -> f32 {
    (end.y - start.y).atan2(end.x - start.x).to_degrees()
}

/// Control-point indices where a new sector begins
///
/// The n points split into 3 sectors as evenly as possible; the first
/// `n % 3` sectors absorb the remainder.
fn sector_boundaries(point_count: usize) -> Vec<usize> {
    let per_sector = point_count / SECTOR_COUNT;
    let remainder = point_count % SECTOR_COUNT;

    let mut boundaries = Vec::with_capacity(SECTOR_COUNT - 1);
    let mut index = 0;
    for sector in 0..SECTOR_COUNT - 1 {
        index += per_sector + usize::from(sector < remainder);
        boundaries.push(index);
    }
    boundaries
}

fn sector_checkpoint(position: Vec2, angle: f32, order: u32, sector: usize) -> TrackCheckpoint {
    TrackCheckpoint {
        id: format!("checkpoint-{order}"),
        position,
        angle,
        order,
        sector_color: Some(SECTOR_COLORS[sector % SECTOR_COLORS.len()].to_string()),
    }
}

/// Build a closed-loop track from authored control points
///
/// Emits one straight segment per consecutive point pair (cyclic), tagged
/// with its sector color, plus checkpoints at the first point (order 1),
/// each sector boundary, and a closing checkpoint back at the first point.
/// Fails rather than returning an unclassified or invalid track.
pub fn control_points_to_track(
    control_points: &[ControlPoint],
    width: f32,
    name: &str,
) -> Result<Track, TrackBuildError> {
    if control_points.len() < 3 {
        return Err(TrackBuildError::InsufficientPoints {
            found: control_points.len(),
        });
    }

    let n = control_points.len();
    let boundaries = sector_boundaries(n);
    let mut segments = Vec::with_capacity(n);
    let mut checkpoints = Vec::new();
    let mut sector = 0usize;
    let mut order = 1u32;

    for i in 0..n {
        let start = control_points[i].position;
        let end = control_points[(i + 1) % n].position;
        let angle = segment_angle(start, end);

        segments.push(TrackSegment {
            id: format!("segment-{i}"),
            kind: SegmentKind::Straight,
            start,
            end,
            width,
            length: start.distance(end),
            radius: None,
            angle: Some(angle),
            sector_color: Some(SECTOR_COLORS[sector % SECTOR_COLORS.len()].to_string()),
        });

        if i == 0 {
            checkpoints.push(sector_checkpoint(start, angle, order, sector));
            order += 1;
        } else if boundaries.contains(&i) {
            sector += 1;
            checkpoints.push(sector_checkpoint(start, angle, order, sector));
            order += 1;
        }
        if i == n - 1 {
            // Closing checkpoint back at the start position
            checkpoints.push(sector_checkpoint(
                control_points[0].position,
                angle,
                order,
                sector,
            ));
        }
    }

    let start_position = control_points[0].position;
    let mut track = Track {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        author: "User".to_string(),
        created_at_ms: 0.0,
        segments,
        checkpoints,
        start_position,
        surface: Surface::Asphalt,
        difficulty: Difficulty::Intermediate,
        classification: Classification::Custom,
        validation_errors: None,
    };

    let report = validate::classify(&mut track);
    if !report.is_valid {
        return Err(TrackBuildError::Invalid {
            errors: report.errors,
        });
    }

    log::info!(
        "Built track '{}': {} segments, {} checkpoints",
        track.name,
        track.segments.len(),
        track.checkpoints.len()
    );
    Ok(track)
}

/// Extract authoring control points from a built track
///
/// One point per segment start. Lossy with respect to handles and
/// curvature - the authoring round trip only needs positions.
pub fn track_to_control_points(track: &Track) -> Vec<ControlPoint> {
    track
        .segments
        .iter()
        .enumerate()
        .map(|(index, segment)| ControlPoint {
            id: format!("control-{index}"),
            position: segment.start,
            handle_in: None,
            handle_out: None,
            kind: ControlPointKind::Normal,
        })
        .collect()
}

/// Default Bezier handle for the authoring preview
///
/// Extends a third of the way along the chord toward (outgoing) or away
/// from (incoming) the neighboring point.
pub fn default_handle(point: &ControlPoint, neighbor: &ControlPoint, outgoing: bool) -> Vec2 {
    let chord = neighbor.position - point.position;
    let distance = chord.length();
    if distance == 0.0 {
        return point.position;
    }
    let factor = if outgoing { 1.0 } else { -1.0 };
    point.position + chord / distance * (distance / 3.0) * factor
}
