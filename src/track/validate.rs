//! Structural track validation
//!
//! Pure invariant checker. Every applicable error is accumulated rather than
//! short-circuiting, so the author sees the full defect list at once.

use glam::Vec2;

use super::model::{Classification, Track, TrackSegment};
use crate::consts::CONNECT_EPSILON;

/// Lowest checkpoint order on a well-formed track
pub const CHECKPOINT_ORDER_BASE: u32 = 1;

/// Outcome of a validation pass
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

fn finite(point: Vec2) -> bool {
    point.x.is_finite() && point.y.is_finite()
}

fn segments_connect(current: &TrackSegment, next: &TrackSegment) -> bool {
    (current.end.x - next.start.x).abs() < CONNECT_EPSILON
        && (current.end.y - next.start.y).abs() < CONNECT_EPSILON
}

fn validate_segment(segment: &TrackSegment, errors: &mut Vec<String>) {
    if segment.id.is_empty() {
        errors.push("Segment missing id".to_string());
    }
    if segment.width <= 0.0 {
        errors.push(format!(
            "Segment {}: invalid width ({})",
            segment.id, segment.width
        ));
    }
    if !finite(segment.start) {
        errors.push(format!("Segment {}: invalid start coordinates", segment.id));
    }
    if !finite(segment.end) {
        errors.push(format!("Segment {}: invalid end coordinates", segment.id));
    }
}

/// Check a track's structural invariants
///
/// Verifies identity fields, segment sanity, loop closure (consecutive
/// segments connect and the last connects back to the first), checkpoint
/// sanity, and that checkpoint orders form the contiguous run starting at
/// [`CHECKPOINT_ORDER_BASE`] with no gaps or duplicates.
pub fn validate(track: &Track) -> ValidationReport {
    let mut errors = Vec::new();
    log::debug!("Validating track: {} ({})", track.name, track.id);

    if track.id.is_empty() || track.name.is_empty() {
        errors.push("Track missing required properties (id or name)".to_string());
    }

    if track.segments.is_empty() {
        errors.push("Track has no segments".to_string());
    } else {
        for (index, segment) in track.segments.iter().enumerate() {
            validate_segment(segment, &mut errors);

            if index + 1 < track.segments.len() {
                let next = &track.segments[index + 1];
                if !segments_connect(segment, next) {
                    errors.push(format!(
                        "Segment {} does not connect to segment {}",
                        segment.id, next.id
                    ));
                }
            }
        }

        let first = &track.segments[0];
        let last = &track.segments[track.segments.len() - 1];
        if !segments_connect(last, first) {
            errors.push("Track is not closed (last segment does not connect to first)".to_string());
        }
    }

    if track.checkpoints.is_empty() {
        errors.push("Track has no checkpoints".to_string());
    } else {
        for checkpoint in &track.checkpoints {
            if checkpoint.id.is_empty() {
                errors.push("Checkpoint missing id".to_string());
            }
            if !finite(checkpoint.position) {
                errors.push(format!("Checkpoint {}: invalid position", checkpoint.id));
            }
        }

        let mut orders: Vec<u32> = track.checkpoints.iter().map(|cp| cp.order).collect();
        orders.sort_unstable();
        let contiguous = orders
            .iter()
            .enumerate()
            .all(|(i, &order)| order == CHECKPOINT_ORDER_BASE + i as u32);
        if !contiguous {
            errors.push("Checkpoint order sequence is not continuous".to_string());
        }
    }

    if errors.is_empty() {
        log::debug!("Track {} validated successfully", track.name);
    } else {
        log::warn!(
            "Track validation failed for {}: {} error(s)",
            track.name,
            errors.len()
        );
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Validate and record the result on the track itself
///
/// A failing track becomes `Invalid` and carries the error list; a passing
/// track that was previously tagged `Invalid` is restored to `Custom`.
pub fn classify(track: &mut Track) -> ValidationReport {
    let report = validate(track);
    if report.is_valid {
        track.validation_errors = None;
        if track.classification == Classification::Invalid {
            track.classification = Classification::Custom;
        }
    } else {
        track.classification = Classification::Invalid;
        track.validation_errors = Some(report.errors.clone());
    }
    report
}
