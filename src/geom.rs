//! Curve and distance math for track geometry
//!
//! Pure functions, no state. The builder uses the spline helpers to turn
//! authored control points into a drivable loop; the simulation uses the
//! segment-distance query for off-track detection.

use glam::Vec2;

/// Evaluate a Catmull-Rom spline through `p1`..`p2` at `t` in [0, 1]
///
/// The curve passes through all control points, which is what makes it the
/// right fit for smoothing a polyline the author has already placed.
pub fn catmull_rom(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let t2 = t * t;
    let t3 = t2 * t;

    let b0 = 0.5 * (-t3 + 2.0 * t2 - t);
    let b1 = 0.5 * (3.0 * t3 - 5.0 * t2 + 2.0);
    let b2 = 0.5 * (-3.0 * t3 + 4.0 * t2 + t);
    let b3 = 0.5 * (t3 - t2);

    p0 * b0 + p1 * b1 + p2 * b2 + p3 * b3
}

/// Smooth a closed polyline with Catmull-Rom splines
///
/// Neighbor indices wrap so the smoothed loop has no seam: the span leaving
/// the first point borrows the second-to-last point as `p0`, and the span
/// arriving at the last point borrows the second point as `p3`. Returns the
/// input unchanged when there are fewer than 4 points.
pub fn smooth_path(points: &[Vec2], segments_per_span: usize) -> Vec<Vec2> {
    if points.len() < 4 {
        return points.to_vec();
    }

    let n = points.len();
    let mut smoothed = Vec::with_capacity((n - 1) * segments_per_span + 1);

    for i in 0..n - 1 {
        let p0 = if i == 0 { points[n - 2] } else { points[i - 1] };
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = if i == n - 2 { points[1] } else { points[i + 2] };

        smoothed.push(p1);
        for j in 1..segments_per_span {
            let t = j as f32 / segments_per_span as f32;
            smoothed.push(catmull_rom(p0, p1, p2, p3, t));
        }
    }

    smoothed.push(points[n - 1]);
    smoothed
}

/// Evaluate a cubic Bezier curve at `t` in [0, 1]
///
/// Used by the authoring preview to draw handle-shaped spans.
pub fn bezier_cubic(p0: Vec2, c1: Vec2, c2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    let u2 = u * u;
    let t2 = t * t;

    p0 * (u2 * u) + c1 * (3.0 * u2 * t) + c2 * (3.0 * u * t2) + p3 * (t2 * t)
}

/// Shortest distance from a point to a line segment
///
/// Projects onto the segment and clamps; when the projection parameter falls
/// outside [0, 1] the distance to the nearer endpoint is returned. Degenerate
/// segments (zero length) fall back to the distance to the start point.
pub fn distance_point_to_segment(point: Vec2, seg_start: Vec2, seg_end: Vec2) -> f32 {
    let seg = seg_end - seg_start;
    let to_point = point - seg_start;

    let len_sq = seg.length_squared();
    if len_sq == 0.0 {
        return to_point.length();
    }

    let t = (to_point.dot(seg) / len_sq).clamp(0.0, 1.0);
    let closest = seg_start + seg * t;
    (point - closest).length()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catmull_rom_endpoints() {
        let p0 = Vec2::new(-1.0, 0.0);
        let p1 = Vec2::new(0.0, 0.0);
        let p2 = Vec2::new(1.0, 1.0);
        let p3 = Vec2::new(2.0, 1.0);

        // The spline interpolates p1 at t=0 and p2 at t=1
        assert!(catmull_rom(p0, p1, p2, p3, 0.0).distance(p1) < 1e-6);
        assert!(catmull_rom(p0, p1, p2, p3, 1.0).distance(p2) < 1e-6);
    }

    #[test]
    fn test_smooth_path_passthrough_below_four_points() {
        let points = vec![Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)];
        assert_eq!(smooth_path(&points, 8), points);
    }

    #[test]
    fn test_smooth_path_preserves_endpoints() {
        let points = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 100.0),
            Vec2::new(0.0, 100.0),
            Vec2::new(0.0, 0.0),
        ];
        let smoothed = smooth_path(&points, 10);

        assert_eq!(smoothed[0], points[0]);
        assert_eq!(*smoothed.last().unwrap(), *points.last().unwrap());
        assert_eq!(smoothed.len(), (points.len() - 1) * 10 + 1);
    }

    #[test]
    fn test_bezier_cubic_endpoints() {
        let p0 = Vec2::new(0.0, 0.0);
        let c1 = Vec2::new(10.0, 20.0);
        let c2 = Vec2::new(30.0, 20.0);
        let p3 = Vec2::new(40.0, 0.0);

        assert!(bezier_cubic(p0, c1, c2, p3, 0.0).distance(p0) < 1e-6);
        assert!(bezier_cubic(p0, c1, c2, p3, 1.0).distance(p3) < 1e-6);
    }

    #[test]
    fn test_distance_on_segment_is_zero() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert!(distance_point_to_segment(Vec2::new(5.0, 0.0), a, b) < 1e-6);
    }

    #[test]
    fn test_distance_beyond_endpoint() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        // Projection falls past b; distance is straight-line to b
        let d = distance_point_to_segment(Vec2::new(13.0, 4.0), a, b);
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_distance_degenerate_segment() {
        let a = Vec2::new(3.0, 4.0);
        let d = distance_point_to_segment(Vec2::ZERO, a, a);
        assert!((d - 5.0).abs() < 1e-6);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn distance_symmetric_under_endpoint_swap(
                px in -500.0f32..500.0, py in -500.0f32..500.0,
                ax in -500.0f32..500.0, ay in -500.0f32..500.0,
                bx in -500.0f32..500.0, by in -500.0f32..500.0,
            ) {
                let p = Vec2::new(px, py);
                let a = Vec2::new(ax, ay);
                let b = Vec2::new(bx, by);
                let d1 = distance_point_to_segment(p, a, b);
                let d2 = distance_point_to_segment(p, b, a);
                prop_assert!((d1 - d2).abs() < 1e-3);
            }
        }
    }
}
