//! Curve flattening: Bézier segments and elliptical arcs to polylines
//!
//! All functions append to `out` and never emit the start point, so consecutive segments
//! can share one buffer.

use std::f64::consts::{PI, TAU};

use super::{lerp_point, segment_distance, Point};
use crate::constants::geometry::{
    ARC_STEP_RADIANS, EPSILON, MAX_ARC_SEGMENTS, MAX_FLATTEN_DEPTH, MIN_FLATTEN_TOLERANCE,
};

/// Flattens a cubic Bézier by recursive de Casteljau subdivision.
///
/// A piece is emitted as a straight chord once both inner control points lie within
/// `tolerance` of it.
pub fn flatten_cubic(p0: Point, p1: Point, p2: Point, p3: Point, tolerance: f64, out: &mut Vec<Point>) {
    let tolerance = tolerance.max(MIN_FLATTEN_TOLERANCE);
    cubic_recursive(p0, p1, p2, p3, tolerance, 0, out);
}

fn cubic_recursive(
    p0: Point,
    p1: Point,
    p2: Point,
    p3: Point,
    tolerance: f64,
    depth: u32,
    out: &mut Vec<Point>,
) {
    let flat = segment_distance(p1, p0, p3) <= tolerance && segment_distance(p2, p0, p3) <= tolerance;
    if flat || depth >= MAX_FLATTEN_DEPTH {
        out.push(p3);
        return;
    }
    let p01 = lerp_point(p0, p1, 0.5);
    let p12 = lerp_point(p1, p2, 0.5);
    let p23 = lerp_point(p2, p3, 0.5);
    let p012 = lerp_point(p01, p12, 0.5);
    let p123 = lerp_point(p12, p23, 0.5);
    let mid = lerp_point(p012, p123, 0.5);
    cubic_recursive(p0, p01, p012, mid, tolerance, depth + 1, out);
    cubic_recursive(mid, p123, p23, p3, tolerance, depth + 1, out);
}

/// Flattens a quadratic Bézier by recursive de Casteljau subdivision
pub fn flatten_quadratic(p0: Point, p1: Point, p2: Point, tolerance: f64, out: &mut Vec<Point>) {
    let tolerance = tolerance.max(MIN_FLATTEN_TOLERANCE);
    quadratic_recursive(p0, p1, p2, tolerance, 0, out);
}

fn quadratic_recursive(p0: Point, p1: Point, p2: Point, tolerance: f64, depth: u32, out: &mut Vec<Point>) {
    if segment_distance(p1, p0, p2) <= tolerance || depth >= MAX_FLATTEN_DEPTH {
        out.push(p2);
        return;
    }
    let p01 = lerp_point(p0, p1, 0.5);
    let p12 = lerp_point(p1, p2, 0.5);
    let mid = lerp_point(p01, p12, 0.5);
    quadratic_recursive(p0, p01, mid, tolerance, depth + 1, out);
    quadratic_recursive(mid, p12, p2, tolerance, depth + 1, out);
}

/// Flattens an SVG elliptical arc from `from` to `to`.
///
/// Uses the endpoint-to-centre conversion and samples a segment count proportional to the
/// swept angle. Out-of-range radii are scaled up; zero radii degrade to a straight line.
#[allow(clippy::too_many_arguments)]
pub fn flatten_arc(
    from: Point,
    rx: f64,
    ry: f64,
    x_axis_rotation_deg: f64,
    large_arc: bool,
    sweep: bool,
    to: Point,
    out: &mut Vec<Point>,
) {
    if from.distance(to) < EPSILON {
        return;
    }
    let mut rx = rx.abs();
    let mut ry = ry.abs();
    if rx < EPSILON || ry < EPSILON {
        out.push(to);
        return;
    }

    let phi = x_axis_rotation_deg.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let half = (from - to) * 0.5;
    let x1p = cos_phi * half.x + sin_phi * half.y;
    let y1p = -sin_phi * half.x + cos_phi * half.y;

    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    let rx2 = rx * rx;
    let ry2 = ry * ry;
    let num = rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p;
    let den = rx2 * y1p * y1p + ry2 * x1p * x1p;
    let mut coef = if den.abs() < EPSILON { 0.0 } else { (num / den).max(0.0).sqrt() };
    if large_arc == sweep {
        coef = -coef;
    }
    let cxp = coef * rx * y1p / ry;
    let cyp = -coef * ry * x1p / rx;
    let mid = (from + to) * 0.5;
    let cx = cos_phi * cxp - sin_phi * cyp + mid.x;
    let cy = sin_phi * cxp + cos_phi * cyp + mid.y;

    let start_vec = Point::new((x1p - cxp) / rx, (y1p - cyp) / ry);
    let end_vec = Point::new((-x1p - cxp) / rx, (-y1p - cyp) / ry);
    let theta1 = vector_angle(Point::X, start_vec);
    let mut delta = vector_angle(start_vec, end_vec);
    if !sweep && delta > 0.0 {
        delta -= TAU;
    } else if sweep && delta < 0.0 {
        delta += TAU;
    }

    let segments = ((delta.abs() / ARC_STEP_RADIANS).ceil() as usize).clamp(1, MAX_ARC_SEGMENTS);
    for i in 1..segments {
        let theta = theta1 + delta * (i as f64 / segments as f64);
        let (sin_t, cos_t) = theta.sin_cos();
        out.push(Point::new(
            cx + rx * cos_t * cos_phi - ry * sin_t * sin_phi,
            cy + rx * cos_t * sin_phi + ry * sin_t * cos_phi,
        ));
    }
    out.push(to);
}

/// Signed angle from `u` to `v` in `(-PI, PI]`
fn vector_angle(u: Point, v: Point) -> f64 {
    let angle = u.perp_dot(v).atan2(u.dot(v));
    if angle <= -PI {
        angle + TAU
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic_at(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
        let mt = 1.0 - t;
        p0 * (mt * mt * mt) + p1 * (3.0 * mt * mt * t) + p2 * (3.0 * mt * t * t) + p3 * (t * t * t)
    }

    #[test]
    fn test_straight_cubic_is_single_segment() {
        let mut out = Vec::new();
        flatten_cubic(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(3.0, 0.0),
            0.1,
            &mut out,
        );
        assert_eq!(out, vec![Point::new(3.0, 0.0)]);
    }

    #[test]
    fn test_cubic_stays_within_tolerance() {
        let (p0, p1, p2, p3) = (
            Point::new(0.0, 0.0),
            Point::new(0.0, 50.0),
            Point::new(100.0, 50.0),
            Point::new(100.0, 0.0),
        );
        let tolerance = 0.2;
        let mut polyline = vec![p0];
        flatten_cubic(p0, p1, p2, p3, tolerance, &mut polyline);
        assert!(polyline.len() > 4);
        assert_eq!(*polyline.last().unwrap(), p3);

        for i in 0..=200 {
            let sample = cubic_at(p0, p1, p2, p3, i as f64 / 200.0);
            let nearest = polyline
                .windows(2)
                .map(|w| segment_distance(sample, w[0], w[1]))
                .fold(f64::INFINITY, f64::min);
            assert!(nearest <= tolerance + 1e-9, "sample {} off by {}", i, nearest);
        }
    }

    #[test]
    fn test_quadratic_ends_at_endpoint() {
        let mut out = Vec::new();
        flatten_quadratic(Point::new(0.0, 0.0), Point::new(5.0, 10.0), Point::new(10.0, 0.0), 0.05, &mut out);
        assert!(out.len() > 2);
        assert_eq!(*out.last().unwrap(), Point::new(10.0, 0.0));
    }

    #[test]
    fn test_half_circle_arc() {
        let mut out = Vec::new();
        let from = Point::new(0.0, 0.0);
        let to = Point::new(20.0, 0.0);
        flatten_arc(from, 10.0, 10.0, 0.0, false, true, to, &mut out);
        assert_eq!(*out.last().unwrap(), to);
        let center = Point::new(10.0, 0.0);
        for p in &out {
            assert!((p.distance(center) - 10.0).abs() < 1e-6);
        }
        // sweep=true from (0,0) to (20,0) bulges to negative y in y-down space
        assert!(out[out.len() / 2].y < 0.0);
        // 180 degrees at 5 degrees per segment
        assert_eq!(out.len(), 36);
    }

    #[test]
    fn test_arc_radius_scaled_up() {
        let mut out = Vec::new();
        flatten_arc(Point::new(0.0, 0.0), 1.0, 1.0, 0.0, false, true, Point::new(10.0, 0.0), &mut out);
        let center = Point::new(5.0, 0.0);
        for p in &out {
            assert!((p.distance(center) - 5.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_degenerate_arcs() {
        let mut out = Vec::new();
        flatten_arc(Point::new(1.0, 1.0), 5.0, 5.0, 0.0, false, false, Point::new(1.0, 1.0), &mut out);
        assert!(out.is_empty());
        flatten_arc(Point::new(0.0, 0.0), 0.0, 5.0, 0.0, false, false, Point::new(3.0, 0.0), &mut out);
        assert_eq!(out, vec![Point::new(3.0, 0.0)]);
    }
}
