//! Basic SVG shapes converted to polylines in element-local space

use std::collections::HashMap;

use super::path_data::{flatten_commands, PathCommand};
use super::transform::parse_number_list;
use crate::constants::geometry::EPSILON;
use crate::geometry::{Path, Point};

pub(crate) type Attributes = HashMap<String, String>;

/// Leading number of an attribute, ignoring a trailing `px`-style unit
pub(crate) fn number_attr(attrs: &Attributes, name: &str) -> Option<f64> {
    let value = attrs.get(name)?;
    let mut cursor = super::path_data::Cursor::new(value.trim());
    cursor.number()
}

fn number_or_zero(attrs: &Attributes, name: &str) -> f64 {
    number_attr(attrs, name).unwrap_or(0.0)
}

pub(crate) fn rect(attrs: &Attributes, tolerance: f64) -> Vec<Path> {
    let x = number_or_zero(attrs, "x");
    let y = number_or_zero(attrs, "y");
    let w = number_or_zero(attrs, "width");
    let h = number_or_zero(attrs, "height");
    if w <= 0.0 || h <= 0.0 {
        return Vec::new();
    }

    // a missing radius copies the other one
    let (rx, ry) = match (number_attr(attrs, "rx"), number_attr(attrs, "ry")) {
        (Some(rx), Some(ry)) => (rx, ry),
        (Some(r), None) | (None, Some(r)) => (r, r),
        (None, None) => (0.0, 0.0),
    };
    let rx = rx.max(0.0).min(w / 2.0);
    let ry = ry.max(0.0).min(h / 2.0);

    if rx <= EPSILON || ry <= EPSILON {
        return vec![Path::closed(vec![
            Point::new(x, y),
            Point::new(x + w, y),
            Point::new(x + w, y + h),
            Point::new(x, y + h),
        ])];
    }

    let corner = |to: Point| PathCommand::ArcTo {
        rx,
        ry,
        rotation: 0.0,
        large_arc: false,
        sweep: true,
        to,
    };
    let mut commands = vec![PathCommand::MoveTo(Point::new(x + rx, y))];
    let edge_then_corner = |edge_end: Point, corner_end: Point, commands: &mut Vec<PathCommand>| {
        let from = match commands.last() {
            Some(PathCommand::MoveTo(p)) | Some(PathCommand::ArcTo { to: p, .. }) => *p,
            _ => edge_end,
        };
        if from.distance(edge_end) > EPSILON {
            commands.push(PathCommand::LineTo(edge_end));
        }
        commands.push(corner(corner_end));
    };
    edge_then_corner(Point::new(x + w - rx, y), Point::new(x + w, y + ry), &mut commands);
    edge_then_corner(Point::new(x + w, y + h - ry), Point::new(x + w - rx, y + h), &mut commands);
    edge_then_corner(Point::new(x + rx, y + h), Point::new(x, y + h - ry), &mut commands);
    edge_then_corner(Point::new(x, y + ry), Point::new(x + rx, y), &mut commands);
    commands.push(PathCommand::Close);
    flatten_commands(&commands, tolerance)
}

pub(crate) fn circle(attrs: &Attributes, tolerance: f64) -> Vec<Path> {
    let r = number_or_zero(attrs, "r");
    ellipse_path(number_or_zero(attrs, "cx"), number_or_zero(attrs, "cy"), r, r, tolerance)
}

pub(crate) fn ellipse(attrs: &Attributes, tolerance: f64) -> Vec<Path> {
    ellipse_path(
        number_or_zero(attrs, "cx"),
        number_or_zero(attrs, "cy"),
        number_or_zero(attrs, "rx"),
        number_or_zero(attrs, "ry"),
        tolerance,
    )
}

fn ellipse_path(cx: f64, cy: f64, rx: f64, ry: f64, tolerance: f64) -> Vec<Path> {
    if rx <= 0.0 || ry <= 0.0 {
        return Vec::new();
    }
    let half = |to: Point| PathCommand::ArcTo {
        rx,
        ry,
        rotation: 0.0,
        large_arc: false,
        sweep: true,
        to,
    };
    let right = Point::new(cx + rx, cy);
    let left = Point::new(cx - rx, cy);
    let commands = [
        PathCommand::MoveTo(right),
        half(left),
        half(right),
        PathCommand::Close,
    ];
    flatten_commands(&commands, tolerance)
}

pub(crate) fn line(attrs: &Attributes) -> Vec<Path> {
    let a = Point::new(number_or_zero(attrs, "x1"), number_or_zero(attrs, "y1"));
    let b = Point::new(number_or_zero(attrs, "x2"), number_or_zero(attrs, "y2"));
    vec![Path::new(vec![a, b])]
}

pub(crate) fn polyline(attrs: &Attributes, closed: bool) -> Vec<Path> {
    let numbers = attrs
        .get("points")
        .map(|points| parse_number_list(points))
        .unwrap_or_default();
    let mut points: Vec<Point> = numbers
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect();
    if closed && points.len() > 2 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 2 {
        return Vec::new();
    }
    vec![Path { points, closed }]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_plain_rect() {
        let paths = rect(&attrs(&[("x", "1"), ("y", "2"), ("width", "10px"), ("height", "5")]), 0.1);
        assert_eq!(paths.len(), 1);
        assert!(paths[0].closed);
        assert_eq!(
            paths[0].points,
            vec![
                Point::new(1.0, 2.0),
                Point::new(11.0, 2.0),
                Point::new(11.0, 7.0),
                Point::new(1.0, 7.0)
            ]
        );
    }

    #[test]
    fn test_rounded_rect_stays_inside_bounds() {
        let paths = rect(&attrs(&[("width", "20"), ("height", "10"), ("rx", "3")]), 0.05);
        assert_eq!(paths.len(), 1);
        let path = &paths[0];
        assert!(path.closed);
        assert!(path.len() > 8);
        for p in &path.points {
            assert!(p.x >= -1e-9 && p.x <= 20.0 + 1e-9);
            assert!(p.y >= -1e-9 && p.y <= 10.0 + 1e-9);
        }
        // corners are cut
        assert!(!path.points.contains(&Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_degenerate_shapes_produce_nothing() {
        assert!(rect(&attrs(&[("width", "0"), ("height", "5")]), 0.1).is_empty());
        assert!(circle(&attrs(&[("r", "0")]), 0.1).is_empty());
        assert!(ellipse(&attrs(&[("rx", "4")]), 0.1).is_empty());
        assert!(polyline(&attrs(&[("points", "1,1")]), false).is_empty());
    }

    #[test]
    fn test_circle_is_closed_ring() {
        let paths = circle(&attrs(&[("cx", "5"), ("cy", "5"), ("r", "2")]), 0.1);
        assert_eq!(paths.len(), 1);
        assert!(paths[0].closed);
        assert_eq!(paths[0].len(), 72);
        for p in &paths[0].points {
            assert!((p.distance(Point::new(5.0, 5.0)) - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_polygon_and_polyline() {
        let open = polyline(&attrs(&[("points", "0,0 10,0 10,10 3")]), false);
        assert_eq!(open[0].len(), 3);
        assert!(!open[0].closed);

        let closed = polyline(&attrs(&[("points", "0,0 10,0 10,10 0,0")]), true);
        assert_eq!(closed[0].len(), 3);
        assert!(closed[0].closed);
    }
}
