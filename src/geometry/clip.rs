//! Line and polyline clipping against rectangles and circles

use super::{Path, Point, Rect};
use crate::constants::geometry::EPSILON;

const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const BOTTOM: u8 = 4;
const TOP: u8 = 8;

fn outcode(p: Point, rect: &Rect) -> u8 {
    let mut code = INSIDE;
    if p.x < rect.min.x {
        code |= LEFT;
    } else if p.x > rect.max.x {
        code |= RIGHT;
    }
    if p.y < rect.min.y {
        code |= BOTTOM;
    } else if p.y > rect.max.y {
        code |= TOP;
    }
    code
}

/// Cohen-Sutherland clipping of segment `a`-`b` to `rect`.
///
/// Endpoints that already lie inside are returned unchanged, bit for bit.
pub fn clip_line_to_rect(a: Point, b: Point, rect: &Rect) -> Option<(Point, Point)> {
    let (mut p, mut q) = (a, b);
    let mut code_p = outcode(p, rect);
    let mut code_q = outcode(q, rect);

    // each pass moves one endpoint onto a boundary, so four passes suffice
    for _ in 0..8 {
        if code_p | code_q == INSIDE {
            return Some((p, q));
        }
        if code_p & code_q != INSIDE {
            return None;
        }
        let code_out = if code_p != INSIDE { code_p } else { code_q };
        let d = q - p;
        let moved = if code_out & TOP != 0 {
            Point::new(p.x + d.x * (rect.max.y - p.y) / d.y, rect.max.y)
        } else if code_out & BOTTOM != 0 {
            Point::new(p.x + d.x * (rect.min.y - p.y) / d.y, rect.min.y)
        } else if code_out & RIGHT != 0 {
            Point::new(rect.max.x, p.y + d.y * (rect.max.x - p.x) / d.x)
        } else {
            Point::new(rect.min.x, p.y + d.y * (rect.min.x - p.x) / d.x)
        };
        if code_out == code_p {
            p = moved;
            code_p = outcode(p, rect);
        } else {
            q = moved;
            code_q = outcode(q, rect);
        }
    }
    None
}

/// Clips segment `a`-`b` to the disc at `center` with `radius`
pub fn clip_line_to_circle(a: Point, b: Point, center: Point, radius: f64) -> Option<(Point, Point)> {
    let r_sq = radius * radius;
    let inside = |p: Point| p.distance_squared(center) <= r_sq;
    if inside(a) && inside(b) {
        return Some((a, b));
    }
    let d = b - a;
    let qa = d.length_squared();
    if qa < EPSILON * EPSILON {
        return None;
    }
    let f = a - center;
    let qb = 2.0 * f.dot(d);
    let qc = f.length_squared() - r_sq;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let t0 = ((-qb - root) / (2.0 * qa)).max(0.0);
    let t1 = ((-qb + root) / (2.0 * qa)).min(1.0);
    if t0 >= t1 {
        return None;
    }
    let p = if inside(a) { a } else { a + d * t0 };
    let q = if inside(b) { b } else { a + d * t1 };
    Some((p, q))
}

/// Intersection point of segments `a`-`b` and `c`-`d`, if any.
///
/// Parallel and degenerate segments report no intersection.
pub fn segment_intersection(a: Point, b: Point, c: Point, d: Point) -> Option<Point> {
    let r = b - a;
    let s = d - c;
    let denom = r.perp_dot(s);
    if denom.abs() < EPSILON {
        return None;
    }
    let t = (c - a).perp_dot(s) / denom;
    let u = (c - a).perp_dot(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a + r * t)
    } else {
        None
    }
}

/// Clips a polyline to a rectangle, splitting it wherever it leaves the region
pub fn clip_path_to_rect(path: &Path, rect: &Rect) -> Vec<Path> {
    clip_path_with(path, |a, b| clip_line_to_rect(a, b, rect))
}

/// Clips a polyline to a disc, splitting it wherever it leaves the region
pub fn clip_path_to_circle(path: &Path, center: Point, radius: f64) -> Vec<Path> {
    clip_path_with(path, |a, b| clip_line_to_circle(a, b, center, radius))
}

fn clip_path_with<F>(path: &Path, clip: F) -> Vec<Path>
where
    F: Fn(Point, Point) -> Option<(Point, Point)>,
{
    if path.is_degenerate() {
        return Vec::new();
    }
    let segments = path.segments();
    let untouched = segments
        .iter()
        .all(|&(a, b)| clip(a, b) == Some((a, b)));
    if untouched {
        return vec![path.clone()];
    }

    let mut pieces: Vec<Vec<Point>> = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    for &(a, b) in &segments {
        match clip(a, b) {
            Some((p, q)) => {
                if current.last() != Some(&p) {
                    flush(&mut current, &mut pieces);
                    current.push(p);
                }
                current.push(q);
                if q != b {
                    flush(&mut current, &mut pieces);
                }
            }
            None => flush(&mut current, &mut pieces),
        }
    }
    flush(&mut current, &mut pieces);

    // a closed path that starts inside wraps around: stitch the last piece onto the first
    if path.closed && pieces.len() >= 2 {
        let joins = match (pieces.last().and_then(|l| l.last()), pieces[0].first()) {
            (Some(tail), Some(head)) => tail == head,
            _ => false,
        };
        if joins {
            if let Some(mut last) = pieces.pop() {
                last.extend(pieces[0].iter().skip(1));
                pieces[0] = last;
            }
        }
    }

    pieces.into_iter().map(Path::new).collect()
}

fn flush(current: &mut Vec<Point>, pieces: &mut Vec<Vec<Point>>) {
    if current.len() >= 2 {
        pieces.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_rect() -> Rect {
        Rect::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0))
    }

    #[test]
    fn test_rect_clip_inside_untouched() {
        let a = Point::new(1.0, 1.0);
        let b = Point::new(9.0, 9.0);
        assert_eq!(clip_line_to_rect(a, b, &unit_rect()), Some((a, b)));
    }

    #[test]
    fn test_rect_clip_crossing() {
        let (p, q) =
            clip_line_to_rect(Point::new(-5.0, 5.0), Point::new(15.0, 5.0), &unit_rect()).unwrap();
        assert_eq!(p, Point::new(0.0, 5.0));
        assert_eq!(q, Point::new(10.0, 5.0));
    }

    #[test]
    fn test_rect_clip_rejects_outside() {
        assert!(clip_line_to_rect(Point::new(-5.0, -5.0), Point::new(-1.0, 20.0), &unit_rect()).is_none());
        assert!(clip_line_to_rect(Point::new(11.0, 0.0), Point::new(20.0, 10.0), &unit_rect()).is_none());
    }

    #[test]
    fn test_circle_clip() {
        let center = Point::new(0.0, 0.0);
        let (p, q) = clip_line_to_circle(Point::new(-10.0, 0.0), Point::new(10.0, 0.0), center, 5.0).unwrap();
        assert!((p.x + 5.0).abs() < 1e-9);
        assert!((q.x - 5.0).abs() < 1e-9);
        assert!(clip_line_to_circle(Point::new(-10.0, 6.0), Point::new(10.0, 6.0), center, 5.0).is_none());
        // degenerate segment outside
        assert!(clip_line_to_circle(Point::new(9.0, 9.0), Point::new(9.0, 9.0), center, 5.0).is_none());
    }

    #[test]
    fn test_segment_intersection() {
        let hit = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        );
        assert_eq!(hit, Some(Point::new(5.0, 5.0)));
        // parallel
        assert!(segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(10.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn test_path_split_by_rect() {
        // zig-zag leaving and re-entering the rectangle
        let path = Path::from_coords(&[(2.0, 5.0), (5.0, 15.0), (8.0, 5.0)]);
        let pieces = clip_path_to_rect(&path, &unit_rect());
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].start(), Some(Point::new(2.0, 5.0)));
        assert!((pieces[0].end().unwrap().y - 10.0).abs() < 1e-9);
        assert_eq!(pieces[1].end(), Some(Point::new(8.0, 5.0)));
    }

    #[test]
    fn test_closed_path_wraps_into_one_piece() {
        // square whose top edge pokes out of the clip rect
        let path = Path::closed(vec![
            Point::new(2.0, 2.0),
            Point::new(8.0, 2.0),
            Point::new(8.0, 12.0),
            Point::new(2.0, 12.0),
        ]);
        let pieces = clip_path_to_rect(&path, &unit_rect());
        assert_eq!(pieces.len(), 1);
        assert!(!pieces[0].closed);
        assert_eq!(pieces[0].len(), 4);
    }

    #[test]
    fn test_fully_inside_path_kept() {
        let path = Path::closed(vec![
            Point::new(2.0, 2.0),
            Point::new(8.0, 2.0),
            Point::new(8.0, 8.0),
        ]);
        let pieces = clip_path_to_rect(&path, &unit_rect());
        assert_eq!(pieces, vec![path]);
    }
}
