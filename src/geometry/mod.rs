//! Geometry kernel: points, paths, layers and the transforms applied to them
//!
//! All coordinates are millimetres in document space.

pub mod clip;
pub mod flatten;
pub mod noise;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::constants::geometry::EPSILON;
use crate::error::ProjectError;

pub use clip::{
    clip_line_to_circle, clip_line_to_rect, clip_path_to_circle, clip_path_to_rect,
    segment_intersection,
};
pub use flatten::{flatten_arc, flatten_cubic, flatten_quadratic};
pub use noise::{fbm2, noise2};

/// A 2D coordinate in millimetres
pub type Point = DVec2;

/// Ordered polyline with an optional implicit closing segment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub points: Vec<Point>,
    #[serde(default)]
    pub closed: bool,
}

impl Path {
    /// Creates an open path
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    /// Creates a closed path; the closing segment back to the first point is implicit
    pub fn closed(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    /// Creates an open path from `(x, y)` tuples
    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Self::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A path with fewer than two points draws nothing
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 2
    }

    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Where the pen lifts after drawing this path
    pub fn exit_point(&self) -> Option<Point> {
        if self.closed {
            self.start()
        } else {
            self.end()
        }
    }

    /// Same path walked in the opposite direction
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Self {
            points,
            closed: self.closed,
        }
    }

    /// Pen-down length, including the closing segment of closed paths
    pub fn length(&self) -> f64 {
        let open: f64 = self
            .points
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum();
        match (self.closed, self.start(), self.end()) {
            (true, Some(first), Some(last)) if self.points.len() >= 2 => open + last.distance(first),
            _ => open,
        }
    }

    /// Consecutive segments, including the closing one for closed paths
    pub fn segments(&self) -> Vec<(Point, Point)> {
        let mut segments: Vec<(Point, Point)> =
            self.points.windows(2).map(|pair| (pair[0], pair[1])).collect();
        if self.closed && self.points.len() >= 2 {
            if let (Some(first), Some(last)) = (self.start(), self.end()) {
                segments.push((last, first));
            }
        }
        segments
    }

    pub fn translate(&mut self, offset: Point) {
        for point in &mut self.points {
            *point += offset;
        }
    }

    pub fn rotate(&mut self, angle: f64, center: Point) {
        for point in &mut self.points {
            *point = rotate_point(*point, angle, center);
        }
    }

    pub fn scale(&mut self, sx: f64, sy: f64, center: Point) {
        for point in &mut self.points {
            *point = scale_point(*point, sx, sy, center);
        }
    }

    pub fn bounds(&self) -> Option<Rect> {
        Rect::bounding(&self.points)
    }
}

/// Paths produced by one generator or modifier invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,
    pub paths: Vec<Path>,
}

impl Layer {
    pub fn new(id: impl Into<String>, paths: Vec<Path>) -> Self {
        Self {
            id: id.into(),
            paths,
        }
    }

    pub fn point_count(&self) -> usize {
        self.paths.iter().map(Path::len).sum()
    }
}

/// A layer bound to a plotter pen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputLayer {
    pub id: String,
    pub name: String,
    pub color: String,
    pub pen: u32,
    pub enabled: bool,
    pub paths: Vec<Path>,
}

impl OutputLayer {
    pub fn new(id: impl Into<String>, pen: u32) -> Self {
        Self {
            id: id.into(),
            name: format!("Pen {}", pen),
            color: crate::constants::output::DEFAULT_COLOR.to_string(),
            pen,
            enabled: true,
            paths: Vec::new(),
        }
    }

    pub fn with_paths(mut self, paths: Vec<Path>) -> Self {
        self.paths = paths;
        self
    }
}

/// Document size in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSettings {
    pub width: f64,
    pub height: f64,
}

impl CanvasSettings {
    /// Both dimensions must be positive and finite
    pub fn new(width: f64, height: f64) -> Result<Self, ProjectError> {
        let canvas = Self { width, height };
        canvas.validate()?;
        Ok(canvas)
    }

    pub fn validate(&self) -> Result<(), ProjectError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(self.width) && valid(self.height) {
            Ok(())
        } else {
            Err(ProjectError::InvalidCanvas {
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(Point::ZERO, Point::new(self.width, self.height))
    }
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: crate::constants::canvas::DEFAULT_WIDTH_MM,
            height: crate::constants::canvas::DEFAULT_HEIGHT_MM,
        }
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub fn new(min: Point, max: Point) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Smallest rectangle containing every point
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Some(Self { min, max })
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Shrinks every side by `margin`; collapses to the centre instead of inverting
    pub fn inset(&self, margin: f64) -> Self {
        let c = self.center();
        let min = (self.min + Point::splat(margin)).min(c);
        let max = (self.max - Point::splat(margin)).max(c);
        Self { min, max }
    }

    pub fn union(&self, other: &Rect) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub fn lerp_point(a: Point, b: Point, t: f64) -> Point {
    a + (b - a) * t
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Rotates `p` by `angle` radians about `center`
pub fn rotate_point(p: Point, angle: f64, center: Point) -> Point {
    let (sin, cos) = angle.sin_cos();
    let d = p - center;
    Point::new(
        center.x + d.x * cos - d.y * sin,
        center.y + d.x * sin + d.y * cos,
    )
}

/// Scales `p` about `center`, independently per axis
pub fn scale_point(p: Point, sx: f64, sy: f64, center: Point) -> Point {
    Point::new(
        center.x + (p.x - center.x) * sx,
        center.y + (p.y - center.y) * sy,
    )
}

/// Distance from `p` to the infinite line through `a` and `b`.
///
/// Falls back to the distance to `a` when the line is degenerate.
pub fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let d = b - a;
    let len = d.length();
    if len < EPSILON {
        return p.distance(a);
    }
    (d.perp_dot(p - a)).abs() / len
}

/// Distance from `p` to the segment `a`-`b`
pub fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let d = b - a;
    let len_sq = d.length_squared();
    if len_sq < EPSILON * EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(d) / len_sq).clamp(0.0, 1.0);
    p.distance(a + d * t)
}

/// Resamples a path so consecutive points are at most `spacing` apart
pub fn resample(path: &Path, spacing: f64) -> Path {
    if spacing <= EPSILON || path.is_degenerate() {
        return path.clone();
    }
    let mut points = Vec::with_capacity(path.len());
    for (a, b) in path.points.windows(2).map(|pair| (pair[0], pair[1])) {
        let steps = ((a.distance(b) / spacing).ceil() as usize).clamp(1, 10_000);
        for i in 0..steps {
            points.push(lerp_point(a, b, i as f64 / steps as f64));
        }
    }
    if let Some(last) = path.end() {
        points.push(last);
    }
    Path {
        points,
        closed: path.closed,
    }
}
