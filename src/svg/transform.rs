//! 2D affine matrices and the SVG `transform` attribute

use std::ops::Mul;

use crate::geometry::Point;

/// Affine matrix `[a b c d e f]` mapping `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `degrees` about the origin
    pub fn rotate(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Rotation by `degrees` about `(cx, cy)`
    pub fn rotate_about(degrees: f64, cx: f64, cy: f64) -> Self {
        Self::translate(cx, cy) * Self::rotate(degrees) * Self::translate(-cx, -cy)
    }

    pub fn skew_x(degrees: f64) -> Self {
        Self::new(1.0, 0.0, degrees.to_radians().tan(), 1.0, 0.0, 0.0)
    }

    pub fn skew_y(degrees: f64) -> Self {
        Self::new(1.0, degrees.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Geometric mean of the axis scale factors, used to carry tolerances across the matrix
    pub fn mean_scale(&self) -> f64 {
        (self.a * self.d - self.b * self.c).abs().sqrt()
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// `lhs * rhs` applies `rhs` first, matching the left-to-right order of an SVG transform list
impl Mul for Affine {
    type Output = Affine;

    fn mul(self, rhs: Affine) -> Affine {
        Affine {
            a: self.a * rhs.a + self.c * rhs.b,
            b: self.b * rhs.a + self.d * rhs.b,
            c: self.a * rhs.c + self.c * rhs.d,
            d: self.b * rhs.c + self.d * rhs.d,
            e: self.a * rhs.e + self.c * rhs.f + self.e,
            f: self.b * rhs.e + self.d * rhs.f + self.f,
        }
    }
}

/// Parses an SVG transform list such as `translate(10 5) rotate(45, 0, 0)`.
///
/// Unknown functions and functions with the wrong argument count are skipped; parsing stops
/// at the first token that is not a function call.
pub fn parse_transform(source: &str) -> Affine {
    let mut result = Affine::IDENTITY;
    let mut rest = source;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }
        let name_len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let name = &rest[..name_len];
        let after_name = rest[name_len..].trim_start();
        let Some(args_start) = after_name.strip_prefix('(') else {
            break;
        };
        let Some(close) = args_start.find(')') else {
            break;
        };
        let args = parse_number_list(&args_start[..close]);
        rest = &args_start[close + 1..];

        if let Some(matrix) = transform_function(name, &args) {
            result = result * matrix;
        }
    }
    result
}

fn transform_function(name: &str, args: &[f64]) -> Option<Affine> {
    let matrix = match (name, args) {
        ("matrix", [a, b, c, d, e, f]) => Affine::new(*a, *b, *c, *d, *e, *f),
        ("translate", [tx]) => Affine::translate(*tx, 0.0),
        ("translate", [tx, ty]) => Affine::translate(*tx, *ty),
        ("scale", [s]) => Affine::scale(*s, *s),
        ("scale", [sx, sy]) => Affine::scale(*sx, *sy),
        ("rotate", [angle]) => Affine::rotate(*angle),
        ("rotate", [angle, cx, cy]) => Affine::rotate_about(*angle, *cx, *cy),
        ("skewX", [angle]) => Affine::skew_x(*angle),
        ("skewY", [angle]) => Affine::skew_y(*angle),
        _ => {
            log::debug!("skipping transform function {}({:?})", name, args);
            return None;
        }
    };
    Some(matrix)
}

/// Splits a whitespace/comma separated list, dropping tokens that are not numbers
pub fn parse_number_list(source: &str) -> Vec<f64> {
    let mut cursor = super::path_data::Cursor::new(source);
    let mut values = Vec::new();
    while !cursor.at_end() {
        cursor.skip_separators();
        if cursor.at_end() {
            break;
        }
        match cursor.number() {
            Some(value) => values.push(value),
            None => cursor.bump(),
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point, b: Point) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn test_list_applies_right_to_left() {
        let m = parse_transform("translate(10, 5) scale(2)");
        assert_eq!(m.apply(Point::new(1.0, 1.0)), Point::new(12.0, 7.0));
    }

    #[test]
    fn test_rotate_about_centre() {
        let m = parse_transform("rotate(90 10 10)");
        assert!(approx(m.apply(Point::new(20.0, 10.0)), Point::new(10.0, 20.0)));
    }

    #[test]
    fn test_matrix_and_skew() {
        let m = parse_transform("matrix(1 0 0 1 3 4)");
        assert_eq!(m.apply(Point::ZERO), Point::new(3.0, 4.0));

        let skew = parse_transform("skewX(45)");
        assert!(approx(skew.apply(Point::new(0.0, 2.0)), Point::new(2.0, 2.0)));
        let skew = parse_transform("skewY(45)");
        assert!(approx(skew.apply(Point::new(2.0, 0.0)), Point::new(2.0, 2.0)));
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let m = parse_transform("wobble(3) translate(1 2 3) translate(4,abc 6)");
        // translate(4, 6) survives once the bad token is dropped
        assert_eq!(m.apply(Point::ZERO), Point::new(4.0, 6.0));
        assert!(parse_transform("garbage").is_identity());
        assert!(parse_transform("").is_identity());
    }

    #[test]
    fn test_mean_scale() {
        assert!((Affine::scale(2.0, 8.0).mean_scale() - 4.0).abs() < 1e-12);
        assert!((Affine::rotate(33.0).mean_scale() - 1.0).abs() < 1e-12);
    }
}
