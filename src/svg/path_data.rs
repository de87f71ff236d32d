//! SVG path data (`d` attribute) tokenizer, parser and flattener

use log::debug;

use crate::constants::geometry::EPSILON;
use crate::geometry::{flatten_arc, flatten_cubic, flatten_quadratic, Path, Point};

/// One absolute drawing command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CubicTo {
        c1: Point,
        c2: Point,
        to: Point,
    },
    QuadTo {
        c: Point,
        to: Point,
    },
    ArcTo {
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
    Close,
}

/// Byte cursor shared by the path-data and number-list parsers
pub(crate) struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    pub(crate) fn bump(&mut self) {
        self.pos += 1;
    }

    pub(crate) fn skip_separators(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_whitespace() || c == b',') {
            self.pos += 1;
        }
    }

    fn skip_digits(&mut self) -> usize {
        let begin = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - begin
    }

    /// Reads one number (`-1.5e3`, `.5`, `+2`); leaves the cursor untouched on failure.
    ///
    /// A second decimal point ends the number, so `1.5.5` reads as `1.5` then `.5`.
    pub(crate) fn number(&mut self) -> Option<f64> {
        let begin = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let mut digits = self.skip_digits();
        if self.peek() == Some(b'.') {
            self.pos += 1;
            digits += self.skip_digits();
        }
        if digits == 0 {
            self.pos = begin;
            return None;
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mantissa_end = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.skip_digits() == 0 {
                self.pos = mantissa_end;
            }
        }
        let parsed = std::str::from_utf8(&self.bytes[begin..self.pos])
            .ok()
            .and_then(|text| text.parse::<f64>().ok())
            .filter(|value| value.is_finite());
        if parsed.is_none() {
            self.pos = begin;
        }
        parsed
    }

    /// Reads an arc flag, which is always a single `0` or `1` character
    fn flag(&mut self) -> Option<bool> {
        let flag = match self.peek()? {
            b'0' => false,
            b'1' => true,
            _ => return None,
        };
        self.pos += 1;
        Some(flag)
    }

    fn point(&mut self) -> Option<Point> {
        self.skip_separators();
        let x = self.number()?;
        self.skip_separators();
        let y = self.number()?;
        Some(Point::new(x, y))
    }

    fn scalar(&mut self) -> Option<f64> {
        self.skip_separators();
        self.number()
    }

    fn skip_to_command(&mut self) {
        while let Some(c) = self.peek() {
            if is_command(c) {
                break;
            }
            self.pos += 1;
        }
    }
}

fn is_command(c: u8) -> bool {
    b"MmLlHhVvCcSsQqTtAaZz".contains(&c)
}

/// Parses path data into absolute commands.
///
/// Coordinate groups after a command repeat it implicitly (after a moveto they become
/// linetos). A malformed argument drops the command and skips ahead to the next command
/// letter; unknown command letters are ignored.
pub fn parse_path_data(d: &str) -> Vec<PathCommand> {
    let mut cursor = Cursor::new(d);
    let mut commands = Vec::new();
    let mut current = Point::ZERO;
    let mut start = Point::ZERO;
    let mut command: Option<u8> = None;
    let mut last_cubic: Option<Point> = None;
    let mut last_quad: Option<Point> = None;

    loop {
        cursor.skip_separators();
        let Some(c) = cursor.peek() else {
            break;
        };
        if c.is_ascii_alphabetic() {
            cursor.bump();
            if !is_command(c) {
                debug!("ignoring unknown path command '{}'", c as char);
                command = None;
                continue;
            }
            if c.eq_ignore_ascii_case(&b'z') {
                commands.push(PathCommand::Close);
                current = start;
                last_cubic = None;
                last_quad = None;
                command = None;
                continue;
            }
            command = Some(c);
        }
        let Some(cmd) = command else {
            // stray argument with no command to repeat
            cursor.bump();
            continue;
        };

        let base = if cmd.is_ascii_lowercase() { current } else { Point::ZERO };
        let parsed = match cmd.to_ascii_uppercase() {
            b'M' => cursor.point().map(|p| PathCommand::MoveTo(base + p)),
            b'L' => cursor.point().map(|p| PathCommand::LineTo(base + p)),
            b'H' => cursor
                .scalar()
                .map(|x| PathCommand::LineTo(Point::new(base.x + x, current.y))),
            b'V' => cursor
                .scalar()
                .map(|y| PathCommand::LineTo(Point::new(current.x, base.y + y))),
            b'C' => (|| {
                let c1 = base + cursor.point()?;
                let c2 = base + cursor.point()?;
                let to = base + cursor.point()?;
                Some(PathCommand::CubicTo { c1, c2, to })
            })(),
            b'S' => (|| {
                let c1 = last_cubic.map_or(current, |c| current * 2.0 - c);
                let c2 = base + cursor.point()?;
                let to = base + cursor.point()?;
                Some(PathCommand::CubicTo { c1, c2, to })
            })(),
            b'Q' => (|| {
                let c = base + cursor.point()?;
                let to = base + cursor.point()?;
                Some(PathCommand::QuadTo { c, to })
            })(),
            b'T' => (|| {
                let c = last_quad.map_or(current, |q| current * 2.0 - q);
                let to = base + cursor.point()?;
                Some(PathCommand::QuadTo { c, to })
            })(),
            b'A' => (|| {
                let rx = cursor.scalar()?;
                let ry = cursor.scalar()?;
                let rotation = cursor.scalar()?;
                cursor.skip_separators();
                let large_arc = cursor.flag()?;
                cursor.skip_separators();
                let sweep = cursor.flag()?;
                let to = base + cursor.point()?;
                Some(PathCommand::ArcTo {
                    rx,
                    ry,
                    rotation,
                    large_arc,
                    sweep,
                    to,
                })
            })(),
            _ => None,
        };

        let Some(parsed) = parsed else {
            debug!("dropping malformed '{}' command in path data", cmd as char);
            cursor.skip_to_command();
            command = None;
            continue;
        };

        last_cubic = None;
        last_quad = None;
        match parsed {
            PathCommand::MoveTo(p) => {
                current = p;
                start = p;
                command = Some(if cmd == b'm' { b'l' } else { b'L' });
            }
            PathCommand::CubicTo { c2, to, .. } => {
                last_cubic = Some(c2);
                current = to;
            }
            PathCommand::QuadTo { c, to } => {
                last_quad = Some(c);
                current = to;
            }
            PathCommand::LineTo(to) | PathCommand::ArcTo { to, .. } => current = to,
            PathCommand::Close => current = start,
        }
        commands.push(parsed);
    }
    commands
}

/// Flattens commands into polylines, one per subpath.
///
/// Closed subpaths drop a final point that duplicates their start.
pub fn flatten_commands(commands: &[PathCommand], tolerance: f64) -> Vec<Path> {
    let mut paths = Vec::new();
    let mut points: Vec<Point> = Vec::new();
    let mut current = Point::ZERO;
    let mut start = Point::ZERO;

    for command in commands {
        match *command {
            PathCommand::MoveTo(p) => {
                finish_open(&mut points, &mut paths);
                current = p;
                start = p;
            }
            PathCommand::Close => {
                finish_closed(&mut points, &mut paths);
                current = start;
            }
            segment => {
                if points.is_empty() {
                    points.push(current);
                }
                current = match segment {
                    PathCommand::LineTo(to) => {
                        points.push(to);
                        to
                    }
                    PathCommand::CubicTo { c1, c2, to } => {
                        flatten_cubic(current, c1, c2, to, tolerance, &mut points);
                        to
                    }
                    PathCommand::QuadTo { c, to } => {
                        flatten_quadratic(current, c, to, tolerance, &mut points);
                        to
                    }
                    PathCommand::ArcTo {
                        rx,
                        ry,
                        rotation,
                        large_arc,
                        sweep,
                        to,
                    } => {
                        flatten_arc(current, rx, ry, rotation, large_arc, sweep, to, &mut points);
                        to
                    }
                    PathCommand::MoveTo(_) | PathCommand::Close => current,
                };
            }
        }
    }
    finish_open(&mut points, &mut paths);
    paths
}

fn finish_open(points: &mut Vec<Point>, paths: &mut Vec<Path>) {
    if points.len() >= 2 {
        paths.push(Path::new(std::mem::take(points)));
    } else {
        points.clear();
    }
}

fn finish_closed(points: &mut Vec<Point>, paths: &mut Vec<Path>) {
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        if points.len() >= 2 && first.distance(*last) < EPSILON {
            points.pop();
        }
    }
    if points.len() >= 2 {
        paths.push(Path::closed(std::mem::take(points)));
    } else {
        points.clear();
    }
}

/// Parses and flattens path data in one step
pub fn path_data_to_paths(d: &str, tolerance: f64) -> Vec<Path> {
    flatten_commands(&parse_path_data(d), tolerance)
}
