//! SVG import into flattened polylines, and SVG export of output layers
//!
//! Import walks the document with a streaming XML reader, composing `transform` attributes
//! down the element tree. All geometry comes out in millimetres: the root `viewBox` to
//! document-size scaling is folded into the base transform.

pub mod export;
pub mod path_data;
mod shapes;
pub mod transform;

use std::collections::HashMap;

use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::constants::geometry::EPSILON;
use crate::constants::svg::{MM_PER_CM, MM_PER_IN, MM_PER_PC, MM_PER_PT, MM_PER_PX};
use crate::geometry::Path;
use crate::settings::SvgImportOptions;
use shapes::Attributes;

pub use export::{to_svg, ExportMode};
pub use path_data::{flatten_commands, parse_path_data, path_data_to_paths, PathCommand};
pub use transform::{parse_transform, Affine};

/// Subtrees that never contribute drawable geometry
const SKIPPED_ELEMENTS: &[&str] = &["defs", "clipPath", "mask", "style", "text", "symbol", "metadata"];

/// The root `viewBox` in user units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    pub fn parse(source: &str) -> Option<Self> {
        match transform::parse_number_list(source).as_slice() {
            [min_x, min_y, width, height] if *width > 0.0 && *height > 0.0 => Some(Self {
                min_x: *min_x,
                min_y: *min_y,
                width: *width,
                height: *height,
            }),
            _ => None,
        }
    }
}

/// Result of importing one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgImport {
    /// Flattened polylines in millimetres
    pub paths: Vec<Path>,
    pub view_box: Option<ViewBox>,
    /// Document width in millimetres, zero when it cannot be resolved
    pub width: f64,
    pub height: f64,
}

/// Converts a length with an optional unit suffix to millimetres.
///
/// Unitless values are CSS pixels. Percentages cannot be resolved and yield `None`.
pub fn parse_length_mm(source: &str) -> Option<f64> {
    let source = source.trim();
    let mut cursor = path_data::Cursor::new(source);
    let value = cursor.number()?;
    let scale = match source[cursor.position()..].trim() {
        "" | "px" => MM_PER_PX,
        "mm" => 1.0,
        "cm" => MM_PER_CM,
        "in" => MM_PER_IN,
        "pt" => MM_PER_PT,
        "pc" => MM_PER_PC,
        _ => return None,
    };
    Some(value * scale)
}

/// Imports every drawable element of an SVG document.
///
/// Never fails: malformed markup ends the walk early, keeping what was read so far, and a
/// document whose root is not `<svg>` yields an empty result.
pub fn import_svg(source: &str, options: &SvgImportOptions) -> SvgImport {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(true);

    let mut importer = Importer::new(options);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => importer.open(&e, true),
            Ok(Event::Empty(e)) => importer.open(&e, false),
            Ok(Event::End(_)) => importer.close(),
            Ok(Event::Eof) => break,
            Err(err) => {
                warn!("SVG parse error at byte {}: {}", reader.buffer_position(), err);
                break;
            }
            _ => {}
        }
        buf.clear();
    }
    importer.finish()
}

/// Inherited presentation state
#[derive(Debug, Clone, Copy)]
struct Style {
    fill_none: bool,
    stroke_none: bool,
}

impl Default for Style {
    // SVG initial values: black fill, no stroke
    fn default() -> Self {
        Self {
            fill_none: false,
            stroke_none: true,
        }
    }
}

impl Style {
    /// Applies presentation attributes, then the `style` attribute which overrides them.
    ///
    /// Returns `None` for elements hidden with `display: none`.
    fn inherit(self, attrs: &Attributes) -> Option<Self> {
        let mut style = self;
        let mut declarations: Vec<(String, String)> = ["fill", "stroke", "display"]
            .iter()
            .filter_map(|name| attrs.get(*name).map(|v| (name.to_string(), v.clone())))
            .collect();
        if let Some(inline) = attrs.get("style") {
            declarations.extend(inline.split(';').filter_map(|decl| {
                let (key, value) = decl.split_once(':')?;
                Some((key.trim().to_string(), value.trim().to_string()))
            }));
        }
        for (key, value) in declarations {
            let value = value.trim();
            match key.as_str() {
                "fill" => style.fill_none = value == "none",
                "stroke" => style.stroke_none = value == "none",
                "display" if value == "none" => return None,
                _ => {}
            }
        }
        Some(style)
    }

    fn filled_without_stroke(&self) -> bool {
        !self.fill_none && self.stroke_none
    }
}

struct Frame {
    transform: Affine,
    style: Style,
}

struct Importer<'a> {
    options: &'a SvgImportOptions,
    stack: Vec<Frame>,
    skip_depth: usize,
    root_seen: bool,
    result: SvgImport,
}

impl<'a> Importer<'a> {
    fn new(options: &'a SvgImportOptions) -> Self {
        Self {
            options,
            stack: Vec::new(),
            skip_depth: 0,
            root_seen: false,
            result: SvgImport::default(),
        }
    }

    fn open(&mut self, element: &BytesStart, has_children: bool) {
        if self.skip_depth > 0 {
            if has_children {
                self.skip_depth += 1;
            }
            return;
        }
        let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
        let attrs = read_attributes(element);

        if !self.root_seen {
            if name != "svg" {
                debug!("document root is <{}>, not <svg>; nothing to import", name);
                self.skip_subtree(has_children);
                return;
            }
            self.root_seen = true;
            let Some(style) = Style::default().inherit(&attrs) else {
                self.skip_subtree(has_children);
                return;
            };
            let transform = self.document_transform(&attrs);
            if has_children {
                self.stack.push(Frame { transform, style });
            }
            return;
        }

        let (parent_transform, parent_style) = match self.stack.last() {
            Some(frame) => (frame.transform, frame.style),
            None => (Affine::IDENTITY, Style::default()),
        };
        let style = match parent_style.inherit(&attrs) {
            Some(style) if !SKIPPED_ELEMENTS.contains(&name.as_str()) => style,
            _ => {
                self.skip_subtree(has_children);
                return;
            }
        };
        let local = match attrs.get("transform") {
            Some(list) if self.options.flatten_transforms => parse_transform(list),
            _ => Affine::IDENTITY,
        };
        let transform = parent_transform * local;

        self.emit(&name, &attrs, style, &transform);
        if has_children {
            self.stack.push(Frame { transform, style });
        }
    }

    fn close(&mut self) {
        if self.skip_depth > 0 {
            self.skip_depth -= 1;
        } else {
            self.stack.pop();
        }
    }

    fn skip_subtree(&mut self, has_children: bool) {
        if has_children {
            self.skip_depth = 1;
        }
    }

    /// Resolves the document size and maps user units to millimetres
    fn document_transform(&mut self, attrs: &Attributes) -> Affine {
        let view_box = attrs.get("viewBox").and_then(|v| ViewBox::parse(v));
        let width = attrs
            .get("width")
            .and_then(|w| parse_length_mm(w))
            .or_else(|| view_box.map(|vb| vb.width * MM_PER_PX));
        let height = attrs
            .get("height")
            .and_then(|h| parse_length_mm(h))
            .or_else(|| view_box.map(|vb| vb.height * MM_PER_PX));

        self.result.view_box = view_box;
        self.result.width = width.unwrap_or(0.0);
        self.result.height = height.unwrap_or(0.0);

        match view_box {
            Some(vb) => {
                let sx = width.map_or(MM_PER_PX, |w| w / vb.width);
                let sy = height.map_or(MM_PER_PX, |h| h / vb.height);
                Affine::scale(sx, sy) * Affine::translate(-vb.min_x, -vb.min_y)
            }
            None => Affine::scale(MM_PER_PX, MM_PER_PX),
        }
    }

    fn emit(&mut self, name: &str, attrs: &Attributes, style: Style, transform: &Affine) {
        if self.options.ignore_fills && style.filled_without_stroke() {
            debug!("skipping filled <{}> without stroke", name);
            return;
        }
        let scale = transform.mean_scale();
        if scale < EPSILON {
            return;
        }
        // flatten in local space with the tolerance carried back through the matrix
        let tolerance = self.options.tolerance / scale;

        let paths = match name {
            "path" => attrs
                .get("d")
                .map(|d| path_data_to_paths(d, tolerance))
                .unwrap_or_default(),
            _ if !self.options.convert_shapes => return,
            "rect" => shapes::rect(attrs, tolerance),
            "circle" => shapes::circle(attrs, tolerance),
            "ellipse" => shapes::ellipse(attrs, tolerance),
            "line" => shapes::line(attrs),
            "polyline" => shapes::polyline(attrs, false),
            "polygon" => shapes::polyline(attrs, true),
            _ => return,
        };

        for mut path in paths {
            if !transform.is_identity() {
                for point in &mut path.points {
                    *point = transform.apply(*point);
                }
            }
            self.result.paths.push(path);
        }
    }

    fn finish(self) -> SvgImport {
        self.result
    }
}

fn read_attributes(element: &BytesStart) -> Attributes {
    let mut attrs = HashMap::new();
    for attr in element.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        if let Ok(value) = attr.unescape_value() {
            attrs.insert(key, value.into_owned());
        }
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn import(source: &str) -> SvgImport {
        import_svg(source, &SvgImportOptions::default())
    }

    #[test]
    fn test_lengths_in_millimetres() {
        let mm = |s: &str| parse_length_mm(s).unwrap();
        assert_eq!(mm("10mm"), 10.0);
        assert_eq!(mm(" 2cm "), 20.0);
        assert_eq!(mm("1in"), 25.4);
        for inch in ["72pt", "6pc", "96", "96px"] {
            assert!((mm(inch) - 25.4).abs() < 1e-9, "{}", inch);
        }
        assert_eq!(parse_length_mm("50%"), None);
        assert_eq!(parse_length_mm("wide"), None);
    }

    #[test]
    fn test_view_box_scaling() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="50mm" viewBox="0 0 200 100">
            <line x1="0" y1="0" x2="200" y2="100" stroke="black"/>
        </svg>"#;
        let result = import(svg);
        assert_eq!(result.width, 100.0);
        assert_eq!(result.height, 50.0);
        assert_eq!(result.view_box.map(|vb| vb.width), Some(200.0));
        assert_eq!(result.paths.len(), 1);
        assert_eq!(result.paths[0].points, vec![Point::new(0.0, 0.0), Point::new(100.0, 50.0)]);
    }

    #[test]
    fn test_view_box_offset() {
        let svg = r#"<svg width="10mm" height="10mm" viewBox="5 5 10 10">
            <line x1="5" y1="5" x2="15" y2="15"/>
        </svg>"#;
        let result = import(svg);
        assert_eq!(result.paths[0].points, vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)]);
    }

    #[test]
    fn test_nested_transforms_compose() {
        let svg = r#"<svg width="100mm" height="100mm" viewBox="0 0 100 100">
            <g transform="translate(10,0)">
                <g transform="scale(2)">
                    <line x1="1" y1="1" x2="2" y2="1"/>
                </g>
                <line x1="0" y1="0" x2="1" y2="0"/>
            </g>
        </svg>"#;
        let result = import(svg);
        assert_eq!(result.paths.len(), 2);
        assert_eq!(result.paths[0].points, vec![Point::new(12.0, 2.0), Point::new(14.0, 2.0)]);
        assert_eq!(result.paths[1].points, vec![Point::new(10.0, 0.0), Point::new(11.0, 0.0)]);
    }

    #[test]
    fn test_transforms_ignored_when_not_flattening() {
        let svg = r#"<svg width="100mm" height="100mm" viewBox="0 0 100 100">
            <g transform="translate(10,0)"><line x1="0" y1="0" x2="1" y2="0"/></g>
        </svg>"#;
        let options = SvgImportOptions {
            flatten_transforms: false,
            ..SvgImportOptions::default()
        };
        let result = import_svg(svg, &options);
        assert_eq!(result.paths[0].points, vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
    }

    #[test]
    fn test_skipped_subtrees() {
        let svg = r#"<svg width="10mm" height="10mm" viewBox="0 0 10 10">
            <defs><path d="M0 0 L5 5"/><g><rect width="2" height="2"/></g></defs>
            <clipPath id="c"><rect width="1" height="1"/></clipPath>
            <text x="1" y="1">hello</text>
            <g style="display:none"><line x1="0" y1="0" x2="1" y2="1"/></g>
            <path d="M1 1 L2 2"/>
        </svg>"#;
        let result = import(svg);
        assert_eq!(result.paths.len(), 1);
        assert_eq!(result.paths[0].points, vec![Point::new(1.0, 1.0), Point::new(2.0, 2.0)]);
    }

    #[test]
    fn test_ignore_fills() {
        let svg = r#"<svg width="10mm" height="10mm" viewBox="0 0 10 10">
            <rect width="5" height="5"/>
            <rect width="5" height="5" fill="none"/>
            <rect width="5" height="5" style="fill:red;stroke:black"/>
            <g fill="none"><circle r="2" cx="5" cy="5"/></g>
        </svg>"#;
        assert_eq!(import(svg).paths.len(), 4);

        let options = SvgImportOptions {
            ignore_fills: true,
            ..SvgImportOptions::default()
        };
        assert_eq!(import_svg(svg, &options).paths.len(), 3);
    }

    #[test]
    fn test_shapes_can_be_disabled() {
        let svg = r#"<svg width="10mm" height="10mm" viewBox="0 0 10 10">
            <rect width="5" height="5"/><path d="M0 0 L1 1"/>
        </svg>"#;
        let options = SvgImportOptions {
            convert_shapes: false,
            ..SvgImportOptions::default()
        };
        assert_eq!(import_svg(svg, &options).paths.len(), 1);
    }

    #[test]
    fn test_non_svg_root_is_empty() {
        let result = import("<html><path d=\"M0 0 L1 1\"/></html>");
        assert!(result.paths.is_empty());
        assert_eq!(result.width, 0.0);
        assert!(import("").paths.is_empty());
        assert!(import("not xml at all").paths.is_empty());
    }

    #[test]
    fn test_no_view_box_uses_pixels() {
        let svg = r#"<svg width="96" height="96"><line x1="0" y1="0" x2="96" y2="0"/></svg>"#;
        let result = import(svg);
        assert!((result.width - 25.4).abs() < 1e-9);
        assert!((result.paths[0].points[1].x - 25.4).abs() < 1e-9);
    }
}
