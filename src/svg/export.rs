//! Serialization of output layers to SVG

use quick_xml::escape::escape;

use crate::constants::svg::{EXPORT_PRECISION, EXPORT_STROKE_WIDTH_MM};
use crate::geometry::{CanvasSettings, OutputLayer, Path};

/// Stroke colouring of exported layers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportMode {
    /// Each layer keeps its preview colour
    #[default]
    Preview,
    /// Everything black, for sending to the plotter
    Export,
}

/// Formats a coordinate with fixed precision and trailing zeros trimmed
pub fn format_number(value: f64) -> String {
    let mut text = format!("{:.*}", EXPORT_PRECISION, value);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

/// Path data string `M x,y L x,y ... [Z]`; empty for an empty path
pub fn path_data(path: &Path) -> String {
    let mut d = String::new();
    for (i, point) in path.points.iter().enumerate() {
        if i > 0 {
            d.push(' ');
        }
        d.push_str(if i == 0 { "M " } else { "L " });
        d.push_str(&format_number(point.x));
        d.push(',');
        d.push_str(&format_number(point.y));
    }
    if path.closed && !path.points.is_empty() {
        d.push_str(" Z");
    }
    d
}

/// Full SVG document in millimetres with one group per enabled layer
pub fn to_svg(layers: &[OutputLayer], canvas: &CanvasSettings, mode: ExportMode) -> String {
    let width = format_number(canvas.width);
    let height = format_number(canvas.height);
    let mut svg = String::new();
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}mm\" height=\"{h}mm\" viewBox=\"0 0 {w} {h}\">\n",
        w = width,
        h = height
    ));

    let mut used_ids: Vec<String> = Vec::new();
    for layer in layers.iter().filter(|layer| layer.enabled) {
        let mut id = format!("pen-{}", layer.pen);
        let mut suffix = 1;
        while used_ids.contains(&id) {
            suffix += 1;
            id = format!("pen-{}-{}", layer.pen, suffix);
        }
        used_ids.push(id.clone());

        let stroke = match mode {
            ExportMode::Preview => layer.color.as_str(),
            ExportMode::Export => "#000000",
        };
        svg.push_str(&format!(
            "  <g id=\"{}\" data-pen=\"{}\" data-name=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"round\" stroke-linejoin=\"round\">\n",
            id,
            layer.pen,
            escape(layer.name.as_str()),
            escape(stroke),
            format_number(EXPORT_STROKE_WIDTH_MM),
        ));
        for path in layer.paths.iter().filter(|p| !p.is_degenerate()) {
            svg.push_str(&format!("    <path d=\"{}\"/>\n", path_data(path)));
        }
        svg.push_str("  </g>\n");
    }
    svg.push_str("</svg>\n");
    svg
}
