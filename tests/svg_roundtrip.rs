//! Exported documents read back through the importer reproduce their geometry

use penflow::geometry::{CanvasSettings, OutputLayer, Path, Point};
use penflow::settings::SvgImportOptions;
use penflow::svg::{import_svg, to_svg, ExportMode};

fn assert_close(a: &[Path], b: &[Path], tolerance: f64) {
    assert_eq!(a.len(), b.len());
    for (left, right) in a.iter().zip(b) {
        assert_eq!(left.closed, right.closed);
        assert_eq!(left.len(), right.len());
        for (p, q) in left.points.iter().zip(&right.points) {
            assert!(p.distance(*q) <= tolerance, "{:?} vs {:?}", p, q);
        }
    }
}

#[test]
fn export_then_import_reproduces_points() {
    let canvas = CanvasSettings::new(120.0, 80.0).unwrap();
    let first = OutputLayer::new("a", 1).with_paths(vec![
        Path::from_coords(&[(10.0, 10.0), (20.5, 10.25), (30.125, 40.0)]),
        Path::closed(vec![
            Point::new(50.0, 50.0),
            Point::new(60.0, 50.0),
            Point::new(60.0, 60.0),
            Point::new(50.0, 60.0),
        ]),
    ]);
    let mut second = OutputLayer::new("b", 2).with_paths(vec![Path::from_coords(&[(1.0, 79.0), (119.0, 1.0)])]);
    second.color = "#3366ff".into();

    let layers = vec![first, second];
    let svg = to_svg(&layers, &canvas, ExportMode::Preview);
    let imported = import_svg(&svg, &SvgImportOptions::default());

    assert_eq!(imported.width, 120.0);
    assert_eq!(imported.height, 80.0);
    let expected: Vec<Path> = layers.iter().flat_map(|l| l.paths.clone()).collect();
    assert_close(&imported.paths, &expected, 1e-9);
}

#[test]
fn reexporting_an_import_is_stable() {
    let source = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="100mm" viewBox="0 0 200 200">
        <g transform="translate(20 20)" stroke="black" fill="none">
            <path d="M0,0 C40,80 120,-40 160,40"/>
            <circle cx="80" cy="80" r="30"/>
        </g>
    </svg>"#;
    let options = SvgImportOptions::default();
    let imported = import_svg(source, &options);
    assert_eq!(imported.paths.len(), 2);
    assert!(imported.paths[1].closed);

    let canvas = CanvasSettings::new(imported.width, imported.height).unwrap();
    let layer = OutputLayer::new("imported", 1).with_paths(imported.paths.clone());
    let svg = to_svg(&[layer], &canvas, ExportMode::Export);
    let again = import_svg(&svg, &options);

    // export rounds to three decimals
    assert_close(&again.paths, &imported.paths, 1e-3);
}

#[test]
fn disabled_layers_are_not_exported() {
    let canvas = CanvasSettings::default();
    let mut hidden = OutputLayer::new("h", 4).with_paths(vec![Path::from_coords(&[(0.0, 0.0), (5.0, 5.0)])]);
    hidden.enabled = false;
    let svg = to_svg(&[hidden], &canvas, ExportMode::Export);
    assert!(import_svg(&svg, &SvgImportOptions::default()).paths.is_empty());
}
