//! Penflow command line: render projects to SVG, import SVG files and report plot statistics

use std::path::{Path as FsPath, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use penflow::constants::data_source::RENDER_WAIT_SECS;
use penflow::geometry::OutputLayer;
use penflow::optimize::{compute_stats, run_pipeline};
use penflow::svg::{import_svg, to_svg, ExportMode};
use penflow::{load_project, CanvasSettings, GraphEngine, OptimizationSettings, Project, SvgImportOptions};

#[derive(Parser)]
#[command(name = "penflow")]
#[command(about = "Procedural line art for pen plotters")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a project and write the plot as SVG
    Render {
        /// Path to the project JSON file
        project: PathBuf,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override the project seed
        #[arg(long)]
        seed: Option<u32>,
        /// Black strokes for plotting instead of layer colours
        #[arg(long)]
        export: bool,
        /// Skip the optimization pipeline
        #[arg(long)]
        no_optimize: bool,
    },
    /// Flatten an SVG file into polylines and write them back out
    Import {
        /// SVG file to read
        file: PathBuf,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip filled shapes without a stroke
        #[arg(long)]
        ignore_fills: bool,
        /// Curve flattening tolerance in mm
        #[arg(long)]
        tolerance: Option<f64>,
    },
    /// Print draw and travel statistics before and after optimization
    Stats {
        /// Path to the project JSON file
        project: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Commands::Render {
            project,
            output,
            seed,
            export,
            no_optimize,
        } => {
            let mut project = open_project(&project)?;
            if let Some(seed) = seed {
                project.seed = seed;
            }
            let mut layers = render_layers(&project);
            if !no_optimize {
                layers = run_pipeline(&layers, &project.settings).0;
            }
            let mode = if export { ExportMode::Export } else { ExportMode::Preview };
            write_output(output.as_deref(), &to_svg(&layers, &project.canvas, mode))
        }
        Commands::Import {
            file,
            output,
            ignore_fills,
            tolerance,
        } => {
            let source = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read SVG file {}", file.display()))?;
            let mut options = SvgImportOptions {
                ignore_fills,
                ..SvgImportOptions::default()
            };
            if let Some(tolerance) = tolerance {
                options.tolerance = tolerance;
            }
            let imported = import_svg(&source, &options);
            info!("imported {} paths from {}", imported.paths.len(), file.display());

            let canvas = CanvasSettings::new(imported.width, imported.height)
                .or_else(|_| imported_bounds(&imported.paths))
                .context("SVG file has no usable size")?;
            let layer = OutputLayer::new("imported", 1).with_paths(imported.paths);
            let stats = compute_stats(&layer.paths, OptimizationSettings::default().plot_speed);
            info!("draw {:.1} mm, travel {:.1} mm", stats.draw_distance, stats.travel_distance);
            write_output(output.as_deref(), &to_svg(&[layer], &canvas, ExportMode::Export))
        }
        Commands::Stats { project } => {
            let project = open_project(&project)?;
            let layers = render_layers(&project);
            let (_, report) = run_pipeline(&layers, &project.settings);
            let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
            println!("{}", json);
            Ok(())
        }
    }
}

fn open_project(path: &FsPath) -> Result<Project> {
    load_project(path).with_context(|| format!("Failed to load project {}", path.display()))
}

/// Evaluates the graph, or the module stack when the graph is empty
fn render_layers(project: &Project) -> Vec<OutputLayer> {
    let mut engine = GraphEngine::default();
    if project.graph.is_empty() {
        let output = project.stack.evaluate(engine.registry(), &project.canvas, project.seed);
        return vec![output.into_output_layer("stack", 1)];
    }

    let mut layers = engine.evaluate(&project.graph, &project.canvas, project.seed);
    if engine.external_data().pending() > 0 {
        info!("waiting for {} data source fetches", engine.external_data().pending());
        if engine.wait_for_external_data(Duration::from_secs(RENDER_WAIT_SECS)) {
            layers = engine.evaluate(&project.graph, &project.canvas, project.seed);
        }
    }
    for diagnostic in engine.diagnostics() {
        warn!("{}: {}", diagnostic.node_id, diagnostic.message);
    }
    layers
}

/// Canvas spanning the imported geometry when the document has no size
fn imported_bounds(paths: &[penflow::Path]) -> Result<CanvasSettings, penflow::ProjectError> {
    let bounds = paths
        .iter()
        .filter_map(|path| path.bounds())
        .reduce(|a, b| a.union(&b));
    let (width, height) = bounds.map_or((0.0, 0.0), |b| (b.max.x, b.max.y));
    CanvasSettings::new(width, height)
}

fn write_output(path: Option<&FsPath>, svg: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, svg).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => print!("{}", svg),
    }
    Ok(())
}
