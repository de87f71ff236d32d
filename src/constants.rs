//! Application-wide constants and default values
//!
//! Centralized location for all hard-coded values to improve maintainability

/// Canvas defaults (A4 portrait)
pub mod canvas {
    pub const DEFAULT_WIDTH_MM: f64 = 210.0;
    pub const DEFAULT_HEIGHT_MM: f64 = 297.0;
}

/// Geometry kernel tolerances and sampling bounds
pub mod geometry {
    /// Guard for zero-length vectors and vanishing determinants
    pub const EPSILON: f64 = 1e-9;

    /// Smallest flattening tolerance honoured, in millimetres
    pub const MIN_FLATTEN_TOLERANCE: f64 = 1e-4;

    /// Maximum de Casteljau subdivision depth
    pub const MAX_FLATTEN_DEPTH: u32 = 16;

    /// Arc sampling step (5 degrees)
    pub const ARC_STEP_RADIANS: f64 = std::f64::consts::PI / 36.0;

    /// Hard cap on segments emitted for one arc
    pub const MAX_ARC_SEGMENTS: usize = 1024;
}

/// Plot optimization defaults
pub mod optimize {
    pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 0.1;
    pub const DEFAULT_JOIN_TOLERANCE: f64 = 0.5;
    pub const DEFAULT_FLATTEN_TOLERANCE: f64 = 0.2;

    /// Pen speed used for time estimates, mm/s
    pub const DEFAULT_PLOT_SPEED: f64 = 50.0;
}

/// Graph evaluation limits
pub mod evaluation {
    /// Deepest dependency chain evaluated before giving up on a branch
    pub const MAX_EVALUATION_DEPTH: usize = 512;

    /// Number of path inputs on the merge node
    pub const MERGE_INPUT_COUNT: usize = 4;

    /// Prefix of ports that feed promoted parameters
    pub const PARAM_PORT_PREFIX: &str = "param:";
}

/// Output node defaults
pub mod output {
    pub const DEFAULT_COLOR: &str = "#000000";
    pub const DEFAULT_PEN: u32 = 1;
}

/// External data source caching
pub mod data_source {
    /// How long a fetched value counts as fresh, in seconds
    pub const DEFAULT_TTL_SECS: u64 = 300;
    /// How long the command line renderer waits for running fetches
    pub const RENDER_WAIT_SECS: u64 = 10;
}

/// SVG import and export
pub mod svg {
    /// Millimetres per CSS pixel (96 dpi)
    pub const MM_PER_PX: f64 = 25.4 / 96.0;
    pub const MM_PER_IN: f64 = 25.4;
    pub const MM_PER_PT: f64 = 25.4 / 72.0;
    pub const MM_PER_PC: f64 = 25.4 / 6.0;
    pub const MM_PER_CM: f64 = 10.0;

    /// Decimal places kept when writing coordinates
    pub const EXPORT_PRECISION: usize = 3;

    pub const EXPORT_STROKE_WIDTH_MM: f64 = 0.3;
}

/// Project file format
pub mod project {
    pub const FORMAT_VERSION: &str = "1.0";
}
