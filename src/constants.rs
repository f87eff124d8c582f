//! Application-wide constants and default values
//!
//! Centralized location for all hard-coded values to improve maintainability

/// Node geometry constants (graph-space units)
pub mod node {
    /// Height of the title bar at the top of every node
    pub const TITLE_HEIGHT: f32 = 30.0;

    /// Vertical space reserved per slot row
    pub const SLOT_HEIGHT: f32 = 20.0;

    /// Default node width
    pub const DEFAULT_WIDTH: f32 = 140.0;

    /// Minimum node width when resizing
    pub const MIN_WIDTH: f32 = 50.0;

    /// Width of the title-bar-only body shown while collapsed
    pub const COLLAPSED_WIDTH: f32 = 80.0;

    /// Side length of the bottom-right resize corner
    pub const RESIZE_CORNER: f32 = 10.0;

    /// Horizontal inset of slot connectors from the node edge
    pub const SLOT_INSET: f32 = 10.0;

    /// Estimated width per title character, used for natural sizing
    pub const TITLE_CHAR_WIDTH: f32 = 7.0;

    /// Padding below the last widget row
    pub const BOTTOM_PADDING: f32 = 6.0;
}

/// Widget row constants
pub mod widget {
    /// Height of one widget row
    pub const HEIGHT: f32 = 20.0;

    /// Vertical gap between stacked widget rows
    pub const SPACING: f32 = 4.0;

    /// Horizontal inset of widget rows from the node edges
    pub const MARGIN: f32 = 6.0;
}

/// Group geometry constants
pub mod group {
    /// Minimum group width
    pub const MIN_WIDTH: f32 = 140.0;

    /// Minimum group height
    pub const MIN_HEIGHT: f32 = 80.0;

    /// Height of the group title band
    pub const TITLE_HEIGHT: f32 = 24.0;

    /// Side length of the bottom-right triangular resize affordance
    pub const RESIZE_CORNER: f32 = 20.0;
}

/// View transform constants
pub mod view {
    /// Minimum zoom scale
    pub const MIN_SCALE: f32 = 0.1;

    /// Maximum zoom scale
    pub const MAX_SCALE: f32 = 10.0;

    /// Scales within this distance of 1.0 snap to exactly 1.0
    pub const SCALE_SNAP: f32 = 0.01;

    /// Multiplier applied per wheel step
    pub const WHEEL_ZOOM_SPEED: f32 = 0.05;
}

/// Hit-testing tolerances (graph-space units)
pub mod hit {
    /// Half-width of a slot connector hit region
    pub const SLOT_HALF_WIDTH: f32 = 10.0;

    /// Half-height of a slot connector hit region
    pub const SLOT_HALF_HEIGHT: f32 = 5.0;

    /// Radius around a link midpoint that counts as hitting the link
    pub const LINK_RADIUS: f32 = 10.0;

    /// Box selections smaller than this on both axes degrade to a click
    pub const CLICK_BOX: f32 = 6.0;
}

/// Grid constants
pub mod grid {
    /// Default snapping and drawing pitch
    pub const SIZE: f32 = 10.0;

    /// Grid lines are not drawn below this scale
    pub const MIN_DRAW_SCALE: f32 = 0.5;
}

/// Link curve constants
pub mod link {
    /// Fraction of the endpoint distance used for control point offsets
    pub const CURVE_TENSION: f32 = 0.25;

    /// Sample count when flattening a curve for bounding checks
    pub const CURVE_SAMPLES: usize = 20;

    /// Period of the traveling-dot animation, in seconds
    pub const FLOW_PERIOD: f64 = 1.5;
}

/// Adaptive render quality constants
pub mod quality {
    /// Scale below which low-quality rendering may engage
    pub const LOW_SCALE: f32 = 0.6;

    /// Frames per second considered acceptable
    pub const FPS_FLOOR: f32 = 30.0;

    /// Counter value at which rendering switches to cheap primitives
    pub const THRESHOLD: u32 = 10;

    /// Upper clamp for the low-quality counter
    pub const COUNTER_MAX: u32 = 20;
}
