//! View transform: pan/zoom between screen and graph coordinates

use egui::{Pos2, Rect, Vec2};

use crate::constants;

/// Maps between screen (device) space and graph (logical) space
///
/// `graph = screen / scale - offset`, so panning accumulates in graph
/// units and the transform stays exactly invertible.
#[derive(Debug, Clone)]
pub struct ViewTransform {
    pub offset: Vec2,
    pub scale: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Optional pixel sub-region of the host surface that shows the graph
    pub viewport: Option<Rect>,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewTransform {
    pub fn new() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            min_scale: constants::view::MIN_SCALE,
            max_scale: constants::view::MAX_SCALE,
            viewport: None,
        }
    }

    /// Screen point to graph point
    pub fn to_graph(&self, screen: Pos2) -> Pos2 {
        Pos2::new(
            screen.x / self.scale - self.offset.x,
            screen.y / self.scale - self.offset.y,
        )
    }

    /// Graph point to screen point
    pub fn to_screen(&self, graph: Pos2) -> Pos2 {
        Pos2::new(
            (graph.x + self.offset.x) * self.scale,
            (graph.y + self.offset.y) * self.scale,
        )
    }

    /// Graph vector to screen vector (scale only, no offset)
    pub fn vec_to_screen(&self, graph: Vec2) -> Vec2 {
        graph * self.scale
    }

    /// Pans by a screen-space delta
    pub fn pan(&mut self, delta_screen: Vec2) {
        self.offset += delta_screen / self.scale;
    }

    /// Sets the scale, keeping the graph point under `pivot_screen` fixed
    ///
    /// Out-of-range requests are clamped, never an error; scales within
    /// [`constants::view::SCALE_SNAP`] of 1.0 snap to exactly 1.0.
    pub fn set_zoom(&mut self, new_scale: f32, pivot_screen: Pos2) {
        let mut value = new_scale.clamp(self.min_scale, self.max_scale);
        if !value.is_finite() {
            value = 1.0;
        }
        if (value - 1.0).abs() < constants::view::SCALE_SNAP {
            value = 1.0;
        }
        if value == self.scale {
            return;
        }

        let before = self.to_graph(pivot_screen);
        self.scale = value;
        let after = self.to_graph(pivot_screen);
        self.offset += after - before;
    }

    /// Multiplies the scale, pivoting on `pivot_screen`
    pub fn zoom_by(&mut self, factor: f32, pivot_screen: Pos2) {
        self.set_zoom(self.scale * factor, pivot_screen);
    }

    /// Graph-space rectangle visible through the given pixel viewport
    ///
    /// The configured sub-viewport, when present, wins over the argument.
    pub fn visible_rect(&self, surface: Rect) -> Rect {
        let pixels = self.viewport.unwrap_or(surface);
        Rect::from_min_max(self.to_graph(pixels.min), self.to_graph(pixels.max))
    }

    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.scale = 1.0;
    }
}
