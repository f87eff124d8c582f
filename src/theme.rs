//! Centralized theme and styling constants for the Nodeweave editor
//!
//! Single source of truth for the colors and strokes used by the render
//! pipeline, so node chrome stays consistent across quality modes.

use egui::Color32;

/// Color palette for the editor canvas
#[derive(Debug, Clone)]
pub struct Colors {
    // Selection and highlighting
    pub selection: Color32,
    pub slot_highlight: Color32,
    pub slot_reject: Color32,

    // Node colors
    pub node_body: Color32,
    pub node_title: Color32,
    pub node_border: Color32,
    pub node_text: Color32,

    // Slot colors
    pub slot_input: Color32,
    pub slot_output: Color32,
    pub slot_border: Color32,

    // Background colors
    pub canvas_background: Color32,
    pub grid_line: Color32,

    // Link colors
    pub link_default: Color32,
    pub link_highlight: Color32,
    pub link_preview: Color32,
    pub link_flow_dot: Color32,

    // Group colors
    pub group_fill: Color32,
    pub group_title: Color32,

    // Overlay colors
    pub box_select_fill: Color32,
    pub box_select_border: Color32,

    // Widget colors
    pub widget_bg: Color32,
    pub widget_active: Color32,
    pub widget_text: Color32,
}

impl Colors {
    /// The default dark palette
    pub fn dark() -> Self {
        Self {
            selection: Color32::from_rgb(100, 150, 255),
            slot_highlight: Color32::from_rgb(120, 255, 170),
            slot_reject: Color32::from_rgb(255, 100, 100),

            node_body: Color32::from_rgb(64, 64, 64),
            node_title: Color32::from_rgb(46, 46, 46),
            node_border: Color32::from_rgb(38, 38, 38),
            node_text: Color32::WHITE,

            slot_input: Color32::from_rgb(70, 120, 90),
            slot_output: Color32::from_rgb(120, 70, 70),
            slot_border: Color32::from_rgb(0, 0, 0),

            canvas_background: Color32::from_rgb(28, 28, 28),
            grid_line: Color32::from_rgb(40, 40, 40),

            link_default: Color32::from_rgb(100, 110, 120),
            link_highlight: Color32::from_rgb(88, 166, 255),
            link_preview: Color32::from_rgb(100, 180, 255),
            link_flow_dot: Color32::from_rgb(255, 220, 120),

            group_fill: Color32::from_rgba_unmultiplied(80, 100, 120, 40),
            group_title: Color32::from_rgb(170, 180, 190),

            box_select_fill: Color32::from_rgba_unmultiplied(100, 150, 255, 30),
            box_select_border: Color32::from_rgb(100, 150, 255),

            widget_bg: Color32::from_rgb(50, 50, 50),
            widget_active: Color32::from_rgb(80, 110, 160),
            widget_text: Color32::from_rgb(220, 220, 220),
        }
    }
}

impl Default for Colors {
    fn default() -> Self {
        Self::dark()
    }
}
