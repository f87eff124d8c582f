//! Node records and per-node geometry

use egui::{Color32, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::graph::slot::{InputSlot, OutputSlot, SlotKind};
use crate::graph::widget::Widget;

/// Unique identifier for a node
pub type NodeId = usize;

/// Closed set of node body shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeShape {
    Box,
    Round,
    Card,
}

/// A positioned, sized unit with typed input/output slots
///
/// The rect spans `position .. position + size` and includes the title bar
/// at the top; slot rows start below the title, widget rows below the
/// slots. Collapsed nodes shrink to a title-bar-only body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub title: String,
    #[serde(with = "pos2_serde")]
    pub position: Pos2,
    #[serde(with = "vec2_serde")]
    pub size: Vec2,
    pub inputs: Vec<InputSlot>,
    pub outputs: Vec<OutputSlot>,
    pub widgets: Vec<Widget>,
    pub collapsed: bool,
    pub resizable: bool,
    pub shape: NodeShape,
    #[serde(with = "color32_serde")]
    pub color: Color32,
}

impl Node {
    /// Creates a node with default size and chrome
    pub fn new(title: impl Into<String>, position: Pos2) -> Self {
        Self {
            id: 0,
            title: title.into(),
            position,
            size: Vec2::new(
                constants::node::DEFAULT_WIDTH,
                constants::node::TITLE_HEIGHT
                    + constants::node::SLOT_HEIGHT
                    + constants::node::BOTTOM_PADDING,
            ),
            inputs: Vec::new(),
            outputs: Vec::new(),
            widgets: Vec::new(),
            collapsed: false,
            resizable: true,
            shape: NodeShape::Round,
            color: Color32::from_rgb(60, 60, 60),
        }
    }

    /// Adds an input slot
    pub fn with_input(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.inputs.push(InputSlot::new(name, ty));
        self.fit_to_content();
        self
    }

    /// Adds an output slot
    pub fn with_output(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.outputs.push(OutputSlot::new(name, ty));
        self.fit_to_content();
        self
    }

    /// Adds a widget row below the slots
    pub fn with_widget(mut self, widget: Widget) -> Self {
        self.widgets.push(widget);
        self.fit_to_content();
        self
    }

    pub fn with_color(mut self, color: Color32) -> Self {
        self.color = color;
        self
    }

    pub fn with_shape(mut self, shape: NodeShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    /// Grows the node to at least its natural size
    pub fn fit_to_content(&mut self) {
        self.size = self.size.max(self.natural_size());
    }

    /// Minimum size that fits the title, slot rows and widget stack
    pub fn natural_size(&self) -> Vec2 {
        let title_w = self.title.len() as f32 * constants::node::TITLE_CHAR_WIDTH
            + 2.0 * constants::node::SLOT_INSET;
        let width = title_w.max(constants::node::MIN_WIDTH);

        let slot_rows = self.inputs.len().max(self.outputs.len()) as f32;
        // the padding keeps the bottom slot row clear of the resize corner
        let height = constants::node::TITLE_HEIGHT
            + slot_rows * constants::node::SLOT_HEIGHT
            + self.widgets.len() as f32
                * (constants::widget::HEIGHT + constants::widget::SPACING)
            + constants::node::BOTTOM_PADDING;
        Vec2::new(width, height)
    }

    /// Effective bounding box; collapsed nodes report the title bar only
    pub fn bounding_rect(&self) -> Rect {
        if self.collapsed {
            Rect::from_min_size(
                self.position,
                Vec2::new(
                    constants::node::COLLAPSED_WIDTH,
                    constants::node::TITLE_HEIGHT,
                ),
            )
        } else {
            Rect::from_min_size(self.position, self.size)
        }
    }

    /// The title band at the top of the body
    pub fn title_rect(&self) -> Rect {
        let width = if self.collapsed {
            constants::node::COLLAPSED_WIDTH
        } else {
            self.size.x
        };
        Rect::from_min_size(
            self.position,
            Vec2::new(width, constants::node::TITLE_HEIGHT),
        )
    }

    /// Point containment against the effective bounding box
    pub fn contains(&self, point: Pos2, margin: f32) -> bool {
        self.bounding_rect().expand(margin).contains(point)
    }

    /// The bottom-right resize corner, empty while collapsed
    pub fn resize_corner(&self) -> Rect {
        let br = self.position + self.size;
        Rect::from_min_max(
            br - Vec2::splat(constants::node::RESIZE_CORNER),
            br,
        )
    }

    /// Connector position for a slot, in graph space
    ///
    /// Inputs sit along the left edge, outputs along the right; collapsed
    /// nodes expose every connector at the middle of the matching title
    /// edge.
    pub fn slot_pos(&self, kind: SlotKind, index: usize) -> Pos2 {
        if self.collapsed {
            let y = self.position.y + constants::node::TITLE_HEIGHT * 0.5;
            return match kind {
                SlotKind::Input => Pos2::new(self.position.x, y),
                SlotKind::Output => {
                    Pos2::new(self.position.x + constants::node::COLLAPSED_WIDTH, y)
                }
            };
        }

        let y = self.position.y
            + constants::node::TITLE_HEIGHT
            + (index as f32 + 0.5) * constants::node::SLOT_HEIGHT;
        match kind {
            SlotKind::Input => Pos2::new(self.position.x + constants::node::SLOT_INSET, y),
            SlotKind::Output => {
                Pos2::new(self.position.x + self.size.x - constants::node::SLOT_INSET, y)
            }
        }
    }

    pub fn input_pos(&self, index: usize) -> Pos2 {
        self.slot_pos(SlotKind::Input, index)
    }

    pub fn output_pos(&self, index: usize) -> Pos2 {
        self.slot_pos(SlotKind::Output, index)
    }

    /// Y coordinate where the widget stack starts
    pub fn widgets_top(&self) -> f32 {
        self.position.y
            + constants::node::TITLE_HEIGHT
            + self.inputs.len().max(self.outputs.len()) as f32 * constants::node::SLOT_HEIGHT
            + constants::widget::SPACING
    }

    /// Screen-stacked rect of one widget row, in graph space
    pub fn widget_rect(&self, index: usize) -> Rect {
        let top = self.widgets_top()
            + index as f32 * (constants::widget::HEIGHT + constants::widget::SPACING);
        Rect::from_min_size(
            Pos2::new(self.position.x + constants::widget::MARGIN, top),
            Vec2::new(
                self.size.x - 2.0 * constants::widget::MARGIN,
                constants::widget::HEIGHT,
            ),
        )
    }

    /// Moves the node, ignoring non-finite deltas
    pub fn translate(&mut self, delta: Vec2) {
        if delta.x.is_finite() && delta.y.is_finite() {
            self.position += delta;
        }
    }

    /// Resizes toward `target`, clamped to the natural or free minimum
    pub fn resize_to(&mut self, target: Vec2, free_resize: bool) {
        let min = if free_resize {
            Vec2::new(constants::node::MIN_WIDTH, constants::node::TITLE_HEIGHT)
        } else {
            self.natural_size()
        };
        if target.x.is_finite() && target.y.is_finite() {
            self.size = target.max(min);
        }
    }
}

// Serde helpers for the egui math types, shaped like compact arrays
mod pos2_serde {
    use egui::Pos2;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(pos: &Pos2, serializer: S) -> Result<S::Ok, S::Error> {
        [pos.x, pos.y].serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pos2, D::Error> {
        let [x, y] = <[f32; 2]>::deserialize(deserializer)?;
        Ok(Pos2::new(x, y))
    }
}

mod vec2_serde {
    use egui::Vec2;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(vec: &Vec2, serializer: S) -> Result<S::Ok, S::Error> {
        [vec.x, vec.y].serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec2, D::Error> {
        let [x, y] = <[f32; 2]>::deserialize(deserializer)?;
        Ok(Vec2::new(x, y))
    }
}

mod color32_serde {
    use egui::Color32;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(color: &Color32, serializer: S) -> Result<S::Ok, S::Error> {
        color.to_array().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color32, D::Error> {
        let [r, g, b, a] = <[u8; 4]>::deserialize(deserializer)?;
        Ok(Color32::from_rgba_premultiplied(r, g, b, a))
    }
}
