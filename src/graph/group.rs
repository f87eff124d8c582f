//! Visual groups with snapshot-based node membership

use egui::{Color32, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::graph::node::{Node, NodeId};

/// Unique identifier for a group
pub type GroupId = usize;

/// A rectangular region that visually gathers nodes
///
/// Membership is a point-in-time snapshot: `recompute_members` captures the
/// nodes whose bounding boxes lie inside the group at that moment, and a
/// group drag moves exactly that snapshot. There is no live parent/child
/// relationship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub title: String,
    #[serde(with = "rect_serde")]
    pub bounds: Rect,
    #[serde(with = "color_serde")]
    pub color: Color32,
    /// Captured at gesture start, cleared when the gesture commits
    #[serde(skip)]
    pub members: Vec<NodeId>,
}

impl Group {
    pub fn new(id: GroupId, title: impl Into<String>, bounds: Rect) -> Self {
        let mut group = Self {
            id,
            title: title.into(),
            bounds,
            color: Color32::from_rgb(80, 100, 120),
            members: Vec::new(),
        };
        group.clamp_size();
        group
    }

    /// Enforces the minimum group footprint
    pub fn clamp_size(&mut self) {
        let size = self.bounds.size().max(Vec2::new(
            constants::group::MIN_WIDTH,
            constants::group::MIN_HEIGHT,
        ));
        self.bounds = Rect::from_min_size(self.bounds.min, size);
    }

    /// Snapshots the nodes fully contained in the group bounds
    pub fn recompute_members<'a>(&mut self, nodes: impl Iterator<Item = &'a Node>) {
        self.members.clear();
        for node in nodes {
            if self.bounds.contains_rect(node.bounding_rect()) {
                self.members.push(node.id);
            }
        }
    }

    /// Moves the group; callers move the member snapshot alongside
    pub fn translate(&mut self, delta: Vec2) {
        if delta.x.is_finite() && delta.y.is_finite() {
            self.bounds = self.bounds.translate(delta);
        }
    }

    /// Resizes toward `corner` (graph space), clamped to the minimum
    pub fn resize_to(&mut self, corner: Pos2) {
        if corner.x.is_finite() && corner.y.is_finite() {
            self.bounds = Rect::from_min_max(self.bounds.min, corner.max(self.bounds.min));
            self.clamp_size();
        }
    }

    pub fn contains(&self, point: Pos2) -> bool {
        self.bounds.contains(point)
    }

    /// The bottom-right triangular resize affordance
    pub fn resize_corner_contains(&self, point: Pos2) -> bool {
        let br = self.bounds.max;
        let c = constants::group::RESIZE_CORNER;
        let local = point - br + Vec2::splat(c);
        // triangle below the diagonal of the corner square
        local.x >= 0.0 && local.y >= 0.0 && local.x + local.y >= c
    }

    pub fn title_rect(&self) -> Rect {
        Rect::from_min_size(
            self.bounds.min,
            Vec2::new(self.bounds.width(), constants::group::TITLE_HEIGHT),
        )
    }
}

mod rect_serde {
    use egui::{Pos2, Rect};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(rect: &Rect, serializer: S) -> Result<S::Ok, S::Error> {
        [rect.min.x, rect.min.y, rect.max.x, rect.max.y].serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rect, D::Error> {
        let [x0, y0, x1, y1] = <[f32; 4]>::deserialize(deserializer)?;
        Ok(Rect::from_min_max(Pos2::new(x0, y0), Pos2::new(x1, y1)))
    }
}

mod color_serde {
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
