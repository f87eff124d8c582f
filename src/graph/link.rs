//! Link records and curve routing directions

use egui::{Color32, Pos2, Vec2};
use serde::{Deserialize, Serialize};

use crate::graph::node::NodeId;

/// Unique identifier for a link
pub type LinkId = usize;

/// Which way a link curve leaves or enters a connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit vector for the direction
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }
}

/// A typed edge from one output slot to one input slot
///
/// Links are created through [`crate::graph::Graph::connect`] only, which
/// registers the id on both endpoint slots; `midpoint` is refreshed by the
/// render pipeline and consumed by hit-testing and tooltips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub origin_node: NodeId,
    pub origin_slot: usize,
    pub target_node: NodeId,
    pub target_slot: usize,
    /// Resolved type tag, taken from the origin output at creation time
    pub ty: String,
    /// Cached t=0.5 point of the rendered curve, in graph space
    #[serde(skip, default = "zero_pos")]
    pub midpoint: Pos2,
    #[serde(skip)]
    pub color: Option<Color32>,
}

fn zero_pos() -> Pos2 {
    Pos2::ZERO
}

impl Link {
    pub fn new(
        id: LinkId,
        origin_node: NodeId,
        origin_slot: usize,
        target_node: NodeId,
        target_slot: usize,
        ty: impl Into<String>,
    ) -> Self {
        Self {
            id,
            origin_node,
            origin_slot,
            target_node,
            target_slot,
            ty: ty.into(),
            midpoint: Pos2::ZERO,
            color: None,
        }
    }

    /// Whether the traveling-dot animation applies to this link
    pub fn is_event(&self) -> bool {
        self.ty.eq_ignore_ascii_case("event")
    }

    /// True if the link touches the given node on either end
    pub fn touches(&self, node: NodeId) -> bool {
        self.origin_node == node || self.target_node == node
    }
}
