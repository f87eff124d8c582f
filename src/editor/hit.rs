//! Hit-testing over graph geometry
//!
//! Pure functions of the current geometry, all in graph space; repeated
//! calls within one frame agree. Paint order decides ties: nodes are
//! scanned topmost-first, groups last-declared-first.

use egui::{Pos2, Rect, Vec2};

use crate::constants;
use crate::graph::{Graph, GroupId, LinkId, NodeId, SlotKind};

/// A slot identified during hit-testing or a link drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRef {
    pub node: NodeId,
    pub index: usize,
    pub kind: SlotKind,
}

/// Topmost node whose expanded bounding box contains `point`
pub fn node_at(graph: &Graph, point: Pos2, tolerance: f32) -> Option<NodeId> {
    graph
        .draw_order()
        .iter()
        .rev()
        .copied()
        .find(|id| {
            graph
                .nodes
                .get(id)
                .is_some_and(|node| node.contains(point, tolerance))
        })
}

/// Slot connector under `point` on one node, scanning the requested side
pub fn slot_at(graph: &Graph, node_id: NodeId, point: Pos2, kind: SlotKind) -> Option<SlotRef> {
    let node = graph.nodes.get(&node_id)?;
    let count = match kind {
        SlotKind::Input => node.inputs.len(),
        SlotKind::Output => node.outputs.len(),
    };
    for index in 0..count {
        let center = node.slot_pos(kind, index);
        let region = Rect::from_center_size(
            center,
            Vec2::new(
                2.0 * constants::hit::SLOT_HALF_WIDTH,
                2.0 * constants::hit::SLOT_HALF_HEIGHT,
            ),
        );
        if region.contains(point) {
            return Some(SlotRef { node: node_id, index, kind });
        }
    }
    None
}

/// Either-side slot under `point`, outputs checked first
pub fn any_slot_at(graph: &Graph, node_id: NodeId, point: Pos2) -> Option<SlotRef> {
    slot_at(graph, node_id, point, SlotKind::Output)
        .or_else(|| slot_at(graph, node_id, point, SlotKind::Input))
}

/// Slot under `point` on any node, topmost node first
pub fn slot_anywhere(graph: &Graph, point: Pos2) -> Option<SlotRef> {
    // connectors stick out past the body, so search with slot tolerance
    let node = node_at(graph, point, constants::hit::SLOT_HALF_WIDTH)?;
    any_slot_at(graph, node, point)
}

/// True when `point` is inside the node's resize corner
pub fn resize_corner_at(graph: &Graph, node_id: NodeId, point: Pos2) -> bool {
    graph
        .nodes
        .get(&node_id)
        .is_some_and(|node| !node.collapsed && node.resize_corner().contains(point))
}

/// Link whose cached midpoint lies within the hit radius of `point`
pub fn link_at(graph: &Graph, point: Pos2) -> Option<LinkId> {
    graph
        .links
        .values()
        .filter(|link| (link.midpoint - point).length() <= constants::hit::LINK_RADIUS)
        .min_by(|a, b| {
            let da = (a.midpoint - point).length();
            let db = (b.midpoint - point).length();
            da.total_cmp(&db)
        })
        .map(|link| link.id)
}

/// Group containing `point`; the last-declared group wins
pub fn group_at(graph: &Graph, point: Pos2) -> Option<GroupId> {
    graph
        .groups
        .iter()
        .rev()
        .find(|group| group.contains(point))
        .map(|group| group.id)
}

/// Widget row under `point` on a node
///
/// Narrows by the node's horizontal bounds first, then walks the stacked
/// rows in order; collapsed nodes expose no widgets.
pub fn widget_at(graph: &Graph, node_id: NodeId, point: Pos2) -> Option<usize> {
    let node = graph.nodes.get(&node_id)?;
    if node.collapsed
        || point.x < node.position.x
        || point.x > node.position.x + node.size.x
    {
        return None;
    }
    (0..node.widgets.len()).find(|&index| node.widget_rect(index).contains(point))
}
