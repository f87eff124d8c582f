//! Selection model: selected nodes, the active group, derived highlights

use std::collections::HashSet;

use egui::Rect;

use crate::graph::{Graph, GroupId, LinkId, NodeId};

/// Tracks which nodes are selected plus one optional active group
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    nodes: HashSet<NodeId>,
    active_group: Option<GroupId>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &HashSet<NodeId> {
        &self.nodes
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn active_group(&self) -> Option<GroupId> {
        self.active_group
    }

    /// Replaces the selection with a single node
    pub fn select_only(&mut self, node: NodeId) {
        self.nodes.clear();
        self.nodes.insert(node);
        self.active_group = None;
    }

    pub fn add(&mut self, node: NodeId) {
        self.nodes.insert(node);
    }

    pub fn remove(&mut self, node: NodeId) {
        self.nodes.remove(&node);
    }

    /// Adds or removes a node, for modifier-click semantics
    pub fn toggle(&mut self, node: NodeId) {
        if !self.nodes.remove(&node) {
            self.nodes.insert(node);
        }
    }

    pub fn set_active_group(&mut self, group: Option<GroupId>) {
        self.active_group = group;
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.active_group = None;
    }

    /// Drops ids that no longer exist in the graph
    pub fn prune(&mut self, graph: &Graph) {
        self.nodes.retain(|id| graph.nodes.contains_key(id));
        if let Some(group) = self.active_group {
            if graph.group(group).is_none() {
                self.active_group = None;
            }
        }
    }

    /// Selection in paint order, for deterministic copy payloads
    pub fn ordered(&self, graph: &Graph) -> Vec<NodeId> {
        graph
            .draw_order()
            .iter()
            .copied()
            .filter(|id| self.nodes.contains(id))
            .collect()
    }

    /// Links touching any selected node
    pub fn highlighted_links(&self, graph: &Graph) -> HashSet<LinkId> {
        graph
            .links
            .values()
            .filter(|link| {
                self.nodes.contains(&link.origin_node) || self.nodes.contains(&link.target_node)
            })
            .map(|link| link.id)
            .collect()
    }

    /// Union of selected node bounding boxes
    pub fn bounding_rect(&self, graph: &Graph) -> Option<Rect> {
        let mut rect: Option<Rect> = None;
        for id in &self.nodes {
            if let Some(node) = graph.nodes.get(id) {
                let bounds = node.bounding_rect();
                rect = Some(match rect {
                    Some(acc) => acc.union(bounds),
                    None => bounds,
                });
            }
        }
        rect
    }
}
