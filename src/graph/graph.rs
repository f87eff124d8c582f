//! Graph container: node/link/group tables and structural mutations
//!
//! The editor core reaches the graph only through these operations; every
//! mutation keeps both endpoint slot lists consistent so no dangling link
//! id can survive a removal.

use std::collections::HashMap;

use egui::Pos2;

use crate::error::GraphError;
use crate::graph::group::{Group, GroupId};
use crate::graph::link::{Link, LinkId};
use crate::graph::node::{Node, NodeId};
use crate::graph::slot::types_compatible;

/// A graph of nodes, links and groups
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub nodes: HashMap<NodeId, Node>,
    pub links: HashMap<LinkId, Link>,
    pub groups: Vec<Group>,
    /// Paint order, back to front; hit-testing scans it front to back
    order: Vec<NodeId>,
    next_node_id: NodeId,
    next_link_id: LinkId,
    next_group_id: GroupId,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and returns its assigned id
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        let id = self.next_node_id;
        self.next_node_id += 1;
        node.id = id;
        self.nodes.insert(id, node);
        self.order.push(id);
        id
    }

    /// Removes a node together with every link touching it
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        let stale: Vec<LinkId> = self
            .links
            .values()
            .filter(|l| l.touches(node_id))
            .map(|l| l.id)
            .collect();
        for link_id in stale {
            self.remove_link(link_id);
        }
        self.order.retain(|&id| id != node_id);
        self.nodes.remove(&node_id)
    }

    /// Paint order, back to front
    pub fn draw_order(&self) -> &[NodeId] {
        &self.order
    }

    /// Moves a node to the front of the paint order
    pub fn bring_to_front(&mut self, node_id: NodeId) {
        if let Some(idx) = self.order.iter().position(|&id| id == node_id) {
            let id = self.order.remove(idx);
            self.order.push(id);
        }
    }

    /// Connects an output slot to an input slot, type-checked
    ///
    /// An occupied target input is disconnected first, preserving the
    /// one-link-per-input invariant. On any error both slots are left
    /// untouched.
    pub fn connect(
        &mut self,
        origin_node: NodeId,
        origin_slot: usize,
        target_node: NodeId,
        target_slot: usize,
    ) -> Result<LinkId, GraphError> {
        if origin_node == target_node {
            return Err(GraphError::SelfConnection);
        }
        let origin_ty = {
            let node = self
                .nodes
                .get(&origin_node)
                .ok_or(GraphError::MissingNode(origin_node))?;
            node.outputs
                .get(origin_slot)
                .ok_or(GraphError::MissingSlot {
                    node: origin_node,
                    slot: origin_slot,
                })?
                .ty
                .clone()
        };
        let target_ty = {
            let node = self
                .nodes
                .get(&target_node)
                .ok_or(GraphError::MissingNode(target_node))?;
            node.inputs
                .get(target_slot)
                .ok_or(GraphError::MissingSlot {
                    node: target_node,
                    slot: target_slot,
                })?
                .ty
                .clone()
        };
        if !types_compatible(&origin_ty, &target_ty) {
            return Err(GraphError::IncompatibleTypes {
                origin: origin_ty,
                target: target_ty,
            });
        }

        if let Some(existing) = self.nodes[&target_node].inputs[target_slot].link {
            self.remove_link(existing);
        }

        let id = self.next_link_id;
        self.next_link_id += 1;
        let link = Link::new(
            id,
            origin_node,
            origin_slot,
            target_node,
            target_slot,
            origin_ty,
        );
        self.links.insert(id, link);
        if let Some(node) = self.nodes.get_mut(&origin_node) {
            node.outputs[origin_slot].links.push(id);
        }
        if let Some(node) = self.nodes.get_mut(&target_node) {
            node.inputs[target_slot].link = Some(id);
        }
        log::debug!("connect {origin_node}:{origin_slot} -> {target_node}:{target_slot} (link {id})");
        Ok(id)
    }

    /// Removes a link from the table and from both endpoint slots
    pub fn remove_link(&mut self, link_id: LinkId) -> Option<Link> {
        let link = self.links.remove(&link_id)?;
        if let Some(node) = self.nodes.get_mut(&link.origin_node) {
            if let Some(slot) = node.outputs.get_mut(link.origin_slot) {
                slot.links.retain(|&id| id != link_id);
            }
        }
        if let Some(node) = self.nodes.get_mut(&link.target_node) {
            if let Some(slot) = node.inputs.get_mut(link.target_slot) {
                if slot.link == Some(link_id) {
                    slot.link = None;
                }
            }
        }
        Some(link)
    }

    /// Disconnects whatever feeds an input slot
    pub fn disconnect_input(&mut self, node_id: NodeId, slot: usize) -> Option<Link> {
        let link_id = self.nodes.get(&node_id)?.inputs.get(slot)?.link?;
        self.remove_link(link_id)
    }

    /// Disconnects every link leaving an output slot, returning them
    pub fn disconnect_output(&mut self, node_id: NodeId, slot: usize) -> Vec<Link> {
        let ids: Vec<LinkId> = self
            .nodes
            .get(&node_id)
            .and_then(|n| n.outputs.get(slot))
            .map(|s| s.links.clone())
            .unwrap_or_default();
        ids.into_iter()
            .filter_map(|id| self.remove_link(id))
            .collect()
    }

    /// Wildcard-aware type check, exposed for drag-time highlighting
    pub fn is_type_compatible(&self, origin_ty: &str, target_ty: &str) -> bool {
        types_compatible(origin_ty, target_ty)
    }

    /// Endpoint connector positions of a link, if both ends still exist
    pub fn link_endpoints(&self, link: &Link) -> Option<(Pos2, Pos2)> {
        let origin = self.nodes.get(&link.origin_node)?;
        let target = self.nodes.get(&link.target_node)?;
        if link.origin_slot >= origin.outputs.len() || link.target_slot >= target.inputs.len() {
            return None;
        }
        Some((
            origin.output_pos(link.origin_slot),
            target.input_pos(link.target_slot),
        ))
    }

    /// First input slot on a node compatible with the given origin type
    pub fn find_input_by_type(&self, node_id: NodeId, origin_ty: &str) -> Option<usize> {
        self.nodes
            .get(&node_id)?
            .inputs
            .iter()
            .position(|s| types_compatible(origin_ty, &s.ty))
    }

    /// First output slot on a node compatible with the given target type
    pub fn find_output_by_type(&self, node_id: NodeId, target_ty: &str) -> Option<usize> {
        self.nodes
            .get(&node_id)?
            .outputs
            .iter()
            .position(|s| types_compatible(&s.ty, target_ty))
    }

    /// Clones a node without its link bindings; the copy is not inserted
    pub fn clone_node(&self, node_id: NodeId) -> Option<Node> {
        let mut copy = self.nodes.get(&node_id)?.clone();
        for input in &mut copy.inputs {
            input.link = None;
        }
        for output in &mut copy.outputs {
            output.links.clear();
        }
        Some(copy)
    }

    /// Adds a group and returns its assigned id
    pub fn add_group(&mut self, mut group: Group) -> GroupId {
        let id = self.next_group_id;
        self.next_group_id += 1;
        group.id = id;
        self.groups.push(group);
        id
    }

    pub fn remove_group(&mut self, group_id: GroupId) -> Option<Group> {
        let idx = self.groups.iter().position(|g| g.id == group_id)?;
        Some(self.groups.remove(idx))
    }

    pub fn group_mut(&mut self, group_id: GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id == group_id)
    }

    pub fn group(&self, group_id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == group_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Pos2;

    fn two_number_nodes() -> (Graph, NodeId, NodeId) {
        let mut graph = Graph::new();
        let a = graph.add_node(Node::new("A", Pos2::new(0.0, 0.0)).with_output("out", "number"));
        let b = graph.add_node(
            Node::new("B", Pos2::new(300.0, 0.0)).with_input("in", "number"),
        );
        (graph, a, b)
    }

    #[test]
    fn test_connect_matching_types_succeeds() {
        let (mut graph, a, b) = two_number_nodes();
        let link = graph.connect(a, 0, b, 0).unwrap();
        assert_eq!(graph.nodes[&a].outputs[0].links, vec![link]);
        assert_eq!(graph.nodes[&b].inputs[0].link, Some(link));
        assert_eq!(graph.links[&link].ty, "number");
    }

    #[test]
    fn test_connect_mismatched_types_leaves_slots_unchanged() {
        let mut graph = Graph::new();
        let a = graph.add_node(Node::new("A", Pos2::ZERO).with_output("out", "number"));
        let b = graph.add_node(Node::new("B", Pos2::ZERO).with_input("in", "string"));
        let err = graph.connect(a, 0, b, 0).unwrap_err();
        assert!(matches!(err, GraphError::IncompatibleTypes { .. }));
        assert!(graph.nodes[&a].outputs[0].links.is_empty());
        assert!(graph.nodes[&b].inputs[0].link.is_none());
        assert!(graph.links.is_empty());
    }

    #[test]
    fn test_connect_replaces_occupied_input() {
        let mut graph = Graph::new();
        let a = graph.add_node(Node::new("A", Pos2::ZERO).with_output("out", "number"));
        let b = graph.add_node(Node::new("B", Pos2::ZERO).with_output("out", "number"));
        let c = graph.add_node(Node::new("C", Pos2::ZERO).with_input("in", "number"));
        let first = graph.connect(a, 0, c, 0).unwrap();
        let second = graph.connect(b, 0, c, 0).unwrap();
        assert!(!graph.links.contains_key(&first));
        assert_eq!(graph.nodes[&c].inputs[0].link, Some(second));
        assert!(graph.nodes[&a].outputs[0].links.is_empty());
    }

    #[test]
    fn test_connect_rejects_self_loop() {
        let mut graph = Graph::new();
        let a = graph.add_node(
            Node::new("A", Pos2::ZERO)
                .with_input("in", "number")
                .with_output("out", "number"),
        );
        assert_eq!(graph.connect(a, 0, a, 0), Err(GraphError::SelfConnection));
    }

    #[test]
    fn test_remove_node_clears_all_referencing_links() {
        let mut graph = Graph::new();
        let a = graph.add_node(Node::new("A", Pos2::ZERO).with_output("out", "number"));
        let mid = graph.add_node(
            Node::new("Mid", Pos2::ZERO)
                .with_input("in", "number")
                .with_output("out", "number"),
        );
        let c = graph.add_node(Node::new("C", Pos2::ZERO).with_input("in", "number"));
        graph.connect(a, 0, mid, 0).unwrap();
        graph.connect(mid, 0, c, 0).unwrap();

        graph.remove_node(mid);

        assert!(graph.links.is_empty());
        assert!(graph.nodes[&a].outputs[0].links.is_empty());
        assert!(graph.nodes[&c].inputs[0].link.is_none());
    }

    #[test]
    fn test_disconnect_output_removes_every_fanout_link() {
        let mut graph = Graph::new();
        let a = graph.add_node(Node::new("A", Pos2::ZERO).with_output("out", "number"));
        let b = graph.add_node(Node::new("B", Pos2::ZERO).with_input("in", "number"));
        let c = graph.add_node(Node::new("C", Pos2::ZERO).with_input("in", "number"));
        graph.connect(a, 0, b, 0).unwrap();
        graph.connect(a, 0, c, 0).unwrap();

        let removed = graph.disconnect_output(a, 0);
        assert_eq!(removed.len(), 2);
        assert!(graph.links.is_empty());
        assert!(graph.nodes[&b].inputs[0].link.is_none());
        assert!(graph.nodes[&c].inputs[0].link.is_none());
    }

    #[test]
    fn test_bring_to_front_reorders_paint_order() {
        let (mut graph, a, b) = two_number_nodes();
        assert_eq!(graph.draw_order(), &[a, b]);
        graph.bring_to_front(a);
        assert_eq!(graph.draw_order(), &[b, a]);
    }

    #[test]
    fn test_clone_node_strips_link_bindings() {
        let (mut graph, a, b) = two_number_nodes();
        graph.connect(a, 0, b, 0).unwrap();
        let copy = graph.clone_node(a).unwrap();
        assert!(copy.outputs[0].links.is_empty());
        let copy = graph.clone_node(b).unwrap();
        assert!(copy.inputs[0].link.is_none());
    }
}
