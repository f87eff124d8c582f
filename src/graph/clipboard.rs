//! Subgraph copy/paste payloads
//!
//! The payload is the serialization contract for clipboard traffic: a node
//! list plus links expressed with indices relative to that list. Links
//! leaving the copied set are dropped; pasting re-creates only internal
//! wiring.

use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};

use crate::graph::graph::Graph;
use crate::graph::node::{Node, NodeId};

/// A link between two entries of the payload's node list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadLink {
    pub origin_index: usize,
    pub origin_slot: usize,
    pub target_index: usize,
    pub target_slot: usize,
}

/// Self-contained subgraph snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardPayload {
    pub nodes: Vec<Node>,
    pub links: Vec<PayloadLink>,
}

impl ClipboardPayload {
    /// Top-left corner of the copied nodes, used to anchor pastes
    pub fn anchor(&self) -> Pos2 {
        let mut anchor = Pos2::new(f32::INFINITY, f32::INFINITY);
        for node in &self.nodes {
            anchor.x = anchor.x.min(node.position.x);
            anchor.y = anchor.y.min(node.position.y);
        }
        if anchor.x.is_finite() { anchor } else { Pos2::ZERO }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Serializes the given nodes and their internal links
///
/// Returns `None` when no listed node exists. Order follows the graph's
/// paint order so a paste restores stacking.
pub fn copy_nodes(graph: &Graph, ids: &[NodeId]) -> Option<ClipboardPayload> {
    let ordered: Vec<NodeId> = graph
        .draw_order()
        .iter()
        .copied()
        .filter(|id| ids.contains(id))
        .collect();
    if ordered.is_empty() {
        return None;
    }

    let nodes: Vec<Node> = ordered
        .iter()
        .filter_map(|&id| graph.clone_node(id))
        .collect();

    let index_of = |id: NodeId| ordered.iter().position(|&n| n == id);
    let mut links = Vec::new();
    for link in graph.links.values() {
        if let (Some(origin_index), Some(target_index)) =
            (index_of(link.origin_node), index_of(link.target_node))
        {
            links.push(PayloadLink {
                origin_index,
                origin_slot: link.origin_slot,
                target_index,
                target_slot: link.target_slot,
            });
        }
    }

    Some(ClipboardPayload { nodes, links })
}

/// Inserts the payload's nodes offset by `offset` and rewires its links
///
/// Returns the ids of the pasted nodes in payload order.
pub fn paste_nodes(graph: &mut Graph, payload: &ClipboardPayload, offset: Vec2) -> Vec<NodeId> {
    let mut new_ids = Vec::with_capacity(payload.nodes.len());
    for node in &payload.nodes {
        let mut copy = node.clone();
        for input in &mut copy.inputs {
            input.link = None;
        }
        for output in &mut copy.outputs {
            output.links.clear();
        }
        copy.translate(offset);
        new_ids.push(graph.add_node(copy));
    }

    for link in &payload.links {
        let (Some(&origin), Some(&target)) = (
            new_ids.get(link.origin_index),
            new_ids.get(link.target_index),
        ) else {
            continue;
        };
        if let Err(err) = graph.connect(origin, link.origin_slot, target, link.target_slot) {
            log::warn!("paste skipped link {link:?}: {err}");
        }
    }

    new_ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::Node;

    fn linked_pair() -> (Graph, NodeId, NodeId) {
        let mut graph = Graph::new();
        let a = graph.add_node(
            Node::new("Source", Pos2::new(10.0, 20.0)).with_output("out", "number"),
        );
        let b = graph.add_node(
            Node::new("Sink", Pos2::new(300.0, 20.0)).with_input("in", "number"),
        );
        graph.connect(a, 0, b, 0).unwrap();
        (graph, a, b)
    }

    #[test]
    fn test_copy_captures_internal_links_only() {
        let (mut graph, a, b) = linked_pair();
        let c = graph.add_node(Node::new("Other", Pos2::ZERO).with_input("in", "number"));
        graph.connect(a, 0, c, 0).unwrap();

        let payload = copy_nodes(&graph, &[a, b]).unwrap();
        assert_eq!(payload.nodes.len(), 2);
        // the a->c link crosses the copied boundary and is dropped
        assert_eq!(payload.links.len(), 1);
        assert_eq!(payload.links[0].origin_index, 0);
        assert_eq!(payload.links[0].target_index, 1);
    }

    #[test]
    fn test_paste_offsets_positions_and_rewires() {
        let (mut graph, a, b) = linked_pair();
        let payload = copy_nodes(&graph, &[a, b]).unwrap();
        let before_nodes = graph.nodes.len();
        let before_links = graph.links.len();

        let pasted = paste_nodes(&mut graph, &payload, Vec2::new(50.0, 60.0));

        assert_eq!(graph.nodes.len(), before_nodes + 2);
        assert_eq!(graph.links.len(), before_links + 1);
        assert_eq!(
            graph.nodes[&pasted[0]].position,
            Pos2::new(60.0, 80.0)
        );
        let link = graph.links.values().find(|l| l.origin_node == pasted[0]).unwrap();
        assert_eq!(link.target_node, pasted[1]);
    }

    #[test]
    fn test_payload_round_trips_through_json() {
        let (graph, a, b) = linked_pair();
        let payload = copy_nodes(&graph, &[a, b]).unwrap();
        let json = payload.to_json().unwrap();
        let restored = ClipboardPayload::from_json(&json).unwrap();
        assert_eq!(restored.nodes.len(), 2);
        assert_eq!(restored.links.len(), 1);
        assert_eq!(restored.anchor(), payload.anchor());
    }
}
