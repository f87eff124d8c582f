//! Typed event fan-out from the editor core to its host
//!
//! Replaces ad-hoc optional callbacks with a registry: an ordered handler
//! list per event kind plus one default handler. Handlers run in
//! registration order and dispatch stops at the first one that reports
//! the event handled.

use std::collections::HashMap;

use egui::{Pos2, Vec2};

use crate::graph::group::GroupId;
use crate::graph::link::LinkId;
use crate::graph::node::NodeId;
use crate::graph::widget::WidgetValue;

/// Everything the core notifies its host about
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    NodeMoved { node: NodeId, position: Pos2 },
    NodeResized { node: NodeId, size: Vec2 },
    NodeRaised { node: NodeId },
    NodeCollapsed { node: NodeId, collapsed: bool },
    NodesDeleted { nodes: Vec<NodeId> },
    NodesPasted { nodes: Vec<NodeId> },
    SelectionChanged { nodes: Vec<NodeId> },
    LinkCreated { link: LinkId },
    LinkRemoved { link: LinkId },
    /// A link drag released over empty space; hosts may offer quick-create
    LinkDropped { position: Pos2, ty: String },
    WidgetChanged {
        node: NodeId,
        widget: usize,
        old: WidgetValue,
        new: WidgetValue,
    },
    /// A combo widget was clicked; menu construction is the host's job
    ComboRequested { node: NodeId, widget: usize },
    /// A text widget was clicked; the editing UI is the host's job
    TextEditRequested { node: NodeId, widget: usize },
    GroupMoved { group: GroupId },
    GroupResized { group: GroupId },
    /// Double-click on empty canvas; hosts may open a node search dialog
    NodeSearchRequested { position: Pos2 },
}

/// Discriminant used to key handler registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    NodeMoved,
    NodeResized,
    NodeRaised,
    NodeCollapsed,
    NodesDeleted,
    NodesPasted,
    SelectionChanged,
    LinkCreated,
    LinkRemoved,
    LinkDropped,
    WidgetChanged,
    ComboRequested,
    TextEditRequested,
    GroupMoved,
    GroupResized,
    NodeSearchRequested,
}

impl EditorEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EditorEvent::NodeMoved { .. } => EventKind::NodeMoved,
            EditorEvent::NodeResized { .. } => EventKind::NodeResized,
            EditorEvent::NodeRaised { .. } => EventKind::NodeRaised,
            EditorEvent::NodeCollapsed { .. } => EventKind::NodeCollapsed,
            EditorEvent::NodesDeleted { .. } => EventKind::NodesDeleted,
            EditorEvent::NodesPasted { .. } => EventKind::NodesPasted,
            EditorEvent::SelectionChanged { .. } => EventKind::SelectionChanged,
            EditorEvent::LinkCreated { .. } => EventKind::LinkCreated,
            EditorEvent::LinkRemoved { .. } => EventKind::LinkRemoved,
            EditorEvent::LinkDropped { .. } => EventKind::LinkDropped,
            EditorEvent::WidgetChanged { .. } => EventKind::WidgetChanged,
            EditorEvent::ComboRequested { .. } => EventKind::ComboRequested,
            EditorEvent::TextEditRequested { .. } => EventKind::TextEditRequested,
            EditorEvent::GroupMoved { .. } => EventKind::GroupMoved,
            EditorEvent::GroupResized { .. } => EventKind::GroupResized,
            EditorEvent::NodeSearchRequested { .. } => EventKind::NodeSearchRequested,
        }
    }
}

/// Whether a handler consumed the event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Handled,
    Pass,
}

type Handler = Box<dyn FnMut(&EditorEvent) -> Handled>;

/// Ordered handler registry with a single default handler
pub struct EventDispatch {
    handlers: HashMap<EventKind, Vec<Handler>>,
}

impl Default for EventDispatch {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatch {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers a handler for one event kind, after existing ones
    pub fn on(&mut self, kind: EventKind, handler: impl FnMut(&EditorEvent) -> Handled + 'static) {
        self.handlers
            .entry(kind)
            .or_default()
            .push(Box::new(handler));
    }

    /// Dispatches in registration order, short-circuiting on `Handled`;
    /// falls through to the default handler when nobody claims the event
    pub fn emit(&mut self, event: EditorEvent) {
        if let Some(handlers) = self.handlers.get_mut(&event.kind()) {
            for handler in handlers.iter_mut() {
                if handler(&event) == Handled::Handled {
                    return;
                }
            }
        }
        Self::default_handler(&event);
    }

    fn default_handler(event: &EditorEvent) {
        log::debug!("unhandled editor event: {event:?}");
    }
}
