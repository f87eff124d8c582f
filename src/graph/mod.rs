//! Graph data model: nodes, slots, links, groups, events and clipboard
//!
//! The interaction and render subsystems treat this module as the
//! externally-owned graph service; they read geometry and topology and
//! request mutations through [`Graph`]'s operations.

pub mod clipboard;
pub mod event;
#[allow(clippy::module_inception)]
pub mod graph;
pub mod group;
pub mod link;
pub mod node;
pub mod slot;
pub mod widget;

pub use clipboard::ClipboardPayload;
pub use event::{EditorEvent, EventDispatch, EventKind, Handled};
pub use graph::Graph;
pub use group::{Group, GroupId};
pub use link::{Direction, Link, LinkId};
pub use node::{Node, NodeId, NodeShape};
pub use slot::{types_compatible, InputSlot, OutputSlot, SlotKind};
pub use widget::{Widget, WidgetKind, WidgetValue};
