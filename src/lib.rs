//! Nodeweave core library
//!
//! A canvas interaction and rendering engine for typed dataflow graph
//! editing: view transform, pointer gesture state machine, hit-testing,
//! selection, and a dual-layer dirty-rendering pipeline over egui.

pub mod constants;
pub mod editor;
pub mod error;
pub mod graph;
pub mod theme;

// Re-export commonly used types
pub use editor::{
    DirtyFlags, EditorConfig, Gesture, GraphEditor, QualityMode, SelectionModel, ViewTransform,
};
pub use error::{GestureError, GraphError};
pub use graph::{
    EditorEvent, EventDispatch, EventKind, Graph, Group, GroupId, Handled, Link, LinkId, Node,
    NodeId, NodeShape, Widget, WidgetKind, WidgetValue,
};
pub use theme::Colors;
