//! Error taxonomy for graph mutations and gesture handling
//!
//! Every condition here is recoverable: rejected operations are inert
//! no-ops and the interaction state machine always returns to idle.

use thiserror::Error;

/// Errors produced by structural graph mutations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("node {0} does not exist")]
    MissingNode(usize),

    #[error("slot {slot} does not exist on node {node}")]
    MissingSlot { node: usize, slot: usize },

    #[error("link {0} does not exist")]
    MissingLink(usize),

    #[error("cannot connect a node to itself")]
    SelfConnection,

    #[error("incompatible slot types: {origin:?} -> {target:?}")]
    IncompatibleTypes { origin: String, target: String },
}

/// Errors detected while a gesture is in flight
///
/// Degenerate transform requests (zoom outside the clamp range) never
/// surface here; the view transform clamps them at the source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GestureError {
    /// The gesture does not apply to its target (resize on a fixed node)
    #[error("gesture not applicable: {0}")]
    InvalidGesture(&'static str),

    /// A transient reference went stale mid-gesture
    #[error("stale reference: {0}")]
    DanglingReference(&'static str),
}
