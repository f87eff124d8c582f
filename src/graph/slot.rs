//! Slot types and connection-type compatibility

use serde::{Deserialize, Serialize};

use crate::graph::link::LinkId;

/// Which side of a node a slot sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKind {
    Input,
    Output,
}

/// A typed connection point on the input side of a node
///
/// Holds at most one incoming link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSlot {
    pub name: String,
    pub ty: String,
    pub link: Option<LinkId>,
}

impl InputSlot {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            link: None,
        }
    }
}

/// A typed connection point on the output side of a node
///
/// Fans out to any number of links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSlot {
    pub name: String,
    pub ty: String,
    pub links: Vec<LinkId>,
}

impl OutputSlot {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            links: Vec::new(),
        }
    }
}

/// Checks whether an origin type tag may connect to a target type tag.
///
/// The empty string and `"*"` are wildcards that match anything. Tags are
/// compared case-insensitively. A tag may be a comma-separated union
/// (`"number,string"`); the connection is valid when any pair of members
/// matches. An `event` origin may additionally feed an `action` target.
pub fn types_compatible(origin: &str, target: &str) -> bool {
    let a = origin.trim();
    let b = target.trim();
    if a.is_empty() || a == "*" || b.is_empty() || b == "*" {
        return true;
    }

    if a.contains(',') || b.contains(',') {
        return a
            .split(',')
            .any(|ta| b.split(',').any(|tb| types_compatible(ta, tb)));
    }

    if a.eq_ignore_ascii_case(b) {
        return true;
    }

    a.eq_ignore_ascii_case("event") && b.eq_ignore_ascii_case("action")
}
