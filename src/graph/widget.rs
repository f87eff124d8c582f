//! Widget records embedded in a node's body
//!
//! Widgets are plain data here; their pointer state machines and drawing
//! live in the editor (`editor::widgets`). The graph never interprets
//! widget values.

use serde::{Deserialize, Serialize};

/// Closed set of widget kinds, each with its own parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WidgetKind {
    /// Momentary push button
    Button,
    /// Boolean toggle
    Toggle,
    /// Horizontal slider over a numeric range
    Slider { min: f32, max: f32 },
    /// Click-drag adjustable number
    Number { step: f32 },
    /// Drop-down choice; menu construction is external
    Combo { options: Vec<String> },
    /// Single-line text; editing UI is external
    Text,
}

/// Current value held by a widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WidgetValue {
    None,
    Number(f32),
    Bool(bool),
    Text(String),
    /// Index into a combo's options
    Choice(usize),
}

impl WidgetValue {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            WidgetValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            WidgetValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

/// One interactive row in a node body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Widget {
    pub name: String,
    pub kind: WidgetKind,
    pub value: WidgetValue,
}

impl Widget {
    pub fn new(name: impl Into<String>, kind: WidgetKind, value: WidgetValue) -> Self {
        Self {
            name: name.into(),
            kind,
            value,
        }
    }

    /// A slider initialized to the low end of its range
    pub fn slider(name: impl Into<String>, min: f32, max: f32, value: f32) -> Self {
        Self::new(
            name,
            WidgetKind::Slider { min, max },
            WidgetValue::Number(value.clamp(min, max)),
        )
    }

    pub fn toggle(name: impl Into<String>, on: bool) -> Self {
        Self::new(name, WidgetKind::Toggle, WidgetValue::Bool(on))
    }

    pub fn number(name: impl Into<String>, step: f32, value: f32) -> Self {
        Self::new(name, WidgetKind::Number { step }, WidgetValue::Number(value))
    }

    pub fn button(name: impl Into<String>) -> Self {
        Self::new(name, WidgetKind::Button, WidgetValue::None)
    }
}
