//! Widget pointer protocol
//!
//! Each widget kind runs its own small state machine across
//! pointer-down/move/up. The editor latches the widget hit at
//! pointer-down and keeps forwarding moves to it until release, so
//! sliders and number drags survive the pointer leaving their rect.

use egui::{Pos2, Rect};

use crate::graph::{Widget, WidgetKind, WidgetValue};

/// Outcome of feeding a pointer event to a widget
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetResponse {
    /// The widget committed a new value
    ValueChanged { old: WidgetValue, new: WidgetValue },
    /// A combo wants its option menu opened by the host
    ComboRequested,
    /// A text widget wants its editing UI opened by the host
    TextEditRequested,
}

/// Latched per-gesture widget state
#[derive(Debug, Clone)]
pub struct WidgetDrag {
    /// Value when the gesture began, for click-vs-drag decisions
    pub start_value: WidgetValue,
    pub last_x: f32,
    pub moved: bool,
}

/// Pointer-down on a widget; returns the latch plus an immediate response
pub fn pointer_down(widget: &mut Widget, rect: Rect, pos: Pos2) -> (WidgetDrag, Option<WidgetResponse>) {
    let drag = WidgetDrag {
        start_value: widget.value.clone(),
        last_x: pos.x,
        moved: false,
    };
    let response = match widget.kind {
        // sliders jump to the pressed position right away
        WidgetKind::Slider { min, max } => set_number(widget, slider_value(rect, pos, min, max)),
        _ => None,
    };
    (drag, response)
}

/// Pointer-move while the widget is latched
pub fn pointer_move(
    widget: &mut Widget,
    drag: &mut WidgetDrag,
    rect: Rect,
    pos: Pos2,
) -> Option<WidgetResponse> {
    let dx = pos.x - drag.last_x;
    if dx != 0.0 {
        drag.moved = true;
    }
    drag.last_x = pos.x;
    match widget.kind {
        WidgetKind::Slider { min, max } => set_number(widget, slider_value(rect, pos, min, max)),
        WidgetKind::Number { step } => {
            let current = widget.value.as_number().unwrap_or(0.0);
            set_number(widget, current + dx * step)
        }
        _ => None,
    }
}

/// Pointer-up ends the latch; click-style widgets commit here
pub fn pointer_up(widget: &mut Widget, drag: &WidgetDrag, rect: Rect, pos: Pos2) -> Option<WidgetResponse> {
    let released_inside = rect.contains(pos);
    match widget.kind {
        WidgetKind::Toggle if released_inside => {
            let old = widget.value.clone();
            let flipped = !widget.value.as_bool().unwrap_or(false);
            widget.value = WidgetValue::Bool(flipped);
            Some(WidgetResponse::ValueChanged { old, new: widget.value.clone() })
        }
        // buttons are momentary; the "value" is the activation itself
        WidgetKind::Button if released_inside => Some(WidgetResponse::ValueChanged {
            old: WidgetValue::None,
            new: WidgetValue::None,
        }),
        WidgetKind::Combo { .. } if released_inside && !drag.moved => {
            Some(WidgetResponse::ComboRequested)
        }
        WidgetKind::Text if released_inside && !drag.moved => {
            Some(WidgetResponse::TextEditRequested)
        }
        _ => None,
    }
}

fn slider_value(rect: Rect, pos: Pos2, min: f32, max: f32) -> f32 {
    let span = rect.width().max(1.0);
    let ratio = ((pos.x - rect.left()) / span).clamp(0.0, 1.0);
    min + ratio * (max - min)
}

fn set_number(widget: &mut Widget, value: f32) -> Option<WidgetResponse> {
    let clamped = match widget.kind {
        WidgetKind::Slider { min, max } => value.clamp(min, max),
        _ => value,
    };
    let old = widget.value.clone();
    if old.as_number() == Some(clamped) {
        return None;
    }
    widget.value = WidgetValue::Number(clamped);
    Some(WidgetResponse::ValueChanged { old, new: widget.value.clone() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Vec2;

    fn row() -> Rect {
        Rect::from_min_size(Pos2::new(0.0, 0.0), Vec2::new(100.0, 20.0))
    }

    #[test]
    fn test_slider_jumps_to_press_position() {
        let mut widget = Widget::slider("gain", 0.0, 2.0, 0.0);
        let (_drag, response) = pointer_down(&mut widget, row(), Pos2::new(50.0, 10.0));
        assert_eq!(widget.value, WidgetValue::Number(1.0));
        assert!(matches!(response, Some(WidgetResponse::ValueChanged { .. })));
    }

    #[test]
    fn test_slider_clamps_to_range_during_drag() {
        let mut widget = Widget::slider("gain", 0.0, 2.0, 1.0);
        let (mut drag, _) = pointer_down(&mut widget, row(), Pos2::new(50.0, 10.0));
        pointer_move(&mut widget, &mut drag, row(), Pos2::new(500.0, 10.0));
        assert_eq!(widget.value, WidgetValue::Number(2.0));
        pointer_move(&mut widget, &mut drag, row(), Pos2::new(-500.0, 10.0));
        assert_eq!(widget.value, WidgetValue::Number(0.0));
    }

    #[test]
    fn test_number_accumulates_step_per_pixel() {
        let mut widget = Widget::number("count", 0.5, 10.0);
        let (mut drag, _) = pointer_down(&mut widget, row(), Pos2::new(10.0, 10.0));
        pointer_move(&mut widget, &mut drag, row(), Pos2::new(30.0, 10.0));
        assert_eq!(widget.value, WidgetValue::Number(20.0));
        pointer_move(&mut widget, &mut drag, row(), Pos2::new(20.0, 10.0));
        assert_eq!(widget.value, WidgetValue::Number(15.0));
    }

    #[test]
    fn test_toggle_flips_on_release_inside_only() {
        let mut widget = Widget::toggle("mute", false);
        let (drag, _) = pointer_down(&mut widget, row(), Pos2::new(10.0, 10.0));
        // released outside: no change
        assert_eq!(pointer_up(&mut widget, &drag, row(), Pos2::new(300.0, 10.0)), None);
        assert_eq!(widget.value, WidgetValue::Bool(false));
        // released inside: flips
        let response = pointer_up(&mut widget, &drag, row(), Pos2::new(10.0, 10.0));
        assert_eq!(widget.value, WidgetValue::Bool(true));
        assert!(matches!(response, Some(WidgetResponse::ValueChanged { .. })));
    }

    #[test]
    fn test_combo_requests_menu_on_click() {
        let mut widget = Widget::new(
            "mode",
            WidgetKind::Combo { options: vec!["a".into(), "b".into()] },
            WidgetValue::Choice(0),
        );
        let (drag, _) = pointer_down(&mut widget, row(), Pos2::new(10.0, 10.0));
        let response = pointer_up(&mut widget, &drag, row(), Pos2::new(10.0, 10.0));
        assert_eq!(response, Some(WidgetResponse::ComboRequested));
    }

    #[test]
    fn test_unchanged_value_emits_nothing() {
        let mut widget = Widget::slider("gain", 0.0, 2.0, 1.0);
        let (mut drag, first) = pointer_down(&mut widget, row(), Pos2::new(50.0, 10.0));
        assert!(first.is_none(), "press at current value should not re-commit");
        assert!(pointer_move(&mut widget, &mut drag, row(), Pos2::new(50.0, 12.0)).is_none());
    }
}
