//! Pointer/keyboard interaction state machine
//!
//! One gesture at a time, driven by the primary pointer stream. Every
//! transient reference held by a gesture is an id that gets re-validated
//! against the graph on each move/up step; staleness drops the gesture
//! back to idle instead of dereferencing.

use std::time::{Duration, Instant};

use egui::{Modifiers, PointerButton, Pos2, Rect, Vec2};

use crate::constants;
use crate::editor::hit::{self, SlotRef};
use crate::error::GestureError;
use crate::editor::render::DirtyFlags;
use crate::editor::selection::SelectionModel;
use crate::editor::view::ViewTransform;
use crate::editor::widgets::{self, WidgetDrag, WidgetResponse};
use crate::graph::clipboard::{self, ClipboardPayload};
use crate::graph::{
    types_compatible, EditorEvent, EventDispatch, Graph, GroupId, NodeId, SlotKind,
};

/// Editor behavior switches, passed explicitly instead of read from
/// ambient global state
#[derive(Debug, Clone)]
pub struct EditorConfig {
    pub allow_panning: bool,
    pub snap_to_grid: bool,
    pub grid_size: f32,
    pub show_grid: bool,
    /// Allow shrinking nodes below their natural size
    pub free_resize: bool,
    /// Dragging a connected input detaches the link and re-roots the drag
    pub break_link_on_input_drag: bool,
    /// Deleting a node reconnects its first input source to its first
    /// output's first target when types allow
    pub auto_splice_on_delete: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            allow_panning: true,
            snap_to_grid: false,
            grid_size: constants::grid::SIZE,
            show_grid: true,
            free_resize: false,
            break_link_on_input_drag: true,
            auto_splice_on_delete: true,
        }
    }
}

/// Everything a gesture step may touch, borrowed from the editor
pub struct EditorCtx<'a> {
    pub graph: &'a mut Graph,
    pub selection: &'a mut SelectionModel,
    pub view: &'a mut ViewTransform,
    pub events: &'a mut EventDispatch,
    pub dirty: &'a mut DirtyFlags,
    pub config: &'a EditorConfig,
}

/// One pointer sample, pre-translated by the view transform
#[derive(Debug, Clone, Copy)]
pub struct PointerInput {
    pub screen: Pos2,
    pub graph: Pos2,
    pub modifiers: Modifiers,
}

/// Where a link drag is rooted
#[derive(Debug, Clone)]
pub enum LinkDragSource {
    /// Loose end seeks an input
    FromOutput { node: NodeId, slot: usize },
    /// Loose end seeks an output
    FromInput { node: NodeId, slot: usize },
    /// Detached link bundle seeks a new shared output
    MovingToInputs { targets: Vec<(NodeId, usize)> },
}

/// In-flight link drag state
#[derive(Debug, Clone)]
pub struct LinkDrag {
    pub source: LinkDragSource,
    /// Type tag of the dragged endpoint, for compatibility highlighting
    pub ty: String,
    pub pos: Pos2,
    pub highlight: Option<SlotRef>,
}

/// The current gesture; states are mutually exclusive
#[derive(Debug, Clone)]
pub enum Gesture {
    Idle,
    PanningView { last_screen: Pos2 },
    DraggingNodes { last: Pos2, moved: bool },
    DraggingLink(LinkDrag),
    ResizingNode { node: NodeId },
    BoxSelecting { anchor: Pos2, current: Pos2 },
    DraggingGroup { group: GroupId, last: Pos2 },
    ResizingGroup { group: GroupId },
    OperatingWidget { node: NodeId, widget: usize, drag: WidgetDrag },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }
}

const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);
const DOUBLE_CLICK_SLOP: f32 = 8.0;

/// The pointer/keyboard state machine
pub struct InteractionController {
    gesture: Gesture,
    last_click: Option<(Instant, Pos2)>,
    /// Last pointer position in graph space, used to anchor pastes
    pointer_graph: Pos2,
    clipboard: Option<ClipboardPayload>,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self {
            gesture: Gesture::Idle,
            last_click: None,
            pointer_graph: Pos2::ZERO,
            clipboard: None,
        }
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn pointer_graph(&self) -> Pos2 {
        self.pointer_graph
    }

    pub fn has_clipboard(&self) -> bool {
        self.clipboard.is_some()
    }

    // === Pointer entry points ===

    pub fn pointer_down(&mut self, ctx: &mut EditorCtx, input: PointerInput, button: PointerButton) {
        self.pointer_graph = input.graph;

        // only the primary stream drives gestures
        if !self.gesture.is_idle() {
            return;
        }

        if button == PointerButton::Middle {
            if ctx.config.allow_panning {
                self.gesture = Gesture::PanningView { last_screen: input.screen };
            }
            return;
        }
        if button != PointerButton::Primary {
            return;
        }

        let double_click = self.register_click(input.graph);
        let pos = input.graph;
        let multi = input.modifiers.ctrl || input.modifiers.command;

        if let Some(node_id) = hit::node_at(ctx.graph, pos, 0.0) {
            if double_click && self.on_title(ctx.graph, node_id, pos) {
                self.toggle_collapse(ctx, node_id);
                return;
            }
            self.pointer_down_on_node(ctx, node_id, pos, input.modifiers);
            return;
        }

        // connectors overhang the body, so slots get a second chance
        if let Some(slot) = hit::slot_anywhere(ctx.graph, pos) {
            self.start_link_drag(ctx, slot, pos, input.modifiers);
            return;
        }

        if multi {
            self.gesture = Gesture::BoxSelecting { anchor: pos, current: pos };
            ctx.dirty.foreground = true;
            return;
        }

        if let Some(group_id) = hit::group_at(ctx.graph, pos) {
            self.pointer_down_on_group(ctx, group_id, pos);
            return;
        }

        if double_click {
            ctx.events.emit(EditorEvent::NodeSearchRequested { position: pos });
            return;
        }

        // empty space: drop the selection, then pan if allowed
        if !ctx.selection.is_empty() {
            ctx.selection.clear();
            self.emit_selection_changed(ctx);
            ctx.dirty.foreground = true;
        }
        if ctx.config.allow_panning {
            self.gesture = Gesture::PanningView { last_screen: input.screen };
        }
    }

    fn pointer_down_on_node(
        &mut self,
        ctx: &mut EditorCtx,
        node_id: NodeId,
        pos: Pos2,
        modifiers: Modifiers,
    ) {
        let multi = modifiers.ctrl || modifiers.command;

        if hit::resize_corner_at(ctx.graph, node_id, pos) {
            if ctx.graph.nodes.get(&node_id).is_some_and(|n| n.resizable) {
                self.gesture = Gesture::ResizingNode { node: node_id };
                return;
            }
            // ignored, the click falls through to a plain node drag
            log::debug!("{}", GestureError::InvalidGesture("resize on fixed-size node"));
        }

        if let Some(slot) = hit::any_slot_at(ctx.graph, node_id, pos) {
            self.start_link_drag(ctx, slot, pos, modifiers);
            return;
        }

        if let Some(widget) = hit::widget_at(ctx.graph, node_id, pos) {
            self.start_widget_gesture(ctx, node_id, widget, pos);
            return;
        }

        // plain body: adjust selection, raise, then drag
        if multi {
            ctx.selection.toggle(node_id);
            self.emit_selection_changed(ctx);
            ctx.dirty.foreground = true;
            return;
        }
        if !ctx.selection.contains(node_id) {
            ctx.selection.select_only(node_id);
            self.emit_selection_changed(ctx);
        }
        ctx.graph.bring_to_front(node_id);
        ctx.events.emit(EditorEvent::NodeRaised { node: node_id });
        ctx.dirty.foreground = true;
        self.gesture = Gesture::DraggingNodes { last: pos, moved: false };
    }

    fn pointer_down_on_group(&mut self, ctx: &mut EditorCtx, group_id: GroupId, pos: Pos2) {
        let Some(group) = ctx.graph.group(group_id) else {
            return;
        };
        if group.resize_corner_contains(pos) {
            self.gesture = Gesture::ResizingGroup { group: group_id };
            return;
        }
        // membership snapshot happens at gesture start, not live
        let nodes: Vec<_> = ctx.graph.nodes.values().cloned().collect();
        if let Some(group) = ctx.graph.group_mut(group_id) {
            group.recompute_members(nodes.iter());
        }
        ctx.selection.set_active_group(Some(group_id));
        self.gesture = Gesture::DraggingGroup { group: group_id, last: pos };
    }

    fn start_link_drag(
        &mut self,
        ctx: &mut EditorCtx,
        slot: SlotRef,
        pos: Pos2,
        modifiers: Modifiers,
    ) {
        let drag = match slot.kind {
            SlotKind::Output => {
                let Some(node) = ctx.graph.nodes.get(&slot.node) else { return };
                let output = &node.outputs[slot.index];
                if modifiers.shift && !output.links.is_empty() {
                    // detach the whole fan-out and re-root at its targets
                    let removed = ctx.graph.disconnect_output(slot.node, slot.index);
                    let targets: Vec<_> = removed
                        .iter()
                        .map(|l| (l.target_node, l.target_slot))
                        .collect();
                    for link in &removed {
                        ctx.events.emit(EditorEvent::LinkRemoved { link: link.id });
                    }
                    ctx.dirty.background = true;
                    LinkDrag {
                        ty: removed
                            .first()
                            .map(|l| l.ty.clone())
                            .unwrap_or_default(),
                        source: LinkDragSource::MovingToInputs { targets },
                        pos,
                        highlight: None,
                    }
                } else {
                    LinkDrag {
                        ty: output.ty.clone(),
                        source: LinkDragSource::FromOutput { node: slot.node, slot: slot.index },
                        pos,
                        highlight: None,
                    }
                }
            }
            SlotKind::Input => {
                let existing = ctx
                    .graph
                    .nodes
                    .get(&slot.node)
                    .and_then(|n| n.inputs.get(slot.index))
                    .and_then(|s| s.link);
                if let (Some(link_id), true) = (existing, ctx.config.break_link_on_input_drag) {
                    // move the existing link: detach and re-root at its origin
                    let Some(link) = ctx.graph.remove_link(link_id) else { return };
                    ctx.events.emit(EditorEvent::LinkRemoved { link: link.id });
                    ctx.dirty.background = true;
                    LinkDrag {
                        ty: link.ty.clone(),
                        source: LinkDragSource::FromOutput {
                            node: link.origin_node,
                            slot: link.origin_slot,
                        },
                        pos,
                        highlight: None,
                    }
                } else {
                    let Some(node) = ctx.graph.nodes.get(&slot.node) else { return };
                    LinkDrag {
                        ty: node.inputs[slot.index].ty.clone(),
                        source: LinkDragSource::FromInput { node: slot.node, slot: slot.index },
                        pos,
                        highlight: None,
                    }
                }
            }
        };
        ctx.dirty.foreground = true;
        self.gesture = Gesture::DraggingLink(drag);
    }

    fn start_widget_gesture(&mut self, ctx: &mut EditorCtx, node_id: NodeId, index: usize, pos: Pos2) {
        let Some(node) = ctx.graph.nodes.get_mut(&node_id) else { return };
        let rect = node.widget_rect(index);
        let Some(widget) = node.widgets.get_mut(index) else { return };
        let (drag, response) = widgets::pointer_down(widget, rect, pos);
        emit_widget_response(ctx, node_id, index, response);
        ctx.dirty.foreground = true;
        self.gesture = Gesture::OperatingWidget { node: node_id, widget: index, drag };
    }

    pub fn pointer_move(&mut self, ctx: &mut EditorCtx, input: PointerInput) {
        self.pointer_graph = input.graph;
        let pos = input.graph;

        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::PanningView { last_screen } => {
                let delta = input.screen - *last_screen;
                *last_screen = input.screen;
                ctx.view.pan(delta);
                ctx.dirty.mark_all();
            }
            Gesture::DraggingNodes { last, moved } => {
                let delta = pos - *last;
                *last = pos;
                *moved = true;
                ctx.selection.prune(ctx.graph);
                let ids = ctx.selection.ordered(ctx.graph);
                if ids.is_empty() {
                    // everything we were dragging disappeared mid-gesture
                    self.gesture = Gesture::Idle;
                    return;
                }
                let mut links_moved = false;
                for id in ids {
                    if let Some(node) = ctx.graph.nodes.get_mut(&id) {
                        node.translate(delta);
                        links_moved |= node.inputs.iter().any(|s| s.link.is_some())
                            || node.outputs.iter().any(|s| !s.links.is_empty());
                        ctx.events.emit(EditorEvent::NodeMoved { node: id, position: node.position });
                    }
                }
                // the link network underneath is reused unless an
                // endpoint actually moved
                ctx.dirty.foreground = true;
                if links_moved {
                    ctx.dirty.background = true;
                }
            }
            Gesture::DraggingLink(drag) => {
                drag.pos = pos;
                let highlight = match hit::slot_anywhere(ctx.graph, pos) {
                    Some(slot) if candidate_compatible(ctx.graph, drag, slot) => Some(slot),
                    _ => None,
                };
                drag.highlight = highlight;
                ctx.dirty.foreground = true;
            }
            Gesture::ResizingNode { node } => {
                let node_id = *node;
                let Some(node) = ctx.graph.nodes.get_mut(&node_id) else {
                    log::warn!("{}", GestureError::DanglingReference("resize target"));
                    self.gesture = Gesture::Idle;
                    return;
                };
                let target = pos - node.position;
                node.resize_to(target, ctx.config.free_resize);
                ctx.dirty.mark_all();
            }
            Gesture::BoxSelecting { current, .. } => {
                *current = pos;
                ctx.dirty.foreground = true;
            }
            Gesture::DraggingGroup { group, last } => {
                let delta = pos - *last;
                *last = pos;
                let group_id = *group;
                let members = match ctx.graph.group_mut(group_id) {
                    Some(group) => {
                        group.translate(delta);
                        group.members.clone()
                    }
                    None => {
                        self.gesture = Gesture::Idle;
                        return;
                    }
                };
                for id in members {
                    if let Some(node) = ctx.graph.nodes.get_mut(&id) {
                        node.translate(delta);
                    }
                }
                ctx.dirty.mark_all();
            }
            Gesture::ResizingGroup { group } => {
                let group_id = *group;
                match ctx.graph.group_mut(group_id) {
                    Some(group) => group.resize_to(pos),
                    None => {
                        self.gesture = Gesture::Idle;
                        return;
                    }
                }
                ctx.dirty.background = true;
            }
            Gesture::OperatingWidget { node, widget, drag } => {
                let (node_id, index) = (*node, *widget);
                let Some(node) = ctx.graph.nodes.get_mut(&node_id) else {
                    self.gesture = Gesture::Idle;
                    return;
                };
                let rect = node.widget_rect(index);
                let Some(widget) = node.widgets.get_mut(index) else {
                    self.gesture = Gesture::Idle;
                    return;
                };
                let response = widgets::pointer_move(widget, drag, rect, pos);
                emit_widget_response(ctx, node_id, index, response);
                ctx.dirty.foreground = true;
            }
        }
    }

    pub fn pointer_up(&mut self, ctx: &mut EditorCtx, input: PointerInput) {
        self.pointer_graph = input.graph;
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        let pos = input.graph;

        match gesture {
            Gesture::Idle | Gesture::PanningView { .. } => {}
            Gesture::DraggingNodes { moved, .. } => {
                if moved {
                    self.commit_node_drag(ctx);
                }
            }
            Gesture::ResizingNode { node } => {
                if let Some(node_ref) = ctx.graph.nodes.get_mut(&node) {
                    if ctx.config.snap_to_grid {
                        let g = ctx.config.grid_size;
                        node_ref.size = (node_ref.size / g).round() * g;
                        node_ref.resize_to(node_ref.size, ctx.config.free_resize);
                    }
                    let size = node_ref.size;
                    ctx.events.emit(EditorEvent::NodeResized { node, size });
                }
                ctx.dirty.mark_all();
            }
            Gesture::BoxSelecting { anchor, current } => {
                self.commit_box_selection(ctx, anchor, current, input.modifiers);
            }
            Gesture::DraggingLink(drag) => {
                self.complete_link_drag(ctx, drag);
            }
            Gesture::DraggingGroup { group, .. } => {
                if ctx.config.snap_to_grid {
                    let g = ctx.config.grid_size;
                    let members = match ctx.graph.group_mut(group) {
                        Some(gr) => {
                            let snapped = (gr.bounds.min.to_vec2() / g).round() * g;
                            gr.bounds = Rect::from_min_size(snapped.to_pos2(), gr.bounds.size());
                            gr.members.clone()
                        }
                        None => Vec::new(),
                    };
                    for id in members {
                        if let Some(node) = ctx.graph.nodes.get_mut(&id) {
                            node.position = ((node.position.to_vec2() / g).round() * g).to_pos2();
                        }
                    }
                }
                ctx.events.emit(EditorEvent::GroupMoved { group });
                ctx.dirty.mark_all();
            }
            Gesture::ResizingGroup { group } => {
                ctx.events.emit(EditorEvent::GroupResized { group });
                ctx.dirty.background = true;
            }
            Gesture::OperatingWidget { node, widget, drag } => {
                if let Some(node_ref) = ctx.graph.nodes.get_mut(&node) {
                    let rect = node_ref.widget_rect(widget);
                    if let Some(widget_ref) = node_ref.widgets.get_mut(widget) {
                        let response = widgets::pointer_up(widget_ref, &drag, rect, pos);
                        emit_widget_response(ctx, node, widget, response);
                    }
                }
                ctx.dirty.foreground = true;
            }
        }
    }

    /// Loss of pointer capture: drop the gesture without committing
    pub fn pointer_cancel(&mut self, ctx: &mut EditorCtx) {
        if !self.gesture.is_idle() {
            log::debug!("gesture cancelled: {:?}", std::mem::discriminant(&self.gesture));
            self.gesture = Gesture::Idle;
            ctx.dirty.foreground = true;
        }
    }

    // === Keyboard entry points ===

    /// Deletes the selection, optionally splicing links across each node
    pub fn delete_selection(&mut self, ctx: &mut EditorCtx) {
        ctx.selection.prune(ctx.graph);
        let ids = ctx.selection.ordered(ctx.graph);
        if ids.is_empty() {
            return;
        }

        let mut splices = Vec::new();
        if ctx.config.auto_splice_on_delete {
            for &id in &ids {
                if let Some(splice) = splice_candidate(ctx.graph, id) {
                    splices.push(splice);
                }
            }
        }

        for &id in &ids {
            ctx.graph.remove_node(id);
        }
        for (origin, oslot, target, islot) in splices {
            if ids.contains(&origin) || ids.contains(&target) {
                continue;
            }
            match ctx.graph.connect(origin, oslot, target, islot) {
                Ok(link) => ctx.events.emit(EditorEvent::LinkCreated { link }),
                Err(err) => log::debug!("auto-splice skipped: {err}"),
            }
        }

        ctx.selection.clear();
        ctx.events.emit(EditorEvent::NodesDeleted { nodes: ids });
        self.emit_selection_changed(ctx);
        ctx.dirty.mark_all();
    }

    /// Serializes the selected subgraph into the internal clipboard
    pub fn copy_selection(&mut self, ctx: &mut EditorCtx) {
        ctx.selection.prune(ctx.graph);
        let ids = ctx.selection.ordered(ctx.graph);
        if let Some(payload) = clipboard::copy_nodes(ctx.graph, &ids) {
            self.clipboard = Some(payload);
        }
    }

    /// Pastes the clipboard, anchored at the current pointer position
    pub fn paste_clipboard(&mut self, ctx: &mut EditorCtx) {
        let Some(payload) = self.clipboard.clone() else {
            return;
        };
        let offset = self.pointer_graph - payload.anchor();
        let pasted = clipboard::paste_nodes(ctx.graph, &payload, offset);
        if pasted.is_empty() {
            return;
        }
        ctx.selection.clear();
        for &id in &pasted {
            ctx.selection.add(id);
        }
        ctx.events.emit(EditorEvent::NodesPasted { nodes: pasted });
        self.emit_selection_changed(ctx);
        ctx.dirty.mark_all();
    }

    pub fn select_all(&mut self, ctx: &mut EditorCtx) {
        let ids: Vec<NodeId> = ctx.graph.draw_order().to_vec();
        ctx.selection.clear();
        for id in ids {
            ctx.selection.add(id);
        }
        self.emit_selection_changed(ctx);
        ctx.dirty.foreground = true;
    }

    /// Moves the selection by whole grid steps
    pub fn nudge_selection(&mut self, ctx: &mut EditorCtx, steps: Vec2) {
        if ctx.selection.is_empty() {
            return;
        }
        let delta = steps * ctx.config.grid_size;
        ctx.selection.prune(ctx.graph);
        for id in ctx.selection.ordered(ctx.graph) {
            if let Some(node) = ctx.graph.nodes.get_mut(&id) {
                node.translate(delta);
                ctx.events.emit(EditorEvent::NodeMoved { node: id, position: node.position });
            }
        }
        ctx.dirty.mark_all();
    }

    /// Escape: abandon whatever gesture is in flight
    pub fn cancel(&mut self, ctx: &mut EditorCtx) {
        self.pointer_cancel(ctx);
    }

    // === Internals ===

    fn commit_node_drag(&mut self, ctx: &mut EditorCtx) {
        ctx.selection.prune(ctx.graph);
        let mut links_moved = false;
        for id in ctx.selection.ordered(ctx.graph) {
            if let Some(node) = ctx.graph.nodes.get_mut(&id) {
                if ctx.config.snap_to_grid {
                    let g = ctx.config.grid_size;
                    node.position = ((node.position.to_vec2() / g).round() * g).to_pos2();
                }
                links_moved |= node.inputs.iter().any(|s| s.link.is_some())
                    || node.outputs.iter().any(|s| !s.links.is_empty());
                ctx.events.emit(EditorEvent::NodeMoved { node: id, position: node.position });
            }
        }
        ctx.dirty.foreground = true;
        if links_moved {
            ctx.dirty.background = true;
        }
    }

    fn commit_box_selection(
        &mut self,
        ctx: &mut EditorCtx,
        anchor: Pos2,
        current: Pos2,
        modifiers: Modifiers,
    ) {
        let multi = modifiers.ctrl || modifiers.command;
        let rect = Rect::from_two_pos(anchor, current);

        if rect.width() < constants::hit::CLICK_BOX && rect.height() < constants::hit::CLICK_BOX {
            // degenerate box: plain click-select at the anchor
            match hit::node_at(ctx.graph, anchor, 0.0) {
                Some(node) if multi => ctx.selection.toggle(node),
                Some(node) => ctx.selection.select_only(node),
                None if !multi => ctx.selection.clear(),
                None => {}
            }
        } else {
            if !multi {
                ctx.selection.clear();
            }
            let ids: Vec<NodeId> = ctx
                .graph
                .draw_order()
                .iter()
                .copied()
                .filter(|id| {
                    ctx.graph
                        .nodes
                        .get(id)
                        .is_some_and(|n| n.bounding_rect().intersects(rect))
                })
                .collect();
            for id in ids {
                ctx.selection.add(id);
            }
        }
        self.emit_selection_changed(ctx);
        ctx.dirty.foreground = true;
    }

    fn complete_link_drag(&mut self, ctx: &mut EditorCtx, drag: LinkDrag) {
        ctx.dirty.mark_all();
        let landing = drag
            .highlight
            .or_else(|| hit::slot_anywhere(ctx.graph, drag.pos))
            .filter(|slot| candidate_compatible(ctx.graph, &drag, *slot));

        match drag.source {
            LinkDragSource::FromOutput { node, slot } => {
                let target = landing.map(|s| (s.node, s.index)).or_else(|| {
                    // type-directed auto-connect against the node body
                    let hit_node = hit::node_at(ctx.graph, drag.pos, 0.0)?;
                    if hit_node == node {
                        return None;
                    }
                    Some((hit_node, ctx.graph.find_input_by_type(hit_node, &drag.ty)?))
                });
                match target {
                    Some((target_node, target_slot)) => {
                        self.try_connect(ctx, node, slot, target_node, target_slot);
                    }
                    None => self.drop_link(ctx, &drag),
                }
            }
            LinkDragSource::FromInput { node, slot } => {
                let origin = landing.map(|s| (s.node, s.index)).or_else(|| {
                    let hit_node = hit::node_at(ctx.graph, drag.pos, 0.0)?;
                    if hit_node == node {
                        return None;
                    }
                    Some((hit_node, ctx.graph.find_output_by_type(hit_node, &drag.ty)?))
                });
                match origin {
                    Some((origin_node, origin_slot)) => {
                        self.try_connect(ctx, origin_node, origin_slot, node, slot);
                    }
                    None => self.drop_link(ctx, &drag),
                }
            }
            LinkDragSource::MovingToInputs { ref targets } => {
                let origin = landing.map(|s| (s.node, s.index)).or_else(|| {
                    let hit_node = hit::node_at(ctx.graph, drag.pos, 0.0)?;
                    Some((hit_node, ctx.graph.find_output_by_type(hit_node, &drag.ty)?))
                });
                match origin {
                    Some((origin_node, origin_slot)) => {
                        for &(target_node, target_slot) in targets {
                            self.try_connect(ctx, origin_node, origin_slot, target_node, target_slot);
                        }
                    }
                    None => self.drop_link(ctx, &drag),
                }
            }
        }
    }

    fn try_connect(
        &mut self,
        ctx: &mut EditorCtx,
        origin_node: NodeId,
        origin_slot: usize,
        target_node: NodeId,
        target_slot: usize,
    ) {
        match ctx.graph.connect(origin_node, origin_slot, target_node, target_slot) {
            Ok(link) => ctx.events.emit(EditorEvent::LinkCreated { link }),
            // rejected connections are inert, never fatal
            Err(err) => log::debug!("connection rejected: {err}"),
        }
    }

    fn drop_link(&mut self, ctx: &mut EditorCtx, drag: &LinkDrag) {
        ctx.events.emit(EditorEvent::LinkDropped {
            position: drag.pos,
            ty: drag.ty.clone(),
        });
    }

    fn toggle_collapse(&mut self, ctx: &mut EditorCtx, node_id: NodeId) {
        if let Some(node) = ctx.graph.nodes.get_mut(&node_id) {
            node.collapsed = !node.collapsed;
            let collapsed = node.collapsed;
            ctx.events.emit(EditorEvent::NodeCollapsed { node: node_id, collapsed });
            ctx.dirty.mark_all();
        }
        self.gesture = Gesture::Idle;
    }

    fn on_title(&self, graph: &Graph, node_id: NodeId, pos: Pos2) -> bool {
        graph
            .nodes
            .get(&node_id)
            .is_some_and(|n| n.title_rect().contains(pos))
    }

    fn register_click(&mut self, pos: Pos2) -> bool {
        let now = Instant::now();
        let double = self.last_click.is_some_and(|(at, where_)| {
            now.duration_since(at) < DOUBLE_CLICK_WINDOW
                && (pos - where_).length() < DOUBLE_CLICK_SLOP
        });
        self.last_click = if double { None } else { Some((now, pos)) };
        double
    }

    fn emit_selection_changed(&self, ctx: &mut EditorCtx) {
        let nodes = ctx.selection.ordered(ctx.graph);
        ctx.events.emit(EditorEvent::SelectionChanged { nodes });
    }

}

fn emit_widget_response(
    ctx: &mut EditorCtx,
    node: NodeId,
    widget: usize,
    response: Option<WidgetResponse>,
) {
    match response {
        Some(WidgetResponse::ValueChanged { old, new }) => {
            ctx.events.emit(EditorEvent::WidgetChanged { node, widget, old, new });
        }
        Some(WidgetResponse::ComboRequested) => {
            ctx.events.emit(EditorEvent::ComboRequested { node, widget });
        }
        Some(WidgetResponse::TextEditRequested) => {
            ctx.events.emit(EditorEvent::TextEditRequested { node, widget });
        }
        None => {}
    }
}

/// Drag-time compatibility check for a candidate landing slot
fn candidate_compatible(graph: &Graph, drag: &LinkDrag, slot: SlotRef) -> bool {
    match (&drag.source, slot.kind) {
        (LinkDragSource::FromOutput { node, .. }, SlotKind::Input) => {
            *node != slot.node
                && graph
                    .nodes
                    .get(&slot.node)
                    .and_then(|n| n.inputs.get(slot.index))
                    .is_some_and(|s| types_compatible(&drag.ty, &s.ty))
        }
        (LinkDragSource::FromInput { node, .. }, SlotKind::Output) => {
            *node != slot.node
                && graph
                    .nodes
                    .get(&slot.node)
                    .and_then(|n| n.outputs.get(slot.index))
                    .is_some_and(|s| types_compatible(&s.ty, &drag.ty))
        }
        (LinkDragSource::MovingToInputs { targets }, SlotKind::Output) => {
            let Some(out_ty) = graph
                .nodes
                .get(&slot.node)
                .and_then(|n| n.outputs.get(slot.index))
                .map(|s| s.ty.clone())
            else {
                return false;
            };
            targets.iter().all(|&(node, index)| {
                node != slot.node
                    && graph
                        .nodes
                        .get(&node)
                        .and_then(|n| n.inputs.get(index))
                        .is_some_and(|s| types_compatible(&out_ty, &s.ty))
            })
        }
        _ => false,
    }
}

/// First-input-to-first-output splice across a node about to be deleted
fn splice_candidate(graph: &Graph, node_id: NodeId) -> Option<(NodeId, usize, NodeId, usize)> {
    let node = graph.nodes.get(&node_id)?;
    let in_link = node.inputs.first()?.link?;
    let out_link = *node.outputs.first()?.links.first()?;
    let in_link = graph.links.get(&in_link)?;
    let out_link = graph.links.get(&out_link)?;
    Some((
        in_link.origin_node,
        in_link.origin_slot,
        out_link.target_node,
        out_link.target_slot,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Node, Widget, WidgetValue};

    struct Fixture {
        graph: Graph,
        selection: SelectionModel,
        view: ViewTransform,
        events: EventDispatch,
        dirty: DirtyFlags,
        config: EditorConfig,
        controller: InteractionController,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                graph: Graph::new(),
                selection: SelectionModel::new(),
                view: ViewTransform::new(),
                events: EventDispatch::new(),
                dirty: DirtyFlags::default(),
                config: EditorConfig::default(),
                controller: InteractionController::new(),
            }
        }

        fn down(&mut self, pos: Pos2, modifiers: Modifiers) {
            let input = PointerInput { screen: pos, graph: pos, modifiers };
            let mut ctx = EditorCtx {
                graph: &mut self.graph,
                selection: &mut self.selection,
                view: &mut self.view,
                events: &mut self.events,
                dirty: &mut self.dirty,
                config: &self.config,
            };
            self.controller.pointer_down(&mut ctx, input, PointerButton::Primary);
        }

        fn drag(&mut self, pos: Pos2) {
            let input = PointerInput { screen: pos, graph: pos, modifiers: Modifiers::NONE };
            let mut ctx = EditorCtx {
                graph: &mut self.graph,
                selection: &mut self.selection,
                view: &mut self.view,
                events: &mut self.events,
                dirty: &mut self.dirty,
                config: &self.config,
            };
            self.controller.pointer_move(&mut ctx, input);
        }

        fn up(&mut self, pos: Pos2) {
            self.up_with(pos, Modifiers::NONE);
        }

        fn up_with(&mut self, pos: Pos2, modifiers: Modifiers) {
            let input = PointerInput { screen: pos, graph: pos, modifiers };
            let mut ctx = EditorCtx {
                graph: &mut self.graph,
                selection: &mut self.selection,
                view: &mut self.view,
                events: &mut self.events,
                dirty: &mut self.dirty,
                config: &self.config,
            };
            self.controller.pointer_up(&mut ctx, input);
        }

        fn with_ctx<R>(&mut self, f: impl FnOnce(&mut InteractionController, &mut EditorCtx) -> R) -> R {
            let mut ctx = EditorCtx {
                graph: &mut self.graph,
                selection: &mut self.selection,
                view: &mut self.view,
                events: &mut self.events,
                dirty: &mut self.dirty,
                config: &self.config,
            };
            f(&mut self.controller, &mut ctx)
        }
    }

    fn source_and_sink(fx: &mut Fixture) -> (NodeId, NodeId) {
        let a = fx.graph.add_node(
            Node::new("N1", Pos2::new(0.0, 0.0)).with_output("result", "number"),
        );
        let b = fx.graph.add_node(
            Node::new("N2", Pos2::new(200.0, 0.0)).with_input("value", "number"),
        );
        (a, b)
    }

    #[test]
    fn test_drag_link_from_output_to_input_creates_link() {
        let mut fx = Fixture::new();
        let (a, b) = source_and_sink(&mut fx);
        let from = fx.graph.nodes[&a].output_pos(0);
        let to = fx.graph.nodes[&b].input_pos(0);

        fx.down(from, Modifiers::NONE);
        assert!(matches!(fx.controller.gesture(), Gesture::DraggingLink(_)));
        fx.drag(to);
        fx.up(to);

        assert_eq!(fx.graph.links.len(), 1);
        let link = fx.graph.links.values().next().unwrap();
        assert_eq!((link.origin_node, link.origin_slot), (a, 0));
        assert_eq!((link.target_node, link.target_slot), (b, 0));
        assert!(fx.controller.gesture().is_idle());
    }

    #[test]
    fn test_incompatible_drop_leaves_slots_unchanged() {
        let mut fx = Fixture::new();
        let a = fx.graph.add_node(
            Node::new("N1", Pos2::new(0.0, 0.0)).with_output("out", "number"),
        );
        let b = fx.graph.add_node(
            Node::new("N2", Pos2::new(200.0, 0.0)).with_input("in", "string"),
        );
        let from = fx.graph.nodes[&a].output_pos(0);
        let to = fx.graph.nodes[&b].input_pos(0);

        fx.down(from, Modifiers::NONE);
        fx.drag(to);
        fx.up(to);

        assert!(fx.graph.links.is_empty());
        assert!(fx.graph.nodes[&a].outputs[0].links.is_empty());
        assert!(fx.graph.nodes[&b].inputs[0].link.is_none());
    }

    #[test]
    fn test_drag_highlight_tracks_compatible_slot() {
        let mut fx = Fixture::new();
        let (a, b) = source_and_sink(&mut fx);
        let from = fx.graph.nodes[&a].output_pos(0);
        let to = fx.graph.nodes[&b].input_pos(0);

        fx.down(from, Modifiers::NONE);
        fx.drag(to);
        match fx.controller.gesture() {
            Gesture::DraggingLink(drag) => {
                assert_eq!(
                    drag.highlight,
                    Some(SlotRef { node: b, index: 0, kind: SlotKind::Input })
                );
            }
            other => panic!("unexpected gesture {other:?}"),
        }
        fx.drag(Pos2::new(500.0, 500.0));
        match fx.controller.gesture() {
            Gesture::DraggingLink(drag) => assert!(drag.highlight.is_none()),
            other => panic!("unexpected gesture {other:?}"),
        }
        fx.up(Pos2::new(500.0, 500.0));
    }

    #[test]
    fn test_node_drag_moves_selection_by_delta() {
        let mut fx = Fixture::new();
        let (a, _b) = source_and_sink(&mut fx);
        let body = fx.graph.nodes[&a].bounding_rect().center();

        fx.down(body, Modifiers::NONE);
        assert!(matches!(fx.controller.gesture(), Gesture::DraggingNodes { .. }));
        fx.drag(body + Vec2::new(35.0, -15.0));
        fx.up(body + Vec2::new(35.0, -15.0));

        assert_eq!(fx.graph.nodes[&a].position, Pos2::new(35.0, -15.0));
    }

    #[test]
    fn test_node_drag_snaps_to_grid_when_enabled() {
        let mut fx = Fixture::new();
        fx.config.snap_to_grid = true;
        let (a, _b) = source_and_sink(&mut fx);
        let body = fx.graph.nodes[&a].bounding_rect().center();

        fx.down(body, Modifiers::NONE);
        fx.drag(body + Vec2::new(33.0, 17.0));
        fx.up(body + Vec2::new(33.0, 17.0));

        let pos = fx.graph.nodes[&a].position;
        assert_eq!(pos, Pos2::new(30.0, 20.0));
    }

    #[test]
    fn test_box_select_captures_overlapping_nodes_only() {
        let mut fx = Fixture::new();
        let a = fx.graph.add_node(Node::new("A", Pos2::new(0.0, 0.0)));
        let b = fx.graph.add_node(Node::new("B", Pos2::new(200.0, 0.0)));
        let c = fx.graph.add_node(Node::new("C", Pos2::new(900.0, 900.0)));

        let ctrl = Modifiers { ctrl: true, ..Default::default() };
        fx.down(Pos2::new(-50.0, -50.0), ctrl);
        assert!(matches!(fx.controller.gesture(), Gesture::BoxSelecting { .. }));
        fx.drag(Pos2::new(400.0, 200.0));
        fx.up(Pos2::new(400.0, 200.0));

        assert!(fx.selection.contains(a));
        assert!(fx.selection.contains(b));
        assert!(!fx.selection.contains(c));
    }

    #[test]
    fn test_degenerate_box_degrades_to_click_select() {
        let mut fx = Fixture::new();
        let (a, _b) = source_and_sink(&mut fx);
        let inside = fx.graph.nodes[&a].bounding_rect().center();

        let ctrl = Modifiers { ctrl: true, ..Default::default() };
        // ctrl-down lands on the node, so it toggles rather than box-selects
        fx.down(inside, ctrl);
        assert!(fx.selection.contains(a));

        // a ctrl-drag on empty space collapsing to a point selects the
        // node at the anchor, if any
        fx.down(Pos2::new(500.0, 500.0), ctrl);
        fx.up_with(Pos2::new(501.0, 501.0), ctrl);
        assert!(fx.selection.contains(a), "toggle-miss keeps selection");
    }

    #[test]
    fn test_empty_click_clears_selection_and_pans() {
        let mut fx = Fixture::new();
        let (a, _b) = source_and_sink(&mut fx);
        fx.selection.add(a);

        fx.down(Pos2::new(600.0, 600.0), Modifiers::NONE);
        assert!(fx.selection.is_empty());
        assert!(matches!(fx.controller.gesture(), Gesture::PanningView { .. }));

        let offset_before = fx.view.offset;
        fx.drag(Pos2::new(650.0, 600.0));
        assert_eq!(fx.view.offset, offset_before + Vec2::new(50.0, 0.0));
        fx.up(Pos2::new(650.0, 600.0));
    }

    #[test]
    fn test_panning_disabled_by_config() {
        let mut fx = Fixture::new();
        fx.config.allow_panning = false;
        fx.down(Pos2::new(600.0, 600.0), Modifiers::NONE);
        assert!(fx.controller.gesture().is_idle());
    }

    #[test]
    fn test_dragging_connected_input_moves_the_link() {
        let mut fx = Fixture::new();
        let (a, b) = source_and_sink(&mut fx);
        let c = fx.graph.add_node(
            Node::new("N3", Pos2::new(200.0, 200.0)).with_input("value", "number"),
        );
        fx.graph.connect(a, 0, b, 0).unwrap();

        // grab the connected input of b: the link detaches and re-roots
        let grab = fx.graph.nodes[&b].input_pos(0);
        fx.down(grab, Modifiers::NONE);
        match fx.controller.gesture() {
            Gesture::DraggingLink(drag) => {
                assert!(matches!(
                    drag.source,
                    LinkDragSource::FromOutput { node, slot: 0 } if node == a
                ));
            }
            other => panic!("unexpected gesture {other:?}"),
        }
        assert!(fx.graph.links.is_empty());

        // release on c's input: the link now runs a -> c
        let to = fx.graph.nodes[&c].input_pos(0);
        fx.drag(to);
        fx.up(to);
        let link = fx.graph.links.values().next().unwrap();
        assert_eq!(link.origin_node, a);
        assert_eq!(link.target_node, c);
        assert!(fx.graph.nodes[&b].inputs[0].link.is_none());
    }

    #[test]
    fn test_shift_drag_moves_whole_output_fanout() {
        let mut fx = Fixture::new();
        let a = fx.graph.add_node(
            Node::new("Src", Pos2::new(0.0, 0.0)).with_output("out", "number"),
        );
        let b = fx.graph.add_node(
            Node::new("SinkB", Pos2::new(300.0, 0.0)).with_input("in", "number"),
        );
        let c = fx.graph.add_node(
            Node::new("SinkC", Pos2::new(300.0, 200.0)).with_input("in", "number"),
        );
        let d = fx.graph.add_node(
            Node::new("Src2", Pos2::new(0.0, 300.0)).with_output("out", "number"),
        );
        fx.graph.connect(a, 0, b, 0).unwrap();
        fx.graph.connect(a, 0, c, 0).unwrap();

        let shift = Modifiers { shift: true, ..Default::default() };
        let grab = fx.graph.nodes[&a].output_pos(0);
        fx.down(grab, shift);
        assert!(fx.graph.links.is_empty(), "links detach at drag start");

        let new_output = fx.graph.nodes[&d].output_pos(0);
        fx.drag(new_output);
        fx.up(new_output);

        assert_eq!(fx.graph.links.len(), 2);
        for link in fx.graph.links.values() {
            assert_eq!(link.origin_node, d);
        }
        assert!(fx.graph.nodes[&b].inputs[0].link.is_some());
        assert!(fx.graph.nodes[&c].inputs[0].link.is_some());
    }

    #[test]
    fn test_link_dropped_in_empty_space_fires_event() {
        use std::cell::RefCell;
        use std::rc::Rc;
        use crate::graph::{EventKind, Handled};

        let mut fx = Fixture::new();
        let (a, _b) = source_and_sink(&mut fx);
        let dropped = Rc::new(RefCell::new(None));
        {
            let dropped = dropped.clone();
            fx.events.on(EventKind::LinkDropped, move |event| {
                if let EditorEvent::LinkDropped { ty, .. } = event {
                    *dropped.borrow_mut() = Some(ty.clone());
                }
                Handled::Handled
            });
        }

        let from = fx.graph.nodes[&a].output_pos(0);
        fx.down(from, Modifiers::NONE);
        fx.drag(Pos2::new(700.0, 700.0));
        fx.up(Pos2::new(700.0, 700.0));

        assert_eq!(dropped.borrow().as_deref(), Some("number"));
        assert!(fx.graph.links.is_empty());
    }

    #[test]
    fn test_resize_gesture_grows_node() {
        let mut fx = Fixture::new();
        let (a, _b) = source_and_sink(&mut fx);
        let corner = fx.graph.nodes[&a].resize_corner().center();

        fx.down(corner, Modifiers::NONE);
        assert!(matches!(fx.controller.gesture(), Gesture::ResizingNode { .. }));
        let target = fx.graph.nodes[&a].position + Vec2::new(400.0, 250.0);
        fx.drag(target);
        fx.up(target);

        let size = fx.graph.nodes[&a].size;
        assert!((size.x - 400.0).abs() < 0.5 && (size.y - 250.0).abs() < 0.5);
    }

    #[test]
    fn test_resize_on_fixed_node_is_ignored() {
        let mut fx = Fixture::new();
        let a = fx.graph.add_node(
            Node::new("Fixed", Pos2::new(0.0, 0.0)).with_resizable(false),
        );
        let corner = fx.graph.nodes[&a].resize_corner().center();
        let size_before = fx.graph.nodes[&a].size;

        fx.down(corner, Modifiers::NONE);
        assert!(
            matches!(fx.controller.gesture(), Gesture::DraggingNodes { .. }),
            "falls through to a node drag"
        );
        fx.drag(corner + Vec2::new(100.0, 100.0));
        fx.up(corner + Vec2::new(100.0, 100.0));
        assert_eq!(fx.graph.nodes[&a].size, size_before);
    }

    #[test]
    fn test_delete_with_auto_splice_reconnects_through() {
        let mut fx = Fixture::new();
        let a = fx.graph.add_node(
            Node::new("A", Pos2::new(0.0, 0.0)).with_output("out", "number"),
        );
        let mid = fx.graph.add_node(
            Node::new("Mid", Pos2::new(300.0, 0.0))
                .with_input("in", "number")
                .with_output("out", "number"),
        );
        let c = fx.graph.add_node(
            Node::new("C", Pos2::new(600.0, 0.0)).with_input("in", "number"),
        );
        fx.graph.connect(a, 0, mid, 0).unwrap();
        fx.graph.connect(mid, 0, c, 0).unwrap();
        fx.selection.add(mid);

        fx.with_ctx(|controller, ctx| controller.delete_selection(ctx));

        assert!(!fx.graph.nodes.contains_key(&mid));
        assert_eq!(fx.graph.links.len(), 1);
        let link = fx.graph.links.values().next().unwrap();
        assert_eq!((link.origin_node, link.target_node), (a, c));
    }

    #[test]
    fn test_copy_paste_offsets_relative_to_pointer() {
        let mut fx = Fixture::new();
        let (a, b) = source_and_sink(&mut fx);
        fx.graph.connect(a, 0, b, 0).unwrap();
        fx.selection.add(a);
        fx.selection.add(b);

        fx.with_ctx(|controller, ctx| controller.copy_selection(ctx));
        // park the pointer somewhere and paste there
        fx.drag(Pos2::new(1000.0, 500.0));
        fx.with_ctx(|controller, ctx| controller.paste_clipboard(ctx));

        assert_eq!(fx.graph.nodes.len(), 4);
        assert_eq!(fx.graph.links.len(), 2);
        let pasted: Vec<_> = fx
            .graph
            .nodes
            .values()
            .filter(|n| ![a, b].contains(&n.id))
            .collect();
        let min_x = pasted.iter().map(|n| n.position.x).fold(f32::INFINITY, f32::min);
        let min_y = pasted.iter().map(|n| n.position.y).fold(f32::INFINITY, f32::min);
        assert_eq!(Pos2::new(min_x, min_y), Pos2::new(1000.0, 500.0));
    }

    #[test]
    fn test_widget_latch_survives_leaving_rect() {
        let mut fx = Fixture::new();
        let id = fx.graph.add_node(
            Node::new("W", Pos2::new(0.0, 0.0))
                .with_input("in", "number")
                .with_widget(Widget::slider("gain", 0.0, 1.0, 0.0)),
        );
        let rect = fx.graph.nodes[&id].widget_rect(0);

        fx.down(rect.center(), Modifiers::NONE);
        assert!(matches!(fx.controller.gesture(), Gesture::OperatingWidget { .. }));
        // drag far past the right edge: value pins to max, latch holds
        fx.drag(rect.center() + Vec2::new(500.0, 80.0));
        assert!(matches!(fx.controller.gesture(), Gesture::OperatingWidget { .. }));
        fx.up(rect.center() + Vec2::new(500.0, 80.0));

        assert_eq!(
            fx.graph.nodes[&id].widgets[0].value,
            WidgetValue::Number(1.0)
        );
    }

    #[test]
    fn test_double_click_on_title_toggles_collapse() {
        let mut fx = Fixture::new();
        let (a, _b) = source_and_sink(&mut fx);
        let title = fx.graph.nodes[&a].title_rect().center();

        fx.down(title, Modifiers::NONE);
        fx.up(title);
        fx.down(title, Modifiers::NONE);

        assert!(fx.graph.nodes[&a].collapsed);
        assert!(fx.controller.gesture().is_idle());
    }

    #[test]
    fn test_group_drag_carries_member_snapshot() {
        use crate::graph::Group;

        let mut fx = Fixture::new();
        let inside = fx.graph.add_node(Node::new("In", Pos2::new(50.0, 80.0)));
        let outside = fx.graph.add_node(Node::new("Out", Pos2::new(900.0, 900.0)));
        fx.graph.add_group(Group::new(
            0,
            "G",
            Rect::from_min_size(Pos2::new(0.0, 0.0), Vec2::new(400.0, 300.0)),
        ));

        // grab the group banner, away from any node
        fx.down(Pos2::new(300.0, 10.0), Modifiers::NONE);
        assert!(matches!(fx.controller.gesture(), Gesture::DraggingGroup { .. }));
        fx.drag(Pos2::new(350.0, 60.0));
        fx.up(Pos2::new(350.0, 60.0));

        assert_eq!(fx.graph.nodes[&inside].position, Pos2::new(100.0, 130.0));
        assert_eq!(fx.graph.nodes[&outside].position, Pos2::new(900.0, 900.0));
        assert_eq!(fx.graph.groups[0].bounds.min, Pos2::new(50.0, 50.0));
    }

    #[test]
    fn test_cancel_clears_gesture_without_commit() {
        let mut fx = Fixture::new();
        let (a, _b) = source_and_sink(&mut fx);
        let body = fx.graph.nodes[&a].bounding_rect().center();

        fx.down(body, Modifiers::NONE);
        fx.with_ctx(|controller, ctx| controller.pointer_cancel(ctx));
        assert!(fx.controller.gesture().is_idle());

        // a new pointer stream starts cleanly
        fx.down(body, Modifiers::NONE);
        assert!(matches!(fx.controller.gesture(), Gesture::DraggingNodes { .. }));
        fx.up(body);
    }

    #[test]
    fn test_second_pointer_down_is_ignored_mid_gesture() {
        let mut fx = Fixture::new();
        let (a, b) = source_and_sink(&mut fx);
        let body_a = fx.graph.nodes[&a].bounding_rect().center();
        let body_b = fx.graph.nodes[&b].bounding_rect().center();

        fx.down(body_a, Modifiers::NONE);
        let first = fx.controller.gesture().clone();
        fx.down(body_b, Modifiers::NONE);
        assert!(matches!(
            (first, fx.controller.gesture()),
            (Gesture::DraggingNodes { .. }, Gesture::DraggingNodes { .. })
        ));
        assert!(!fx.selection.contains(b));
        fx.up(body_a);
    }

    #[test]
    fn test_unlinked_node_drag_leaves_background_clean() {
        let mut fx = Fixture::new();
        let loner = fx.graph.add_node(Node::new("Loner", Pos2::new(0.0, 0.0)));
        let (a, b) = source_and_sink(&mut fx);
        fx.graph.connect(a, 0, b, 0).unwrap();
        fx.graph.nodes.get_mut(&a).unwrap().position = Pos2::new(0.0, 400.0);
        fx.graph.nodes.get_mut(&b).unwrap().position = Pos2::new(300.0, 400.0);

        let body = fx.graph.nodes[&loner].bounding_rect().center();
        fx.down(body, Modifiers::NONE);
        fx.dirty = DirtyFlags::default();
        fx.drag(body + Vec2::new(20.0, 0.0));
        assert!(fx.dirty.foreground);
        assert!(!fx.dirty.background, "no link endpoint moved");
        fx.up(body + Vec2::new(20.0, 0.0));

        // dragging a linked node invalidates the link layer too
        let body = fx.graph.nodes[&a].bounding_rect().center();
        fx.down(body, Modifiers::NONE);
        fx.dirty = DirtyFlags::default();
        fx.drag(body + Vec2::new(20.0, 0.0));
        assert!(fx.dirty.background);
        fx.up(body + Vec2::new(20.0, 0.0));
    }

    #[test]
    fn test_nudge_moves_selection_by_grid_step() {
        let mut fx = Fixture::new();
        let (a, _b) = source_and_sink(&mut fx);
        fx.selection.add(a);
        fx.with_ctx(|controller, ctx| controller.nudge_selection(ctx, Vec2::new(1.0, 0.0)));
        assert_eq!(fx.graph.nodes[&a].position.x, constants::grid::SIZE);
    }
}
