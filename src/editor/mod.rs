//! Graph editor core
//!
//! [`GraphEditor`] wires the view transform, hit-testing, selection,
//! interaction state machine and render pipeline together and exposes the
//! host-facing surface: pointer/keyboard entry points, a per-tick `draw`,
//! and query accessors. The egui plumbing lives in [`GraphEditor::show`];
//! everything below it works on plain coordinates and is testable without
//! a UI.

pub mod debug_tools;
pub mod hit;
pub mod interaction;
pub mod quality;
pub mod render;
pub mod selection;
pub mod view;
pub mod widgets;

pub use debug_tools::DebugTools;
pub use interaction::{EditorConfig, Gesture, InteractionController, PointerInput};
pub use quality::{QualityMode, RenderQuality};
pub use render::{DirtyFlags, RenderPipeline};
pub use selection::SelectionModel;
pub use view::ViewTransform;

use egui::{Key, Modifiers, Painter, PointerButton, Pos2, Rect, Sense, Vec2};

use crate::constants;
use crate::editor::interaction::EditorCtx;
use crate::editor::render::FrameContext;
use crate::graph::{EditorEvent, EventDispatch, Graph, GroupId, NodeId, WidgetValue};
use crate::theme::Colors;

/// The canvas interaction and rendering engine
pub struct GraphEditor {
    graph: Graph,
    view: ViewTransform,
    selection: SelectionModel,
    interaction: InteractionController,
    render: RenderPipeline,
    events: EventDispatch,
    dirty: DirtyFlags,
    config: EditorConfig,
    theme: Colors,
    debug_tools: DebugTools,
}

impl Default for GraphEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphEditor {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            view: ViewTransform::new(),
            selection: SelectionModel::new(),
            interaction: InteractionController::new(),
            render: RenderPipeline::new(),
            events: EventDispatch::new(),
            dirty: DirtyFlags { foreground: true, background: true },
            config: EditorConfig::default(),
            theme: Colors::dark(),
            debug_tools: DebugTools::new(),
        }
    }

    // === Accessors ===

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Mutable graph access for the host; assumes topology may change
    pub fn graph_mut(&mut self) -> &mut Graph {
        self.dirty.mark_all();
        &mut self.graph
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn gesture(&self) -> &Gesture {
        self.interaction.gesture()
    }

    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EditorConfig {
        self.dirty.mark_all();
        &mut self.config
    }

    pub fn theme(&self) -> &Colors {
        &self.theme
    }

    /// Handler registration for host-side reactions
    pub fn events_mut(&mut self) -> &mut EventDispatch {
        &mut self.events
    }

    pub fn quality(&self) -> &RenderQuality {
        self.render.quality()
    }

    pub fn debug_tools_mut(&mut self) -> &mut DebugTools {
        &mut self.debug_tools
    }

    // === Graph conveniences ===

    pub fn add_node(&mut self, node: crate::graph::Node) -> NodeId {
        self.dirty.mark_all();
        self.graph.add_node(node)
    }

    pub fn add_group(&mut self, group: crate::graph::Group) -> GroupId {
        self.dirty.background = true;
        self.graph.add_group(group)
    }

    /// Host-side widget commit (combo pick, finished text edit)
    pub fn set_widget_value(&mut self, node: NodeId, widget: usize, value: WidgetValue) {
        let Some(widget_ref) = self
            .graph
            .nodes
            .get_mut(&node)
            .and_then(|n| n.widgets.get_mut(widget))
        else {
            return;
        };
        let old = std::mem::replace(&mut widget_ref.value, value.clone());
        if old != value {
            self.events.emit(EditorEvent::WidgetChanged { node, widget, old, new: value });
            self.dirty.foreground = true;
        }
    }

    // === Pointer entry points (screen coordinates) ===

    pub fn pointer_down(&mut self, screen: Pos2, button: PointerButton, modifiers: Modifiers) {
        let input = self.pointer_input(screen, modifiers);
        let mut ctx = Self::ctx(
            &mut self.graph,
            &mut self.selection,
            &mut self.view,
            &mut self.events,
            &mut self.dirty,
            &self.config,
        );
        self.interaction.pointer_down(&mut ctx, input, button);
    }

    pub fn pointer_moved(&mut self, screen: Pos2, modifiers: Modifiers) {
        let input = self.pointer_input(screen, modifiers);
        let mut ctx = Self::ctx(
            &mut self.graph,
            &mut self.selection,
            &mut self.view,
            &mut self.events,
            &mut self.dirty,
            &self.config,
        );
        self.interaction.pointer_move(&mut ctx, input);
    }

    pub fn pointer_up(&mut self, screen: Pos2, modifiers: Modifiers) {
        let input = self.pointer_input(screen, modifiers);
        let mut ctx = Self::ctx(
            &mut self.graph,
            &mut self.selection,
            &mut self.view,
            &mut self.events,
            &mut self.dirty,
            &self.config,
        );
        self.interaction.pointer_up(&mut ctx, input);
    }

    /// Loss of pointer capture; never commits partial state
    pub fn pointer_cancel(&mut self) {
        let mut ctx = Self::ctx(
            &mut self.graph,
            &mut self.selection,
            &mut self.view,
            &mut self.events,
            &mut self.dirty,
            &self.config,
        );
        self.interaction.pointer_cancel(&mut ctx);
    }

    /// Wheel input: one step scales by `1 + delta * speed`, pivoting on
    /// the pointer so the graph point under it stays put
    pub fn wheel_zoom(&mut self, wheel_delta: f32, pivot_screen: Pos2) {
        if wheel_delta == 0.0 {
            return;
        }
        let factor = 1.0 + wheel_delta * constants::view::WHEEL_ZOOM_SPEED;
        self.view.zoom_by(factor, pivot_screen);
        self.dirty.mark_all();
    }

    // === Keyboard entry points ===

    pub fn key_delete(&mut self) {
        self.with_interaction(|i, ctx| i.delete_selection(ctx));
    }

    pub fn key_copy(&mut self) {
        self.with_interaction(|i, ctx| i.copy_selection(ctx));
    }

    pub fn key_paste(&mut self) {
        self.with_interaction(|i, ctx| i.paste_clipboard(ctx));
    }

    pub fn key_select_all(&mut self) {
        self.with_interaction(|i, ctx| i.select_all(ctx));
    }

    pub fn key_escape(&mut self) {
        self.with_interaction(|i, ctx| i.cancel(ctx));
    }

    pub fn key_nudge(&mut self, steps: Vec2) {
        self.with_interaction(|i, ctx| i.nudge_selection(ctx, steps));
    }

    // === Drawing ===

    /// Renders one frame into `painter`, clipped to `viewport`
    pub fn draw(&mut self, painter: &Painter, viewport: Rect, anim_time: f64) {
        let mut frame = FrameContext {
            graph: &mut self.graph,
            selection: &self.selection,
            gesture: self.interaction.gesture(),
            view: &self.view,
            config: &self.config,
            theme: &self.theme,
            viewport,
            anim_time,
            fps: self.debug_tools.fps(),
        };
        self.render.draw(painter, &mut self.dirty, &mut frame);

        // animated links need continuous frames; everything else is
        // event-driven
        if self.graph.links.values().any(|l| l.is_event()) {
            painter.ctx().request_repaint();
        }
    }

    /// Full egui integration: input translation plus drawing
    pub fn show(&mut self, ui: &mut egui::Ui) -> egui::Response {
        let response = ui.allocate_response(ui.available_size(), Sense::click_and_drag());
        let canvas = response.rect;
        let painter = ui.painter_at(canvas);
        painter.rect_filled(canvas, 0.0, self.theme.canvas_background);

        self.debug_tools.update_frame_time();

        let (pointer_pos, modifiers, anim_time) = ui.input(|i| {
            (i.pointer.interact_pos(), i.modifiers, i.time)
        });

        if let Some(pos) = pointer_pos {
            let inside = canvas.contains(pos);
            let pressed: Vec<PointerButton> = ui.input(|i| {
                [PointerButton::Primary, PointerButton::Middle]
                    .into_iter()
                    .filter(|&b| i.pointer.button_pressed(b))
                    .collect()
            });
            if inside {
                for button in pressed {
                    self.pointer_down(pos, button, modifiers);
                }
            }
            // idle moves still track the pointer, anchoring pastes
            self.pointer_moved(pos, modifiers);
            let released = ui.input(|i| {
                i.pointer.button_released(PointerButton::Primary)
                    || i.pointer.button_released(PointerButton::Middle)
            });
            if released {
                self.pointer_up(pos, modifiers);
            }

            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if inside && scroll != 0.0 {
                self.wheel_zoom(scroll * 0.02, pos);
            }
        } else if !self.interaction.gesture().is_idle()
            && ui.input(|i| !i.pointer.any_down())
        {
            // the pointer left us mid-gesture without a release event
            self.pointer_cancel();
        }

        self.handle_keys(ui);

        self.draw(&painter, canvas, anim_time);
        self.debug_tools
            .render_performance_info(ui, self.graph.nodes.len(), self.graph.links.len());

        response
    }

    fn handle_keys(&mut self, ui: &mut egui::Ui) {
        let wants_keyboard = ui.ctx().wants_keyboard_input();
        if wants_keyboard {
            return;
        }
        let input = ui.input(|i| {
            (
                i.key_pressed(Key::Delete) || i.key_pressed(Key::Backspace),
                i.key_pressed(Key::Escape),
                i.modifiers.command && i.key_pressed(Key::C),
                i.modifiers.command && i.key_pressed(Key::V),
                i.modifiers.command && i.key_pressed(Key::A),
                i.key_pressed(Key::ArrowLeft),
                i.key_pressed(Key::ArrowRight),
                i.key_pressed(Key::ArrowUp),
                i.key_pressed(Key::ArrowDown),
                i.key_pressed(Key::F1),
                i.key_pressed(Key::F2),
                i.key_pressed(Key::F3),
            )
        });
        let (delete, escape, copy, paste, select_all, left, right, up, down, f1, f2, f3) = input;

        if delete {
            self.key_delete();
        }
        if escape {
            self.key_escape();
        }
        if copy {
            self.key_copy();
        }
        if paste {
            self.key_paste();
        }
        if select_all {
            self.key_select_all();
        }
        let mut nudge = Vec2::ZERO;
        if left {
            nudge.x -= 1.0;
        }
        if right {
            nudge.x += 1.0;
        }
        if up {
            nudge.y -= 1.0;
        }
        if down {
            nudge.y += 1.0;
        }
        if nudge != Vec2::ZERO {
            self.key_nudge(nudge);
        }
        if f1 {
            self.debug_tools.toggle_performance_info();
        }
        if f2 {
            DebugTools::add_benchmark_nodes(&mut self.graph, 25);
            self.dirty.mark_all();
        }
        if f3 {
            DebugTools::add_stress_test(&mut self.graph, 500);
            self.dirty.mark_all();
        }
    }

    // === Internals ===

    fn pointer_input(&self, screen: Pos2, modifiers: Modifiers) -> PointerInput {
        PointerInput {
            screen,
            graph: self.view.to_graph(screen),
            modifiers,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn ctx<'a>(
        graph: &'a mut Graph,
        selection: &'a mut SelectionModel,
        view: &'a mut ViewTransform,
        events: &'a mut EventDispatch,
        dirty: &'a mut DirtyFlags,
        config: &'a EditorConfig,
    ) -> EditorCtx<'a> {
        EditorCtx { graph, selection, view, events, dirty, config }
    }

    fn with_interaction(&mut self, f: impl FnOnce(&mut InteractionController, &mut EditorCtx)) {
        let mut ctx = Self::ctx(
            &mut self.graph,
            &mut self.selection,
            &mut self.view,
            &mut self.events,
            &mut self.dirty,
            &self.config,
        );
        f(&mut self.interaction, &mut ctx);
    }
}
