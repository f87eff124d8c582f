//! Dual-layer render pipeline
//!
//! Two cached shape lists: a background layer (grid, groups, committed
//! links) and a foreground layer (nodes, slots, widgets). Each layer
//! rebuilds only when its dirty flag is set and is replayed from cache
//! otherwise, so dragging a node leaves the link network untouched until
//! an endpoint actually moves. Transient overlays (link preview, box
//! select, traveling dots) are rebuilt every frame; they are cheap.

use egui::epaint::CubicBezierShape;
use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, Vec2};

use crate::constants;
use crate::editor::interaction::{EditorConfig, Gesture, LinkDragSource};
use crate::editor::quality::{QualityMode, RenderQuality};
use crate::editor::selection::SelectionModel;
use crate::editor::view::ViewTransform;
use crate::graph::{Direction, Graph, NodeShape, SlotKind, WidgetKind, WidgetValue};
use crate::theme::Colors;

/// Per-layer redraw flags
#[derive(Debug, Clone, Copy, Default)]
pub struct DirtyFlags {
    pub foreground: bool,
    pub background: bool,
}

impl DirtyFlags {
    pub fn mark_all(&mut self) {
        self.foreground = true;
        self.background = true;
    }

    pub fn any(&self) -> bool {
        self.foreground || self.background
    }
}

/// Control polygon for a link curve between two directed endpoints
///
/// Control points are offset from each endpoint by a fraction of the
/// endpoint distance along the endpoint's direction, producing S-curves
/// that respect slot orientation.
pub fn link_curve(from: Pos2, from_dir: Direction, to: Pos2, to_dir: Direction) -> [Pos2; 4] {
    let reach = (to - from).length() * constants::link::CURVE_TENSION;
    [
        from,
        from + from_dir.unit() * reach,
        to + to_dir.unit() * reach,
        to,
    ]
}

/// Point on a cubic Bezier at parameter `t`
pub fn bezier_point(t: f32, points: &[Pos2; 4]) -> Pos2 {
    let mt = 1.0 - t;
    let (mt2, t2) = (mt * mt, t * t);
    let (a, b, c, d) = (mt2 * mt, 3.0 * mt2 * t, 3.0 * mt * t2, t2 * t);
    Pos2::new(
        a * points[0].x + b * points[1].x + c * points[2].x + d * points[3].x,
        a * points[0].y + b * points[1].y + c * points[2].y + d * points[3].y,
    )
}

/// Conservative bounding box of a curve's control polygon
fn curve_bounds(points: &[Pos2; 4]) -> Rect {
    let mut rect = Rect::from_two_pos(points[0], points[3]);
    rect.extend_with(points[1]);
    rect.extend_with(points[2]);
    rect
}

/// Everything one frame of drawing needs, borrowed from the editor
pub struct FrameContext<'a> {
    pub graph: &'a mut Graph,
    pub selection: &'a SelectionModel,
    pub gesture: &'a Gesture,
    pub view: &'a ViewTransform,
    pub config: &'a EditorConfig,
    pub theme: &'a Colors,
    pub viewport: Rect,
    /// Monotonic animation clock, seconds
    pub anim_time: f64,
    /// Measured frame rate fed to the quality controller
    pub fps: f32,
}

/// The dual-surface renderer
pub struct RenderPipeline {
    background_cache: Vec<Shape>,
    foreground_cache: Vec<Shape>,
    quality: RenderQuality,
    /// Scratch buffer reused across frames to avoid per-frame allocation
    scratch_points: Vec<Pos2>,
    last_view: (Vec2, f32, Rect),
    last_mode: QualityMode,
    background_rebuilds: u64,
    foreground_rebuilds: u64,
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self {
            background_cache: Vec::new(),
            foreground_cache: Vec::new(),
            quality: RenderQuality::new(),
            scratch_points: Vec::new(),
            last_view: (Vec2::ZERO, 1.0, Rect::NOTHING),
            last_mode: QualityMode::Full,
            background_rebuilds: 0,
            foreground_rebuilds: 0,
        }
    }

    pub fn quality(&self) -> &RenderQuality {
        &self.quality
    }

    pub fn background_rebuilds(&self) -> u64 {
        self.background_rebuilds
    }

    pub fn foreground_rebuilds(&self) -> u64 {
        self.foreground_rebuilds
    }

    /// Draws one frame, rebuilding whichever layers are flagged dirty
    pub fn draw(&mut self, painter: &Painter, dirty: &mut DirtyFlags, frame: &mut FrameContext) {
        // cached shapes live in screen space, so any view change
        // invalidates both layers
        let view_key = (frame.view.offset, frame.view.scale, frame.viewport);
        if view_key != self.last_view {
            self.last_view = view_key;
            dirty.mark_all();
        }
        if self.quality.mode() != self.last_mode {
            self.last_mode = self.quality.mode();
            dirty.mark_all();
        }

        let rebuilt = dirty.any();
        let visible = frame.view.visible_rect(frame.viewport);

        // midpoints feed hit-testing, so refresh them even for culled links
        refresh_midpoints(frame.graph);

        if dirty.background {
            self.rebuild_background(frame, visible);
            self.background_rebuilds += 1;
            dirty.background = false;
        }
        if dirty.foreground {
            self.rebuild_foreground(painter, frame, visible);
            self.foreground_rebuilds += 1;
            dirty.foreground = false;
        }

        painter.extend(self.background_cache.clone());
        painter.extend(self.foreground_cache.clone());
        self.draw_overlay(painter, frame);

        if rebuilt {
            self.quality.observe_frame(frame.fps, frame.view.scale);
        }
    }

    // === Background: grid, groups, committed links ===

    fn rebuild_background(&mut self, frame: &mut FrameContext, visible: Rect) {
        let mut shapes = std::mem::take(&mut self.background_cache);
        shapes.clear();
        let view = frame.view;
        let theme = frame.theme;
        let low = self.quality.mode() == QualityMode::Low;

        if frame.config.show_grid && view.scale >= constants::grid::MIN_DRAW_SCALE && !low {
            grid_shapes(&mut shapes, frame.config.grid_size, visible, view, theme);
        }

        for group in &frame.graph.groups {
            let rect = screen_rect(view, group.bounds);
            shapes.push(Shape::rect_filled(rect, 4.0, group.color.gamma_multiply(0.25)));
            shapes.push(stroke_rect(rect, Stroke::new(1.0, group.color)));
            // the triangular resize affordance in the bottom-right corner
            let c = constants::group::RESIZE_CORNER * view.scale;
            shapes.push(Shape::convex_polygon(
                vec![
                    rect.max - Vec2::new(c, 0.0),
                    rect.max,
                    rect.max - Vec2::new(0.0, c),
                ],
                group.color.gamma_multiply(0.5),
                Stroke::NONE,
            ));
        }

        let highlighted = frame.selection.highlighted_links(frame.graph);
        let links: Vec<_> = frame.graph.links.values().cloned().collect();
        for link in links {
            let Some((from, to)) = frame.graph.link_endpoints(&link) else {
                continue;
            };
            let points = link_curve(from, Direction::Right, to, Direction::Left);
            if !curve_bounds(&points).intersects(visible) {
                continue;
            }
            let screen_points = points.map(|p| view.to_screen(p));
            let color = link.color.unwrap_or(if highlighted.contains(&link.id) {
                theme.link_highlight
            } else {
                theme.link_default
            });
            let width = if highlighted.contains(&link.id) { 3.0 } else { 2.0 } * view.scale;
            if low {
                shapes.push(Shape::line_segment(
                    [screen_points[0], screen_points[3]],
                    Stroke::new(width, color),
                ));
            } else {
                shapes.push(Shape::CubicBezier(CubicBezierShape {
                    points: screen_points,
                    closed: false,
                    fill: Color32::TRANSPARENT,
                    stroke: Stroke::new(width, color).into(),
                }));
            }
        }

        self.background_cache = shapes;
    }

    // === Foreground: nodes, slots, widgets ===

    fn rebuild_foreground(&mut self, painter: &Painter, frame: &mut FrameContext, visible: Rect) {
        let mut shapes = std::mem::take(&mut self.foreground_cache);
        shapes.clear();
        let low = self.quality.mode() == QualityMode::Low;

        let order: Vec<_> = frame.graph.draw_order().to_vec();
        for id in order {
            let Some(node) = frame.graph.nodes.get(&id) else { continue };
            if !node.bounding_rect().intersects(visible) {
                continue;
            }
            let selected = frame.selection.contains(id);
            node_shapes(&mut shapes, painter, node, selected, frame, low);
        }

        self.foreground_cache = shapes;
    }

    // === Per-frame overlay: preview curve, box select, traveling dots ===

    fn draw_overlay(&mut self, painter: &Painter, frame: &mut FrameContext) {
        let view = frame.view;
        let theme = frame.theme;

        match frame.gesture {
            Gesture::DraggingLink(drag) => {
                let stroke = Stroke::new(2.0 * view.scale, theme.link_preview);
                self.scratch_points.clear();
                match &drag.source {
                    LinkDragSource::FromOutput { node, slot } => {
                        if let Some(n) = frame.graph.nodes.get(node) {
                            self.scratch_points.push(n.output_pos(*slot));
                        }
                    }
                    LinkDragSource::FromInput { node, slot } => {
                        if let Some(n) = frame.graph.nodes.get(node) {
                            self.scratch_points.push(n.input_pos(*slot));
                        }
                    }
                    LinkDragSource::MovingToInputs { targets } => {
                        for (node, slot) in targets {
                            if let Some(n) = frame.graph.nodes.get(node) {
                                self.scratch_points.push(n.input_pos(*slot));
                            }
                        }
                    }
                }
                let seeking_input = matches!(drag.source, LinkDragSource::FromOutput { .. });
                for anchor in &self.scratch_points {
                    let (from, from_dir, to, to_dir) = if seeking_input {
                        (*anchor, Direction::Right, drag.pos, Direction::Left)
                    } else {
                        (drag.pos, Direction::Right, *anchor, Direction::Left)
                    };
                    let points =
                        link_curve(from, from_dir, to, to_dir).map(|p| view.to_screen(p));
                    painter.add(Shape::CubicBezier(CubicBezierShape {
                        points,
                        closed: false,
                        fill: Color32::TRANSPARENT,
                        stroke: stroke.into(),
                    }));
                }
                if let Some(slot) = drag.highlight {
                    if let Some(node) = frame.graph.nodes.get(&slot.node) {
                        let center = view.to_screen(node.slot_pos(slot.kind, slot.index));
                        painter.circle_stroke(
                            center,
                            8.0 * view.scale,
                            Stroke::new(2.0, theme.slot_highlight),
                        );
                    }
                }
            }
            Gesture::BoxSelecting { anchor, current } => {
                let rect = Rect::from_two_pos(view.to_screen(*anchor), view.to_screen(*current));
                painter.rect_filled(rect, 0.0, theme.box_select_fill);
                painter.add(stroke_rect(rect, Stroke::new(1.0, theme.box_select_border)));
            }
            _ => {}
        }

        // traveling dots animate every frame, outside both caches
        if self.quality.mode() == QualityMode::Full {
            let phase =
                (frame.anim_time % constants::link::FLOW_PERIOD) / constants::link::FLOW_PERIOD;
            let links: Vec<_> = frame
                .graph
                .links
                .values()
                .filter(|l| l.is_event())
                .cloned()
                .collect();
            for link in links {
                if let Some((from, to)) = frame.graph.link_endpoints(&link) {
                    let points = link_curve(from, Direction::Right, to, Direction::Left);
                    let dot = bezier_point(phase as f32, &points);
                    painter.circle_filled(
                        view.to_screen(dot),
                        3.0 * view.scale,
                        theme.link_flow_dot,
                    );
                }
            }
        }
    }
}

/// Recomputes every link's cached curve midpoint
fn refresh_midpoints(graph: &mut Graph) {
    let updates: Vec<(usize, Pos2)> = graph
        .links
        .values()
        .filter_map(|link| {
            let (from, to) = graph.link_endpoints(link)?;
            let points = link_curve(from, Direction::Right, to, Direction::Left);
            Some((link.id, bezier_point(0.5, &points)))
        })
        .collect();
    for (id, midpoint) in updates {
        if let Some(link) = graph.links.get_mut(&id) {
            link.midpoint = midpoint;
        }
    }
}

fn screen_rect(view: &ViewTransform, rect: Rect) -> Rect {
    Rect::from_min_max(view.to_screen(rect.min), view.to_screen(rect.max))
}

/// Rectangle outline as a closed polyline, cache-friendly
fn stroke_rect(rect: Rect, stroke: Stroke) -> Shape {
    Shape::closed_line(
        vec![rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()],
        stroke,
    )
}

fn grid_shapes(
    shapes: &mut Vec<Shape>,
    pitch: f32,
    visible: Rect,
    view: &ViewTransform,
    theme: &Colors,
) {
    let stroke = Stroke::new(1.0, theme.grid_line);
    let mut x = (visible.min.x / pitch).floor() * pitch;
    while x <= visible.max.x {
        let a = view.to_screen(Pos2::new(x, visible.min.y));
        let b = view.to_screen(Pos2::new(x, visible.max.y));
        shapes.push(Shape::line_segment([a, b], stroke));
        x += pitch;
    }
    let mut y = (visible.min.y / pitch).floor() * pitch;
    while y <= visible.max.y {
        let a = view.to_screen(Pos2::new(visible.min.x, y));
        let b = view.to_screen(Pos2::new(visible.max.x, y));
        shapes.push(Shape::line_segment([a, b], stroke));
        y += pitch;
    }
}

fn node_shapes(
    shapes: &mut Vec<Shape>,
    painter: &Painter,
    node: &crate::graph::Node,
    selected: bool,
    frame: &FrameContext,
    low: bool,
) {
    let view = frame.view;
    let theme = frame.theme;
    let scale = view.scale;
    let body = screen_rect(view, node.bounding_rect());
    let rounding = match node.shape {
        NodeShape::Box => 0.0,
        NodeShape::Round => 5.0 * scale,
        NodeShape::Card => 9.0 * scale,
    };

    let border = if selected { theme.selection } else { theme.node_border };
    shapes.push(Shape::rect_filled(body.expand(1.0 * scale), rounding, border));
    shapes.push(Shape::rect_filled(body, rounding, theme.node_body));

    let title = screen_rect(view, node.title_rect());
    shapes.push(Shape::rect_filled(title, rounding, theme.node_title));

    let show_text = !low && scale > 0.5;
    if show_text {
        let galley = painter.layout_no_wrap(
            node.title.clone(),
            FontId::proportional(12.0 * scale),
            theme.node_text,
        );
        let pos = Align2::CENTER_CENTER.align_size_within_rect(galley.size(), title).min;
        shapes.push(Shape::galley(pos, galley, theme.node_text));
    }

    // connectors; collapsed nodes still show their merged title-edge pair
    let slot_radius = 4.0 * scale;
    let slot_count = |kind| match kind {
        SlotKind::Input => if node.collapsed { node.inputs.len().min(1) } else { node.inputs.len() },
        SlotKind::Output => if node.collapsed { node.outputs.len().min(1) } else { node.outputs.len() },
    };
    for kind in [SlotKind::Input, SlotKind::Output] {
        let color = match kind {
            SlotKind::Input => theme.slot_input,
            SlotKind::Output => theme.slot_output,
        };
        for index in 0..slot_count(kind) {
            let center = view.to_screen(node.slot_pos(kind, index));
            if low {
                let r = Rect::from_center_size(center, Vec2::splat(2.0 * slot_radius));
                shapes.push(Shape::rect_filled(r, 0.0, color));
            } else {
                shapes.push(Shape::circle_filled(center, slot_radius + 1.0, theme.slot_border));
                shapes.push(Shape::circle_filled(center, slot_radius, color));
            }
        }
    }

    if node.collapsed {
        return;
    }

    if node.resizable && !low {
        let corner = screen_rect(view, node.resize_corner());
        shapes.push(Shape::line_segment(
            [corner.left_bottom(), corner.right_top()],
            Stroke::new(1.0, theme.node_border),
        ));
    }

    for (index, widget) in node.widgets.iter().enumerate() {
        let rect = screen_rect(view, node.widget_rect(index));
        shapes.push(Shape::rect_filled(rect, 3.0 * scale, theme.widget_bg));
        match (&widget.kind, &widget.value) {
            (WidgetKind::Slider { min, max }, WidgetValue::Number(v)) => {
                let ratio = ((v - min) / (max - min).max(f32::EPSILON)).clamp(0.0, 1.0);
                let fill = Rect::from_min_size(
                    rect.min,
                    Vec2::new(rect.width() * ratio, rect.height()),
                );
                shapes.push(Shape::rect_filled(fill, 3.0 * scale, theme.widget_active));
            }
            (WidgetKind::Toggle, WidgetValue::Bool(true)) => {
                shapes.push(Shape::rect_filled(rect, 3.0 * scale, theme.widget_active));
            }
            _ => {}
        }
        if show_text {
            let label = widget_label(widget);
            let galley = painter.layout_no_wrap(
                label,
                FontId::proportional(10.0 * scale),
                theme.widget_text,
            );
            let pos = Align2::CENTER_CENTER.align_size_within_rect(galley.size(), rect).min;
            shapes.push(Shape::galley(pos, galley, theme.widget_text));
        }
    }
}

fn widget_label(widget: &crate::graph::Widget) -> String {
    match &widget.value {
        WidgetValue::Number(v) => format!("{}: {v:.2}", widget.name),
        WidgetValue::Bool(v) => format!("{}: {}", widget.name, if *v { "on" } else { "off" }),
        WidgetValue::Text(text) => format!("{}: {text}", widget.name),
        WidgetValue::Choice(index) => match &widget.kind {
            WidgetKind::Combo { options } => {
                let choice = options.get(*index).map(String::as_str).unwrap_or("?");
                format!("{}: {choice}", widget.name)
            }
            _ => widget.name.clone(),
        },
        WidgetValue::None => widget.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;

    #[test]
    fn test_link_curve_controls_follow_directions() {
        let from = Pos2::new(0.0, 0.0);
        let to = Pos2::new(100.0, 0.0);
        let points = link_curve(from, Direction::Right, to, Direction::Left);
        assert_eq!(points[0], from);
        assert_eq!(points[3], to);
        assert_eq!(points[1], Pos2::new(25.0, 0.0));
        assert_eq!(points[2], Pos2::new(75.0, 0.0));
    }

    #[test]
    fn test_bezier_midpoint_of_straight_curve() {
        let points = link_curve(
            Pos2::new(0.0, 0.0),
            Direction::Right,
            Pos2::new(100.0, 0.0),
            Direction::Left,
        );
        let mid = bezier_point(0.5, &points);
        assert!((mid.x - 50.0).abs() < 1e-3);
        assert!(mid.y.abs() < 1e-3);
    }

    #[test]
    fn test_dirty_flags_default_clean() {
        let mut flags = DirtyFlags::default();
        assert!(!flags.any());
        flags.mark_all();
        assert!(flags.foreground && flags.background);
    }

    fn run_frame(
        pipeline: &mut RenderPipeline,
        dirty: &mut DirtyFlags,
        graph: &mut Graph,
        view: &ViewTransform,
    ) {
        let ctx = egui::Context::default();
        let selection = SelectionModel::new();
        let config = EditorConfig::default();
        let theme = Colors::dark();
        let _ = ctx.run(Default::default(), |ctx| {
            let painter = ctx.layer_painter(egui::LayerId::background());
            let mut frame = FrameContext {
                graph,
                selection: &selection,
                gesture: &Gesture::Idle,
                view,
                config: &config,
                theme: &theme,
                viewport: Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0)),
                anim_time: 0.0,
                fps: 60.0,
            };
            pipeline.draw(&painter, dirty, &mut frame);
        });
    }

    fn linked_graph() -> Graph {
        let mut graph = Graph::new();
        let a = graph.add_node(Node::new("A", Pos2::new(0.0, 0.0)).with_output("o", "number"));
        let b = graph.add_node(
            Node::new("B", Pos2::new(300.0, 0.0)).with_input("i", "number"),
        );
        graph.connect(a, 0, b, 0).unwrap();
        graph
    }

    #[test]
    fn test_layers_rebuild_only_when_dirty() {
        let mut pipeline = RenderPipeline::new();
        let mut dirty = DirtyFlags { foreground: true, background: true };
        let mut graph = linked_graph();
        let view = ViewTransform::new();

        run_frame(&mut pipeline, &mut dirty, &mut graph, &view);
        assert_eq!(pipeline.background_rebuilds(), 1);
        assert_eq!(pipeline.foreground_rebuilds(), 1);
        assert!(!dirty.any());

        // clean frame: both caches replayed
        run_frame(&mut pipeline, &mut dirty, &mut graph, &view);
        assert_eq!(pipeline.background_rebuilds(), 1);
        assert_eq!(pipeline.foreground_rebuilds(), 1);

        // foreground-only invalidation leaves the background cache alone
        dirty.foreground = true;
        run_frame(&mut pipeline, &mut dirty, &mut graph, &view);
        assert_eq!(pipeline.background_rebuilds(), 1);
        assert_eq!(pipeline.foreground_rebuilds(), 2);
    }

    #[test]
    fn test_view_change_invalidates_both_layers() {
        let mut pipeline = RenderPipeline::new();
        let mut dirty = DirtyFlags { foreground: true, background: true };
        let mut graph = linked_graph();
        let mut view = ViewTransform::new();

        run_frame(&mut pipeline, &mut dirty, &mut graph, &view);
        view.pan(Vec2::new(50.0, 0.0));
        run_frame(&mut pipeline, &mut dirty, &mut graph, &view);
        assert_eq!(pipeline.background_rebuilds(), 2);
        assert_eq!(pipeline.foreground_rebuilds(), 2);
    }

    #[test]
    fn test_draw_refreshes_link_midpoints() {
        let mut pipeline = RenderPipeline::new();
        let mut dirty = DirtyFlags { foreground: true, background: true };
        let mut graph = linked_graph();
        let view = ViewTransform::new();

        run_frame(&mut pipeline, &mut dirty, &mut graph, &view);
        let link = graph.links.values().next().unwrap();
        let (from, to) = graph.link_endpoints(link).unwrap();
        let expected = bezier_point(
            0.5,
            &link_curve(from, Direction::Right, to, Direction::Left),
        );
        assert!((link.midpoint - expected).length() < 1e-3);
    }
}
