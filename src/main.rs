//! Nodeweave - a visual editor for typed dataflow graphs
//!
//! Hosts the editor core in an eframe window: a top bar with view state
//! and toggles, and a central canvas that owns all pointer interaction.

use eframe::egui;
use egui::{Color32, Pos2, Rect, Vec2};

use nodeweave::graph::{Group, Node, Widget};
use nodeweave::{EditorEvent, EventKind, GraphEditor, Handled};

/// Application shell around the editor core
struct NodeweaveApp {
    editor: GraphEditor,
}

impl NodeweaveApp {
    fn new() -> Self {
        let mut editor = GraphEditor::new();
        seed_demo_graph(&mut editor);

        // host-side reaction example: log committed widget values
        editor.events_mut().on(EventKind::WidgetChanged, |event| {
            if let EditorEvent::WidgetChanged { node, widget, new, .. } = event {
                log::info!("widget {widget} on node {node} changed to {new:?}");
            }
            Handled::Pass
        });

        Self { editor }
    }
}

/// A small starter graph so the canvas is not empty on first launch
fn seed_demo_graph(editor: &mut GraphEditor) {
    let time = editor.add_node(
        Node::new("Time", Pos2::new(80.0, 120.0))
            .with_output("seconds", "number")
            .with_output("tick", "event"),
    );
    let gain = editor.add_node(
        Node::new("Gain", Pos2::new(320.0, 100.0))
            .with_input("value", "number")
            .with_output("scaled", "number")
            .with_widget(Widget::slider("amount", 0.0, 2.0, 1.0))
            .with_widget(Widget::toggle("bypass", false)),
    );
    let osc = editor.add_node(
        Node::new("Oscilloscope", Pos2::new(580.0, 140.0))
            .with_input("signal", "number")
            .with_input("trigger", "action"),
    );

    let graph = editor.graph_mut();
    let _ = graph.connect(time, 0, gain, 0);
    let _ = graph.connect(gain, 0, osc, 0);
    let _ = graph.connect(time, 1, osc, 1);
    graph.add_group(Group::new(
        0,
        "Signal chain",
        Rect::from_min_size(Pos2::new(40.0, 40.0), Vec2::new(460.0, 260.0)),
    ));
}

impl eframe::App for NodeweaveApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_bar")
            .frame(
                egui::Frame::default()
                    .fill(Color32::from_rgb(28, 28, 28))
                    .inner_margin(egui::Margin::same(8)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new("Nodeweave").color(Color32::LIGHT_BLUE),
                    );
                    ui.separator();
                    let view = self.editor.view().clone();
                    ui.label(format!("Zoom: {:.1}x", view.scale));
                    ui.label(format!(
                        "Pan: ({:.0}, {:.0})",
                        view.offset.x, view.offset.y
                    ));
                    ui.separator();

                    let config = self.editor.config().clone();
                    let mut show_grid = config.show_grid;
                    let mut snap = config.snap_to_grid;
                    if ui.checkbox(&mut show_grid, "Grid").changed() {
                        self.editor.config_mut().show_grid = show_grid;
                    }
                    if ui.checkbox(&mut snap, "Snap").changed() {
                        self.editor.config_mut().snap_to_grid = snap;
                    }
                    ui.separator();
                    ui.label(format!(
                        "{} nodes, {} links",
                        self.editor.graph().nodes.len(),
                        self.editor.graph().links.len()
                    ));
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(Color32::from_rgb(28, 28, 28)))
            .show(ctx, |ui| {
                self.editor.show(ui);
            });
    }
}

/// Application entry point.
fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Nodeweave",
        options,
        Box::new(|_cc| Ok(Box::new(NodeweaveApp::new()))),
    )
}
