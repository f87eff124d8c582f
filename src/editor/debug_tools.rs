//! Debug and performance monitoring tools for the editor
//!
//! Frame-time tracking feeds the adaptive render quality; the benchmark
//! helpers scatter throwaway nodes for interactive performance testing.

use std::time::Instant;

use egui::{Pos2, Ui, Vec2};
use rand::Rng;

use crate::graph::{Graph, Node, NodeId, Widget};

/// Tracks frame times and builds benchmark graphs
pub struct DebugTools {
    show_performance_info: bool,
    frame_times: Vec<f32>,
    last_frame_time: Instant,
}

impl Default for DebugTools {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugTools {
    pub fn new() -> Self {
        Self {
            show_performance_info: false,
            frame_times: Vec::new(),
            last_frame_time: Instant::now(),
        }
    }

    pub fn toggle_performance_info(&mut self) {
        self.show_performance_info = !self.show_performance_info;
    }

    /// Records the time since the previous call
    pub fn update_frame_time(&mut self) {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        self.frame_times.push(frame_time);
        if self.frame_times.len() > 60 {
            self.frame_times.remove(0);
        }
    }

    /// Average frame rate over the tracked window
    pub fn fps(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 60.0;
        }
        let avg = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        if avg > 0.0 { 1.0 / avg } else { 60.0 }
    }

    /// Performance overlay window
    pub fn render_performance_info(&self, ui: &mut Ui, node_count: usize, link_count: usize) {
        if !self.show_performance_info || self.frame_times.is_empty() {
            return;
        }
        egui::Window::new("Performance")
            .default_pos([10.0, 40.0])
            .default_size([200.0, 100.0])
            .resizable(false)
            .show(ui.ctx(), |ui| {
                ui.label(format!("FPS: {:.1}", self.fps()));
                ui.label(format!("Nodes: {node_count}"));
                ui.label(format!("Links: {link_count}"));
                ui.separator();
                ui.label("F1: Toggle performance info");
                ui.label("F2: Add 25 benchmark nodes");
                ui.label("F3: Stress test (500 nodes)");
            });
    }

    /// Scatters benchmark nodes over a loose grid with random jitter
    pub fn add_benchmark_nodes(graph: &mut Graph, count: usize) -> Vec<NodeId> {
        let mut rng = rand::rng();
        let spacing = 180.0;
        let grid_cols = (count as f32).sqrt().ceil() as usize;

        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let col = i % grid_cols;
            let row = i / grid_cols;
            let jitter = Vec2::new(rng.random_range(-20.0..20.0), rng.random_range(-20.0..20.0));
            let pos = Pos2::new(50.0 + col as f32 * spacing, 80.0 + row as f32 * spacing) + jitter;
            let node = Node::new(format!("Bench {i}"), pos)
                .with_input("in", "number")
                .with_output("out", "number")
                .with_widget(Widget::slider("value", 0.0, 1.0, rng.random_range(0.0..1.0)));
            ids.push(graph.add_node(node));
        }
        ids
    }

    /// Benchmark nodes plus chained connections for stress testing
    pub fn add_stress_test(graph: &mut Graph, count: usize) -> Vec<NodeId> {
        let ids = Self::add_benchmark_nodes(graph, count);
        for window in ids.windows(2) {
            let _ = graph.connect(window[0], 0, window[1], 0);
        }
        // some long-distance links to exercise culling
        for i in (0..ids.len().saturating_sub(20)).step_by(10) {
            let _ = graph.connect(ids[i], 0, ids[i + 20], 0);
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benchmark_nodes_are_connectable() {
        let mut graph = Graph::new();
        let ids = DebugTools::add_stress_test(&mut graph, 16);
        assert_eq!(ids.len(), 16);
        assert!(!graph.links.is_empty());
    }

    #[test]
    fn test_fps_defaults_before_first_frame() {
        let tools = DebugTools::new();
        assert_eq!(tools.fps(), 60.0);
    }
}
