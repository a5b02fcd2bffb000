//! Host-owned engine context
//!
//! [`Engine`] wires one tick of data flow: simulation step, clustering, cluster
//! presentation, camera. Each host visualization owns its own engine; nothing is
//! shared between instances. The engine keeps the expanded-cluster set and camera
//! focus on the host's behalf, but both are passed into the stateless functions fresh
//! every tick.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::camera::{CameraMode, CameraPose, FocusController};
use crate::cluster::{self, ClusterView};
use crate::config::EngineConfig;
use crate::error::{EngineResult, SimulationFault};
use crate::graph::{Edge, Node};
use crate::layout::{self, LayoutResult, LayoutStrategy};
use crate::math::Vec3;
use crate::simulation::{Simulation, SimulationState};

/// Everything a renderer needs for one tick
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    /// Simulated position of every node
    pub positions: BTreeMap<String, Vec3>,
    pub clusters: Vec<ClusterView>,
    /// Node ids drawn individually (not in any cluster)
    pub standalone: Vec<String>,
    pub camera: CameraPose,
    pub camera_mode: CameraMode,
    pub alpha: f32,
    pub iteration: u64,
    /// Whether the simulation is still moving nodes
    pub active: bool,
    /// Nodes reset this tick because they went non-finite
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub faults: Vec<SimulationFault>,
}

/// Layout, simulation, clustering and camera for one visualization
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    simulation: Simulation,
    camera: FocusController,
    expanded: BTreeSet<String>,
}

impl Engine {
    /// Create an empty engine
    pub fn new(config: EngineConfig) -> Self {
        let config = config.sanitized();
        Self {
            simulation: Simulation::initialize(&[], &[], &config.simulation),
            camera: FocusController::new(&config.camera),
            expanded: BTreeSet::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn camera(&self) -> &FocusController {
        &self.camera
    }

    pub fn state(&self) -> SimulationState {
        self.simulation.state()
    }

    /// Lay out a fresh graph, start the simulation from it, and frame it.
    ///
    /// The camera's overview distance is refit to the layout bounds.
    pub fn load(&mut self, nodes: &[Node], edges: &[Edge], strategy: LayoutStrategy) -> LayoutResult {
        let result = layout::layout(
            nodes,
            edges,
            strategy,
            &self.config.layout,
            &self.config.simulation,
        );

        let mut placed = nodes.to_vec();
        result.apply(&mut placed);
        self.simulation = Simulation::initialize(&placed, edges, &self.config.simulation);

        self.config.camera.fit_overview(&result.bounds);
        self.camera.set_config(&self.config.camera);

        tracing::debug!(
            ?strategy,
            nodes = self.simulation.nodes().len(),
            overview_distance = self.config.camera.overview_distance,
            "loaded graph"
        );
        result
    }

    /// Advance the simulation one step (if active) and compose the frame
    pub fn tick(&mut self) -> Frame {
        let active = self.simulation.step();
        let faults = self.simulation.take_faults();

        let nodes = self.simulation.snapshot();
        let clustering = cluster::cluster(&nodes, &self.config.cluster);
        let clusters = cluster::present(&clustering, &self.expanded, &self.config.cluster);
        let camera = self.camera.tick(&nodes);
        let state = self.simulation.state();

        Frame {
            positions: self.simulation.positions(),
            clusters,
            standalone: clustering.standalone,
            camera,
            camera_mode: self.camera.mode().clone(),
            alpha: state.alpha,
            iteration: state.iteration,
            active,
            faults,
        }
    }

    /// Replace the node/edge set and reheat; surviving nodes keep their positions
    pub fn set_graph(&mut self, nodes: &[Node], edges: &[Edge]) {
        self.simulation.set_graph(nodes, edges);
    }

    pub fn fix_node(&mut self, id: &str, position: Option<Vec3>) -> EngineResult<()> {
        self.simulation.fix_node(id, position)
    }

    pub fn release_node(&mut self, id: &str) -> EngineResult<()> {
        self.simulation.release_node(id)
    }

    /// Reheat to `alpha`, or to the configured reheat alpha when `None`
    pub fn reheat(&mut self, alpha: Option<f32>) {
        let alpha = alpha.unwrap_or(self.config.simulation.reheat_alpha);
        self.simulation.reheat(alpha);
    }

    pub fn focus(&mut self, node_id: impl Into<String>) {
        self.camera.focus(node_id);
    }

    pub fn clear_focus(&mut self) {
        self.camera.clear_focus();
    }

    /// Mark a cluster expanded. Returns false if it already was.
    ///
    /// Cluster ids are only stable until the next recomputation; an id that no longer
    /// names a cluster is kept but has no effect.
    pub fn expand_cluster(&mut self, cluster_id: impl Into<String>) -> bool {
        self.expanded.insert(cluster_id.into())
    }

    /// Collapse a cluster. Returns false if it was not expanded.
    pub fn collapse_cluster(&mut self, cluster_id: &str) -> bool {
        self.expanded.remove(cluster_id)
    }

    /// Flip a cluster's state; returns true if it is now expanded
    pub fn toggle_cluster(&mut self, cluster_id: &str) -> bool {
        if self.expanded.remove(cluster_id) {
            false
        } else {
            self.expanded.insert(cluster_id.to_string());
            true
        }
    }

    pub fn expanded_clusters(&self) -> &BTreeSet<String> {
        &self.expanded
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::error::EngineError;
    use crate::graph::Category;

    fn sample_graph() -> (Vec<Node>, Vec<Edge>) {
        let nodes = (0..8)
            .map(|i| Node::new(format!("n{i}"), Category::ALL[i % 3]))
            .collect();
        let edges = vec![
            Edge::new("n0", "n1"),
            Edge::new("n1", "n2"),
            Edge::new("n2", "missing"),
        ];
        (nodes, edges)
    }

    #[test]
    fn empty_engine_ticks_inactive() {
        let mut engine = Engine::default();
        let frame = engine.tick();
        assert!(!frame.active);
        assert!(frame.positions.is_empty());
        assert!(frame.clusters.is_empty());
        assert_eq!(frame.camera_mode, CameraMode::Overview);
    }

    #[test]
    fn load_places_nodes_and_starts_simulation() {
        let (nodes, edges) = sample_graph();
        let mut engine = Engine::default();
        let result = engine.load(&nodes, &edges, LayoutStrategy::Ring);

        assert_eq!(result.positions.len(), 8);
        assert_eq!(engine.simulation().edge_count(), 2);
        assert_eq!(engine.simulation().positions(), result.positions);
        assert!(engine.simulation().is_running());
        assert_eq!(engine.state().iteration, 0);
    }

    #[test]
    fn load_refits_overview_distance() {
        let (nodes, edges) = sample_graph();
        let mut engine = Engine::default();
        let before = engine.config().camera.overview_distance;
        let result = engine.load(&nodes, &edges, LayoutStrategy::Grid);

        let mut expected = CameraConfig::default();
        expected.fit_overview(&result.bounds);
        assert_eq!(engine.config().camera.overview_distance, expected.overview_distance);
        assert_ne!(engine.config().camera.overview_distance, before);
    }

    #[test]
    fn tick_advances_and_converges() {
        let (nodes, edges) = sample_graph();
        let mut engine = Engine::default();
        engine.load(&nodes, &edges, LayoutStrategy::Anchor);

        let first = engine.tick();
        assert!(first.active);
        assert_eq!(first.iteration, 1);
        assert!(first.alpha < 1.0);

        let mut last = first;
        for _ in 0..1000 {
            last = engine.tick();
            if !last.active {
                break;
            }
        }
        assert!(!last.active);
        let settled = engine.tick();
        assert_eq!(settled.iteration, last.iteration);
    }

    #[test]
    fn every_node_is_clustered_or_standalone() {
        let (nodes, edges) = sample_graph();
        let mut engine = Engine::default();
        engine.load(&nodes, &edges, LayoutStrategy::Grid);
        let frame = engine.tick();

        let clustered: usize = frame.clusters.iter().map(|c| c.cluster().members.len()).sum();
        assert_eq!(clustered + frame.standalone.len(), 8);
    }

    #[test]
    fn expand_and_collapse_cluster() {
        let nodes: Vec<Node> = (0..4)
            .map(|i| Node::new(format!("n{i}"), Category::Task).fixed_at([i as f32, 0.0, 0.0]))
            .collect();
        let mut engine = Engine::default();
        engine.load(&nodes, &[], LayoutStrategy::Ring);

        let frame = engine.tick();
        assert_eq!(frame.clusters.len(), 1);
        let id = frame.clusters[0].cluster().id.clone();
        assert!(!frame.clusters[0].is_expanded());

        assert!(engine.expand_cluster(id.clone()));
        assert!(!engine.expand_cluster(id.clone()));
        assert!(engine.tick().clusters[0].is_expanded());

        assert!(!engine.toggle_cluster(&id));
        assert!(engine.expanded_clusters().is_empty());
        assert!(engine.toggle_cluster(&id));
        assert!(engine.collapse_cluster(&id));
        assert!(!engine.tick().clusters[0].is_expanded());
    }

    #[test]
    fn focus_tracks_node_and_falls_back() {
        let (nodes, edges) = sample_graph();
        let mut engine = Engine::default();
        engine.load(&nodes, &edges, LayoutStrategy::Ring);

        engine.focus("n3");
        let frame = engine.tick();
        assert_eq!(frame.camera_mode, CameraMode::Focused("n3".to_string()));
        assert_eq!(engine.camera().target().look_at, frame.positions["n3"]);

        let remaining: Vec<Node> = nodes.into_iter().filter(|n| n.id != "n3").collect();
        engine.set_graph(&remaining, &edges);
        assert_eq!(engine.tick().camera_mode, CameraMode::Overview);
    }

    #[test]
    fn set_graph_reheats_converged_engine() {
        let (nodes, edges) = sample_graph();
        let mut engine = Engine::default();
        engine.load(&nodes, &edges, LayoutStrategy::Grid);
        while engine.tick().active {}

        engine.set_graph(&nodes[..5], &edges);
        assert!(engine.simulation().is_running());
        let reheat = engine.config().simulation.reheat_alpha;
        assert!((engine.state().alpha - reheat).abs() < 1e-6);
    }

    #[test]
    fn host_operations_report_unknown_nodes() {
        let (nodes, edges) = sample_graph();
        let mut engine = Engine::default();
        engine.load(&nodes, &edges, LayoutStrategy::Ring);

        assert!(matches!(
            engine.fix_node("nope", None),
            Err(EngineError::UnknownNode(id)) if id == "nope"
        ));
        engine.fix_node("n0", Some([1.0, 2.0, 3.0])).unwrap();
        for _ in 0..20 {
            engine.tick();
        }
        assert_eq!(engine.simulation().node("n0").unwrap().position, [1.0, 2.0, 3.0]);
        engine.release_node("n0").unwrap();
        assert!(!engine.simulation().node("n0").unwrap().fixed);
    }

    #[test]
    fn reheat_defaults_to_configured_alpha() {
        let mut engine = Engine::default();
        engine.load(&sample_graph().0, &[], LayoutStrategy::Grid);
        while engine.tick().active {}
        engine.reheat(None);
        assert!(engine.simulation().is_running());
    }

    #[test]
    fn frame_serializes() {
        let (nodes, edges) = sample_graph();
        let mut engine = Engine::default();
        engine.load(&nodes, &edges, LayoutStrategy::Grid);
        let json = serde_json::to_value(engine.tick()).unwrap();
        assert_eq!(json["positions"].as_object().unwrap().len(), 8);
        assert_eq!(json["camera_mode"]["mode"], "overview");
        assert!(json.get("faults").is_none());
    }
}
