//! 3D force simulation for graph layout
//!
//! Each step reads one immutable snapshot of the node set and produces a new one, so
//! every pairwise force is computed once and applied with opposite signs to both
//! nodes. Results never depend on iteration order, and a renderer holding the previous
//! snapshot never observes a half-finished step.
//!
//! Per step, from the snapshot taken at step start:
//!
//! 1. **Center gravity**: pull toward the origin proportional to distance
//! 2. **Repulsion**: inverse-square push between every node pair, scaled by mass
//! 3. **Springs**: Hooke's-law pull/push along every edge toward its rest length
//!
//! Velocities are damped, advanced by `acceleration * alpha`, clamped, and integrated.
//! A positional collision pass then separates overlapping nodes directly, and any node
//! left with a non-finite position or velocity is reset and reported.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::f32::consts::TAU;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::config::SimulationConfig;
use crate::error::{EngineError, EngineResult, SimulationFault};
use crate::graph::{Edge, Node, floor_positive};
use crate::math::{self, Vec3};

/// Convergence state of a simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationState {
    /// Simulation temperature; decays geometrically and only rises on reheat
    pub alpha: f32,
    /// Steps taken since the last `initialize`
    pub iteration: u64,
    /// False once alpha has dropped below `alpha_min`
    pub running: bool,
}

/// An edge resolved to node indices
#[derive(Debug, Clone)]
struct SimEdge {
    source: usize,
    target: usize,
    strength: f32,
    rest_length: f32,
}

/// CPU force simulation over an owned node snapshot
#[derive(Debug, Clone)]
pub struct Simulation {
    nodes: Arc<[Node]>,
    edges: Vec<SimEdge>,
    index: HashMap<String, usize>,
    config: SimulationConfig,
    state: SimulationState,
    faults: Vec<SimulationFault>,
}

impl Simulation {
    /// Start a simulation at alpha 1 from the given nodes and edges.
    ///
    /// Nodes are sanitized, duplicate ids after the first are dropped, and edges whose
    /// endpoints are missing are ignored.
    pub fn initialize(nodes: &[Node], edges: &[Edge], config: &SimulationConfig) -> Self {
        let config = config.clone().sanitized();
        let (nodes, index) = build_nodes(nodes.iter().cloned());
        let edges = resolve_edges(edges, &index, &config);

        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            "initialized force simulation"
        );

        let running = nodes.len() >= 2;
        Self {
            nodes: nodes.into(),
            edges,
            index,
            config,
            state: SimulationState {
                alpha: 1.0,
                iteration: 0,
                running,
            },
            faults: Vec::new(),
        }
    }

    /// Current node snapshot; cheap to clone and never mutated in place
    pub fn snapshot(&self) -> Arc<[Node]> {
        Arc::clone(&self.nodes)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Number of edges that resolved to known nodes
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Position of every node, keyed by id
    pub fn positions(&self) -> BTreeMap<String, Vec3> {
        self.nodes
            .iter()
            .map(|n| (n.id.clone(), n.position))
            .collect()
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Check if simulation is still running
    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Faults recorded since the last call, oldest first
    pub fn take_faults(&mut self) -> Vec<SimulationFault> {
        std::mem::take(&mut self.faults)
    }

    /// Advance one step. Returns true while active, false once converged.
    pub fn step(&mut self) -> bool {
        if !self.state.running {
            return false;
        }
        if self.nodes.len() < 2 {
            self.state.running = false;
            return false;
        }

        let current = Arc::clone(&self.nodes);
        let accelerations = self.accelerations(&current);
        let alpha = self.state.alpha;

        let mut next: Vec<Node> = current.to_vec();
        for (node, acceleration) in next.iter_mut().zip(&accelerations) {
            if node.fixed {
                node.velocity = math::ZERO;
                continue;
            }
            let velocity = math::add(
                math::scale(node.velocity, self.config.damping),
                math::scale(*acceleration, alpha),
            );
            node.velocity = math::clamp_length(velocity, self.config.max_velocity);
            node.position = math::add(node.position, node.velocity);
        }

        self.resolve_collisions(&mut next);
        self.repair_non_finite(&current, &mut next);

        self.nodes = next.into();
        self.state.iteration += 1;
        self.state.alpha *= 1.0 - self.config.alpha_decay;

        trace!(
            iteration = self.state.iteration,
            alpha = self.state.alpha,
            "simulation step"
        );

        if self.state.alpha < self.config.alpha_min {
            self.state.running = false;
            debug!(iterations = self.state.iteration, "force simulation converged");
        }
        self.state.running
    }

    /// Step until converged or `max_steps` have run; returns the steps taken
    pub fn run(&mut self, max_steps: usize) -> usize {
        let mut taken = 0;
        while taken < max_steps && self.state.running {
            self.step();
            taken += 1;
        }
        taken
    }

    /// Raise alpha to at least `alpha` and resume stepping without moving any node
    pub fn reheat(&mut self, alpha: f32) {
        let alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            self.config.reheat_alpha
        };
        self.state.alpha = self.state.alpha.max(alpha);
        self.state.running = self.nodes.len() >= 2 && self.state.alpha >= self.config.alpha_min;
        debug!(alpha = self.state.alpha, "reheated force simulation");
    }

    /// Anchor a node, optionally moving it to `position` first
    pub fn fix_node(&mut self, id: &str, position: Option<Vec3>) -> EngineResult<()> {
        self.update_node(id, |node| {
            if let Some(position) = position.filter(|p| math::is_finite(*p)) {
                node.position = position;
            }
            node.velocity = math::ZERO;
            node.fixed = true;
        })
    }

    /// Release an anchored node back to the forces
    pub fn release_node(&mut self, id: &str) -> EngineResult<()> {
        self.update_node(id, |node| node.fixed = false)
    }

    /// Replace the node/edge set after a structural change.
    ///
    /// Nodes that survive keep their simulated position and velocity (unless the host
    /// now pins them), new nodes start from their supplied position, and the simulation
    /// is reheated to `reheat_alpha`.
    pub fn set_graph(&mut self, nodes: &[Node], edges: &[Edge]) {
        let merged = nodes.iter().map(|incoming| {
            let mut node = incoming.clone();
            if let Some(existing) = self.node(&node.id).filter(|_| !incoming.fixed) {
                node.position = existing.position;
                node.velocity = existing.velocity;
            }
            node
        });
        let (nodes, index) = build_nodes(merged.collect::<Vec<_>>());
        self.edges = resolve_edges(edges, &index, &self.config);
        self.nodes = nodes.into();
        self.index = index;

        debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "replaced simulation graph"
        );
        self.reheat(self.config.reheat_alpha);
    }

    fn update_node(&mut self, id: &str, f: impl FnOnce(&mut Node)) -> EngineResult<()> {
        let i = *self
            .index
            .get(id)
            .ok_or_else(|| EngineError::UnknownNode(id.to_string()))?;
        let mut nodes = self.nodes.to_vec();
        f(&mut nodes[i]);
        self.nodes = nodes.into();
        Ok(())
    }

    /// Acceleration of every node from gravity, repulsion and springs
    fn accelerations(&self, nodes: &[Node]) -> Vec<Vec3> {
        let n = nodes.len();
        let eps = self.config.distance_epsilon;
        let mut acc = vec![math::ZERO; n];

        for (a, node) in acc.iter_mut().zip(nodes) {
            if !node.fixed {
                *a = math::scale(node.position, -self.config.center_gravity);
            }
        }

        if self.config.repulsion > 0.0 {
            for i in 0..n {
                for j in (i + 1)..n {
                    let delta = math::sub(nodes[i].position, nodes[j].position);
                    let (dir, dist) = separation(delta, eps, &nodes[i].id, &nodes[j].id);
                    let force = math::scale(dir, self.config.repulsion / (dist * dist));
                    apply_pair(&mut acc, nodes, i, j, force);
                }
            }
        }

        for edge in &self.edges {
            let (s, t) = (edge.source, edge.target);
            let delta = math::sub(nodes[t].position, nodes[s].position);
            let (dir, dist) = separation(delta, eps, &nodes[t].id, &nodes[s].id);
            let displacement = dist - edge.rest_length;
            let force = math::scale(
                dir,
                displacement * self.config.spring_strength * edge.strength,
            );
            apply_pair(&mut acc, nodes, s, t, force);
        }

        acc
    }

    /// Push apart any pair closer than the sum of radii plus `min_separation`
    fn resolve_collisions(&self, nodes: &mut [Node]) {
        let n = nodes.len();
        let eps = self.config.distance_epsilon;
        let mut shifts = vec![math::ZERO; n];

        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (&nodes[i], &nodes[j]);
                if a.fixed && b.fixed {
                    continue;
                }
                let min_dist = a.radius + b.radius + self.config.min_separation;
                let delta = math::sub(a.position, b.position);
                let dist = math::length(delta);
                if dist.is_nan() || dist >= min_dist {
                    continue;
                }
                let (dir, _) = separation(delta, eps, &a.id, &b.id);
                let overlap = min_dist - dist;
                match (a.fixed, b.fixed) {
                    (false, false) => {
                        let half = math::scale(dir, overlap * 0.5);
                        shifts[i] = math::add(shifts[i], half);
                        shifts[j] = math::sub(shifts[j], half);
                    }
                    (false, true) => shifts[i] = math::add(shifts[i], math::scale(dir, overlap)),
                    (true, false) => shifts[j] = math::sub(shifts[j], math::scale(dir, overlap)),
                    (true, true) => {}
                }
            }
        }

        for (node, shift) in nodes.iter_mut().zip(shifts) {
            node.position = math::add(node.position, shift);
        }
    }

    /// Reset nodes whose state became non-finite and record a fault for each
    fn repair_non_finite(&mut self, previous: &[Node], next: &mut [Node]) {
        for (before, node) in previous.iter().zip(next.iter_mut()) {
            if math::is_finite(node.position) && math::is_finite(node.velocity) {
                continue;
            }
            let reset_to = if math::is_finite(before.position) {
                before.position
            } else {
                math::ZERO
            };
            warn!(
                node = %node.id,
                iteration = self.state.iteration,
                "non-finite node state, resetting"
            );
            node.position = reset_to;
            node.velocity = math::ZERO;
            self.faults.push(SimulationFault::NonFinite {
                node: node.id.clone(),
                iteration: self.state.iteration,
                reset_to,
            });
        }
    }
}

/// Inverse-square repulsion acting on a point at `a` from a point at `b`.
///
/// The distance is floored at `epsilon`. Coincident points have no defined direction
/// and yield zero here; the simulation substitutes a deterministic axis for them.
pub fn repulsion_force(a: Vec3, b: Vec3, strength: f32, epsilon: f32) -> Vec3 {
    let delta = math::sub(a, b);
    let len = math::length(delta);
    if len == 0.0 {
        return math::ZERO;
    }
    let dist = len.max(epsilon);
    math::scale(math::scale(delta, 1.0 / len), strength / (dist * dist))
}

/// Add `force / mass` to node `i` and subtract it from node `j`, skipping fixed nodes
fn apply_pair(acc: &mut [Vec3], nodes: &[Node], i: usize, j: usize, force: Vec3) {
    if !nodes[i].fixed {
        acc[i] = math::add(acc[i], math::scale(force, 1.0 / nodes[i].mass));
    }
    if !nodes[j].fixed {
        acc[j] = math::sub(acc[j], math::scale(force, 1.0 / nodes[j].mass));
    }
}

/// Unit direction and floored length of `delta`, the offset of node `id` from node
/// `other`.
///
/// A zero-length delta falls back to [`fallback_axis`], so coincident nodes still
/// separate, the same way whatever order the nodes came in.
fn separation(delta: Vec3, epsilon: f32, id: &str, other: &str) -> (Vec3, f32) {
    let len = math::length(delta);
    let dir = if len > 0.0 {
        math::scale(delta, 1.0 / len)
    } else {
        fallback_axis(id, other)
    };
    (dir, len.max(epsilon))
}

/// Horizontal unit axis for a coincident pair, pointing from `other` toward `id`.
///
/// The angle is a hash of the two ids in sorted order; swapping the arguments flips
/// the sign.
fn fallback_axis(id: &str, other: &str) -> Vec3 {
    let (low, high) = if id < other { (id, other) } else { (other, id) };
    let mut hasher = DefaultHasher::new();
    (low, high).hash(&mut hasher);
    let angle = (hasher.finish() >> 40) as f32 / (1u64 << 24) as f32 * TAU;
    let axis = [angle.cos(), 0.0, angle.sin()];
    if id < other { axis } else { math::neg(axis) }
}

fn build_nodes<I>(nodes: I) -> (Vec<Node>, HashMap<String, usize>)
where
    I: IntoIterator<Item = Node>,
{
    let mut out = Vec::new();
    let mut index = HashMap::new();
    for node in nodes {
        if index.contains_key(&node.id) {
            warn!(node = %node.id, "duplicate node id ignored");
            continue;
        }
        index.insert(node.id.clone(), out.len());
        out.push(node.sanitized());
    }
    (out, index)
}

fn resolve_edges(
    edges: &[Edge],
    index: &HashMap<String, usize>,
    config: &SimulationConfig,
) -> Vec<SimEdge> {
    edges
        .iter()
        .filter_map(|e| {
            let source = *index.get(&e.source)?;
            let target = *index.get(&e.target)?;
            if source == target {
                return None;
            }
            let rest_length = e
                .rest_length
                .map(|l| floor_positive(l, config.distance_epsilon))
                .unwrap_or(config.ideal_length);
            Some(SimEdge {
                source,
                target,
                strength: e.effective_strength(),
                rest_length,
            })
        })
        .collect()
}
