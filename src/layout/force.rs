//! Embedded force layout
//!
//! Runs the force simulation for a fixed iteration budget and returns where it settled.
//! Nodes still at the origin are scattered first (seeded) so they do not all start
//! coincident; nodes with a position keep it as their starting point.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{LayoutConfig, SimulationConfig};
use crate::graph::{Edge, Node};
use crate::math::{self, Vec3};
use crate::simulation::Simulation;

pub(super) fn place(
    nodes: &[Node],
    edges: &[Edge],
    config: &LayoutConfig,
    simulation: &SimulationConfig,
) -> Vec<Vec3> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let extent = config.random_extent;

    let seeded: Vec<Node> = nodes
        .iter()
        .map(|node| {
            let mut node = node.clone();
            if !node.fixed && node.position == math::ZERO {
                node.position = [
                    rng.gen_range(-extent..=extent),
                    rng.gen_range(-extent..=extent),
                    rng.gen_range(-extent..=extent),
                ];
            }
            node
        })
        .collect();

    let mut sim = Simulation::initialize(&seeded, edges, simulation);
    let steps = sim.run(config.force_iterations);
    for fault in sim.take_faults() {
        tracing::warn!(%fault, "fault during force layout");
    }
    tracing::debug!(steps, "force layout settled");

    nodes
        .iter()
        .map(|n| sim.node(&n.id).map_or(n.position, |settled| settled.position))
        .collect()
}
