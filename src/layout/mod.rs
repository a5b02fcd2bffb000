//! One-shot layout strategies
//!
//! Each strategy is a pure function of (nodes, edges, config): it assigns a position to
//! every node and reports the bounding box for camera framing. Nothing is retained
//! between calls; randomness comes from a seeded generator in the config.
//!
//! - **Ring**: one horizontal ring per category, jittered by activity
//! - **Anchor**: each category clustered on a small ring around a fixed anchor
//! - **Hierarchy**: size-ranked bands stepping down and outward
//! - **Grid**: a cubic lattice centered at the origin
//! - **Force**: a bounded run of the force simulation
//!
//! Fixed nodes always keep their pinned position and are left out of the placement.

mod anchor;
mod force;
mod grid;
mod hierarchy;
mod ring;

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::bounds::BoundingBox;
use crate::config::{LayoutConfig, SimulationConfig};
use crate::graph::{Edge, Node};
use crate::math::Vec3;

pub use anchor::category_anchor;

/// Which placement to compute
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum LayoutStrategy {
    /// Concentric ring per category
    #[default]
    Ring,
    /// Small ring around a fixed anchor per category
    Anchor,
    /// Bands ordered by node size
    Hierarchy,
    /// Cubic lattice
    Grid,
    /// Bounded force simulation run
    Force,
}

/// Output of a layout: a position per node id plus framing bounds
#[derive(Debug, Clone, Default, Serialize)]
pub struct LayoutResult {
    pub positions: BTreeMap<String, Vec3>,
    pub bounds: BoundingBox,
}

impl LayoutResult {
    /// Write the computed positions into matching nodes and clear their velocities
    pub fn apply(&self, nodes: &mut [Node]) {
        for node in nodes {
            if let Some(position) = self.positions.get(&node.id) {
                node.position = *position;
                node.velocity = [0.0, 0.0, 0.0];
            }
        }
    }
}

/// Compute a layout for `nodes`.
///
/// Only the force strategy reads `edges` and `simulation`. Duplicate ids after the
/// first are ignored.
pub fn layout(
    nodes: &[Node],
    edges: &[Edge],
    strategy: LayoutStrategy,
    config: &LayoutConfig,
    simulation: &SimulationConfig,
) -> LayoutResult {
    let config = config.clone().sanitized();

    let mut seen = HashSet::new();
    let nodes: Vec<Node> = nodes
        .iter()
        .filter(|n| seen.insert(n.id.as_str()))
        .map(|n| n.clone().sanitized())
        .collect();

    let placed = match strategy {
        LayoutStrategy::Ring => place_free(&nodes, &config, ring::place),
        LayoutStrategy::Anchor => place_free(&nodes, &config, anchor::place),
        LayoutStrategy::Hierarchy => place_free(&nodes, &config, hierarchy::place),
        LayoutStrategy::Grid => place_free(&nodes, &config, grid::place),
        LayoutStrategy::Force => force::place(&nodes, edges, &config, simulation),
    };

    let bounds = BoundingBox::from_spheres(
        nodes
            .iter()
            .zip(&placed)
            .map(|(n, position)| (*position, n.radius)),
    );
    let positions = nodes
        .iter()
        .zip(placed)
        .map(|(n, position)| (n.id.clone(), position))
        .collect();

    tracing::debug!(?strategy, nodes = nodes.len(), "computed layout");

    LayoutResult { positions, bounds }
}

/// Run a deterministic placement over the free nodes and merge pinned positions back in
fn place_free(
    nodes: &[Node],
    config: &LayoutConfig,
    place: fn(&[&Node], &LayoutConfig) -> Vec<Vec3>,
) -> Vec<Vec3> {
    let free: Vec<&Node> = nodes.iter().filter(|n| !n.fixed).collect();
    let mut free_positions = place(&free, config).into_iter();
    nodes
        .iter()
        .map(|n| {
            if n.fixed {
                n.position
            } else {
                free_positions.next().unwrap_or(n.position)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Category;

    fn nodes(count: usize) -> Vec<Node> {
        (0..count)
            .map(|i| Node::new(format!("n{i}"), Category::ALL[i % Category::ALL.len()]))
            .collect()
    }

    const ALL_STRATEGIES: [LayoutStrategy; 5] = [
        LayoutStrategy::Ring,
        LayoutStrategy::Anchor,
        LayoutStrategy::Hierarchy,
        LayoutStrategy::Grid,
        LayoutStrategy::Force,
    ];

    #[test]
    fn every_strategy_positions_every_node() {
        let input = nodes(13);
        for strategy in ALL_STRATEGIES {
            let result = layout(
                &input,
                &[],
                strategy,
                &LayoutConfig::default(),
                &SimulationConfig::default(),
            );
            assert_eq!(result.positions.len(), 13, "{strategy:?}");
            assert!(!result.bounds.is_empty());
            for position in result.positions.values() {
                assert!(position.iter().all(|c| c.is_finite()), "{strategy:?}");
            }
        }
    }

    #[test]
    fn every_strategy_is_deterministic() {
        let input = nodes(9);
        let edges = vec![Edge::new("n0", "n1"), Edge::new("n1", "n2")];
        for strategy in ALL_STRATEGIES {
            let a = layout(
                &input,
                &edges,
                strategy,
                &LayoutConfig::default(),
                &SimulationConfig::default(),
            );
            let b = layout(
                &input,
                &edges,
                strategy,
                &LayoutConfig::default(),
                &SimulationConfig::default(),
            );
            assert_eq!(a.positions, b.positions, "{strategy:?}");
        }
    }

    #[test]
    fn fixed_nodes_keep_pinned_position() {
        let mut input = nodes(6);
        input[2] = input[2].clone().fixed_at([42.0, -1.0, 3.0]);
        for strategy in ALL_STRATEGIES {
            let result = layout(
                &input,
                &[],
                strategy,
                &LayoutConfig::default(),
                &SimulationConfig::default(),
            );
            assert_eq!(result.positions["n2"], [42.0, -1.0, 3.0], "{strategy:?}");
        }
    }

    #[test]
    fn empty_input_gives_empty_result() {
        for strategy in ALL_STRATEGIES {
            let result = layout(
                &[],
                &[],
                strategy,
                &LayoutConfig::default(),
                &SimulationConfig::default(),
            );
            assert!(result.positions.is_empty());
            assert!(result.bounds.is_empty());
        }
    }

    #[test]
    fn bounds_cover_node_spheres() {
        let input = vec![Node::new("big", Category::Person).with_radius(3.0)];
        let result = layout(
            &input,
            &[],
            LayoutStrategy::Grid,
            &LayoutConfig::default(),
            &SimulationConfig::default(),
        );
        assert_eq!(result.bounds.min, [-3.0, -3.0, -3.0]);
        assert_eq!(result.bounds.max, [3.0, 3.0, 3.0]);
        assert_eq!(result.bounds.center(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn apply_writes_positions_back() {
        let mut input = nodes(2);
        input[0].velocity = [1.0, 1.0, 1.0];
        let result = layout(
            &input,
            &[],
            LayoutStrategy::Grid,
            &LayoutConfig::default(),
            &SimulationConfig::default(),
        );
        result.apply(&mut input);
        assert_eq!(input[0].position, result.positions["n0"]);
        assert_eq!(input[0].velocity, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn strategy_names_are_snake_case() {
        let strategy: LayoutStrategy = serde_json::from_str("\"hierarchy\"").unwrap();
        assert_eq!(strategy, LayoutStrategy::Hierarchy);
        assert_eq!(LayoutStrategy::default(), LayoutStrategy::Ring);
    }
}
