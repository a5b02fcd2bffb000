//! Hierarchical banding by node size
//!
//! Nodes are ranked by radius (largest first, ties broken by id) and cut into layers of
//! `band_size`. Each layer sits lower and wider than the one before it, so the most
//! important nodes crown the top of the structure.

use std::f32::consts::TAU;

use crate::config::LayoutConfig;
use crate::graph::Node;
use crate::math::{self, Vec3};

pub(super) fn place(nodes: &[&Node], config: &LayoutConfig) -> Vec<Vec3> {
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|&a, &b| {
        nodes[b]
            .radius
            .total_cmp(&nodes[a].radius)
            .then_with(|| nodes[a].id.cmp(&nodes[b].id))
    });

    let layer_count = order.len().div_ceil(config.band_size);
    let top = (layer_count.saturating_sub(1)) as f32 * config.band_height / 2.0;

    let mut positions = vec![math::ZERO; nodes.len()];
    for (layer, members) in order.chunks(config.band_size).enumerate() {
        let height = top - layer as f32 * config.band_height;
        let radius = config.base_radius + layer as f32 * config.layer_gap;
        let step = TAU / members.len() as f32;
        // Stagger alternate layers so members do not line up vertically
        let offset = if layer % 2 == 1 { step / 2.0 } else { 0.0 };

        for (k, &i) in members.iter().enumerate() {
            positions[i] = math::ring_point([0.0, height, 0.0], radius, offset + k as f32 * step);
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Category;

    #[test]
    fn largest_nodes_are_highest() {
        let nodes: Vec<Node> = (0..9)
            .map(|i| Node::new(format!("n{i}"), Category::Document).with_radius(1.0 + i as f32))
            .collect();
        let refs: Vec<&Node> = nodes.iter().collect();
        let config = LayoutConfig::default();
        let positions = place(&refs, &config);

        // n8..n5 form the top layer, n0 is alone in the bottom layer
        let top_y = positions[8][1];
        for i in 5..9 {
            assert_eq!(positions[i][1], top_y);
        }
        assert!(positions[4][1] < top_y);
        assert!(positions[0][1] < positions[4][1]);
        assert_eq!(positions[0][1], -top_y);
    }

    #[test]
    fn layers_widen_downward() {
        let nodes: Vec<Node> = (0..8)
            .map(|i| Node::new(format!("n{i}"), Category::Topic).with_radius(8.0 - i as f32))
            .collect();
        let refs: Vec<&Node> = nodes.iter().collect();
        let config = LayoutConfig::default();
        let positions = place(&refs, &config);

        let ring = |p: Vec3| (p[0] * p[0] + p[2] * p[2]).sqrt();
        assert!((ring(positions[0]) - config.base_radius).abs() < 1e-4);
        assert!((ring(positions[7]) - (config.base_radius + config.layer_gap)).abs() < 1e-4);
    }

    #[test]
    fn equal_sizes_rank_by_id() {
        let nodes = [
            Node::new("b", Category::Task),
            Node::new("a", Category::Task),
        ];
        let refs: Vec<&Node> = nodes.iter().collect();
        let config = LayoutConfig {
            band_size: 1,
            ..Default::default()
        };
        let positions = place(&refs, &config);
        assert!(positions[1][1] > positions[0][1]);
    }
}
