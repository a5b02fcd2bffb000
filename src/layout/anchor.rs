//! Category anchoring
//!
//! Each category owns one of six anchors on the axes around the origin. Members form a
//! small horizontal ring around their anchor; a lone member sits on the anchor itself.

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use crate::config::LayoutConfig;
use crate::graph::{Category, Node};
use crate::math::{self, Vec3};

/// Unit directions of the anchors, indexed by category ordinal
const ANCHOR_DIRECTIONS: [Vec3; 6] = [
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
];

/// Fixed spatial anchor for a category
pub fn category_anchor(category: Category, config: &LayoutConfig) -> Vec3 {
    let direction = ANCHOR_DIRECTIONS[category.index() % ANCHOR_DIRECTIONS.len()];
    math::scale(direction, config.anchor_distance)
}

pub(super) fn place(nodes: &[&Node], config: &LayoutConfig) -> Vec<Vec3> {
    let mut groups: BTreeMap<Category, Vec<usize>> = BTreeMap::new();
    for (i, node) in nodes.iter().enumerate() {
        groups.entry(node.category).or_default().push(i);
    }

    let mut positions = vec![math::ZERO; nodes.len()];
    for (category, members) in &groups {
        let anchor = category_anchor(*category, config);
        if let [only] = members.as_slice() {
            positions[*only] = anchor;
            continue;
        }
        let step = TAU / members.len() as f32;
        for (k, &i) in members.iter().enumerate() {
            positions[i] = math::ring_point(anchor, config.anchor_ring_radius, k as f32 * step);
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_are_distinct() {
        let config = LayoutConfig::default();
        for a in Category::ALL {
            for b in Category::ALL {
                if a != b {
                    assert_ne!(category_anchor(a, &config), category_anchor(b, &config));
                }
            }
        }
    }

    #[test]
    fn members_ring_their_anchor() {
        let nodes: Vec<Node> = (0..4)
            .map(|i| Node::new(format!("m{i}"), Category::Meeting))
            .chain(std::iter::once(Node::new("solo", Category::Task)))
            .collect();
        let refs: Vec<&Node> = nodes.iter().collect();
        let config = LayoutConfig::default();
        let positions = place(&refs, &config);

        let anchor = category_anchor(Category::Meeting, &config);
        for p in &positions[..4] {
            assert!((math::distance(*p, anchor) - config.anchor_ring_radius).abs() < 1e-4);
        }
        assert_eq!(positions[4], category_anchor(Category::Task, &config));
    }
}
