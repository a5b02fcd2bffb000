//! Concentric rings, one per category
//!
//! Category `i` sits on a horizontal ring of radius `base_radius + i * layer_gap`.
//! Members are spread at even angular steps; active nodes are nudged off their slot
//! along the ring and across it. The nudge is a straight-line offset capped at
//! `max_jitter`, which never exceeds half the layer gap, so rings stay distinguishable.

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::LayoutConfig;
use crate::graph::{Category, Node};
use crate::math::{self, Vec3};

pub(super) fn place(nodes: &[&Node], config: &LayoutConfig) -> Vec<Vec3> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let max_jitter = config.max_jitter();

    let mut rings: BTreeMap<Category, Vec<usize>> = BTreeMap::new();
    for (i, node) in nodes.iter().enumerate() {
        rings.entry(node.category).or_default().push(i);
    }

    let mut positions = vec![math::ZERO; nodes.len()];
    for (category, members) in &rings {
        let radius = config.base_radius + category.index() as f32 * config.layer_gap;
        let step = TAU / members.len() as f32;

        for (k, &i) in members.iter().enumerate() {
            // Always draw, so one node's activity never shifts another's jitter
            let radial: f32 = rng.gen_range(-1.0..=1.0);
            let along: f32 = rng.gen_range(-1.0..=1.0);

            let angle = k as f32 * step;
            let slot = math::ring_point(math::ZERO, radius, angle);
            let reach = nodes[i].activity * max_jitter;
            let outward = [angle.cos(), 0.0, angle.sin()];
            let tangent = [-angle.sin(), 0.0, angle.cos()];
            let offset = math::add(
                math::scale(outward, radial * reach),
                math::scale(tangent, along * reach),
            );
            positions[i] = math::add(slot, math::clamp_length(offset, reach));
        }
    }
    positions
}
