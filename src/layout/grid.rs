//! Cubic lattice layout

use crate::config::LayoutConfig;
use crate::graph::Node;
use crate::math::Vec3;

/// Smallest edge length whose cube holds `count` cells
fn side_for(count: usize) -> usize {
    let mut side = 1;
    while side * side * side < count {
        side += 1;
    }
    side
}

pub(super) fn place(nodes: &[&Node], config: &LayoutConfig) -> Vec<Vec3> {
    let side = side_for(nodes.len());
    let center = (side - 1) as f32 / 2.0;
    let coord = |c: usize| (c as f32 - center) * config.grid_spacing;

    (0..nodes.len())
        .map(|i| {
            let x = i % side;
            let y = (i / side) % side;
            let z = i / (side * side);
            [coord(x), coord(y), coord(z)]
        })
        .collect()
}
