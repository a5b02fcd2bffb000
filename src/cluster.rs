//! Greedy spatial clustering for presentation
//!
//! Nodes are visited once in input order. A node that still has enough free neighbors
//! within `cluster_distance` seeds a cluster of itself plus its nearest neighbors, up to
//! `max_cluster_size`. Neighbors past that cap are consumed by the seed but presented
//! standalone. The grouping depends only on input order; it is not globally optimal.
//!
//! Clusters are recomputed wholesale whenever positions or config change, so cluster
//! ids are only meaningful until the next recomputation. Whether a cluster is shown
//! expanded is decided by the host and passed into [`present`] each time.

use std::collections::{BTreeSet, HashSet};
use std::f32::consts::TAU;

use serde::Serialize;

use crate::config::ClusterConfig;
use crate::graph::Node;
use crate::math::{self, Vec3};

/// A group of nearby nodes collapsed into one aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Derived from the seed node id (e.g., "cluster:person:ada")
    pub id: String,
    /// Member node ids, seed first, then by distance from the seed
    pub members: Vec<String>,
    /// Mean member position
    pub centroid: Vec3,
    /// `sqrt(member count) * size_scale`
    pub radius: f32,
    /// Mean member activity
    pub activity: f32,
}

/// Result of a clustering pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Clustering {
    pub clusters: Vec<Cluster>,
    /// Nodes not in any cluster, in input order
    pub standalone: Vec<String>,
}

/// A node placed for presentation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedNode {
    pub id: String,
    pub position: Vec3,
}

/// How a cluster is shown this frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ClusterView {
    /// Drawn as a single aggregate
    Collapsed(Cluster),
    /// Members drawn individually on a ring around the centroid
    Expanded {
        cluster: Cluster,
        members: Vec<PlacedNode>,
    },
}

impl ClusterView {
    pub fn cluster(&self) -> &Cluster {
        match self {
            ClusterView::Collapsed(cluster) => cluster,
            ClusterView::Expanded { cluster, .. } => cluster,
        }
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self, ClusterView::Expanded { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Free,
    Member,
    /// Within reach of a seed whose cluster was already full
    Spilled,
}

/// Group spatially-near nodes into bounded-size clusters
pub fn cluster(nodes: &[Node], config: &ClusterConfig) -> Clustering {
    let config = config.clone().sanitized();

    let mut seen = HashSet::new();
    let nodes: Vec<&Node> = nodes.iter().filter(|n| seen.insert(n.id.as_str())).collect();

    if !config.enabled {
        return Clustering {
            clusters: Vec::new(),
            standalone: nodes.iter().map(|n| n.id.clone()).collect(),
        };
    }

    let mut slots = vec![Slot::Free; nodes.len()];
    let mut clusters = Vec::new();

    for seed in 0..nodes.len() {
        if slots[seed] != Slot::Free {
            continue;
        }

        let origin = nodes[seed].position;
        let mut neighbors: Vec<(f32, usize)> = (0..nodes.len())
            .filter(|&j| j != seed && slots[j] == Slot::Free)
            .map(|j| (math::distance(origin, nodes[j].position), j))
            .filter(|(d, _)| *d <= config.cluster_distance)
            .collect();

        if neighbors.len() + 1 < config.min_cluster_size {
            continue;
        }

        // Stable sort: equal distances keep input order
        neighbors.sort_by(|a, b| a.0.total_cmp(&b.0));
        let take = neighbors.len().min(config.max_cluster_size - 1);

        slots[seed] = Slot::Member;
        let mut members = vec![seed];
        for (k, &(_, j)) in neighbors.iter().enumerate() {
            if k < take {
                slots[j] = Slot::Member;
                members.push(j);
            } else {
                slots[j] = Slot::Spilled;
            }
        }

        clusters.push(build_cluster(&nodes, &members, &config));
    }

    let standalone = nodes
        .iter()
        .zip(&slots)
        .filter(|(_, slot)| **slot != Slot::Member)
        .map(|(n, _)| n.id.clone())
        .collect();

    tracing::trace!(clusters = clusters.len(), "clustered nodes");

    Clustering {
        clusters,
        standalone,
    }
}

fn build_cluster(nodes: &[&Node], members: &[usize], config: &ClusterConfig) -> Cluster {
    let count = members.len() as f32;
    Cluster {
        id: format!("cluster:{}", nodes[members[0]].id),
        members: members.iter().map(|&i| nodes[i].id.clone()).collect(),
        centroid: math::mean(members.iter().map(|&i| nodes[i].position)),
        radius: count.sqrt() * config.size_scale,
        activity: members.iter().map(|&i| nodes[i].activity).sum::<f32>() / count,
    }
}

/// Resolve each cluster to its presentation given the host's expanded set.
///
/// Expanded members are placed evenly on a ring of `expand_radius` around the
/// centroid. This is a presentation-time placement, not a simulation.
pub fn present(
    clustering: &Clustering,
    expanded: &BTreeSet<String>,
    config: &ClusterConfig,
) -> Vec<ClusterView> {
    let config = config.clone().sanitized();
    clustering
        .clusters
        .iter()
        .map(|cluster| {
            if !expanded.contains(&cluster.id) {
                return ClusterView::Collapsed(cluster.clone());
            }
            let step = TAU / cluster.members.len() as f32;
            let members = cluster
                .members
                .iter()
                .enumerate()
                .map(|(k, id)| PlacedNode {
                    id: id.clone(),
                    position: math::ring_point(
                        cluster.centroid,
                        config.expand_radius,
                        k as f32 * step,
                    ),
                })
                .collect();
            ClusterView::Expanded {
                cluster: cluster.clone(),
                members,
            }
        })
        .collect()
}
