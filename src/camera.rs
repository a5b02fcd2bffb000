//! Camera focus controller
//!
//! A two-state machine (overview or focused on one node) that eases an actual camera
//! pose toward a target pose. The target is recomputed from the current node set on
//! every tick, so a focused camera follows its node as the simulation moves it.
//! Motion is plain linear interpolation by a per-mode fraction: slow for the overview,
//! quicker when acquiring a node. It never overshoots.

use serde::Serialize;

use crate::config::CameraConfig;
use crate::graph::Node;
use crate::math::{self, Vec3};

/// What the camera is looking at
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "node", rename_all = "snake_case")]
pub enum CameraMode {
    /// Establishing shot of the whole scene around the origin
    #[default]
    Overview,
    /// Framing a single node by id
    Focused(String),
}

/// Camera position and look-at point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraPose {
    /// Place the camera `distance` away from `look_at`, behind (+z) and raised by
    /// `elevation` radians
    fn orbiting(look_at: Vec3, distance: f32, elevation: f32) -> Self {
        let offset = [0.0, distance * elevation.sin(), distance * elevation.cos()];
        Self {
            position: math::add(look_at, offset),
            look_at,
        }
    }
}

/// Eases the camera between overview and per-node focus
#[derive(Debug, Clone)]
pub struct FocusController {
    config: CameraConfig,
    mode: CameraMode,
    pose: CameraPose,
    target: CameraPose,
}

impl FocusController {
    /// Create a controller resting at the overview pose
    pub fn new(config: &CameraConfig) -> Self {
        let config = config.clone().sanitized();
        let pose = overview_pose(&config);
        Self {
            config,
            mode: CameraMode::Overview,
            pose,
            target: pose,
        }
    }

    pub fn mode(&self) -> &CameraMode {
        &self.mode
    }

    /// Current interpolated pose
    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// Target pose as of the last tick
    pub fn target(&self) -> CameraPose {
        self.target
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Replace the camera constants; the pose eases toward the new target on later ticks
    pub fn set_config(&mut self, config: &CameraConfig) {
        self.config = config.clone().sanitized();
    }

    /// Start (or retarget) focus on a node
    pub fn focus(&mut self, node_id: impl Into<String>) {
        self.mode = CameraMode::Focused(node_id.into());
    }

    /// Return to the overview
    pub fn clear_focus(&mut self) {
        self.mode = CameraMode::Overview;
    }

    /// Advance one tick against the current node set and return the new pose.
    ///
    /// A focused node that no longer exists drops the controller back to overview.
    pub fn tick(&mut self, nodes: &[Node]) -> CameraPose {
        self.target = match &self.mode {
            CameraMode::Overview => overview_pose(&self.config),
            CameraMode::Focused(id) => match nodes.iter().find(|n| &n.id == id) {
                Some(node) => focused_pose(&self.config, node),
                None => {
                    tracing::debug!(node = %id, "focused node is gone, returning to overview");
                    self.mode = CameraMode::Overview;
                    overview_pose(&self.config)
                }
            },
        };

        let t = match self.mode {
            CameraMode::Overview => self.config.overview_lerp,
            CameraMode::Focused(_) => self.config.focus_lerp,
        };
        let epsilon = self.config.settle_epsilon;
        self.pose = CameraPose {
            position: approach(self.pose.position, self.target.position, t, epsilon),
            look_at: approach(self.pose.look_at, self.target.look_at, t, epsilon),
        };
        self.pose
    }

    /// True once the pose has reached the last computed target
    pub fn is_settled(&self) -> bool {
        self.pose == self.target
    }
}

/// Overview target: above and behind the origin at the configured distance
pub fn overview_pose(config: &CameraConfig) -> CameraPose {
    CameraPose::orbiting(
        math::ZERO,
        config.overview_distance,
        config.overview_elevation,
    )
}

/// Focused target: behind and above the node, farther away for larger nodes
pub fn focused_pose(config: &CameraConfig, node: &Node) -> CameraPose {
    let distance = node.radius * config.focus_multiplier + config.focus_offset;
    CameraPose::orbiting(node.position, distance, config.focus_elevation)
}

/// Lerp toward `target`, snapping once within `epsilon`
fn approach(current: Vec3, target: Vec3, t: f32, epsilon: f32) -> Vec3 {
    let next = math::lerp3(current, target, t);
    if math::distance(next, target) <= epsilon || !math::is_finite(next) {
        target
    } else {
        next
    }
}
