//! Engine configuration
//!
//! Every tunable constant has a documented `DEFAULT_*` value. Configs are plain serde
//! structs so a host can load them from YAML or JSON; any field left out keeps its
//! default. Malformed values are clamped by `sanitized()` instead of being rejected.

use std::f32::consts::FRAC_PI_2;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bounds::BoundingBox;
use crate::error::{EngineError, EngineResult};
use crate::graph::{extension, floor_positive};

// =============================================================================
// Shared floors
// =============================================================================

/// Smallest distance used as a force denominator (avoids singularities)
pub const DISTANCE_EPSILON: f32 = 0.01;

/// Smallest mass a node may have
pub const MIN_MASS: f32 = 0.01;

/// Smallest radius a node may have
pub const MIN_RADIUS: f32 = 0.01;

/// Default node radius when the host supplies none
pub const DEFAULT_NODE_RADIUS: f32 = 1.0;

/// Default edge strength when the host supplies none
pub const DEFAULT_EDGE_STRENGTH: f32 = 1.0;

// =============================================================================
// Simulation defaults
// =============================================================================

/// Pull toward the origin, per unit of distance
pub const DEFAULT_CENTER_GRAVITY: f32 = 0.01;

/// Inverse-square repulsion constant between every node pair.
///
/// Small next to the spring constant, so a short edge settles near its rest length.
pub const DEFAULT_REPULSION: f32 = 0.15;

/// Spring constant for edges
pub const DEFAULT_SPRING_STRENGTH: f32 = 0.4;

/// Rest length for edges that do not carry their own
pub const DEFAULT_IDEAL_LENGTH: f32 = 8.0;

/// Fraction of velocity kept each step
pub const DEFAULT_DAMPING: f32 = 0.6;

/// Velocity magnitude cap applied after force accumulation
pub const DEFAULT_MAX_VELOCITY: f32 = 10.0;

/// Extra gap kept between node surfaces by collision correction
pub const DEFAULT_MIN_SEPARATION: f32 = 0.5;

/// Alpha below which the simulation is converged
pub const DEFAULT_ALPHA_MIN: f32 = 0.001;

/// Number of steps for alpha to decay from 1 to `DEFAULT_ALPHA_MIN`
pub const DEFAULT_ALPHA_DECAY_TICKS: f32 = 300.0;

/// Alpha restored after a structural change to the node/edge set
pub const DEFAULT_REHEAT_ALPHA: f32 = 0.3;

// =============================================================================
// Layout defaults
// =============================================================================

/// Radius of the innermost ring or band
pub const DEFAULT_BASE_RADIUS: f32 = 10.0;

/// Radial distance between consecutive rings or bands
pub const DEFAULT_LAYER_GAP: f32 = 6.0;

/// Maximum radial jitter for a fully active node (capped at half the layer gap)
pub const DEFAULT_JITTER: f32 = 2.0;

/// Distance of category anchors from the origin
pub const DEFAULT_ANCHOR_DISTANCE: f32 = 30.0;

/// Radius of the ring members form around their category anchor
pub const DEFAULT_ANCHOR_RING_RADIUS: f32 = 5.0;

/// Nodes per layer in hierarchical banding
pub const DEFAULT_BAND_SIZE: usize = 4;

/// Vertical drop between hierarchical layers
pub const DEFAULT_BAND_HEIGHT: f32 = 6.0;

/// Lattice spacing for the grid layout
pub const DEFAULT_GRID_SPACING: f32 = 4.0;

/// Iteration budget for the embedded force layout
pub const DEFAULT_FORCE_ITERATIONS: usize = 100;

/// Half-extent of the cube unplaced nodes are scattered in before a force layout
pub const DEFAULT_RANDOM_EXTENT: f32 = 20.0;

/// Seed for jitter and random placement
pub const DEFAULT_SEED: u64 = 0x5EED;

// =============================================================================
// Clustering defaults
// =============================================================================

/// Neighborhood radius for grouping nodes
pub const DEFAULT_CLUSTER_DISTANCE: f32 = 6.0;

/// Fewest members a cluster may have
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 3;

/// Most members a cluster may have
pub const DEFAULT_MAX_CLUSTER_SIZE: usize = 12;

/// Cluster radius per square root of member count
pub const DEFAULT_CLUSTER_SIZE_SCALE: f32 = 1.5;

/// Ring radius expanded members are placed on around the centroid
pub const DEFAULT_EXPAND_RADIUS: f32 = 6.0;

// =============================================================================
// Camera defaults
// =============================================================================

/// Distance of the overview pose from the origin
pub const DEFAULT_OVERVIEW_DISTANCE: f32 = 80.0;

/// Elevation of the overview pose above the horizontal plane (radians)
pub const DEFAULT_OVERVIEW_ELEVATION: f32 = 0.5;

/// Focus distance per unit of node radius
pub const DEFAULT_FOCUS_MULTIPLIER: f32 = 4.0;

/// Focus distance added regardless of node size
pub const DEFAULT_FOCUS_OFFSET: f32 = 6.0;

/// Elevation of the focused pose behind the node (radians)
pub const DEFAULT_FOCUS_ELEVATION: f32 = 0.35;

/// Interpolation fraction per tick in overview
pub const DEFAULT_OVERVIEW_LERP: f32 = 0.03;

/// Interpolation fraction per tick while focused
pub const DEFAULT_FOCUS_LERP: f32 = 0.08;

/// Vertical field of view used for overview framing (radians)
pub const DEFAULT_FOV: f32 = std::f32::consts::FRAC_PI_4;

/// Closest the fitted overview may come
pub const DEFAULT_MIN_OVERVIEW_DISTANCE: f32 = 20.0;

/// Farthest the fitted overview may go
pub const DEFAULT_MAX_OVERVIEW_DISTANCE: f32 = 1000.0;

/// Distance under which the camera counts as settled
pub const DEFAULT_SETTLE_EPSILON: f32 = 0.01;

fn clamp_unit(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

fn clamp_elevation(value: f32, fallback: f32) -> f32 {
    let value = if value.is_finite() { value } else { fallback };
    value.clamp(-FRAC_PI_2, FRAC_PI_2)
}

fn non_negative(value: f32) -> f32 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

/// Force simulation constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub center_gravity: f32,
    pub repulsion: f32,
    pub spring_strength: f32,
    pub ideal_length: f32,
    pub damping: f32,
    pub max_velocity: f32,
    pub min_separation: f32,
    pub alpha_min: f32,
    /// Fraction of alpha removed each step
    pub alpha_decay: f32,
    pub reheat_alpha: f32,
    pub distance_epsilon: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            center_gravity: DEFAULT_CENTER_GRAVITY,
            repulsion: DEFAULT_REPULSION,
            spring_strength: DEFAULT_SPRING_STRENGTH,
            ideal_length: DEFAULT_IDEAL_LENGTH,
            damping: DEFAULT_DAMPING,
            max_velocity: DEFAULT_MAX_VELOCITY,
            min_separation: DEFAULT_MIN_SEPARATION,
            alpha_min: DEFAULT_ALPHA_MIN,
            alpha_decay: 1.0 - DEFAULT_ALPHA_MIN.powf(1.0 / DEFAULT_ALPHA_DECAY_TICKS),
            reheat_alpha: DEFAULT_REHEAT_ALPHA,
            distance_epsilon: DISTANCE_EPSILON,
        }
    }
}

impl SimulationConfig {
    pub fn sanitized(mut self) -> Self {
        self.distance_epsilon = floor_positive(self.distance_epsilon, DISTANCE_EPSILON);
        self.center_gravity = non_negative(self.center_gravity);
        self.repulsion = non_negative(self.repulsion);
        self.spring_strength = non_negative(self.spring_strength);
        self.ideal_length = floor_positive(self.ideal_length, self.distance_epsilon);
        self.damping = clamp_unit(self.damping, DEFAULT_DAMPING);
        self.max_velocity = floor_positive(self.max_velocity, self.distance_epsilon);
        self.min_separation = non_negative(self.min_separation);
        self.alpha_min = clamp_unit(self.alpha_min, DEFAULT_ALPHA_MIN);
        self.alpha_decay = clamp_unit(self.alpha_decay, 0.0);
        self.reheat_alpha = clamp_unit(self.reheat_alpha, DEFAULT_REHEAT_ALPHA);
        self
    }
}

/// Layout strategy constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub base_radius: f32,
    pub layer_gap: f32,
    pub jitter: f32,
    pub anchor_distance: f32,
    pub anchor_ring_radius: f32,
    pub band_size: usize,
    pub band_height: f32,
    pub grid_spacing: f32,
    pub force_iterations: usize,
    pub random_extent: f32,
    pub seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_radius: DEFAULT_BASE_RADIUS,
            layer_gap: DEFAULT_LAYER_GAP,
            jitter: DEFAULT_JITTER,
            anchor_distance: DEFAULT_ANCHOR_DISTANCE,
            anchor_ring_radius: DEFAULT_ANCHOR_RING_RADIUS,
            band_size: DEFAULT_BAND_SIZE,
            band_height: DEFAULT_BAND_HEIGHT,
            grid_spacing: DEFAULT_GRID_SPACING,
            force_iterations: DEFAULT_FORCE_ITERATIONS,
            random_extent: DEFAULT_RANDOM_EXTENT,
            seed: DEFAULT_SEED,
        }
    }
}

impl LayoutConfig {
    pub fn sanitized(mut self) -> Self {
        self.base_radius = floor_positive(self.base_radius, DISTANCE_EPSILON);
        self.layer_gap = floor_positive(self.layer_gap, DISTANCE_EPSILON);
        self.jitter = non_negative(self.jitter);
        self.anchor_distance = floor_positive(self.anchor_distance, DISTANCE_EPSILON);
        self.anchor_ring_radius = floor_positive(self.anchor_ring_radius, DISTANCE_EPSILON);
        self.band_size = self.band_size.max(1);
        self.band_height = non_negative(self.band_height);
        self.grid_spacing = floor_positive(self.grid_spacing, DISTANCE_EPSILON);
        self.random_extent = floor_positive(self.random_extent, DISTANCE_EPSILON);
        self
    }

    /// Radial jitter for a fully active node, never more than half the layer gap
    pub fn max_jitter(&self) -> f32 {
        self.jitter.min(self.layer_gap * 0.5)
    }
}

/// Clustering constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Disable to present every node standalone
    pub enabled: bool,
    pub cluster_distance: f32,
    pub min_cluster_size: usize,
    pub max_cluster_size: usize,
    pub size_scale: f32,
    pub expand_radius: f32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cluster_distance: DEFAULT_CLUSTER_DISTANCE,
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            max_cluster_size: DEFAULT_MAX_CLUSTER_SIZE,
            size_scale: DEFAULT_CLUSTER_SIZE_SCALE,
            expand_radius: DEFAULT_EXPAND_RADIUS,
        }
    }
}

impl ClusterConfig {
    pub fn sanitized(mut self) -> Self {
        self.cluster_distance = floor_positive(self.cluster_distance, DISTANCE_EPSILON);
        self.min_cluster_size = self.min_cluster_size.max(1);
        self.max_cluster_size = self.max_cluster_size.max(self.min_cluster_size);
        self.size_scale = floor_positive(self.size_scale, DISTANCE_EPSILON);
        self.expand_radius = floor_positive(self.expand_radius, DISTANCE_EPSILON);
        self
    }
}

/// Camera framing and interpolation constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub overview_distance: f32,
    pub overview_elevation: f32,
    pub focus_multiplier: f32,
    pub focus_offset: f32,
    pub focus_elevation: f32,
    pub overview_lerp: f32,
    pub focus_lerp: f32,
    pub fov: f32,
    pub min_overview_distance: f32,
    pub max_overview_distance: f32,
    pub settle_epsilon: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            overview_distance: DEFAULT_OVERVIEW_DISTANCE,
            overview_elevation: DEFAULT_OVERVIEW_ELEVATION,
            focus_multiplier: DEFAULT_FOCUS_MULTIPLIER,
            focus_offset: DEFAULT_FOCUS_OFFSET,
            focus_elevation: DEFAULT_FOCUS_ELEVATION,
            overview_lerp: DEFAULT_OVERVIEW_LERP,
            focus_lerp: DEFAULT_FOCUS_LERP,
            fov: DEFAULT_FOV,
            min_overview_distance: DEFAULT_MIN_OVERVIEW_DISTANCE,
            max_overview_distance: DEFAULT_MAX_OVERVIEW_DISTANCE,
            settle_epsilon: DEFAULT_SETTLE_EPSILON,
        }
    }
}

impl CameraConfig {
    pub fn sanitized(mut self) -> Self {
        self.min_overview_distance = floor_positive(self.min_overview_distance, DISTANCE_EPSILON);
        self.max_overview_distance = floor_positive(
            self.max_overview_distance,
            self.min_overview_distance,
        );
        self.overview_distance = floor_positive(self.overview_distance, DISTANCE_EPSILON);
        self.overview_elevation =
            clamp_elevation(self.overview_elevation, DEFAULT_OVERVIEW_ELEVATION);
        self.focus_elevation = clamp_elevation(self.focus_elevation, DEFAULT_FOCUS_ELEVATION);
        self.focus_multiplier = non_negative(self.focus_multiplier);
        self.focus_offset = floor_positive(self.focus_offset, DISTANCE_EPSILON);
        self.overview_lerp = clamp_unit(self.overview_lerp, DEFAULT_OVERVIEW_LERP);
        self.focus_lerp = clamp_unit(self.focus_lerp, DEFAULT_FOCUS_LERP);
        self.fov = if self.fov.is_finite() && self.fov > 0.0 && self.fov < std::f32::consts::PI {
            self.fov
        } else {
            DEFAULT_FOV
        };
        self.settle_epsilon = floor_positive(self.settle_epsilon, f32::EPSILON);
        self
    }

    /// Overview distance that fits `bounds` in the field of view
    pub fn fit_overview(&mut self, bounds: &BoundingBox) {
        if bounds.is_empty() {
            return;
        }

        let size = bounds.size();
        let max_dim = size[0].max(size[1]).max(size[2]);
        // The overview looks at the origin, so cover the farthest corner from it too
        let reach = bounds.max_abs_extent() * 2.0;
        let span = max_dim.max(reach);
        let distance = (span / 2.0) / (self.fov / 2.0).tan();

        self.overview_distance =
            distance.clamp(self.min_overview_distance, self.max_overview_distance);
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub simulation: SimulationConfig,
    pub layout: LayoutConfig,
    pub cluster: ClusterConfig,
    pub camera: CameraConfig,
}

impl EngineConfig {
    /// Read a configuration from a `.json`, `.yaml` or `.yml` file
    pub fn from_path(path: &Path) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = match extension(path).as_deref() {
            Some("json") => serde_json::from_str(&text)?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&text)?,
            other => {
                return Err(EngineError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                ));
            }
        };
        Ok(config.sanitized())
    }

    pub fn sanitized(self) -> Self {
        Self {
            simulation: self.simulation.sanitized(),
            layout: self.layout.sanitized(),
            cluster: self.cluster.sanitized(),
            camera: self.camera.sanitized(),
        }
    }
}
