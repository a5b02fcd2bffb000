//! Graph data types supplied by the host
//!
//! Nodes and edges are projections of workspace entities and their relations. The
//! engine borrows them for one call and hands back updated copies; it never keeps a
//! reference across calls.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_EDGE_STRENGTH, DEFAULT_NODE_RADIUS, MIN_MASS, MIN_RADIUS};
use crate::error::{EngineError, EngineResult};
use crate::math::{self, Vec3};

/// Category of a workspace entity, used to group nodes in layouts
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Person,
    Meeting,
    Document,
    Thread,
    Task,
    #[default]
    Topic,
}

impl Category {
    /// Every category, in layout order
    pub const ALL: [Category; 6] = [
        Category::Person,
        Category::Meeting,
        Category::Document,
        Category::Thread,
        Category::Task,
        Category::Topic,
    ];

    /// Stable ordinal of this category
    pub fn index(&self) -> usize {
        match self {
            Category::Person => 0,
            Category::Meeting => 1,
            Category::Document => 2,
            Category::Thread => 3,
            Category::Task => 4,
            Category::Topic => 5,
        }
    }
}

/// A positioned, sized entity in the visualized graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier (e.g., "person:ada", "doc:roadmap")
    pub id: String,

    /// Entity category
    #[serde(default)]
    pub category: Category,

    /// Visual radius; also the size metric for hierarchical layouts and camera framing
    #[serde(default = "default_radius")]
    pub radius: f32,

    /// Inertia for force integration
    #[serde(default = "default_mass")]
    pub mass: f32,

    /// Recent activity in [0, 1]
    #[serde(default)]
    pub activity: f32,

    /// Position in 3D space (the pinned position when `fixed` is set)
    #[serde(default)]
    pub position: Vec3,

    /// Velocity carried between simulation steps
    #[serde(default, skip_serializing_if = "is_zero")]
    pub velocity: Vec3,

    /// Anchored nodes are never moved by simulation forces
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fixed: bool,
}

fn default_radius() -> f32 {
    DEFAULT_NODE_RADIUS
}

fn default_mass() -> f32 {
    1.0
}

fn is_zero(v: &Vec3) -> bool {
    *v == math::ZERO
}

impl Node {
    /// Create a node at the origin with default size and mass
    pub fn new(id: impl Into<String>, category: Category) -> Self {
        Self {
            id: id.into(),
            category,
            radius: DEFAULT_NODE_RADIUS,
            mass: 1.0,
            activity: 0.0,
            position: math::ZERO,
            velocity: math::ZERO,
            fixed: false,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_activity(mut self, activity: f32) -> Self {
        self.activity = activity;
        self
    }

    /// Pin the node at the given position
    pub fn fixed_at(mut self, position: Vec3) -> Self {
        self.position = position;
        self.velocity = math::ZERO;
        self.fixed = true;
        self
    }

    /// Clamp malformed values into their valid ranges.
    ///
    /// Non-positive radius and mass are raised to small positive minimums, activity is
    /// clamped to [0, 1], and non-finite vectors are reset to zero.
    pub fn sanitized(mut self) -> Self {
        self.radius = floor_positive(self.radius, MIN_RADIUS);
        self.mass = floor_positive(self.mass, MIN_MASS);
        self.activity = if self.activity.is_finite() {
            self.activity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if !math::is_finite(self.position) {
            self.position = math::ZERO;
        }
        if !math::is_finite(self.velocity) || self.fixed {
            self.velocity = math::ZERO;
        }
        self
    }
}

/// A weighted relation between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node ID
    pub source: String,

    /// Target node ID
    pub target: String,

    /// Spring weight in [0, 1]
    #[serde(default = "default_strength")]
    pub strength: f32,

    /// Rest length; falls back to the configured ideal spring length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_length: Option<f32>,
}

fn default_strength() -> f32 {
    DEFAULT_EDGE_STRENGTH
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            strength: DEFAULT_EDGE_STRENGTH,
            rest_length: None,
        }
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_rest_length(mut self, rest_length: f32) -> Self {
        self.rest_length = Some(rest_length);
        self
    }

    /// Strength clamped to [0, 1] (non-finite becomes 0)
    pub fn effective_strength(&self) -> f32 {
        if self.strength.is_finite() {
            self.strength.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Complete graph input as read from a file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphInput {
    #[serde(default)]
    pub nodes: Vec<Node>,

    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphInput {
    /// Read a graph from a `.json`, `.yaml` or `.yml` file
    pub fn from_path(path: &Path) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path)?;
        match extension(path).as_deref() {
            Some("json") => Ok(serde_json::from_str(&text)?),
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&text)?),
            other => Err(EngineError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }
}

/// Lower-cased file extension of a path
pub(crate) fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Raise non-positive or non-finite values to `min`
pub(crate) fn floor_positive(value: f32, min: f32) -> f32 {
    if value.is_finite() && value >= min {
        value
    } else {
        min
    }
}
