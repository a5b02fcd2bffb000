//! constellation - spatial layout and simulation engine for 3D node-link graphs.
//!
//! This crate decides where every node of a graph sits in 3D space. It provides
//! deterministic layout strategies, a force simulation for continuous refinement,
//! greedy spatial clustering with host-driven expand/collapse, and a camera controller
//! that eases between an overview and a focused node. Rendering is left to the host,
//! which feeds nodes and edges in and reads a [`Frame`] back each tick.

pub mod bounds;
pub mod camera;
pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod layout;
pub mod math;
pub mod simulation;

pub use bounds::BoundingBox;
pub use camera::{CameraMode, CameraPose, FocusController};
pub use cluster::{Cluster, ClusterView, Clustering};
pub use config::{CameraConfig, ClusterConfig, EngineConfig, LayoutConfig, SimulationConfig};
pub use engine::{Engine, Frame};
pub use error::{EngineError, EngineResult, SimulationFault};
pub use graph::{Category, Edge, GraphInput, Node};
pub use layout::{LayoutResult, LayoutStrategy};
pub use math::Vec3;
pub use simulation::{Simulation, SimulationState};
