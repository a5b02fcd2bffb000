//! Error types for the layout engine
//!
//! Malformed numeric input is clamped rather than rejected, so the only errors here are
//! I/O and parsing failures at the edges, host calls naming unknown nodes, and
//! simulation faults reported back to the host.

use thiserror::Error;

/// Errors returned by engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// A host operation referenced a node id that is not in the current graph
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// The file format is not supported
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// A fatal-grade condition detected after a simulation step.
///
/// The offending node has already been isolated when one of these is reported.
#[derive(Error, Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulationFault {
    /// A node's position or velocity became NaN or infinite
    #[error("node {node} produced a non-finite state at iteration {iteration}; reset to {reset_to:?}")]
    NonFinite {
        node: String,
        iteration: u64,
        reset_to: [f32; 3],
    },
}
