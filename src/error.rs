//! Error types for Toolflow.
//!
//! All errors in Toolflow are represented by the `FlowError` enum. Spec and
//! cycle errors are raised before any node runs; reference, tool and timeout
//! errors are per-attempt failures that a node may retry; `NodeFailed` is the
//! fatal error that aborts a run once a node's retries are exhausted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::workflow::node::NodeId;

/// Error type returned by tool bodies.
///
/// Boxed so tools can bubble up any error with `?`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Unified error type for all Toolflow operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    /// Workflow document is invalid: duplicate ids, dangling edges, unknown tools.
    #[error("invalid workflow spec: {0}")]
    Spec(String),

    /// The workflow graph is not acyclic.
    #[error("workflow graph contains a cycle among nodes: {}", .0.join(", "))]
    Cycle(Vec<NodeId>),

    /// A `$ref` placeholder uses an unsupported path.
    #[error("unsupported $ref path: {0}")]
    RefSyntax(String),

    /// A `$ref` placeholder points at a missing value.
    #[error("$ref not found: {0}")]
    RefNotFound(String),

    /// The tool body returned an error.
    #[error("tool '{tool}' failed: {message}")]
    Tool {
        tool: String,
        message: String,
    },

    /// The tool invocation exceeded the node's timeout.
    #[error("tool '{tool}' timed out after {secs}s")]
    Timeout {
        tool: String,
        secs: f64,
    },

    /// A node exhausted its retries and aborted the run.
    #[error("node '{node}' failed after {attempts} attempt(s): {error}")]
    NodeFailed {
        trace_id: String,
        node: NodeId,
        attempts: u32,
        error: String,
    },

    /// Configuration parsing errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON, TOML).
    #[error("{0}")]
    Convert(String),

    /// Trace storage errors.
    #[error("{0}")]
    Store(String),
}

impl FlowError {
    /// Whether the error was raised before any node started.
    pub fn is_validation(&self) -> bool {
        matches!(self, FlowError::Spec(_) | FlowError::Cycle(_))
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(error: serde_json::Error) -> Self {
        FlowError::Convert(error.to_string())
    }
}

impl From<toml::de::Error> for FlowError {
    fn from(error: toml::de::Error) -> Self {
        FlowError::Config(error.to_string())
    }
}

impl From<jsonschema::ValidationError<'_>> for FlowError {
    fn from(error: jsonschema::ValidationError<'_>) -> Self {
        FlowError::Spec(error.to_string())
    }
}
