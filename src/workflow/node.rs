use std::time::Duration;

use serde_json::{Map, Value};

use crate::{FlowError, Result, model::NodeModel};

/// node id
pub type NodeId = String;

/// Runtime node: one workflow step bound to a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// node id
    pub id: NodeId,
    /// name looked up in the tool registry
    pub tool: String,
    /// parameter tree, may contain `$ref` placeholders
    pub params: Map<String, Value>,
    /// additional attempts after the first
    pub retry: u32,
    /// invocation timeout, unbounded when absent
    pub timeout: Option<Duration>,
}

impl Node {
    pub fn new(model: &NodeModel) -> Result<Self> {
        let timeout = match model.timeout_sec {
            None => None,
            Some(secs) if secs.is_finite() && secs > 0.0 => {
                let timeout = Duration::try_from_secs_f64(secs).map_err(|e| FlowError::Spec(format!("node '{}' has invalid timeout_sec: {}", model.id, e)))?;
                Some(timeout)
            }
            Some(secs) => {
                return Err(FlowError::Spec(format!("node '{}' has invalid timeout_sec: {}, must be positive", model.id, secs)));
            }
        };

        Ok(Self {
            id: model.id.clone(),
            tool: model.tool.clone(),
            params: model.params.clone(),
            retry: model.retry,
            timeout,
        })
    }

    /// Total number of attempts the node may make.
    pub fn max_attempts(&self) -> u32 {
        self.retry.saturating_add(1)
    }

    pub fn timeout_sec(&self) -> Option<f64> {
        self.timeout.map(|t| t.as_secs_f64())
    }
}
