use std::sync::Arc;

use serde_json::{Map, Value, json};

use crate::workflow::node::NodeId;

/// Read-only view of a run handed to every tool call.
///
/// Cheap to clone: the input and the results snapshot are shared.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    input: Arc<Value>,
    results: Arc<Map<NodeId, Value>>,
}

impl ToolContext {
    pub fn new(
        input: Value,
        results: Map<NodeId, Value>,
    ) -> Self {
        Self {
            input: Arc::new(input),
            results: Arc::new(results),
        }
    }

    pub(crate) fn from_shared(
        input: Arc<Value>,
        results: Arc<Map<NodeId, Value>>,
    ) -> Self {
        Self {
            input,
            results,
        }
    }

    /// the run input
    pub fn input(&self) -> &Value {
        &self.input
    }

    /// results of the nodes completed before this one
    pub fn results(&self) -> &Map<NodeId, Value> {
        &self.results
    }

    pub fn result(
        &self,
        nid: &str,
    ) -> Option<&Value> {
        self.results.get(nid)
    }

    /// `{"input": ..., "results": ...}`
    pub fn to_value(&self) -> Value {
        json!({
            "input": self.input.as_ref(),
            "results": self.results.as_ref(),
        })
    }
}
