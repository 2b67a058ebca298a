use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    FlowError, Result,
    model::{EdgeModel, NodeModel},
};

/// Workflow document: ordered nodes plus precedence edges.
///
/// Node order is significant: it breaks ties between nodes that become
/// ready at the same time during scheduling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowModel {
    pub nodes: Vec<NodeModel>,
    #[serde(default)]
    pub edges: Vec<EdgeModel>,
}

impl WorkflowModel {
    pub fn from_json(s: &str) -> Result<Self> {
        let value = serde_json::from_str::<Value>(s).map_err(|e| FlowError::Spec(format!("{}", e)))?;
        Self::from_value(value)
    }

    /// Validates the document against [`WorkflowModel::schema`] and deserializes it.
    pub fn from_value(value: Value) -> Result<Self> {
        jsonschema::validate(&Self::schema(), &value)?;
        serde_json::from_value::<WorkflowModel>(value).map_err(|e| FlowError::Spec(format!("{}", e)))
    }

    pub fn schema() -> Value {
        json!({
            "type": "object",
            "required": ["nodes"],
            "properties": {
                "nodes": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["id", "tool"],
                        "properties": {
                            "id": { "type": "string", "minLength": 1 },
                            "tool": { "type": "string", "minLength": 1 },
                            "params": { "type": "object" },
                            "retry": { "type": "integer", "minimum": 0 },
                            "timeout_sec": {
                                "anyOf": [
                                    { "type": "number", "exclusiveMinimum": 0 },
                                    { "type": "null" }
                                ]
                            }
                        }
                    }
                },
                "edges": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["from", "to"],
                        "properties": {
                            "from": { "type": "string" },
                            "to": { "type": "string" }
                        }
                    }
                }
            }
        })
    }
}
