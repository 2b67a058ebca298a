use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeModel {
    pub id: String,
    pub tool: String,
    #[serde(default)]
    pub params: Map<String, Value>,
    /// additional attempts after the first one
    #[serde(default)]
    pub retry: u32,
    #[serde(default)]
    pub timeout_sec: Option<f64>,
}
