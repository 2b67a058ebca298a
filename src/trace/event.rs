use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::workflow::node::NodeId;

/// Status of one attempt at running a node.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Started,
    Completed,
    Failed,
}

/// One failed attempt in a node's error history.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AttemptError {
    /// 1-based attempt number
    pub attempt: u32,
    pub error: String,
}

/// Per-attempt execution record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExecutionEvent {
    pub node: NodeId,
    pub tool: String,
    /// resolved params, or the raw ones when resolution failed
    pub params: Value,
    pub retry: u32,
    pub timeout_sec: Option<f64>,
    pub status: EventStatus,
    /// 1-based attempt number
    pub attempt: u32,
    /// epoch seconds
    pub start_ts: f64,
    pub end_ts: Option<f64>,
    /// every error of this node up to and including this attempt
    #[serde(default)]
    pub errors: Vec<AttemptError>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_value(EventStatus::Started).unwrap(), json!("started"));
        assert_eq!(serde_json::to_value(EventStatus::Completed).unwrap(), json!("completed"));
        assert_eq!(serde_json::to_value(EventStatus::Failed).unwrap(), json!("failed"));
        assert_eq!(EventStatus::Failed.as_ref(), "failed");
        assert_eq!(EventStatus::from_str("completed").unwrap(), EventStatus::Completed);
        assert!(EventStatus::from_str("running").is_err());
    }

    #[test]
    fn test_event_document_shape() {
        let event = ExecutionEvent {
            node: "image".to_string(),
            tool: "generate_image".to_string(),
            params: json!({"prompt": "cat"}),
            retry: 1,
            timeout_sec: None,
            status: EventStatus::Failed,
            attempt: 1,
            start_ts: 1.5,
            end_ts: Some(2.0),
            errors: vec![AttemptError {
                attempt: 1,
                error: "boom".to_string(),
            }],
        };

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "node": "image",
                "tool": "generate_image",
                "params": {"prompt": "cat"},
                "retry": 1,
                "timeout_sec": null,
                "status": "failed",
                "attempt": 1,
                "start_ts": 1.5,
                "end_ts": 2.0,
                "errors": [{"attempt": 1, "error": "boom"}]
            })
        );
    }
}
