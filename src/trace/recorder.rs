use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    Result,
    store::TraceStore,
    trace::{AttemptError, EventStatus, ExecutionEvent, Trace},
    utils,
    workflow::node::{Node, NodeId},
};

/// Accumulates the events of one run and persists them once.
#[derive(Debug)]
pub struct TraceRecorder {
    trace: Trace,
}

impl TraceRecorder {
    pub fn new(
        trace_id: String,
        order: Vec<NodeId>,
        input: Value,
    ) -> Self {
        Self {
            trace: Trace {
                trace_id,
                order,
                input,
                results: Map::new(),
                events: Vec::new(),
            },
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace.trace_id
    }

    pub fn events(&self) -> &[ExecutionEvent] {
        &self.trace.events
    }

    /// Opens a `started` event for an attempt and returns its position.
    ///
    /// `history` is the node's error history before this attempt.
    pub fn start_attempt(
        &mut self,
        node: &Node,
        attempt: u32,
        params: Value,
        history: &[AttemptError],
    ) -> usize {
        debug!(trace_id = %self.trace.trace_id, node = %node.id, tool = %node.tool, attempt, "attempt started");

        self.trace.events.push(ExecutionEvent {
            node: node.id.clone(),
            tool: node.tool.clone(),
            params,
            retry: node.retry,
            timeout_sec: node.timeout_sec(),
            status: EventStatus::Started,
            attempt,
            start_ts: utils::time::time_secs(),
            end_ts: None,
            errors: history.to_vec(),
        });
        self.trace.events.len() - 1
    }

    pub fn complete_attempt(
        &mut self,
        pos: usize,
    ) {
        self.close(pos, EventStatus::Completed, None);
    }

    pub fn fail_attempt(
        &mut self,
        pos: usize,
        error: AttemptError,
    ) {
        self.close(pos, EventStatus::Failed, Some(error));
    }

    fn close(
        &mut self,
        pos: usize,
        status: EventStatus,
        error: Option<AttemptError>,
    ) {
        if let Some(event) = self.trace.events.get_mut(pos) {
            event.status = status;
            event.end_ts = Some(utils::time::time_secs());
            event.errors.extend(error);
        }
    }

    /// Attaches the final results and returns the finished trace.
    pub fn finish(
        mut self,
        results: Map<NodeId, Value>,
    ) -> Trace {
        self.trace.results = results;
        self.trace
    }

    /// Writes the finished trace to `store` and returns its location.
    ///
    /// Consumes the recorder, so a run is persisted at most once.
    pub async fn persist(
        self,
        results: Map<NodeId, Value>,
        store: &dyn TraceStore,
    ) -> Result<String> {
        let trace = self.finish(results);
        store.save(&trace).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{model::NodeModel, store::MemStore};

    fn node() -> Node {
        Node::new(&NodeModel {
            id: "image".to_string(),
            tool: "generate_image".to_string(),
            retry: 1,
            timeout_sec: Some(2.0),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_events_accumulate_per_attempt() {
        let node = node();
        let mut recorder = TraceRecorder::new("t".to_string(), vec!["image".to_string()], json!({}));

        let first = recorder.start_attempt(&node, 1, json!({"prompt": "x"}), &[]);
        assert_eq!(recorder.events()[first].status, EventStatus::Started);
        assert_eq!(recorder.events()[first].end_ts, None);

        let error = AttemptError {
            attempt: 1,
            error: "boom".to_string(),
        };
        recorder.fail_attempt(first, error.clone());

        let second = recorder.start_attempt(&node, 2, json!({"prompt": "x"}), &[error.clone()]);
        recorder.complete_attempt(second);

        let events = recorder.events();
        assert_eq!(events.len(), 2);

        assert_eq!(events[0].status, EventStatus::Failed);
        assert_eq!(events[0].attempt, 1);
        assert_eq!(events[0].errors, vec![error.clone()]);
        assert_eq!(events[0].timeout_sec, Some(2.0));
        assert_eq!(events[0].retry, 1);
        assert!(events[0].end_ts.unwrap() >= events[0].start_ts);

        assert_eq!(events[1].status, EventStatus::Completed);
        assert_eq!(events[1].attempt, 2);
        assert_eq!(events[1].errors, vec![error]);
        assert!(events[1].start_ts >= events[0].start_ts);
    }

    #[tokio::test]
    async fn test_persist_writes_finished_trace() {
        let store = MemStore::new(4);
        let mut recorder = TraceRecorder::new("run1".to_string(), vec!["image".to_string()], json!({"task": "x"}));
        let pos = recorder.start_attempt(&node(), 1, json!({}), &[]);
        recorder.complete_attempt(pos);

        let mut results = Map::new();
        results.insert("image".to_string(), json!({"image_path": "a.png"}));

        let location = recorder.persist(results.clone(), &store).await.unwrap();
        assert_eq!(location, "mem://run1");

        let trace = store.load("run1").await.unwrap();
        assert_eq!(trace.order, vec!["image"]);
        assert_eq!(trace.input, json!({"task": "x"}));
        assert_eq!(trace.results, results);
        assert_eq!(trace.events.len(), 1);
        assert_eq!(trace.last_event("image").unwrap().status, EventStatus::Completed);
        assert_eq!(trace.failed_node(), None);
    }
}
