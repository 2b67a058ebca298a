//! Execution trace of a workflow run.
//!
//! A [`Trace`] is created when a run starts, mutated in memory through a
//! [`TraceRecorder`] while nodes execute, and persisted once when the run
//! ends, whether it succeeded or not.

mod event;
mod recorder;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::workflow::node::NodeId;

pub use event::{AttemptError, EventStatus, ExecutionEvent};
pub use recorder::TraceRecorder;

/// Persisted record of one run.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Trace {
    pub trace_id: String,
    /// execution order chosen by the scheduler
    pub order: Vec<NodeId>,
    pub input: Value,
    pub results: Map<NodeId, Value>,
    /// one event per attempt, in chronological order
    pub events: Vec<ExecutionEvent>,
}

impl Trace {
    /// events recorded for `nid`, in order
    pub fn events_for<'a>(
        &'a self,
        nid: &'a str,
    ) -> impl Iterator<Item = &'a ExecutionEvent> + 'a {
        self.events.iter().filter(move |e| e.node == nid)
    }

    /// last recorded event for `nid`
    pub fn last_event(
        &self,
        nid: &str,
    ) -> Option<&ExecutionEvent> {
        self.events.iter().rev().find(|e| e.node == nid)
    }

    /// node whose final attempt failed, if any
    pub fn failed_node(&self) -> Option<&NodeId> {
        self.events.last().filter(|e| e.status == EventStatus::Failed && !self.results.contains_key(&e.node)).map(|e| &e.node)
    }
}
