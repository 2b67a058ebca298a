//! Workflow engine - the main entry point for Toolflow.
//!
//! A run goes through four stages:
//! - validation: node ids, edge endpoints and tool names
//! - scheduling: a deterministic topological order, cycles rejected
//! - execution: one node at a time, strictly in that order
//! - persistence: the trace is written once, whether the run succeeded or not

use std::{sync::Arc, time::Instant};

use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::{
    FlowError, Result,
    config::RetryConfig,
    model::WorkflowModel,
    runtime::NodeExecutor,
    store::TraceStore,
    tools::ToolRegistry,
    trace::{Trace, TraceRecorder},
    utils,
    workflow::{
        Workflow,
        node::{Node, NodeId},
    },
};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub trace_id: String,
    /// value returned by every node, keyed by node id
    pub results: Map<NodeId, Value>,
    /// where the trace was persisted
    pub location: String,
}

/// The workflow engine.
///
/// Owns the tool registry it runs against and the store traces go to. Runs
/// share nothing else, so one engine can serve many runs.
///
/// # Example
///
/// ```rust,ignore
/// let engine = EngineBuilder::new()
///     .tool_fn("outline", |params, _| Ok(json!({"title": params["task"]})))
///     .build()?;
///
/// let workflow = WorkflowModel::from_json(json_str)?;
/// let run = engine.run(&workflow, json!({"task": "demo"})).await?;
/// println!("trace written to {}", run.location);
/// ```
pub struct Engine {
    registry: Arc<ToolRegistry>,
    executor: NodeExecutor,
    store: Arc<dyn TraceStore>,
}

impl Engine {
    pub(crate) fn new(
        registry: Arc<ToolRegistry>,
        store: Arc<dyn TraceStore>,
        retry: RetryConfig,
    ) -> Self {
        let executor = NodeExecutor::new(registry.clone(), retry);
        Self {
            registry,
            executor,
            store,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn store(&self) -> Arc<dyn TraceStore> {
        self.store.clone()
    }

    /// Checks the workflow without running it and returns its execution order.
    pub fn validate(
        &self,
        model: &WorkflowModel,
    ) -> Result<Vec<NodeId>> {
        self.prepare(model).map(|(_, order)| order)
    }

    /// Runs the workflow against `input`.
    ///
    /// Validation and cycle errors are returned before anything executes and
    /// leave no trace behind. A node that exhausts its retries aborts the run
    /// with [`FlowError::NodeFailed`]; the trace up to that point, including
    /// the results of every node completed before it, is still persisted.
    pub async fn run(
        &self,
        model: &WorkflowModel,
        input: Value,
    ) -> Result<RunResult> {
        if !input.is_object() {
            return Err(FlowError::Spec("run input must be a JSON object".to_string()));
        }
        let (workflow, order) = self.prepare(model)?;
        let nodes: Vec<&Node> = order.iter().filter_map(|nid| workflow.get_node(nid)).collect();

        let trace_id = utils::longid();
        let started = Instant::now();
        info!(trace_id = %trace_id, order = ?order, "workflow run started");
        debug!(trace_id = %trace_id, "{}", workflow.describe());

        let mut recorder = TraceRecorder::new(trace_id.clone(), order, input.clone());
        let input = Arc::new(input);
        let mut results = Arc::new(Map::new());

        let mut outcome = Ok(());
        for node in nodes {
            if let Err(e) = self.executor.execute(node, &input, &mut results, &mut recorder).await {
                outcome = Err(e);
                break;
            }
        }

        let results = Arc::unwrap_or_clone(results);
        let persisted = recorder.persist(results.clone(), self.store.as_ref()).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match (outcome, persisted) {
            (Ok(()), Ok(location)) => {
                info!(trace_id = %trace_id, location = %location, elapsed_ms, "workflow run completed");
                Ok(RunResult {
                    trace_id,
                    results,
                    location,
                })
            }
            (Ok(()), Err(e)) => {
                error!(trace_id = %trace_id, error = %e, "failed to persist trace");
                Err(e)
            }
            (Err(e), Ok(location)) => {
                error!(trace_id = %trace_id, location = %location, elapsed_ms, error = %e, "workflow run aborted");
                Err(e)
            }
            (Err(e), Err(store_err)) => {
                warn!(trace_id = %trace_id, error = %store_err, "failed to persist trace of aborted run");
                Err(e)
            }
        }
    }

    /// Loads a persisted trace by run identifier.
    pub async fn load_trace(
        &self,
        trace_id: &str,
    ) -> Result<Trace> {
        self.store.load(trace_id).await
    }

    fn prepare(
        &self,
        model: &WorkflowModel,
    ) -> Result<(Workflow, Vec<NodeId>)> {
        let workflow = Workflow::try_from(model)?;

        if let Some(node) = workflow.nodes().find(|n| !self.registry.contains(&n.tool)) {
            return Err(FlowError::Spec(format!("unknown tool '{}' on node '{}'", node.tool, node.id)));
        }

        let order = workflow.schedule()?;
        Ok((workflow, order))
    }
}
