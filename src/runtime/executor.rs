//! Node executor: runs one node's tool with retries and timeout handling.
//!
//! Every attempt resolves the node's params against the same input and
//! results snapshot, opens a trace event, invokes the tool (bounded by the
//! node timeout when set) and closes the event. Failed attempts sleep for the
//! configured backoff before the next one; once the budget is spent the
//! failure becomes [`FlowError::NodeFailed`].

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::{
    FlowError, Result,
    config::RetryConfig,
    runtime::ToolContext,
    tools::{Params, Tool, ToolRegistry},
    trace::{AttemptError, TraceRecorder},
    workflow::{
        node::{Node, NodeId},
        reference,
    },
};

#[derive(Debug, Clone)]
pub struct NodeExecutor {
    registry: Arc<ToolRegistry>,
    retry: RetryConfig,
}

impl NodeExecutor {
    pub fn new(
        registry: Arc<ToolRegistry>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            registry,
            retry,
        }
    }

    /// Executes `node` and stores its value under the node id in `results`.
    ///
    /// `results` is only written after the tool has returned successfully.
    pub async fn execute(
        &self,
        node: &Node,
        input: &Arc<Value>,
        results: &mut Arc<Map<NodeId, Value>>,
        recorder: &mut TraceRecorder,
    ) -> Result<Value> {
        let tool = self.registry.get(&node.tool).ok_or_else(|| FlowError::Spec(format!("unknown tool '{}' on node '{}'", node.tool, node.id)))?;

        let mut history: Vec<AttemptError> = Vec::new();
        let mut attempt: u32 = 1;

        loop {
            let resolved = reference::resolve_map(&node.params, input, results);
            let event_params = match &resolved {
                Ok(params) => Value::Object(params.clone()),
                Err(_) => Value::Object(node.params.clone()),
            };

            let pos = recorder.start_attempt(node, attempt, event_params, &history);

            let outcome = match resolved {
                Ok(params) => {
                    let ctx = ToolContext::from_shared(input.clone(), results.clone());
                    self.invoke(node, tool.as_ref(), params, ctx).await
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(value) => {
                    recorder.complete_attempt(pos);
                    if let Some(last) = history.last() {
                        warn!(trace_id = %recorder.trace_id(), node = %node.id, attempts = attempt, error = %last.error, "node had errors but recovered");
                    }
                    debug!(trace_id = %recorder.trace_id(), node = %node.id, attempt, "node completed");

                    Arc::make_mut(results).insert(node.id.clone(), value.clone());
                    return Ok(value);
                }
                Err(err) => {
                    let error = AttemptError {
                        attempt,
                        error: err.to_string(),
                    };
                    recorder.fail_attempt(pos, error.clone());
                    history.push(error);

                    if attempt >= node.max_attempts() {
                        error!(trace_id = %recorder.trace_id(), node = %node.id, attempts = attempt, error = %err, "node failed, retries exhausted");
                        return Err(FlowError::NodeFailed {
                            trace_id: recorder.trace_id().to_string(),
                            node: node.id.clone(),
                            attempts: attempt,
                            error: err.to_string(),
                        });
                    }

                    let delay = self.retry.backoff(attempt);
                    warn!(trace_id = %recorder.trace_id(), node = %node.id, attempt, error = %err, delay_ms = delay.as_millis() as u64, "attempt failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One tool call, bounded by the node timeout.
    ///
    /// On timeout the in-flight call future is dropped, which cancels it.
    async fn invoke(
        &self,
        node: &Node,
        tool: &dyn Tool,
        params: Params,
        ctx: ToolContext,
    ) -> Result<Value> {
        let call = tool.call(params, ctx);

        let ret = match node.timeout {
            Some(timeout) => tokio::time::timeout(timeout, call).await.map_err(|_| FlowError::Timeout {
                tool: node.tool.clone(),
                secs: timeout.as_secs_f64(),
            })?,
            None => call.await,
        };

        ret.map_err(|e| FlowError::Tool {
            tool: node.tool.clone(),
            message: e.to_string(),
        })
    }
}
