use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use futures::{FutureExt, future::BoxFuture};

use crate::{
    runtime::ToolContext,
    tools::{Params, Tool, ToolResult},
};

pub type ToolFn = Arc<dyn Fn(Params, ToolContext) -> ToolResult + Send + Sync>;
pub type ToolFnAsync = Arc<dyn Fn(Params, ToolContext) -> BoxFuture<'static, ToolResult> + Send + Sync>;

/// Closure-backed tool.
///
/// Both calling conventions end up behind the same [`Tool::call`], so the
/// executor awaits them the same way. A `Sync` body runs on the blocking
/// thread pool; when a node timeout fires first its result is discarded.
#[derive(Clone)]
pub enum FnTool {
    Sync(ToolFn),
    Async(ToolFnAsync),
}

impl FnTool {
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(Params, ToolContext) -> ToolResult + Send + Sync + 'static,
    {
        FnTool::Sync(Arc::new(f))
    }

    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn(Params, ToolContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        FnTool::Async(Arc::new(move |params, ctx| f(params, ctx).boxed()))
    }
}

#[async_trait]
impl Tool for FnTool {
    async fn call(
        &self,
        params: Params,
        ctx: ToolContext,
    ) -> ToolResult {
        match self {
            FnTool::Sync(f) => {
                let f = f.clone();
                match tokio::task::spawn_blocking(move || f(params, ctx)).await {
                    Ok(ret) => ret,
                    Err(e) => Err(e.into()),
                }
            }
            FnTool::Async(f) => f(params, ctx).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_sync_and_async_are_awaited_uniformly() {
        let tools = vec![
            FnTool::sync(|_, _| Ok(json!("now"))),
            FnTool::future(|_, _| async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(json!("later"))
            }),
        ];

        let mut outputs = Vec::new();
        for tool in &tools {
            outputs.push(tool.call(Params::new(), ToolContext::default()).await.unwrap());
        }
        assert_eq!(outputs, vec![json!("now"), json!("later")]);
    }

    #[tokio::test]
    async fn test_sync_tool_panic_becomes_error() {
        let tool = FnTool::sync(|_, _| panic!("tool body panicked"));
        assert!(tool.call(Params::new(), ToolContext::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_async_tool_reads_context() {
        let tool = FnTool::future(|_, ctx: ToolContext| async move {
            let task: ToolResult = ctx.input().get("task").cloned().ok_or_else(|| "no task".into());
            task.map(|task| json!({"echo": task}))
        });

        let ctx = ToolContext::new(json!({"task": "demo"}), Default::default());
        assert_eq!(tool.call(Params::new(), ctx).await.unwrap(), json!({"echo": "demo"}));
    }
}
