//! Tool abstraction and registry.
//!
//! A tool is the callable bound to a workflow node. The engine does not know
//! what a tool does; it only looks it up by name, hands it the resolved
//! params plus a read-only [`ToolContext`], and awaits the result.

mod func;

use std::{collections::HashMap, fmt, future::Future, sync::Arc};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{BoxError, runtime::ToolContext};

pub use func::{FnTool, ToolFn, ToolFnAsync};

/// Resolved named parameters passed to a tool.
pub type Params = Map<String, Value>;

/// Result returned by a tool body.
pub type ToolResult = std::result::Result<Value, BoxError>;

#[async_trait]
pub trait Tool: Send + Sync {
    /// Invokes the tool.
    ///
    /// # Arguments
    ///
    /// * `params` - The node's params with every `$ref` resolved.
    /// * `ctx` - Read-only view of the run input and the results so far.
    ///
    /// # Returns
    ///
    /// Returns the value stored under the node id in the results map.
    async fn call(
        &self,
        params: Params,
        ctx: ToolContext,
    ) -> ToolResult;
}

/// Mapping from tool name to tool.
///
/// Owned by an engine rather than kept in global state, so engines with
/// different tool sets can coexist.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool, replacing any tool with the same name.
    pub fn register<T>(
        &mut self,
        name: impl Into<String>,
        tool: T,
    ) -> &mut Self
    where
        T: Tool + 'static,
    {
        self.tools.insert(name.into(), Arc::new(tool));
        self
    }

    /// Registers a closure that produces its result immediately.
    pub fn register_fn<F>(
        &mut self,
        name: impl Into<String>,
        f: F,
    ) -> &mut Self
    where
        F: Fn(Params, ToolContext) -> ToolResult + Send + Sync + 'static,
    {
        self.register(name, FnTool::sync(f))
    }

    /// Registers a closure returning a future.
    pub fn register_async_fn<F, Fut>(
        &mut self,
        name: impl Into<String>,
        f: F,
    ) -> &mut Self
    where
        F: Fn(Params, ToolContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        self.register(name, FnTool::future(f))
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.tools.contains_key(name)
    }

    /// registered tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("ToolRegistry").field("tools", &self.names()).finish()
    }
}
