use std::{future::Future, sync::Arc};

use crate::{
    Engine, FlowError, Result, StoreType,
    config::Config,
    runtime::ToolContext,
    store::{self, TraceStore},
    tools::{Params, Tool, ToolRegistry, ToolResult},
};

#[derive(Default)]
pub struct EngineBuilder {
    config: Config,
    registry: ToolRegistry,
    store: Option<Arc<dyn TraceStore>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = config;
        self
    }

    /// Replaces the tool registry, dropping tools registered so far.
    pub fn tools(
        mut self,
        registry: ToolRegistry,
    ) -> Self {
        self.registry = registry;
        self
    }

    pub fn tool<T>(
        mut self,
        name: impl Into<String>,
        tool: T,
    ) -> Self
    where
        T: Tool + 'static,
    {
        self.registry.register(name, tool);
        self
    }

    pub fn tool_fn<F>(
        mut self,
        name: impl Into<String>,
        f: F,
    ) -> Self
    where
        F: Fn(Params, ToolContext) -> ToolResult + Send + Sync + 'static,
    {
        self.registry.register_fn(name, f);
        self
    }

    pub fn tool_async_fn<F, Fut>(
        mut self,
        name: impl Into<String>,
        f: F,
    ) -> Self
    where
        F: Fn(Params, ToolContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        self.registry.register_async_fn(name, f);
        self
    }

    /// Uses `store` instead of the one described by the config.
    pub fn store(
        mut self,
        store: Arc<dyn TraceStore>,
    ) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<Engine> {
        let store = match self.store {
            Some(store) => store,
            None => {
                let config = &self.config.store;
                match config.store_type {
                    StoreType::File if config.file.dir.as_os_str().is_empty() => {
                        return Err(FlowError::Config("store.file.dir must not be empty".to_string()));
                    }
                    StoreType::Mem if config.mem.capacity == 0 => {
                        return Err(FlowError::Config("store.mem.capacity must be greater than 0".to_string()));
                    }
                    _ => {}
                }
                store::from_config(config)
            }
        };

        Ok(Engine::new(Arc::new(self.registry), store, self.config.retry))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_builder_registers_tools() {
        struct Echo;

        #[async_trait::async_trait]
        impl Tool for Echo {
            async fn call(
                &self,
                params: Params,
                _ctx: ToolContext,
            ) -> ToolResult {
                Ok(serde_json::Value::Object(params))
            }
        }

        let engine = EngineBuilder::new()
            .tool("echo", Echo)
            .tool_fn("now", |_, _| Ok(json!(1)))
            .tool_async_fn("later", |_, _| async { Ok(json!(2)) })
            .store(Arc::new(store::MemStore::new(4)))
            .build()
            .unwrap();

        assert_eq!(engine.registry().names(), vec!["echo", "later", "now"]);
    }

    #[test]
    fn test_builder_rejects_bad_store_config() {
        let mut config = Config::default();
        config.store.store_type = StoreType::Mem;
        config.store.mem.capacity = 0;
        assert!(matches!(EngineBuilder::new().config(config.clone()).build(), Err(FlowError::Config(_))));

        config.store.store_type = StoreType::File;
        config.store.file.dir = PathBuf::new();
        assert!(matches!(EngineBuilder::new().config(config).build(), Err(FlowError::Config(_))));
    }

    #[tokio::test]
    async fn test_builder_uses_configured_store() {
        let config = Config::load_from_str("[store]\nstore_type = \"mem\"\n").unwrap();
        let engine = EngineBuilder::new().config(config).tool_fn("t", |_, _| Ok(json!("ok"))).build().unwrap();

        let model = crate::WorkflowModel::from_json(r#"{"nodes": [{"id": "n", "tool": "t"}]}"#).unwrap();
        let run = engine.run(&model, json!({})).await.unwrap();
        assert_eq!(run.location, format!("mem://{}", run.trace_id));
    }
}
