//! # Toolflow
//!
//! Toolflow is a small, embeddable workflow engine written in Rust.
//! A workflow is a DAG of nodes, each bound to a named tool. The engine runs
//! the nodes one at a time in a deterministic topological order. It wires
//! outputs to inputs through `{"$ref": ...}` placeholders, retries failed
//! nodes with a linear backoff, and persists a per-attempt trace of every run.
//!
//! ## Core Features
//!
//! - **Deterministic Scheduling**: Kahn's algorithm with declaration-order tie-break
//! - **Reference Resolution**: `input.<path>` and `results.<node>.<path>` placeholders
//! - **Retries and Timeouts**: per-node retry budget, per-attempt timeout powered by `tokio`
//! - **Pluggable Trace Storage**: JSON files on disk, or an in-memory store for testing
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use toolflow::{EngineBuilder, WorkflowModel};
//!
//! let engine = EngineBuilder::new()
//!     .tool_fn("outline", |params, _| Ok(json!({"title": params["task"]})))
//!     .build()?;
//!
//! let workflow = WorkflowModel::from_json(json_str)?;
//! let run = engine.run(&workflow, json!({"task": "demo"})).await?;
//! println!("{:?}", run.results);
//! ```

mod builder;
mod common;
mod config;
mod engine;
mod error;
mod model;
mod runtime;
mod store;
mod tools;
mod trace;
mod utils;
mod workflow;

pub use builder::EngineBuilder;
pub use config::{Config, FileStoreConfig, MemStoreConfig, RetryConfig, StoreConfig, StoreType};
pub use engine::{Engine, RunResult};
pub use error::{BoxError, FlowError};
pub use model::*;
pub use runtime::ToolContext;
pub use store::{FileStore, MemStore, TraceStore};
pub use tools::{FnTool, Params, Tool, ToolFn, ToolFnAsync, ToolRegistry, ToolResult};
pub use trace::{AttemptError, EventStatus, ExecutionEvent, Trace};
pub use workflow::{Workflow, node::NodeId, resolve, schedule};

/// Result type alias for Toolflow operations.
pub type Result<T> = std::result::Result<T, FlowError>;
