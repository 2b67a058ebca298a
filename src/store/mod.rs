//! Storage layer for persisting run traces.
//!
//! Provides an abstraction over different storage backends:
//! - `FileStore`: one pretty-printed JSON document per run
//! - `MemStore`: bounded in-memory storage for tests and embedding

mod file;
mod mem;

use std::{error::Error, sync::Arc};

use async_trait::async_trait;

use crate::{FlowError, Result, StoreType, config::StoreConfig, trace::Trace};

pub use file::FileStore;
pub use mem::MemStore;

/// Maps storage errors to FlowError.
fn map_store_err(err: impl Error) -> FlowError {
    FlowError::Store(err.to_string())
}

/// Durable storage for traces, addressed by run identifier.
#[async_trait]
pub trait TraceStore: Send + Sync {
    /// Writes the trace and returns where it was stored.
    async fn save(
        &self,
        trace: &Trace,
    ) -> Result<String>;

    /// Reads back a trace written by [`TraceStore::save`].
    async fn load(
        &self,
        trace_id: &str,
    ) -> Result<Trace>;
}

/// Builds the store selected by the configuration.
pub fn from_config(config: &StoreConfig) -> Arc<dyn TraceStore> {
    match config.store_type {
        StoreType::File => Arc::new(FileStore::new(&config.file.dir)),
        StoreType::Mem => Arc::new(MemStore::new(config.mem.capacity)),
    }
}

/// Trace ids end up in file names, keep them to a safe alphabet.
fn check_trace_id(trace_id: &str) -> Result<()> {
    if trace_id.is_empty() || !trace_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(FlowError::Store(format!("invalid trace id '{}'", trace_id)));
    }
    Ok(())
}
