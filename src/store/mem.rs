use async_trait::async_trait;

use crate::{
    FlowError, Result,
    common::MemCache,
    store::{TraceStore, check_trace_id},
    trace::Trace,
};

/// Keeps traces in a bounded in-memory cache.
///
/// Once `capacity` is exceeded the least recently used traces are evicted;
/// the trace just saved is always kept.
#[derive(Clone)]
pub struct MemStore {
    traces: MemCache<String, Trace>,
}

impl MemStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            traces: MemCache::new(capacity),
        }
    }
}

#[async_trait]
impl TraceStore for MemStore {
    async fn save(
        &self,
        trace: &Trace,
    ) -> Result<String> {
        check_trace_id(&trace.trace_id)?;
        self.traces.set(trace.trace_id.clone(), trace.clone());
        Ok(format!("mem://{}", trace.trace_id))
    }

    async fn load(
        &self,
        trace_id: &str,
    ) -> Result<Trace> {
        self.traces.get(&trace_id.to_string()).ok_or_else(|| FlowError::Store(format!("trace {} not found", trace_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_load() {
        let store = MemStore::new(8);
        let trace = Trace {
            trace_id: "t1".to_string(),
            order: vec!["a".to_string()],
            ..Default::default()
        };

        assert_eq!(store.save(&trace).await.unwrap(), "mem://t1");
        assert_eq!(store.load("t1").await.unwrap(), trace);
        assert!(matches!(store.load("t2").await, Err(FlowError::Store(_))));
    }

    #[tokio::test]
    async fn test_saved_trace_loads_when_store_is_full() {
        let store = MemStore::new(2);
        let trace = |id: String| Trace {
            trace_id: id,
            ..Default::default()
        };

        for id in ["hot1", "hot2"] {
            store.save(&trace(id.to_string())).await.unwrap();
        }
        for _ in 0..20 {
            store.load("hot1").await.unwrap();
            store.load("hot2").await.unwrap();
        }

        for n in 0..50 {
            let id = format!("run{}", n);
            let location = store.save(&trace(id.clone())).await.unwrap();
            assert_eq!(location, format!("mem://{}", id));
            assert_eq!(store.load(&id).await.unwrap().trace_id, id);
        }
    }
}
