use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::trace;

use crate::{
    Result,
    store::{TraceStore, check_trace_id, map_store_err},
    trace::Trace,
};

/// Writes each trace to `<dir>/<trace_id>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_of(
        &self,
        trace_id: &str,
    ) -> Result<PathBuf> {
        check_trace_id(trace_id)?;
        Ok(self.dir.join(format!("{}.json", trace_id)))
    }
}

#[async_trait]
impl TraceStore for FileStore {
    async fn save(
        &self,
        trace: &Trace,
    ) -> Result<String> {
        let path = self.path_of(&trace.trace_id)?;
        trace!("store::save({})", path.display());

        let text = serde_json::to_string_pretty(trace)?;
        tokio::fs::create_dir_all(&self.dir).await.map_err(map_store_err)?;
        tokio::fs::write(&path, text).await.map_err(map_store_err)?;

        Ok(path.display().to_string())
    }

    async fn load(
        &self,
        trace_id: &str,
    ) -> Result<Trace> {
        let path = self.path_of(trace_id)?;
        trace!("store::load({})", path.display());

        let text = tokio::fs::read_to_string(&path).await.map_err(map_store_err)?;
        let trace = serde_json::from_str::<Trace>(&text)?;
        Ok(trace)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, json};

    use super::*;
    use crate::FlowError;

    fn sample() -> Trace {
        let mut results = Map::new();
        results.insert("outline".to_string(), json!({"title": "Deck"}));
        Trace {
            trace_id: "0123abcd".to_string(),
            order: vec!["outline".to_string()],
            input: json!({"task": "ワークフローのテスト"}),
            results,
            events: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_save_creates_directory_and_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path().join("artifacts").join("workflows"));

        let location = store.save(&sample()).await.unwrap();
        let path = store.dir().join("0123abcd.json");
        assert_eq!(location, path.display().to_string());

        let doc: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["trace_id"], json!("0123abcd"));
        assert_eq!(doc["order"], json!(["outline"]));
        assert_eq!(doc["input"]["task"], json!("ワークフローのテスト"));
        assert_eq!(doc["results"]["outline"]["title"], json!("Deck"));
        assert_eq!(doc["events"], json!([]));
    }

    #[tokio::test]
    async fn test_load_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path());

        store.save(&sample()).await.unwrap();
        assert_eq!(store.load("0123abcd").await.unwrap(), sample());
    }

    #[tokio::test]
    async fn test_load_missing_trace() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path());
        assert!(matches!(store.load("nope").await, Err(FlowError::Store(_))));
    }

    #[tokio::test]
    async fn test_rejects_path_like_ids() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path());
        let trace = Trace {
            trace_id: "../escape".to_string(),
            ..Default::default()
        };
        assert!(matches!(store.save(&trace).await, Err(FlowError::Store(_))));
    }
}
