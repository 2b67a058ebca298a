use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::{FlowError, Result};

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// trace store config
    pub store: StoreConfig,
    /// backoff between retried attempts
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// store type
    pub store_type: StoreType,
    /// file store config
    pub file: FileStoreConfig,
    /// memory store config
    pub mem: MemStoreConfig,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    #[default]
    File,
    Mem,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileStoreConfig {
    /// directory receiving `<trace_id>.json`, defaults to `artifacts/workflows`
    pub dir: PathBuf,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("artifacts").join("workflows"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct MemStoreConfig {
    /// number of traces kept, defaults to 1024
    pub capacity: usize,
}

impl Default for MemStoreConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
        }
    }
}

/// Linear backoff: the delay after failed attempt `n` is `min(step * n, cap)`.
///
/// The defaults (1s step, 3s cap) are a tunable, not a load-shedding policy.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    pub backoff_step_ms: u64,
    pub backoff_cap_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            backoff_step_ms: 1000,
            backoff_cap_ms: 3000,
        }
    }
}

impl RetryConfig {
    /// Delay to sleep after the 1-based failed `attempt`.
    pub fn backoff(
        &self,
        attempt: u32,
    ) -> Duration {
        let delay = self.backoff_step_ms.saturating_mul(u64::from(attempt)).min(self.backoff_cap_ms);
        Duration::from_millis(delay)
    }
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref()).map_err(|e| FlowError::Config(format!("failed to load config file {:?}: {}", path.as_ref(), e)))?;

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(toml_str)?;
        Ok(config)
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_config_deserialize() {
        let toml_str = r#"
        [store]
        store_type = "mem"

        [store.file]
        dir = "/tmp/traces"

        [store.mem]
        capacity = 8

        [retry]
        backoff_step_ms = 10
        backoff_cap_ms = 25
        "#;
        let config = Config::load_from_str(toml_str).unwrap();
        assert_eq!(config.store.store_type, StoreType::Mem);
        assert_eq!(config.store.file.dir, PathBuf::from("/tmp/traces"));
        assert_eq!(config.store.mem.capacity, 8);
        assert_eq!(config.retry.backoff_step_ms, 10);
        assert_eq!(config.retry.backoff_cap_ms, 25);
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::load_from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.store.store_type, StoreType::File);
        assert_eq!(config.store.file.dir, PathBuf::from("artifacts/workflows"));
        assert_eq!(config.store.mem.capacity, 1024);
        assert_eq!(config.retry, RetryConfig::default());
    }

    #[test]
    fn test_config_partial_section() {
        let config = Config::load_from_str("[retry]\nbackoff_cap_ms = 500\n").unwrap();
        assert_eq!(config.retry.backoff_step_ms, 1000);
        assert_eq!(config.retry.backoff_cap_ms, 500);
    }

    #[test]
    fn test_config_invalid() {
        assert!(matches!(Config::load_from_str("[store]\nstore_type = \"postgres\"\n"), Err(FlowError::Config(_))));
        assert!(matches!(Config::create("/definitely/not/here.toml"), Err(FlowError::Config(_))));
    }

    #[test]
    fn test_config_create_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store]\nstore_type = \"mem\"").unwrap();
        let config = Config::create(file.path()).unwrap();
        assert_eq!(config.store.store_type, StoreType::Mem);
    }

    #[test]
    fn test_default_backoff() {
        let retry = RetryConfig::default();
        assert_eq!(retry.backoff(1), Duration::from_secs(1));
        assert_eq!(retry.backoff(2), Duration::from_secs(2));
        assert_eq!(retry.backoff(3), Duration::from_secs(3));
        assert_eq!(retry.backoff(4), Duration::from_secs(3));
        assert_eq!(retry.backoff(u32::MAX), Duration::from_secs(3));
    }
}
