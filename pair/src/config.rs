use crate::error::ChainError;
use log::warn;
use once_cell::sync::OnceCell;
use serde_derive::Deserialize;
use std::sync::{Mutex, MutexGuard};

static INSTANCE: OnceCell<Mutex<RuntimeConfig>> = OnceCell::new();

pub fn instance() -> &'static Mutex<RuntimeConfig> {
    INSTANCE.get_or_init(|| Mutex::new(RuntimeConfig::new()))
}

fn lock() -> MutexGuard<'static, RuntimeConfig> {
    // a poisoned config is still a valid config
    instance().lock().unwrap_or_else(|e| e.into_inner())
}

/// Copy of the process-wide config
pub fn current() -> RuntimeConfig {
    lock().clone()
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AccountsConfig {
    pub seed: String,
    pub count: usize,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        AccountsConfig {
            seed: "pair".to_string(),
            count: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RuntimeConfig {
    pub addr: String,
    pub metrics_addr: String,
    pub base_path: String,
    pub snapshot_interval_secs: u64,
    pub accounts: AccountsConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig::new()
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        RuntimeConfig {
            addr: "0.0.0.0:4000".to_string(),
            metrics_addr: "0.0.0.0:4010".to_string(),
            base_path: "data".to_string(),
            snapshot_interval_secs: 60,
            accounts: AccountsConfig::default(),
        }
    }

    /// Reads and validates a config file
    pub fn load(path: &str) -> Result<Self, ChainError> {
        let contents = std::fs::read_to_string(path)?;
        let config: RuntimeConfig =
            toml::from_str(&contents).map_err(|e| ChainError::Config(e.to_string()))?;
        if config.snapshot_interval_secs == 0 {
            return Err(ChainError::Config(
                "snapshot_interval_secs must be positive".to_string(),
            ));
        }
        Ok(config)
    }

    /// Loads `path` and installs it as the process-wide config. A missing or
    /// malformed file leaves the defaults in place.
    pub fn from_toml(path: &str) -> Self {
        match Self::load(path) {
            Ok(config) => {
                lock().clone_from(&config);
                config
            }
            Err(e) => {
                warn!(
                    "Something went wrong reading the runtime config file {}, {}",
                    path, e
                );
                current()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_partial_file() {
        let config: RuntimeConfig = toml::from_str(
            r#"
            addr = "127.0.0.1:5000"
            [accounts]
            count = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.addr, "127.0.0.1:5000");
        assert_eq!(config.metrics_addr, "0.0.0.0:4010");
        assert_eq!(config.snapshot_interval_secs, 60);
        assert_eq!(config.accounts.seed, "pair");
        assert_eq!(config.accounts.count, 3);
    }

    #[test]
    fn test_from_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "base_path = \"/tmp/pair-test\"").unwrap();
        writeln!(file, "snapshot_interval_secs = 5").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = RuntimeConfig::from_toml(&path);
        assert_eq!(config.base_path, "/tmp/pair-test");
        assert_eq!(config.snapshot_interval_secs, 5);
        assert_eq!(current().base_path, "/tmp/pair-test");
    }

    #[test]
    fn test_load_rejects_bad_files() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "addr = [").unwrap();
        assert!(matches!(
            RuntimeConfig::load(file.path().to_str().unwrap()),
            Err(ChainError::Config(_))
        ));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "snapshot_interval_secs = 0").unwrap();
        assert!(matches!(
            RuntimeConfig::load(file.path().to_str().unwrap()),
            Err(ChainError::Config(_))
        ));

        assert!(matches!(
            RuntimeConfig::load("/nonexistent/pair/config.toml"),
            Err(ChainError::Io(_))
        ));
    }
}
