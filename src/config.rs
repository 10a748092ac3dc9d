//! PollDaemon configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main PollDaemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Polled endpoint configuration
    pub endpoint: EndpointConfig,

    /// Batch sizing
    pub batch: BatchConfig,

    /// Output file configuration
    pub storage: StorageConfig,

    /// Inter-batch pacing
    pub pacing: PacingConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.url.is_empty() {
            return Err(eyre::eyre!("endpoint.url must not be empty"));
        }
        if self.batch.count == 0 {
            return Err(eyre::eyre!("batch.count must be at least 1"));
        }
        if self.batch.concurrency == 0 {
            return Err(eyre::eyre!("batch.concurrency must be at least 1"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .polldaemon.yml
        let local_config = PathBuf::from(".polldaemon.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/polldaemon/polldaemon.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("polldaemon").join("polldaemon.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Polled endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// URL to poll
    pub url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: "https://cursorfreeapi.96ai.top/api/generate?location=US".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl EndpointConfig {
    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Batch sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Requests per batch
    pub count: usize,

    /// Maximum in-flight requests within a batch
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            count: 10,
            concurrency: 2,
        }
    }
}

/// Output file configuration
///
/// The per-file record cap is an invariant of the output format, not a
/// setting; see [`crate::writer::MAX_RECORDS_PER_FILE`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for output files
    pub dir: PathBuf,

    /// Base name for output files (res.txt, res2.txt, ...)
    pub base: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            base: "res".to_string(),
        }
    }
}

/// Inter-batch pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Pause after a successful batch, in milliseconds
    #[serde(rename = "batch-delay-ms")]
    pub batch_delay_ms: u64,

    /// Pause after a batch-level error, in milliseconds
    #[serde(rename = "error-delay-ms")]
    pub error_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            batch_delay_ms: 1_000,
            error_delay_ms: 5_000,
        }
    }
}

impl PacingConfig {
    /// Pause after a successful batch
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// Pause after a batch-level error
    pub fn error_delay(&self) -> Duration {
        Duration::from_millis(self.error_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.batch.count, 10);
        assert_eq!(config.batch.concurrency, 2);
        assert_eq!(config.storage.base, "res");
        assert_eq!(config.storage.dir, PathBuf::from("."));
        assert_eq!(config.pacing.batch_delay_ms, 1_000);
        assert_eq!(config.pacing.error_delay_ms, 5_000);
    }

    #[test]
    fn test_default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
endpoint:
  url: https://api.example.com/generate
  timeout-ms: 10000

batch:
  count: 25
  concurrency: 5

storage:
  dir: /var/lib/polldaemon
  base: capture

pacing:
  batch-delay-ms: 2000
  error-delay-ms: 10000
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.endpoint.url, "https://api.example.com/generate");
        assert_eq!(config.endpoint.timeout(), Duration::from_secs(10));
        assert_eq!(config.batch.count, 25);
        assert_eq!(config.batch.concurrency, 5);
        assert_eq!(config.storage.dir, PathBuf::from("/var/lib/polldaemon"));
        assert_eq!(config.storage.base, "capture");
        assert_eq!(config.pacing.batch_delay(), Duration::from_secs(2));
        assert_eq!(config.pacing.error_delay(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
batch:
  count: 50
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.batch.count, 50);

        // Defaults for unspecified
        assert_eq!(config.batch.concurrency, 2);
        assert_eq!(config.storage.base, "res");
        assert_eq!(config.pacing.error_delay_ms, 5_000);
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let mut config = Config::default();
        config.endpoint.url = String::new();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_count() {
        let mut config = Config::default();
        config.batch.count = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.batch.concurrency = 0;

        assert!(config.validate().is_err());
    }
}
