//! Configuration types for prompt-scraper

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resilient executor settings
///
/// Attempt `i` (0-based) runs under `base_timeout + i * timeout_step`. A timed-out
/// attempt waits `timeout_retry_delay` before the next one; a retryable status
/// waits `backoff_unit * 2^i`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Total attempts per outbound call (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Timeout of the first attempt (default: 120 seconds)
    #[serde(default = "default_base_timeout", with = "duration_serde")]
    pub base_timeout: Duration,

    /// Added to the timeout for every further attempt (default: 60 seconds)
    #[serde(default = "default_timeout_step", with = "duration_serde")]
    pub timeout_step: Duration,

    /// Pause after a timed-out attempt (default: 5 seconds)
    #[serde(default = "default_timeout_retry_delay", with = "duration_serde")]
    pub timeout_retry_delay: Duration,

    /// Base unit of the exponential backoff on retryable statuses (default: 1 second)
    #[serde(default = "default_backoff_unit", with = "duration_serde")]
    pub backoff_unit: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_timeout: default_base_timeout(),
            timeout_step: default_timeout_step(),
            timeout_retry_delay: default_timeout_retry_delay(),
            backoff_unit: default_backoff_unit(),
        }
    }
}

/// System-instruction placeholder values
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Substituted for `{{location}}` (default: "Washington, DC")
    #[serde(default = "default_location")]
    pub location: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
        }
    }
}

/// Connection probe settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Single-attempt timeout (default: 15 seconds)
    #[serde(default = "default_probe_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Prompt sent to the endpoint
    #[serde(default = "default_probe_prompt")]
    pub prompt: String,

    /// Model used when the caller does not name one
    #[serde(default = "default_probe_model")]
    pub default_model: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: default_probe_timeout(),
            prompt: default_probe_prompt(),
            default_model: default_probe_model(),
        }
    }
}

/// Main configuration for [`Scraper`](crate::Scraper)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database file (default: "./data/prompt_scraper.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Retry and timeout discipline for outbound calls
    #[serde(default)]
    pub executor: ExecutorConfig,

    /// Placeholder values for system instructions
    #[serde(default)]
    pub template: TemplateConfig,

    /// Connection probe settings
    #[serde(default)]
    pub probe: ProbeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            executor: ExecutorConfig::default(),
            template: TemplateConfig::default(),
            probe: ProbeConfig::default(),
        }
    }
}

impl Config {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        Self::from_json_str(&contents)
    }

    /// Reject settings the executor cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.executor.max_retries == 0 {
            return Err(Error::config(
                "executor.max_retries",
                "at least one attempt is required",
            ));
        }
        if self.executor.base_timeout.is_zero() {
            return Err(Error::config(
                "executor.base_timeout",
                "base timeout must be greater than zero",
            ));
        }
        if self.probe.timeout.is_zero() {
            return Err(Error::config(
                "probe.timeout",
                "probe timeout must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./data/prompt_scraper.db")
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_timeout() -> Duration {
    Duration::from_secs(120)
}

fn default_timeout_step() -> Duration {
    Duration::from_secs(60)
}

fn default_timeout_retry_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_backoff_unit() -> Duration {
    Duration::from_secs(1)
}

fn default_location() -> String {
    "Washington, DC".to_string()
}

fn default_probe_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_probe_prompt() -> String {
    "Hello, response with one word.".to_string()
}

fn default_probe_model() -> String {
    "api_google_gemini-3-pro-preview".to_string()
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.executor.max_retries, 3);
        assert_eq!(config.executor.base_timeout, Duration::from_secs(120));
        assert_eq!(config.executor.timeout_step, Duration::from_secs(60));
        assert_eq!(config.executor.timeout_retry_delay, Duration::from_secs(5));
        assert_eq!(config.executor.backoff_unit, Duration::from_secs(1));
        assert_eq!(config.template.location, "Washington, DC");
        assert_eq!(config.probe.timeout, Duration::from_secs(15));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_json_yields_defaults() {
        let config = Config::from_json_str("{}").unwrap();
        assert_eq!(
            config.database_path,
            PathBuf::from("./data/prompt_scraper.db")
        );
        assert_eq!(config.executor.max_retries, 3);
    }

    #[test]
    fn partial_json_overrides_selected_fields() {
        let config = Config::from_json_str(
            r#"{
                "database_path": "/tmp/scrape.db",
                "executor": { "max_retries": 5, "base_timeout": 30 },
                "template": { "location": "Berlin" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/scrape.db"));
        assert_eq!(config.executor.max_retries, 5);
        assert_eq!(config.executor.base_timeout, Duration::from_secs(30));
        assert_eq!(config.executor.timeout_step, Duration::from_secs(60));
        assert_eq!(config.template.location, "Berlin");
    }

    #[test]
    fn zero_retries_is_rejected() {
        let err = Config::from_json_str(r#"{ "executor": { "max_retries": 0 } }"#).unwrap_err();
        assert!(
            matches!(err, Error::Config { ref key, .. } if key.as_deref() == Some("executor.max_retries"))
        );
    }

    #[test]
    fn zero_base_timeout_is_rejected() {
        let err = Config::from_json_str(r#"{ "executor": { "base_timeout": 0 } }"#).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = Config::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn from_file_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "probe": { "timeout": 3 } }"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.probe.timeout, Duration::from_secs(3));
    }

    #[test]
    fn from_file_missing_is_config_error() {
        let err = Config::from_file(Path::new("/nonexistent/prompt-scraper.json")).unwrap_err();
        assert!(matches!(err, Error::Config { key: None, .. }));
    }
}
