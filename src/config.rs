use serde::{Deserialize, Serialize};
use anyhow::Result;
use std::path::Path;
use std::time::Duration;
use tokio::fs;

const DEFAULT_ENDPOINTS: [&str; 2] = [
    "gateway01.us-east-1.dev.shared.aws.tidbcloud.com",
    "acc-gateway01.us-east-1.dev.shared.aws.tidbcloud.com",
];

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PingConfig {
    /// Hostnames probed on every invocation, in admission order.
    pub endpoints: Vec<String>,
    /// Attempts averaged per endpoint.
    pub sample_count: u32,
    /// Max endpoints sampled at once.
    pub concurrency: usize,
    pub per_attempt_timeout_ms: u64,
    pub target_port: u16,
    /// Cancels the invocation once elapsed: no new endpoints are admitted and
    /// pending attempts fail. Unset means no deadline.
    pub invocation_deadline_ms: Option<u64>,
    pub listen_addr: String,
    pub log_level: String,
    pub enable_latency_history: bool,
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            sample_count: 10,
            concurrency: 8,
            per_attempt_timeout_ms: 5000,
            target_port: 4000,
            invocation_deadline_ms: None,
            listen_addr: "0.0.0.0:8080".to_string(),
            log_level: "info".to_string(),
            enable_latency_history: false,
        }
    }
}

impl PingConfig {
    /// Load from the JSON file named by `TARGET_CONFIG`, or fall back to the built-in defaults.
    pub async fn load() -> Result<Self> {
        let config = match std::env::var("TARGET_CONFIG") {
            Ok(path) => {
                println!("Starting with local file: {}", path);
                Self::load_file_config(&path).await?
            }
            Err(_) => {
                println!("TARGET_CONFIG not set, using built-in endpoints");
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    async fn load_file_config(file_path: &str) -> Result<Self> {
        if !Path::new(file_path).exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", file_path));
        }

        let content = fs::read_to_string(file_path).await?;
        let config: PingConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_sampling()?;
        self.validate_log_level()
    }

    /// Checks only the fields that drive sampling.
    pub fn validate_sampling(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            return Err(anyhow::anyhow!("At least one endpoint must be configured"));
        }
        if let Some(pos) = self.endpoints.iter().position(|e| e.trim().is_empty()) {
            return Err(anyhow::anyhow!("Endpoint #{} is empty", pos));
        }
        if self.sample_count == 0 {
            return Err(anyhow::anyhow!("sample_count must be at least 1"));
        }
        if self.concurrency == 0 {
            return Err(anyhow::anyhow!("concurrency must be at least 1"));
        }
        if self.per_attempt_timeout_ms == 0 {
            return Err(anyhow::anyhow!("per_attempt_timeout_ms must be greater than 0"));
        }
        Ok(())
    }

    pub fn per_attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.per_attempt_timeout_ms)
    }

    pub fn invocation_deadline(&self) -> Option<Duration> {
        self.invocation_deadline_ms.map(Duration::from_millis)
    }

    /// Get the log level as a tracing::Level
    pub fn get_tracing_level(&self) -> Result<tracing::Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(tracing::Level::TRACE),
            "debug" => Ok(tracing::Level::DEBUG),
            "info" => Ok(tracing::Level::INFO),
            "warn" | "warning" => Ok(tracing::Level::WARN),
            "error" => Ok(tracing::Level::ERROR),
            _ => Err(anyhow::anyhow!("Invalid log level: {}. Valid levels are: trace, debug, info, warn, error", self.log_level))
        }
    }

    /// Validate the log level is one of the supported values
    pub fn validate_log_level(&self) -> Result<()> {
        self.get_tracing_level().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_built_in_constants() {
        let cfg = PingConfig::default();
        assert_eq!(cfg.endpoints.len(), 2);
        assert_eq!(cfg.sample_count, 10);
        assert_eq!(cfg.concurrency, 8);
        assert_eq!(cfg.per_attempt_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.target_port, 4000);
        assert!(cfg.invocation_deadline().is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let cfg: PingConfig = serde_json::from_str(
            r#"{"endpoints": ["a.example", "b.example"], "concurrency": 2, "invocation_deadline_ms": 1500}"#,
        )
        .unwrap();
        assert_eq!(cfg.endpoints, vec!["a.example", "b.example"]);
        assert_eq!(cfg.concurrency, 2);
        assert_eq!(cfg.sample_count, 10);
        assert_eq!(cfg.invocation_deadline(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn validate_rejects_degenerate_values() {
        let mut cfg = PingConfig::default();
        cfg.sample_count = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = PingConfig::default();
        cfg.concurrency = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = PingConfig::default();
        cfg.endpoints = vec!["a.example".into(), "  ".into()];
        assert!(cfg.validate().is_err());

        let mut cfg = PingConfig::default();
        cfg.endpoints.clear();
        assert!(cfg.validate().is_err());

        let mut cfg = PingConfig::default();
        cfg.per_attempt_timeout_ms = 0;
        assert!(cfg.validate_sampling().is_err());

        let mut cfg = PingConfig::default();
        cfg.log_level = "verbose".into();
        assert!(cfg.validate().is_err());
        assert!(cfg.validate_sampling().is_ok());
    }

    #[test]
    fn log_level_parsing_is_case_insensitive() {
        let mut cfg = PingConfig::default();
        cfg.log_level = "WARNING".into();
        assert_eq!(cfg.get_tracing_level().unwrap(), tracing::Level::WARN);
    }
}
