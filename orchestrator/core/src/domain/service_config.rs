// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Orchestrator service configuration.
//!
//! Loaded from a YAML manifest (`corral-config.yaml`). Discovery precedence:
//! explicit path flag, `CORRAL_CONFIG_PATH`, then the working directory.
//! Every field has a usable default so the daemon starts without a file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrchestratorConfig {
    /// HTTP API bind address.
    pub listen_host: String,
    pub listen_port: u16,

    /// Base URL of the remote runtime provider control plane.
    pub provider_base_url: String,

    /// Container image every runtime version is created from.
    pub container_uri: String,

    /// Execution role handed to created runtimes.
    pub execution_role_arn: String,

    /// Retention for provider-managed memory resources.
    pub memory_retention_days: u32,

    /// Interval between two polls of a pending remote operation.
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Ceiling after which a pending remote operation is declared timed out.
    #[serde(with = "humantime_serde")]
    pub poll_ceiling: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            listen_host: "127.0.0.1".to_string(),
            listen_port: 8600,
            provider_base_url: "http://127.0.0.1:8610".to_string(),
            container_uri: "registry.100monkeys.ai/corral/agent-runtime:latest".to_string(),
            execution_role_arn: "arn:corral:iam::role/agent-runtime".to_string(),
            memory_retention_days: 90,
            poll_interval: Duration::from_secs(2),
            poll_ceiling: Duration::from_secs(300),
        }
    }
}

impl OrchestratorConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover a configuration file using the precedence order:
    /// 1. `CORRAL_CONFIG_PATH` environment variable
    /// 2. `./corral-config.yaml` (working directory)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("CORRAL_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./corral-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.poll_ceiling, Duration::from_secs(300));
        assert!(config.poll_interval < config.poll_ceiling);
    }

    #[test]
    fn parses_partial_yaml_over_defaults() {
        let config = OrchestratorConfig::from_yaml_str(
            r#"
            listenPort: 9000
            providerBaseUrl: "http://provider.internal:8080"
            pollInterval: "500ms"
            pollCeiling: "30s"
            "#,
        )
        .unwrap();

        assert_eq!(config.listen_port, 9000);
        assert_eq!(config.provider_base_url, "http://provider.internal:8080");
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.poll_ceiling, Duration::from_secs(30));
        // untouched fields keep their defaults
        assert_eq!(config.listen_host, "127.0.0.1");
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corral-config.yaml");
        std::fs::write(&path, "listenPort: 8700\nmemoryRetentionDays: 30\n").unwrap();

        let config = OrchestratorConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.listen_port, 8700);
        assert_eq!(config.memory_retention_days, 30);
    }
}
