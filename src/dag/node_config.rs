// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::ConfigError;

/// How a logical node is realized by the framework (its vertical topology).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// One operator invocation, inline in the node's own task.
    #[default]
    SingleThread,
    /// `concurrency` physical units running concurrently on the local worker pool.
    MultiThread,
    /// `concurrency` physical units handed to a [`Dispatcher`](crate::framework::Dispatcher).
    Distributed,
}

/// Declarative, immutable execution options attached to a node.
///
/// The well-known options are typed fields with declared defaults. Everything else lives
/// in `options` and is only reachable through typed lookups that fail loudly when the
/// option is absent, unless the caller explicitly supplies a default.
///
/// # Example
/// ```yaml
/// strategy: multi_thread
/// concurrency: 4
/// max_retries: 2
/// retry_backoff_ms: 100
/// timeout_ms: 30000
/// options:
///   window_size: 24
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    #[serde(default)]
    pub strategy: ExecutionStrategy,
    /// Number of physical units for fan-out strategies.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Extra attempts after the first failed operator invocation.
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default)]
    pub retry_backoff_ms: u64,
    /// Upper bound for a single operator invocation.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Operator-specific options.
    #[serde(default)]
    pub options: HashMap<String, serde_yaml::Value>,
}

fn default_concurrency() -> usize {
    1
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            strategy: ExecutionStrategy::default(),
            concurrency: default_concurrency(),
            max_retries: 0,
            retry_backoff_ms: 0,
            timeout_ms: None,
            options: HashMap::new(),
        }
    }
}

impl NodeConfig {
    pub fn single_thread() -> Self {
        Self::default()
    }

    pub fn multi_thread(concurrency: usize) -> Self {
        Self {
            strategy: ExecutionStrategy::MultiThread,
            concurrency,
            ..Self::default()
        }
    }

    pub fn distributed(concurrency: usize) -> Self {
        Self {
            strategy: ExecutionStrategy::Distributed,
            concurrency,
            ..Self::default()
        }
    }

    pub fn with_retries(mut self, max_retries: u32, backoff_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff_ms = backoff_ms;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Set an operator option. Values are stored in their YAML form.
    pub fn with_option<T: Serialize>(mut self, name: &str, value: T) -> Result<Self, ConfigError> {
        let value = serde_yaml::to_value(value).map_err(|e| ConfigError::InvalidOption {
            option: name.to_string(),
            reason: e.to_string(),
        })?;
        self.options.insert(name.to_string(), value);
        Ok(self)
    }

    /// Number of physical units this configuration expands into.
    pub fn physical_unit_count(&self) -> usize {
        match self.strategy {
            ExecutionStrategy::SingleThread => 1,
            ExecutionStrategy::MultiThread | ExecutionStrategy::Distributed => self.concurrency,
        }
    }

    /// Typed lookup of an operator option; absent options are an error.
    pub fn option<T: DeserializeOwned>(&self, name: &str) -> Result<T, ConfigError> {
        match self.options.get(name) {
            Some(value) => decode_option(name, value),
            None => Err(ConfigError::MissingOption {
                option: name.to_string(),
            }),
        }
    }

    /// Typed lookup with an explicitly declared default.
    pub fn option_or<T: DeserializeOwned>(&self, name: &str, default: T) -> Result<T, ConfigError> {
        match self.options.get(name) {
            Some(value) => decode_option(name, value),
            None => Ok(default),
        }
    }

    pub fn has_option(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Reject configurations that cannot be turned into physical units.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.strategy != ExecutionStrategy::SingleThread && self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency {
                concurrency: self.concurrency,
            });
        }
        if self.timeout_ms == Some(0) {
            return Err(ConfigError::InvalidOption {
                option: "timeout_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn decode_option<T: DeserializeOwned>(name: &str, value: &serde_yaml::Value) -> Result<T, ConfigError> {
    serde_yaml::from_value(value.clone()).map_err(|e| ConfigError::InvalidOption {
        option: name.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NodeConfig::default();
        assert_eq!(config.strategy, ExecutionStrategy::SingleThread);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.timeout_ms, None);
        assert_eq!(config.physical_unit_count(), 1);
    }

    #[test]
    fn test_parse_from_yaml() {
        let yaml = r#"
strategy: multi_thread
concurrency: 4
max_retries: 2
timeout_ms: 500
options:
  window_size: 24
  metric: page_views
"#;
        let config: NodeConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.strategy, ExecutionStrategy::MultiThread);
        assert_eq!(config.physical_unit_count(), 4);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.option::<u32>("window_size").unwrap(), 24);
        assert_eq!(config.option::<String>("metric").unwrap(), "page_views");
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let yaml = "threads: 4\n";
        assert!(serde_yaml::from_str::<NodeConfig>(yaml).is_err());
    }

    #[test]
    fn test_missing_option_fails_without_default() {
        let config = NodeConfig::default();
        match config.option::<u32>("window_size") {
            Err(ConfigError::MissingOption { option }) => assert_eq!(option, "window_size"),
            other => panic!("Expected MissingOption, got {:?}", other),
        }
        assert_eq!(config.option_or("window_size", 12u32).unwrap(), 12);
    }

    #[test]
    fn test_wrongly_typed_option_is_invalid() {
        let config = NodeConfig::default().with_option("window_size", "large").unwrap();
        assert!(matches!(
            config.option::<u32>("window_size"),
            Err(ConfigError::InvalidOption { .. })
        ));
        assert!(matches!(
            config.option_or::<u32>("window_size", 1),
            Err(ConfigError::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_single_thread_ignores_concurrency() {
        let mut config = NodeConfig::default();
        config.concurrency = 8;
        assert_eq!(config.physical_unit_count(), 1);
    }

    #[test]
    fn test_validate_rejects_zero_units() {
        assert!(matches!(
            NodeConfig::multi_thread(0).validate(),
            Err(ConfigError::InvalidConcurrency { concurrency: 0 })
        ));
        assert!(NodeConfig::distributed(3).validate().is_ok());
        assert!(NodeConfig::default().with_timeout_ms(0).validate().is_err());
    }
}
