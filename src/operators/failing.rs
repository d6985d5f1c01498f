// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::dag::{ExecutionResults, NodeConfig};
use crate::errors::ConfigError;
use crate::operators::{Key, Value};
use crate::traits::{Operator, OperatorContext};

pub const NAME: &str = "failing";

const DEFAULT_MESSAGE: &str = "operator failed";

/// Always fails with `options.message`. Handy for exercising failure propagation.
pub struct FailingOperator {
    message: String,
}

impl FailingOperator {
    pub fn from_config(config: &NodeConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            message: config.option_or("message", DEFAULT_MESSAGE.to_string())?,
        })
    }
}

#[async_trait]
impl Operator<Key, Value> for FailingOperator {
    async fn run(&self, ctx: &OperatorContext<Key, Value>) -> anyhow::Result<ExecutionResults<Key, Value>> {
        anyhow::bail!("{} (attempt {})", self.message, ctx.attempt())
    }

    fn name(&self) -> &str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::test_support::context;

    #[tokio::test]
    async fn test_fails_with_configured_message() {
        let config = NodeConfig::default().with_option("message", "disk full").unwrap();
        let operator = FailingOperator::from_config(&config).unwrap();

        let err = operator.run(&context(config, 0, 1, vec![])).await.unwrap_err();
        assert_eq!(err.to_string(), "disk full (attempt 1)");
    }

    #[test]
    fn test_default_message() {
        let operator = FailingOperator::from_config(&NodeConfig::default()).unwrap();
        assert_eq!(operator.message, DEFAULT_MESSAGE);
    }
}
