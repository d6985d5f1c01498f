// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::json;

use crate::dag::{ExecutionResults, NodeConfig};
use crate::errors::ConfigError;
use crate::operators::{Key, Value};
use crate::traits::{Operator, OperatorContext};

pub const NAME: &str = "partitioned_range";

/// Emits `{prefix}-{i} -> i` for every `i` in `start..end`.
///
/// The range is striped over the physical units: unit `p` of `n` produces the indices
/// whose offset from `start` is congruent to `p` modulo `n`.
pub struct PartitionedRangeOperator {
    start: i64,
    end: i64,
    prefix: String,
}

impl PartitionedRangeOperator {
    pub fn from_config(config: &NodeConfig) -> Result<Self, ConfigError> {
        let end: i64 = config.option("end")?;
        let start = config.option_or("start", 0i64)?;
        if end < start {
            return Err(ConfigError::InvalidOption {
                option: "end".to_string(),
                reason: format!("must not be smaller than start ({} < {})", end, start),
            });
        }
        Ok(Self {
            start,
            end,
            prefix: config.option_or("prefix", "item".to_string())?,
        })
    }
}

#[async_trait]
impl Operator<Key, Value> for PartitionedRangeOperator {
    async fn run(&self, ctx: &OperatorContext<Key, Value>) -> anyhow::Result<ExecutionResults<Key, Value>> {
        Ok((self.start..self.end)
            .enumerate()
            .filter(|(offset, _)| ctx.owns(*offset))
            .map(|(_, i)| (format!("{}-{}", self.prefix, i), json!(i)))
            .collect())
    }

    fn name(&self) -> &str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::test_support::context;

    fn config(start: i64, end: i64) -> NodeConfig {
        NodeConfig::default()
            .with_option("start", start)
            .unwrap()
            .with_option("end", end)
            .unwrap()
            .with_option("prefix", "reading")
            .unwrap()
    }

    #[tokio::test]
    async fn test_units_cover_the_range_exactly_once() {
        let operator = PartitionedRangeOperator::from_config(&config(10, 20)).unwrap();
        let mut seen = Vec::new();
        for partition in 0..3 {
            let results = operator
                .run(&context(config(10, 20), partition, 3, vec![]))
                .await
                .unwrap();
            seen.extend(results.into_inner().into_values().map(|v| v.as_i64().unwrap()));
        }
        seen.sort_unstable();
        assert_eq!(seen, (10..20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_keys_use_prefix() {
        let operator = PartitionedRangeOperator::from_config(&config(0, 2)).unwrap();
        let results = operator.run(&context(config(0, 2), 0, 1, vec![])).await.unwrap();
        let map = results.into_inner();
        assert_eq!(map["reading-1"], json!(1));
    }

    #[test]
    fn test_end_is_required_and_ordered() {
        assert!(matches!(
            PartitionedRangeOperator::from_config(&NodeConfig::default()),
            Err(ConfigError::MissingOption { .. })
        ));
        assert!(matches!(
            PartitionedRangeOperator::from_config(&config(5, 1)),
            Err(ConfigError::InvalidOption { .. })
        ));
    }
}
