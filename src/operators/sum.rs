// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::json;

use crate::dag::{ExecutionResults, NodeConfig};
use crate::errors::ConfigError;
use crate::operators::{Key, Value};
use crate::traits::{Operator, OperatorContext};

pub const NAME: &str = "sum";

/// Sums every numeric upstream value into `options.output_key` (default `"sum"`).
///
/// Integers stay integers; a single float turns the total into a float. Only the first
/// physical unit emits, so fan-out does not duplicate the key.
pub struct SumOperator {
    output_key: String,
}

impl SumOperator {
    pub fn from_config(config: &NodeConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            output_key: config.option_or("output_key", NAME.to_string())?,
        })
    }
}

#[async_trait]
impl Operator<Key, Value> for SumOperator {
    async fn run(&self, ctx: &OperatorContext<Key, Value>) -> anyhow::Result<ExecutionResults<Key, Value>> {
        if !ctx.owns(0) {
            return Ok(ExecutionResults::new());
        }

        let mut integer: Option<i64> = Some(0);
        let mut float = 0.0f64;
        for (node, reader) in ctx.inputs().iter() {
            for (key, value) in reader {
                let number = value.as_f64().ok_or_else(|| {
                    anyhow::anyhow!("value of '{}' from '{}' is not a number: {}", key, node, value)
                })?;
                float += number;
                integer = match (integer, value.as_i64()) {
                    (Some(total), Some(n)) => total.checked_add(n),
                    _ => None,
                };
            }
        }

        let total = match integer {
            Some(total) => json!(total),
            None => json!(float),
        };
        Ok([(self.output_key.clone(), total)].into_iter().collect())
    }

    fn name(&self) -> &str {
        NAME
    }
}
