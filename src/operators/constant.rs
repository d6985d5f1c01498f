// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::dag::{ExecutionResults, NodeConfig};
use crate::errors::ConfigError;
use crate::operators::{Key, Value};
use crate::traits::{Operator, OperatorContext};

pub const NAME: &str = "constant";

/// Emits the values configured under `options.values`.
///
/// Keys are dealt out round-robin over the physical units in key order.
pub struct ConstantOperator {
    values: BTreeMap<Key, Value>,
}

impl ConstantOperator {
    pub fn new(values: BTreeMap<Key, Value>) -> Self {
        Self { values }
    }

    pub fn from_config(config: &NodeConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.option_or("values", BTreeMap::new())?))
    }
}

#[async_trait]
impl Operator<Key, Value> for ConstantOperator {
    async fn run(&self, ctx: &OperatorContext<Key, Value>) -> anyhow::Result<ExecutionResults<Key, Value>> {
        Ok(self
            .values
            .iter()
            .enumerate()
            .filter(|(i, _)| ctx.owns(*i))
            .map(|(_, (k, v))| (k.clone(), v.clone()))
            .collect())
    }

    fn name(&self) -> &str {
        NAME
    }
}
