// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in local operators over `String -> serde_json::Value` results.
//!
//! | name | options | output |
//! |---|---|---|
//! | `constant` | `values` (map) | the configured values |
//! | `partitioned_range` | `start`, `end`, `prefix` | `{prefix}-{i} -> i` for `start <= i < end` |
//! | `union` | none | every upstream entry; a key seen twice fails the node |
//! | `sum` | `output_key` | sum of every numeric upstream value |
//! | `failing` | `message` | always fails |
//!
//! Operators that produce several keys split them across physical units with
//! [`OperatorContext::owns`](crate::traits::OperatorContext::owns), so any of them can run
//! under a fan-out strategy without producing colliding keys.

pub mod constant;
pub mod failing;
pub mod partitioned_range;
pub mod sum;
pub mod union;

use std::sync::Arc;

use crate::config::OperatorRegistry;
use crate::errors::ConfigError;
use crate::traits::Operator;

pub use constant::ConstantOperator;
pub use failing::FailingOperator;
pub use partitioned_range::PartitionedRangeOperator;
pub use sum::SumOperator;
pub use union::UnionOperator;

pub type Key = String;
pub type Value = serde_json::Value;

/// Registry holding every built-in operator.
pub fn builtin_registry() -> OperatorRegistry<Key, Value> {
    let mut registry = OperatorRegistry::new();
    register_builtin_operators(&mut registry);
    registry
}

/// Add the built-in operators to an existing registry, replacing same-named entries.
pub fn register_builtin_operators(registry: &mut OperatorRegistry<Key, Value>) {
    registry.register_fn(constant::NAME, |config| build(ConstantOperator::from_config(config)));
    registry.register_fn(partitioned_range::NAME, |config| {
        build(PartitionedRangeOperator::from_config(config))
    });
    registry.register_fn(union::NAME, |_| build(Ok(UnionOperator)));
    registry.register_fn(sum::NAME, |config| build(SumOperator::from_config(config)));
    registry.register_fn(failing::NAME, |config| build(FailingOperator::from_config(config)));
}

fn build<O>(operator: Result<O, ConfigError>) -> anyhow::Result<Arc<dyn Operator<Key, Value>>>
where
    O: Operator<Key, Value> + 'static,
{
    let operator: Arc<dyn Operator<Key, Value>> = Arc::new(operator?);
    Ok(operator)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::dag::{NodeConfig, ExecutionResults, ExecutionResultsReader, NodeIdentifier, UpstreamResults};
    use crate::traits::OperatorContext;

    pub fn context(
        config: NodeConfig,
        partition: usize,
        partitions: usize,
        inputs: Vec<(&str, Vec<(&str, Value)>)>,
    ) -> OperatorContext<Key, Value> {
        let upstream: UpstreamResults<Key, Value> = inputs
            .into_iter()
            .map(|(node, entries)| {
                let results: ExecutionResults<Key, Value> = entries
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect();
                ExecutionResultsReader::new(NodeIdentifier::from_name(node), results)
            })
            .collect();
        let logical = NodeIdentifier::from_name("node");
        OperatorContext::new(
            logical.physical(partition),
            logical,
            partition,
            partitions,
            Arc::new(config),
            upstream,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::NodeConfig;

    #[test]
    fn test_builtin_registry_names() {
        let registry = builtin_registry();
        assert_eq!(
            registry.names(),
            vec!["constant", "failing", "partitioned_range", "sum", "union"]
        );
    }

    #[test]
    fn test_option_errors_surface_at_instantiation() {
        let registry = builtin_registry();
        let descriptor = registry.get("partitioned_range").unwrap();

        match descriptor.instantiate(&NodeConfig::default()) {
            Err(ConfigError::OperatorCreationFailed { operator, reason }) => {
                assert_eq!(operator, "partitioned_range");
                assert!(reason.contains("end"));
            }
            Err(other) => panic!("Expected OperatorCreationFailed, got {:?}", other),
            Ok(_) => panic!("Expected OperatorCreationFailed, got an operator"),
        }
    }
}
