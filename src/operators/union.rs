// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::dag::{ExecutionResults, NodeIdentifier};
use crate::operators::{Key, Value};
use crate::traits::{Operator, OperatorContext};

pub const NAME: &str = "union";

/// Merges the results of every upstream node. Two upstreams producing the same key is an
/// error.
pub struct UnionOperator;

#[async_trait]
impl Operator<Key, Value> for UnionOperator {
    async fn run(&self, ctx: &OperatorContext<Key, Value>) -> anyhow::Result<ExecutionResults<Key, Value>> {
        let mut upstream: Vec<_> = ctx.inputs().iter().collect();
        upstream.sort_by(|a, b| a.0.cmp(b.0));

        let mut merged: BTreeMap<&Key, (&NodeIdentifier, &Value)> = BTreeMap::new();
        for (node, reader) in upstream {
            for (key, value) in reader {
                if let Some((first, _)) = merged.insert(key, (node, value)) {
                    anyhow::bail!("key '{}' produced by both '{}' and '{}'", key, first, node);
                }
            }
        }

        Ok(merged
            .into_iter()
            .enumerate()
            .filter(|(i, _)| ctx.owns(*i))
            .map(|(_, (key, (_, value)))| (key.clone(), value.clone()))
            .collect())
    }

    fn name(&self) -> &str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::NodeConfig;
    use crate::operators::test_support::context;
    use serde_json::json;

    #[tokio::test]
    async fn test_merges_all_upstreams() {
        let ctx = context(
            NodeConfig::default(),
            0,
            1,
            vec![
                ("left", vec![("a", json!(1)), ("b", json!(2))]),
                ("right", vec![("c", json!(3))]),
            ],
        );
        let results = UnionOperator.run(&ctx).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_key_is_an_error() {
        let ctx = context(
            NodeConfig::default(),
            0,
            1,
            vec![("left", vec![("a", json!(1))]), ("right", vec![("a", json!(2))])],
        );
        let err = UnionOperator.run(&ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "key 'a' produced by both 'left' and 'right'");
    }

    #[tokio::test]
    async fn test_no_upstream_yields_nothing() {
        let ctx = context(NodeConfig::default(), 0, 1, vec![]);
        assert!(UnionOperator.run(&ctx).await.unwrap().is_empty());
    }
}
