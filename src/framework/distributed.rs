// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};
use tokio::task::JoinSet;

use crate::dag::{ExecutionResultsReader, ExecutionStatus, NodeConfig, NodeIdentifier, UpstreamResults};
use crate::errors::{ConfigError, ExecutionError, NodeFailure};
use crate::framework::dispatcher::Dispatcher;
use crate::framework::fan_out::FanOutCore;
use crate::traits::{FrameworkNode, FrameworkNodeRef, NodeTiming, OperatorDescriptor, ResultKey, ResultValue};

/// Fans a logical node out into `concurrency` units whose placement is decided by a
/// [`Dispatcher`], then merges their outputs.
pub struct DistributedFrameworkNode<K, V> {
    core: FanOutCore<K, V>,
    dispatcher: Arc<dyn Dispatcher<K, V>>,
}

impl<K: ResultKey, V: ResultValue> DistributedFrameworkNode<K, V> {
    pub fn new(
        id: NodeIdentifier,
        descriptor: &OperatorDescriptor<K, V>,
        config: NodeConfig,
        dispatcher: Arc<dyn Dispatcher<K, V>>,
    ) -> Result<Arc<Self>, ConfigError> {
        let operators = FanOutCore::instantiate_operators(&id, descriptor, &config)?;
        Ok(Arc::new_cyclic(|node: &Weak<Self>| {
            let parent: Weak<dyn FrameworkNode<K, V>> = node.clone();
            Self {
                core: FanOutCore::new(parent, id, descriptor.name(), config, operators),
                dispatcher,
            }
        }))
    }
}

#[async_trait]
impl<K: ResultKey, V: ResultValue> FrameworkNode<K, V> for DistributedFrameworkNode<K, V> {
    fn identifier(&self) -> &NodeIdentifier {
        &self.core.id
    }

    fn operator_name(&self) -> &str {
        &self.core.operator_name
    }

    fn node_config(&self) -> &NodeConfig {
        &self.core.config
    }

    fn logical_node(self: Arc<Self>) -> FrameworkNodeRef<K, V> {
        self
    }

    fn physical_nodes(self: Arc<Self>) -> Vec<FrameworkNodeRef<K, V>> {
        self.core.physical_nodes()
    }

    fn execution_status(&self) -> ExecutionStatus {
        self.core.state.status()
    }

    fn execution_results_reader(&self) -> Result<ExecutionResultsReader<K, V>, ExecutionError> {
        self.core.state.reader()
    }

    fn failure(&self) -> Option<NodeFailure> {
        self.core.state.failure()
    }

    fn timing(&self) -> NodeTiming {
        self.core.state.timing()
    }

    fn skip(&self) -> Result<(), ExecutionError> {
        self.core.skip()
    }

    async fn call(&self, inputs: UpstreamResults<K, V>) -> Result<NodeIdentifier, ExecutionError> {
        self.core.begin(self.dispatcher.name())?;

        let mut units = JoinSet::new();
        for unit in self.core.physical_nodes() {
            let dispatcher = Arc::clone(&self.dispatcher);
            let inputs = inputs.clone();
            units.spawn(async move { dispatcher.dispatch(unit, inputs).await });
        }

        while let Some(joined) = units.join_next().await {
            joined.map_err(|e| ExecutionError::InternalError {
                message: format!("dispatch for '{}' aborted: {}", self.core.id, e),
            })??;
        }

        self.core.finish()
    }
}

impl<K, V> PartialEq for DistributedFrameworkNode<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.core.id == other.core.id
    }
}

impl<K, V> Eq for DistributedFrameworkNode<K, V> {}

impl<K, V> Hash for DistributedFrameworkNode<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.core.id.hash(state);
    }
}
