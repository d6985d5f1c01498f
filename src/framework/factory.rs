// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::dag::{ExecutionStrategy, Node, NodeConfig, NodeIdentifier};
use crate::errors::ConfigError;
use crate::framework::dispatcher::{Dispatcher, LocalDispatcher};
use crate::framework::distributed::DistributedFrameworkNode;
use crate::framework::multi_thread::MultiThreadFrameworkNode;
use crate::framework::single_thread::SingleThreadFrameworkNode;
use crate::traits::{FrameworkNodeRef, OperatorDescriptor, ResultKey, ResultValue};

/// Builds the framework node matching a configuration's execution strategy.
pub struct FrameworkNodeFactory<K, V> {
    dispatcher: Arc<dyn Dispatcher<K, V>>,
}

impl<K: ResultKey, V: ResultValue> Default for FrameworkNodeFactory<K, V> {
    fn default() -> Self {
        Self {
            dispatcher: Arc::new(LocalDispatcher::new()),
        }
    }
}

impl<K: ResultKey, V: ResultValue> FrameworkNodeFactory<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher handed to every distributed node this factory builds.
    pub fn with_dispatcher(dispatcher: Arc<dyn Dispatcher<K, V>>) -> Self {
        Self { dispatcher }
    }

    pub fn create(
        &self,
        id: NodeIdentifier,
        descriptor: &OperatorDescriptor<K, V>,
        config: NodeConfig,
    ) -> Result<FrameworkNodeRef<K, V>, ConfigError> {
        let node: FrameworkNodeRef<K, V> = match config.strategy {
            ExecutionStrategy::SingleThread => SingleThreadFrameworkNode::new(id, descriptor, config)? as FrameworkNodeRef<K, V>,
            ExecutionStrategy::MultiThread => MultiThreadFrameworkNode::new(id, descriptor, config)? as FrameworkNodeRef<K, V>,
            ExecutionStrategy::Distributed => DistributedFrameworkNode::new(
                id,
                descriptor,
                config,
                Arc::clone(&self.dispatcher),
            )? as FrameworkNodeRef<K, V>,
        };
        Ok(node)
    }

    /// Build the framework node for a logical node.
    pub fn create_for(
        &self,
        node: &Node,
        descriptor: &OperatorDescriptor<K, V>,
    ) -> Result<FrameworkNodeRef<K, V>, ConfigError> {
        self.create(node.id().clone(), descriptor, node.config().clone())
    }
}
