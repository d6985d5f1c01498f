// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! User-provided computation and the context it runs in.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::dag::{ExecutionResults, NodeConfig, NodeIdentifier, UpstreamResults};
use crate::errors::ConfigError;
use crate::traits::{ResultKey, ResultValue};

/// The unit of work a node runs.
///
/// An operator reads the results of its node's upstream dependencies and produces a fresh
/// result map. It is invoked once per physical unit and must not retain anything between
/// invocations that the framework relies on. Returning `Err` marks the invocation failed;
/// whether it is retried is decided by the node's configuration.
#[async_trait]
pub trait Operator<K, V>: Send + Sync {
    async fn run(&self, ctx: &OperatorContext<K, V>) -> anyhow::Result<ExecutionResults<K, V>>;

    fn name(&self) -> &str;
}

/// Everything an operator invocation may look at.
#[derive(Debug)]
pub struct OperatorContext<K, V> {
    node: NodeIdentifier,
    logical: NodeIdentifier,
    partition: usize,
    partitions: usize,
    attempt: u32,
    config: Arc<NodeConfig>,
    inputs: UpstreamResults<K, V>,
}

impl<K, V> Clone for OperatorContext<K, V> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            logical: self.logical.clone(),
            partition: self.partition,
            partitions: self.partitions,
            attempt: self.attempt,
            config: Arc::clone(&self.config),
            inputs: self.inputs.clone(),
        }
    }
}

impl<K, V> OperatorContext<K, V> {
    pub fn new(
        node: NodeIdentifier,
        logical: NodeIdentifier,
        partition: usize,
        partitions: usize,
        config: Arc<NodeConfig>,
        inputs: UpstreamResults<K, V>,
    ) -> Self {
        Self {
            node,
            logical,
            partition,
            partitions,
            attempt: 1,
            config,
            inputs,
        }
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }

    /// Identifier of the unit actually running (`name#i` for fan-out units).
    pub fn node(&self) -> &NodeIdentifier {
        &self.node
    }

    /// Identifier of the logical node the invocation belongs to.
    pub fn logical(&self) -> &NodeIdentifier {
        &self.logical
    }

    /// Zero-based index of this unit among its siblings.
    pub fn partition(&self) -> usize {
        self.partition
    }

    /// Total number of sibling units; 1 for single-thread nodes.
    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// 1-based attempt counter.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn inputs(&self) -> &UpstreamResults<K, V> {
        &self.inputs
    }

    /// Whether the item at `index` of a deterministic ordering belongs to this unit.
    pub fn owns(&self, index: usize) -> bool {
        self.partitions <= 1 || index % self.partitions == self.partition
    }
}

pub type OperatorFactoryFn<K, V> =
    dyn Fn(&NodeConfig) -> anyhow::Result<Arc<dyn Operator<K, V>>> + Send + Sync;

/// A named, late-bound way of obtaining operator instances.
///
/// Nodes refer to operators by name. The descriptor turns that name into an instance once
/// per physical unit, with the node's configuration at hand.
pub struct OperatorDescriptor<K, V> {
    name: String,
    factory: Arc<OperatorFactoryFn<K, V>>,
}

impl<K, V> Clone for OperatorDescriptor<K, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<K, V> fmt::Debug for OperatorDescriptor<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorDescriptor")
            .field("name", &self.name)
            .finish()
    }
}

impl<K: ResultKey, V: ResultValue> OperatorDescriptor<K, V> {
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&NodeConfig) -> anyhow::Result<Arc<dyn Operator<K, V>>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    /// Every unit shares the same instance.
    pub fn shared(operator: Arc<dyn Operator<K, V>>) -> Self {
        let name = operator.name().to_string();
        Self::new(name, move |_| Ok(Arc::clone(&operator)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instantiate(&self, config: &NodeConfig) -> Result<Arc<dyn Operator<K, V>>, ConfigError> {
        (self.factory)(config).map_err(|e| ConfigError::OperatorCreationFailed {
            operator: self.name.clone(),
            reason: e.to_string(),
        })
    }
}
