// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};
use std::time::Duration;

use crate::dag::{ExecutionResultsReader, ExecutionStatus, NodeConfig, NodeIdentifier, UpstreamResults};
use crate::errors::{ConfigError, ExecutionError, NodeFailure};
use crate::framework::operator_executor::OperatorExecutor;
use crate::framework::state::NodeState;
use crate::observability::messages::node::{NodeFailed, RetryScheduled};
use crate::observability::messages::StructuredLog;
use crate::traits::{
    FrameworkNode, FrameworkNodeRef, NodeTiming, Operator, OperatorContext, OperatorDescriptor,
    ResultKey, ResultValue,
};

/// A node that runs its operator once, inline in its own task.
///
/// Also serves as the physical unit of the fan-out variants. A unit knows its partition
/// index and keeps a weak link to the fan-out node that created it, which is what
/// [`FrameworkNode::logical_node`] hands back.
pub struct SingleThreadFrameworkNode<K, V> {
    id: NodeIdentifier,
    logical_id: NodeIdentifier,
    parent: Option<Weak<dyn FrameworkNode<K, V>>>,
    partition: usize,
    partitions: usize,
    operator_name: String,
    config: Arc<NodeConfig>,
    executor: OperatorExecutor<K, V>,
    state: NodeState<K, V>,
}

impl<K: ResultKey, V: ResultValue> SingleThreadFrameworkNode<K, V> {
    pub fn new(
        id: NodeIdentifier,
        descriptor: &OperatorDescriptor<K, V>,
        config: NodeConfig,
    ) -> Result<Arc<Self>, ConfigError> {
        config.validate().map_err(|e| e.for_node(&id))?;
        let operator = descriptor.instantiate(&config).map_err(|e| e.for_node(&id))?;

        Ok(Arc::new(Self {
            logical_id: id.clone(),
            parent: None,
            partition: 0,
            partitions: 1,
            operator_name: descriptor.name().to_string(),
            executor: OperatorExecutor::new(operator, &config),
            config: Arc::new(config),
            state: NodeState::new(id.clone()),
            id,
        }))
    }

    pub(crate) fn physical_unit(
        parent: Weak<dyn FrameworkNode<K, V>>,
        logical_id: &NodeIdentifier,
        partition: usize,
        partitions: usize,
        operator_name: &str,
        operator: Arc<dyn Operator<K, V>>,
        config: Arc<NodeConfig>,
    ) -> Self {
        let id = logical_id.physical(partition);
        Self {
            logical_id: logical_id.clone(),
            parent: Some(parent),
            partition,
            partitions,
            operator_name: operator_name.to_string(),
            executor: OperatorExecutor::new(operator, &config),
            config,
            state: NodeState::new(id.clone()),
            id,
        }
    }

    pub fn partition(&self) -> usize {
        self.partition
    }

    pub fn partitions(&self) -> usize {
        self.partitions
    }

    fn context(&self, inputs: UpstreamResults<K, V>, attempt: u32) -> OperatorContext<K, V> {
        OperatorContext::new(
            self.id.clone(),
            self.logical_id.clone(),
            self.partition,
            self.partitions,
            Arc::clone(&self.config),
            inputs,
        )
        .with_attempt(attempt)
    }

    fn record_failure(&self, failure: NodeFailure) -> Result<(), ExecutionError> {
        NodeFailed {
            node_id: self.id.as_str(),
            failure: &failure,
        }
        .log();
        self.state.fail(failure)
    }
}

#[async_trait]
impl<K: ResultKey, V: ResultValue> FrameworkNode<K, V> for SingleThreadFrameworkNode<K, V> {
    fn identifier(&self) -> &NodeIdentifier {
        &self.id
    }

    fn operator_name(&self) -> &str {
        &self.operator_name
    }

    fn node_config(&self) -> &NodeConfig {
        &self.config
    }

    fn logical_node(self: Arc<Self>) -> FrameworkNodeRef<K, V> {
        if let Some(parent) = self.parent.as_ref().and_then(Weak::upgrade) {
            return parent;
        }
        self
    }

    fn physical_nodes(self: Arc<Self>) -> Vec<FrameworkNodeRef<K, V>> {
        vec![self as FrameworkNodeRef<K, V>]
    }

    fn execution_status(&self) -> ExecutionStatus {
        self.state.status()
    }

    fn execution_results_reader(&self) -> Result<ExecutionResultsReader<K, V>, ExecutionError> {
        self.state.reader()
    }

    fn failure(&self) -> Option<NodeFailure> {
        self.state.failure()
    }

    fn timing(&self) -> NodeTiming {
        self.state.timing()
    }

    fn skip(&self) -> Result<(), ExecutionError> {
        self.state.skip()
    }

    async fn call(&self, inputs: UpstreamResults<K, V>) -> Result<NodeIdentifier, ExecutionError> {
        self.state.begin()?;

        let max_attempts = self.config.max_retries.saturating_add(1);
        let backoff = Duration::from_millis(self.config.retry_backoff_ms);
        let mut attempt = 1;

        loop {
            let outcome = self
                .executor
                .execute(self.context(inputs.clone(), attempt))
                .await;

            match outcome {
                Ok(results) => {
                    self.state.succeed(results)?;
                    break;
                }
                Err(_) if attempt < max_attempts => {
                    attempt += 1;
                    RetryScheduled {
                        node_id: self.id.as_str(),
                        next_attempt: attempt,
                        max_attempts,
                        backoff,
                    }
                    .log();
                    if !backoff.is_zero() {
                        tokio::time::sleep(backoff).await;
                    }
                }
                Err(failure) => {
                    self.record_failure(failure)?;
                    break;
                }
            }
        }

        Ok(self.id.clone())
    }
}

impl<K, V> PartialEq for SingleThreadFrameworkNode<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<K, V> Eq for SingleThreadFrameworkNode<K, V> {}

impl<K, V> Hash for SingleThreadFrameworkNode<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::ExecutionResults;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails until it has been called `succeed_on` times.
    struct Flaky {
        calls: AtomicU32,
        succeed_on: u32,
    }

    #[async_trait]
    impl Operator<String, u32> for Flaky {
        async fn run(&self, ctx: &OperatorContext<String, u32>) -> anyhow::Result<ExecutionResults<String, u32>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call < self.succeed_on {
                anyhow::bail!("transient failure {}", call);
            }
            Ok([("attempt".to_string(), ctx.attempt())].into_iter().collect())
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn flaky_node(succeed_on: u32, config: NodeConfig) -> (Arc<Flaky>, Arc<SingleThreadFrameworkNode<String, u32>>) {
        let operator = Arc::new(Flaky {
            calls: AtomicU32::new(0),
            succeed_on,
        });
        let descriptor = OperatorDescriptor::shared(operator.clone() as Arc<dyn Operator<String, u32>>);
        let node = SingleThreadFrameworkNode::new(NodeIdentifier::from_name("fetch"), &descriptor, config).unwrap();
        (operator, node)
    }

    #[tokio::test]
    async fn test_call_records_success() {
        let (_, node) = flaky_node(1, NodeConfig::default());
        assert_eq!(node.execution_status(), ExecutionStatus::Pending);

        let returned = node.call(UpstreamResults::new()).await.unwrap();
        assert_eq!(&returned, node.identifier());
        assert_eq!(node.execution_status(), ExecutionStatus::Success);

        let reader = node.execution_results_reader().unwrap();
        assert_eq!(reader.get(&"attempt".to_string()), Some(&1));
        assert_eq!(reader.node().as_str(), "fetch");
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let (operator, node) = flaky_node(3, NodeConfig::default().with_retries(2, 1));
        node.call(UpstreamResults::new()).await.unwrap();

        assert_eq!(node.execution_status(), ExecutionStatus::Success);
        assert_eq!(operator.calls.load(Ordering::SeqCst), 3);
        let reader = node.execution_results_reader().unwrap();
        assert_eq!(reader.get(&"attempt".to_string()), Some(&3));
    }

    #[tokio::test]
    async fn test_exhausted_retries_record_failure() {
        let (operator, node) = flaky_node(10, NodeConfig::default().with_retries(1, 0));
        node.call(UpstreamResults::new()).await.unwrap();

        assert_eq!(node.execution_status(), ExecutionStatus::Failed);
        assert_eq!(operator.calls.load(Ordering::SeqCst), 2);
        match node.failure() {
            Some(NodeFailure::Operator { attempts, message, .. }) => {
                assert_eq!(attempts, 2);
                assert_eq!(message, "transient failure 2");
            }
            other => panic!("Expected operator failure, got {:?}", other),
        }
        assert!(matches!(
            node.execution_results_reader(),
            Err(ExecutionError::ResultsNotReady { status: ExecutionStatus::Failed, .. })
        ));
    }

    #[tokio::test]
    async fn test_second_call_is_a_programming_error() {
        let (_, node) = flaky_node(1, NodeConfig::default());
        node.call(UpstreamResults::new()).await.unwrap();
        assert!(matches!(
            node.call(UpstreamResults::new()).await,
            Err(ExecutionError::IllegalTransition { from: ExecutionStatus::Success, .. })
        ));
    }

    #[tokio::test]
    async fn test_standalone_node_is_its_own_logical_and_physical_node() {
        let (_, node) = flaky_node(1, NodeConfig::default());
        let logical = Arc::clone(&node).logical_node();
        assert_eq!(logical.identifier(), node.identifier());

        let physical = Arc::clone(&node).physical_nodes();
        assert_eq!(physical.len(), 1);
        assert_eq!(physical[0].identifier(), node.identifier());
    }

    #[test]
    fn test_invalid_config_names_the_node() {
        let descriptor = OperatorDescriptor::shared(Arc::new(Flaky {
            calls: AtomicU32::new(0),
            succeed_on: 1,
        }) as Arc<dyn Operator<String, u32>>);
        let result = SingleThreadFrameworkNode::new(
            NodeIdentifier::from_name("fetch"),
            &descriptor,
            NodeConfig::default().with_timeout_ms(0),
        );
        match result {
            Err(ConfigError::ForNode { node, .. }) => assert_eq!(node.as_str(), "fetch"),
            Err(other) => panic!("Expected ForNode, got {:?}", other),
            Ok(_) => panic!("Expected a configuration error"),
        }
    }
}
