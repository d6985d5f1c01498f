// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use tokio_util::sync::CancellationToken;

use crate::config::{OperatorRegistry, WorkflowConfig};
use crate::dag::LogicalDag;
use crate::engine::{DagExecutor, RunReport};
use crate::errors::{ConfigError, ExecutionError, ValidationError};
use crate::framework::{FrameworkNodeFactory, FrameworkNodeMap};
use crate::traits::{ResultKey, ResultValue};

/// Everything needed to execute a workflow once.
pub struct Runtime<K, V> {
    pub dag: LogicalDag,
    pub nodes: FrameworkNodeMap<K, V>,
    pub executor: DagExecutor,
}

impl<K: ResultKey, V: ResultValue> Runtime<K, V> {
    pub async fn run(&self) -> Result<RunReport, ExecutionError> {
        self.executor.run(&self.dag, &self.nodes).await
    }

    pub async fn run_with_cancellation(&self, cancel: CancellationToken) -> Result<RunReport, ExecutionError> {
        self.executor
            .run_with_cancellation(&self.dag, &self.nodes, cancel)
            .await
    }
}

/// Assembles a [`Runtime`] from a workflow configuration.
///
/// Assembly validates the workflow, resolves every operator name through the registry and
/// builds one framework node per logical node. Any problem is reported before a single
/// operator runs.
///
/// # Example
/// ```
/// use the_taskframe::config::{parse_config, RuntimeBuilder};
/// use the_taskframe::errors::FailureStrategy;
/// use the_taskframe::operators::builtin_registry;
///
/// let config = parse_config(
///     "failure_strategy: fail_fast\nnodes:\n  - id: seed\n    operator: constant\n",
/// )
/// .unwrap();
///
/// let runtime = RuntimeBuilder::from_config(&config, &builtin_registry()).unwrap();
/// assert_eq!(runtime.nodes.len(), 1);
/// assert_eq!(runtime.executor.failure_strategy(), FailureStrategy::FailFast);
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    pub fn from_config<K: ResultKey, V: ResultValue>(
        cfg: &WorkflowConfig,
        registry: &OperatorRegistry<K, V>,
    ) -> Result<Runtime<K, V>, ConfigError> {
        Self::from_config_with_factory(cfg, registry, &FrameworkNodeFactory::default())
    }

    /// Like [`RuntimeBuilder::from_config`], with a factory carrying a custom dispatcher.
    pub fn from_config_with_factory<K: ResultKey, V: ResultValue>(
        cfg: &WorkflowConfig,
        registry: &OperatorRegistry<K, V>,
        factory: &FrameworkNodeFactory<K, V>,
    ) -> Result<Runtime<K, V>, ConfigError> {
        cfg.validate()?;
        let dag = cfg.to_logical_dag()?;

        let mut nodes = FrameworkNodeMap::new();
        for node in dag.nodes() {
            let descriptor = registry
                .get(node.operator())
                .map_err(|e| e.for_node(node.id()))?;
            let framework_node = factory.create_for(node, descriptor)?;
            nodes.insert(framework_node).map_err(|_| {
                ConfigError::Validation(vec![ValidationError::DuplicateNodeId {
                    node_id: node.id().to_string(),
                }])
            })?;
        }

        let executor = DagExecutor::new(cfg.executor_options.resolved_max_concurrency())
            .with_failure_strategy(cfg.failure_strategy);

        Ok(Runtime {
            dag,
            nodes,
            executor,
        })
    }
}
