// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Dependency-counting DAG executor.
//!
//! # Execution Flow
//!
//! 1. **Validation**: the DAG must be acyclic with resolvable edges, and every logical node
//!    must have a framework node registered under its own identifier
//! 2. **Initialization**: dependency counts and topological ranks from the dependency graph
//! 3. **Dispatch**: ready nodes leave a priority queue and run as tasks, at most
//!    `max_concurrency` at a time
//! 4. **Completion**: each finished node decrements its dependents' counters. A dependent
//!    whose counter reaches zero is dispatched if all of its upstream nodes succeeded and
//!    skipped otherwise; skips cascade through the rest of the graph
//!
//! The executor only ever talks to logical nodes. How a node fans out into physical units
//! is none of its business.
//!
//! # Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use the_taskframe::dag::{ExecutionResults, LogicalDag, Node, NodeConfig, NodeIdentifier};
//! use the_taskframe::engine::DagExecutor;
//! use the_taskframe::framework::{FrameworkNodeFactory, FrameworkNodeMap};
//! use the_taskframe::traits::{Operator, OperatorContext, OperatorDescriptor};
//!
//! struct Count;
//!
//! #[async_trait]
//! impl Operator<String, usize> for Count {
//!     async fn run(&self, ctx: &OperatorContext<String, usize>) -> anyhow::Result<ExecutionResults<String, usize>> {
//!         let seen: usize = ctx.inputs().iter().map(|(_, reader)| reader.len()).sum();
//!         Ok([(ctx.node().to_string(), seen)].into_iter().collect())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "count"
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dag = LogicalDag::new()
//!     .with_node(Node::new("a", "count"))?
//!     .with_node(Node::new("b", "count").depends_on("a"))?;
//!
//! let descriptor = OperatorDescriptor::shared(Arc::new(Count) as Arc<dyn Operator<String, usize>>);
//! let factory = FrameworkNodeFactory::new();
//! let mut nodes = FrameworkNodeMap::new();
//! for node in dag.nodes() {
//!     nodes.insert(factory.create_for(node, &descriptor)?)?;
//! }
//!
//! let report = DagExecutor::new(2).run(&dag, &nodes).await?;
//! assert!(report.is_success());
//!
//! let b = nodes.get(&NodeIdentifier::from_name("b")).unwrap();
//! assert_eq!(b.execution_results_reader()?.get(&"b".to_string()), Some(&1));
//! # Ok(())
//! # }
//! ```

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::consts::FALLBACK_MAX_CONCURRENCY;
use crate::dag::{DependencyGraph, ExecutionStatus, LogicalDag, NodeIdentifier, UpstreamResults};
use crate::engine::ready_queue::{ReadyNode, ReadyQueue};
use crate::engine::report::{NodeReport, RunReport};
use crate::errors::{ExecutionError, FailureStrategy};
use crate::framework::FrameworkNodeMap;
use crate::observability::messages::engine::{
    ExecutionCancelled, ExecutionCompleted, ExecutionFailed, ExecutionStarted, NodeCompleted,
    NodeDispatched, NodeSkipped,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{FrameworkNodeRef, ResultKey, ResultValue};

#[derive(Debug, Clone)]
pub struct DagExecutor {
    max_concurrency: usize,
    failure_strategy: FailureStrategy,
}

impl Default for DagExecutor {
    fn default() -> Self {
        let concurrency = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(FALLBACK_MAX_CONCURRENCY);
        Self::new(concurrency)
    }
}

impl DagExecutor {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
            failure_strategy: FailureStrategy::default(),
        }
    }

    pub fn with_failure_strategy(mut self, failure_strategy: FailureStrategy) -> Self {
        self.failure_strategy = failure_strategy;
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn failure_strategy(&self) -> FailureStrategy {
        self.failure_strategy
    }

    /// Drive every node of `dag` to a terminal state.
    ///
    /// Operator failures never surface here: they are recorded on the failing node and in
    /// the report. `Err` is reserved for programming errors, which abort the run.
    pub async fn run<K: ResultKey, V: ResultValue>(
        &self,
        dag: &LogicalDag,
        nodes: &FrameworkNodeMap<K, V>,
    ) -> Result<RunReport, ExecutionError> {
        self.run_with_cancellation(dag, nodes, CancellationToken::new())
            .await
    }

    /// Like [`DagExecutor::run`], stopping early once `cancel` fires.
    ///
    /// Cancellation never interrupts a node that is already running. Nodes that have not
    /// been dispatched yet are skipped, in-flight nodes are awaited.
    pub async fn run_with_cancellation<K: ResultKey, V: ResultValue>(
        &self,
        dag: &LogicalDag,
        nodes: &FrameworkNodeMap<K, V>,
        cancel: CancellationToken,
    ) -> Result<RunReport, ExecutionError> {
        let result = self.execute(dag, nodes, cancel).await;
        if let Err(error) = &result {
            ExecutionFailed { error }.log();
        }
        result
    }

    async fn execute<K: ResultKey, V: ResultValue>(
        &self,
        dag: &LogicalDag,
        nodes: &FrameworkNodeMap<K, V>,
        cancel: CancellationToken,
    ) -> Result<RunReport, ExecutionError> {
        let run_started = Instant::now();

        dag.validate().map_err(ExecutionError::InvalidGraph)?;
        for id in dag.ids() {
            let node = nodes
                .get(id)
                .ok_or_else(|| ExecutionError::MissingFrameworkNode { node: id.clone() })?;
            if node.identifier() != id {
                return Err(ExecutionError::IdentifierMismatch {
                    expected: id.clone(),
                    actual: node.identifier().clone(),
                });
            }
        }

        let graph = dag.dependency_graph();
        let ranks = graph
            .topological_ranks()
            .ok_or_else(|| ExecutionError::InternalError {
                message: "dependency graph contains cycles after validation".into(),
            })?;

        let strategy_name = match self.failure_strategy {
            FailureStrategy::ContinueOnError => "continue_on_error",
            FailureStrategy::FailFast => "fail_fast",
        };
        ExecutionStarted {
            node_count: dag.len(),
            max_concurrency: self.max_concurrency,
            failure_strategy: strategy_name,
        }
        .log();

        // Fail-fast must not cancel the caller's token.
        let cancel = cancel.child_token();
        let mut scheduler = Scheduler {
            remaining: graph.dependency_counts(),
            graph,
            ranks,
            nodes,
            ready: ReadyQueue::new(),
            report: RunReport::new(),
            run_started,
        };
        scheduler.enqueue_entry_points();

        let mut in_flight: JoinSet<Result<NodeIdentifier, ExecutionError>> = JoinSet::new();
        let mut running: HashSet<NodeIdentifier> = HashSet::new();
        let mut cancellation_seen = false;
        let mut fail_fast_triggered = false;

        loop {
            if cancel.is_cancelled() && !cancellation_seen {
                cancellation_seen = true;
                ExecutionCancelled {
                    reason: if fail_fast_triggered { "fail_fast" } else { "requested" },
                    in_flight: running.len(),
                }
                .log();
            }

            while running.len() < self.max_concurrency {
                let Some(next) = scheduler.ready.pop() else {
                    break;
                };

                if cancel.is_cancelled() {
                    scheduler.skip(&next.id, "run cancelled")?;
                    scheduler.settle(next.id)?;
                    continue;
                }

                let node = Arc::clone(scheduler.node(&next.id)?);
                let inputs = scheduler.upstream_results(&next.id)?;
                NodeDispatched {
                    node_id: next.id.as_str(),
                    rank: next.topological_rank,
                    in_flight: running.len() + 1,
                }
                .log();
                running.insert(next.id);
                in_flight.spawn(async move { node.call(inputs).await });
            }

            if running.is_empty() {
                break;
            }

            let joined = tokio::select! {
                joined = in_flight.join_next() => joined,
                _ = cancel.cancelled(), if !cancellation_seen => continue,
            };

            let finished = joined
                .ok_or_else(|| ExecutionError::InternalError {
                    message: format!("{} nodes marked running but no task in flight", running.len()),
                })?
                .map_err(|e| ExecutionError::InternalError {
                    message: format!("node task aborted: {}", e),
                })??;

            if !running.remove(&finished) {
                return Err(ExecutionError::InternalError {
                    message: format!("completion reported for node '{}' which was not running", finished),
                });
            }

            let status = scheduler.node(&finished)?.execution_status();
            if !status.is_terminal() {
                return Err(ExecutionError::InternalError {
                    message: format!("node '{}' returned in non-terminal status {}", finished, status),
                });
            }
            NodeCompleted {
                node_id: finished.as_str(),
                status: &status.to_string(),
            }
            .log();
            scheduler.record(&finished)?;

            if status == ExecutionStatus::Failed
                && self.failure_strategy == FailureStrategy::FailFast
                && scheduler.report.len() < dag.len()
                && !cancel.is_cancelled()
            {
                fail_fast_triggered = true;
                cancel.cancel();
            }

            scheduler.settle(finished)?;
        }

        let mut report = scheduler.report;
        if report.len() != dag.len() {
            return Err(ExecutionError::InternalError {
                message: format!(
                    "run ended with {} of {} nodes in a terminal state",
                    report.len(),
                    dag.len()
                ),
            });
        }
        report.finish(cancellation_seen, run_started.elapsed());

        ExecutionCompleted {
            node_count: report.len(),
            succeeded: report.succeeded().len(),
            failed: report.failed().len(),
            skipped: report.skipped().len(),
            duration: report.duration(),
        }
        .log();

        Ok(report)
    }
}

/// Mutable bookkeeping of a single run.
struct Scheduler<'a, K, V> {
    graph: DependencyGraph,
    ranks: HashMap<NodeIdentifier, usize>,
    remaining: HashMap<NodeIdentifier, usize>,
    nodes: &'a FrameworkNodeMap<K, V>,
    ready: ReadyQueue,
    report: RunReport,
    run_started: Instant,
}

impl<K: ResultKey, V: ResultValue> Scheduler<'_, K, V> {
    fn node(&self, id: &NodeIdentifier) -> Result<&FrameworkNodeRef<K, V>, ExecutionError> {
        self.nodes
            .get(id)
            .ok_or_else(|| ExecutionError::MissingFrameworkNode { node: id.clone() })
    }

    fn enqueue_entry_points(&mut self) {
        for id in self.graph.entry_points() {
            let rank = self.rank(&id);
            self.ready.push(ReadyNode::new(id, rank));
        }
    }

    fn rank(&self, id: &NodeIdentifier) -> usize {
        self.ranks.get(id).copied().unwrap_or(0)
    }

    /// Readers of every direct upstream node. All of them are SUCCESS by construction.
    fn upstream_results(&self, id: &NodeIdentifier) -> Result<UpstreamResults<K, V>, ExecutionError> {
        self.graph
            .dependencies(id)
            .iter()
            .map(|upstream| self.node(upstream)?.execution_results_reader())
            .collect()
    }

    fn record(&mut self, id: &NodeIdentifier) -> Result<(), ExecutionError> {
        let node = self.node(id)?;
        let timing = node.timing();
        let report = NodeReport {
            node: id.clone(),
            status: node.execution_status(),
            failure: node.failure(),
            started_at: timing
                .started
                .map(|t| t.saturating_duration_since(self.run_started)),
            finished_at: timing
                .finished
                .map(|t| t.saturating_duration_since(self.run_started)),
        };
        self.report.record(report);
        Ok(())
    }

    fn skip(&mut self, id: &NodeIdentifier, reason: &str) -> Result<(), ExecutionError> {
        self.node(id)?.skip()?;
        NodeSkipped {
            node_id: id.as_str(),
            reason,
        }
        .log();
        self.record(id)
    }

    /// Resolve the dependents of a node that just reached a terminal state.
    fn settle(&mut self, finished: NodeIdentifier) -> Result<(), ExecutionError> {
        let mut settled = VecDeque::from([finished]);

        while let Some(done) = settled.pop_front() {
            let dependents = self.graph.dependents(&done).to_vec();
            for dependent in dependents {
                let count = self.remaining.get_mut(&dependent).ok_or_else(|| {
                    ExecutionError::InternalError {
                        message: format!("no dependency counter for node '{}'", dependent),
                    }
                })?;
                *count = count.saturating_sub(1);
                if *count > 0 {
                    continue;
                }

                let blocked_by = self
                    .graph
                    .dependencies(&dependent)
                    .iter()
                    .find(|upstream| {
                        self.nodes
                            .get(upstream)
                            .map(|n| n.execution_status() != ExecutionStatus::Success)
                            .unwrap_or(true)
                    })
                    .cloned();

                match blocked_by {
                    None => {
                        let rank = self.rank(&dependent);
                        self.ready.push(ReadyNode::new(dependent, rank));
                    }
                    Some(upstream) => {
                        let reason = format!("upstream '{}' did not succeed", upstream);
                        self.skip(&dependent, &reason)?;
                        settled.push_back(dependent);
                    }
                }
            }
        }

        Ok(())
    }
}
