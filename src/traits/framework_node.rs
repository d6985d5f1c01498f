// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The executable counterpart of a logical node.

use async_trait::async_trait;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Instant;

use crate::dag::{ExecutionResultsReader, ExecutionStatus, NodeConfig, NodeIdentifier, UpstreamResults};
use crate::errors::{ExecutionError, NodeFailure};
use crate::traits::{ResultKey, ResultValue};

pub type FrameworkNodeRef<K, V> = Arc<dyn FrameworkNode<K, V>>;

/// When a node left PENDING and when it reached a terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeTiming {
    pub started: Option<Instant>,
    pub finished: Option<Instant>,
}

/// A node as the executor sees it.
///
/// A framework node owns its execution status, its results and its physical sub-nodes.
/// The DAG executor only ever talks to the logical node through [`FrameworkNode::call`]
/// and the read accessors below; fan-out into physical units is the node's own business.
///
/// Equality and hashing of `dyn FrameworkNode` go by [`FrameworkNode::identifier`] alone.
#[async_trait]
pub trait FrameworkNode<K, V>: Send + Sync {
    fn identifier(&self) -> &NodeIdentifier;

    fn operator_name(&self) -> &str;

    fn node_config(&self) -> &NodeConfig;

    /// The node this one belongs to in the horizontal DAG.
    ///
    /// A stand-alone node returns itself; a physical unit returns the fan-out node that
    /// created it.
    fn logical_node(self: Arc<Self>) -> FrameworkNodeRef<K, V>;

    /// The units that actually run, fixed at construction.
    fn physical_nodes(self: Arc<Self>) -> Vec<FrameworkNodeRef<K, V>>;

    fn execution_status(&self) -> ExecutionStatus;

    /// Read-only view over the node's results. Only available once the node is SUCCESS.
    fn execution_results_reader(&self) -> Result<ExecutionResultsReader<K, V>, ExecutionError>;

    /// Cause recorded when the node ended up FAILED.
    fn failure(&self) -> Option<NodeFailure>;

    fn timing(&self) -> NodeTiming;

    /// Move a PENDING node straight to SKIPPED.
    fn skip(&self) -> Result<(), ExecutionError>;

    /// Run the node against the results of its upstream dependencies.
    ///
    /// Returns the node's own identifier once it reached SUCCESS or FAILED. Operator
    /// failures are recorded on the node, never returned; `Err` means the framework itself
    /// was misused (the node had already run, for instance).
    async fn call(&self, inputs: UpstreamResults<K, V>) -> Result<NodeIdentifier, ExecutionError>;
}

/// Identity comparison for framework nodes.
pub fn same_node<K: ResultKey, V: ResultValue>(
    a: &dyn FrameworkNode<K, V>,
    b: &dyn FrameworkNode<K, V>,
) -> bool {
    a.identifier() == b.identifier()
}

impl<K: ResultKey, V: ResultValue> PartialEq for dyn FrameworkNode<K, V> {
    fn eq(&self, other: &Self) -> bool {
        same_node(self, other)
    }
}

impl<K: ResultKey, V: ResultValue> Eq for dyn FrameworkNode<K, V> {}

impl<K: ResultKey, V: ResultValue> Hash for dyn FrameworkNode<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier().hash(state);
    }
}

impl<K: ResultKey, V: ResultValue> fmt::Debug for dyn FrameworkNode<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameworkNode")
            .field("identifier", self.identifier())
            .field("operator", &self.operator_name())
            .field("status", &self.execution_status())
            .finish()
    }
}
