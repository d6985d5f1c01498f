// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for DAG executor lifecycle and scheduling events.
//!
//! This module contains message types for logging events related to:
//! * Run start, completion and abort
//! * Dispatch of ready nodes
//! * Nodes reaching a terminal state, including skips and cancellation

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A run started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_taskframe::observability::messages::engine::ExecutionStarted;
///
/// let msg = ExecutionStarted {
///     node_count: 5,
///     max_concurrency: 4,
///     failure_strategy: "fail_fast",
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Starting DAG execution: 5 nodes, max_concurrency=4, failure_strategy=fail_fast"
/// );
/// ```
pub struct ExecutionStarted<'a> {
    pub node_count: usize,
    pub max_concurrency: usize,
    pub failure_strategy: &'a str,
}

impl Display for ExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting DAG execution: {} nodes, max_concurrency={}, failure_strategy={}",
            self.node_count, self.max_concurrency, self.failure_strategy
        )
    }
}

impl StructuredLog for ExecutionStarted<'_> {
    fn log(&self) {
        tracing::info!(
            node_count = self.node_count,
            max_concurrency = self.max_concurrency,
            failure_strategy = self.failure_strategy,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution",
            span_name = name,
            node_count = self.node_count,
            max_concurrency = self.max_concurrency,
            failure_strategy = self.failure_strategy,
        )
    }
}

/// Every node reached a terminal state.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ExecutionCompleted {
    pub node_count: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration: Duration,
}

impl Display for ExecutionCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "DAG execution completed: {} nodes ({} succeeded, {} failed, {} skipped) in {:?}",
            self.node_count, self.succeeded, self.failed, self.skipped, self.duration
        )
    }
}

impl StructuredLog for ExecutionCompleted {
    fn log(&self) {
        tracing::info!(
            node_count = self.node_count,
            succeeded = self.succeeded,
            failed = self.failed,
            skipped = self.skipped,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution_completed",
            span_name = name,
            node_count = self.node_count,
            succeeded = self.succeeded,
            failed = self.failed,
            skipped = self.skipped,
            duration = ?self.duration,
        )
    }
}

/// The run was aborted by a programming error.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_taskframe::observability::messages::engine::ExecutionFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
/// let msg = ExecutionFailed { error: &error };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ExecutionFailed<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for ExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "DAG execution aborted: {}", self.error)
    }
}

impl StructuredLog for ExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("execution_failed", span_name = name, error = %self.error)
    }
}

/// Cancellation was observed; nodes that have not started will be skipped.
///
/// # Log Level
/// `warn!` - Degraded behavior
pub struct ExecutionCancelled<'a> {
    pub reason: &'a str,
    pub in_flight: usize,
}

impl Display for ExecutionCancelled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "DAG execution cancelled ({}): waiting for {} in-flight nodes, skipping the rest",
            self.reason, self.in_flight
        )
    }
}

impl StructuredLog for ExecutionCancelled<'_> {
    fn log(&self) {
        tracing::warn!(reason = self.reason, in_flight = self.in_flight, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "execution_cancelled",
            span_name = name,
            reason = self.reason,
            in_flight = self.in_flight,
        )
    }
}

/// A ready node was handed to a worker task.
///
/// # Log Level
/// `debug!` - Scheduling detail
pub struct NodeDispatched<'a> {
    pub node_id: &'a str,
    pub rank: usize,
    pub in_flight: usize,
}

impl Display for NodeDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dispatching node '{}' (rank {}, {} in flight)",
            self.node_id, self.rank, self.in_flight
        )
    }
}

impl StructuredLog for NodeDispatched<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            rank = self.rank,
            in_flight = self.in_flight,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node_dispatched",
            span_name = name,
            node_id = self.node_id,
            rank = self.rank,
        )
    }
}

/// A dispatched node came back in a terminal state.
///
/// # Log Level
/// `debug!` - Scheduling detail
pub struct NodeCompleted<'a> {
    pub node_id: &'a str,
    pub status: &'a str,
}

impl Display for NodeCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node '{}' finished with status {}", self.node_id, self.status)
    }
}

impl StructuredLog for NodeCompleted<'_> {
    fn log(&self) {
        tracing::debug!(node_id = self.node_id, status = self.status, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node_completed",
            span_name = name,
            node_id = self.node_id,
            status = self.status,
        )
    }
}

/// A node will never run.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_taskframe::observability::messages::engine::NodeSkipped;
///
/// let msg = NodeSkipped {
///     node_id: "alert",
///     reason: "upstream 'detect' did not succeed",
/// };
///
/// assert_eq!(msg.to_string(), "Skipping node 'alert': upstream 'detect' did not succeed");
/// ```
pub struct NodeSkipped<'a> {
    pub node_id: &'a str,
    pub reason: &'a str,
}

impl Display for NodeSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Skipping node '{}': {}", self.node_id, self.reason)
    }
}

impl StructuredLog for NodeSkipped<'_> {
    fn log(&self) {
        tracing::info!(node_id = self.node_id, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node_skipped",
            span_name = name,
            node_id = self.node_id,
            reason = self.reason,
        )
    }
}
