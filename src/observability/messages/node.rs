// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for framework node and operator invocation events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// An operator invocation is about to start.
///
/// # Log Level
/// `debug!` - Execution detail
pub struct OperatorInvocationStarted<'a> {
    pub node_id: &'a str,
    pub operator: &'a str,
    pub attempt: u32,
}

impl Display for OperatorInvocationStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Invoking operator '{}' for node '{}' (attempt {})",
            self.operator, self.node_id, self.attempt
        )
    }
}

impl StructuredLog for OperatorInvocationStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            operator = self.operator,
            attempt = self.attempt,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "operator_invocation",
            span_name = name,
            node_id = self.node_id,
            operator = self.operator,
            attempt = self.attempt,
        )
    }
}

/// An operator invocation returned results.
///
/// # Log Level
/// `debug!` - Execution detail
///
/// # Example
/// ```
/// use the_taskframe::observability::messages::node::OperatorInvocationCompleted;
/// use std::time::Duration;
///
/// let msg = OperatorInvocationCompleted {
///     node_id: "detect#2",
///     operator: "zscore",
///     result_count: 12,
///     duration: Duration::from_millis(40),
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct OperatorInvocationCompleted<'a> {
    pub node_id: &'a str,
    pub operator: &'a str,
    pub result_count: usize,
    pub duration: Duration,
}

impl Display for OperatorInvocationCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Operator '{}' for node '{}' produced {} results in {:?}",
            self.operator, self.node_id, self.result_count, self.duration
        )
    }
}

impl StructuredLog for OperatorInvocationCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            operator = self.operator,
            result_count = self.result_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "operator_completed",
            span_name = name,
            node_id = self.node_id,
            operator = self.operator,
            result_count = self.result_count,
        )
    }
}

/// An operator invocation failed, timed out or panicked.
///
/// # Log Level
/// `warn!` - The node may still recover through a retry
pub struct OperatorInvocationFailed<'a> {
    pub node_id: &'a str,
    pub operator: &'a str,
    pub attempt: u32,
    pub error: &'a dyn Display,
}

impl Display for OperatorInvocationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Operator '{}' for node '{}' failed on attempt {}: {}",
            self.operator, self.node_id, self.attempt, self.error
        )
    }
}

impl StructuredLog for OperatorInvocationFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            node_id = self.node_id,
            operator = self.operator,
            attempt = self.attempt,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "operator_failed",
            span_name = name,
            node_id = self.node_id,
            operator = self.operator,
            attempt = self.attempt,
        )
    }
}

/// A failed invocation will be retried after a backoff.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RetryScheduled<'a> {
    pub node_id: &'a str,
    pub next_attempt: u32,
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Display for RetryScheduled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Retrying node '{}' in {:?} (attempt {} of {})",
            self.node_id, self.backoff, self.next_attempt, self.max_attempts
        )
    }
}

impl StructuredLog for RetryScheduled<'_> {
    fn log(&self) {
        tracing::info!(
            node_id = self.node_id,
            next_attempt = self.next_attempt,
            max_attempts = self.max_attempts,
            backoff_ms = self.backoff.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "retry_scheduled",
            span_name = name,
            node_id = self.node_id,
            next_attempt = self.next_attempt,
        )
    }
}

/// A fan-out node handed its physical units out for execution.
///
/// # Log Level
/// `debug!` - Execution detail
pub struct PhysicalUnitsDispatched<'a> {
    pub node_id: &'a str,
    pub strategy: &'a str,
    pub units: usize,
}

impl Display for PhysicalUnitsDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' fanning out to {} physical units ({})",
            self.node_id, self.units, self.strategy
        )
    }
}

impl StructuredLog for PhysicalUnitsDispatched<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            strategy = self.strategy,
            units = self.units,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "physical_units",
            span_name = name,
            node_id = self.node_id,
            strategy = self.strategy,
            units = self.units,
        )
    }
}

/// Outputs of all physical units merged into the logical node's results.
///
/// # Log Level
/// `debug!`
pub struct PhysicalUnitsMerged<'a> {
    pub node_id: &'a str,
    pub units: usize,
    pub result_count: usize,
}

impl Display for PhysicalUnitsMerged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' merged {} results from {} physical units",
            self.node_id, self.result_count, self.units
        )
    }
}

impl StructuredLog for PhysicalUnitsMerged<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            units = self.units,
            result_count = self.result_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "physical_units_merged",
            span_name = name,
            node_id = self.node_id,
            units = self.units,
        )
    }
}

/// A node recorded FAILED.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_taskframe::observability::messages::node::NodeFailed;
///
/// let cause = "operator 'zscore' failed after 3 attempt(s): division by zero";
/// let msg = NodeFailed {
///     node_id: "detect",
///     failure: &cause,
/// };
///
/// assert!(msg.to_string().starts_with("Node 'detect' failed"));
/// ```
pub struct NodeFailed<'a> {
    pub node_id: &'a str,
    pub failure: &'a dyn Display,
}

impl Display for NodeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node '{}' failed: {}", self.node_id, self.failure)
    }
}

impl StructuredLog for NodeFailed<'_> {
    fn log(&self) {
        tracing::error!(node_id = self.node_id, failure = %self.failure, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "node_failed",
            span_name = name,
            node_id = self.node_id,
            failure = %self.failure,
        )
    }
}
