// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Execution-time error taxonomy.
//!
//! Two very different things live here:
//!
//! * [`ExecutionError`] is a programming error. It aborts the run and is never retried.
//! * [`NodeFailure`] is the captured cause of a FAILED node. It is data, not control flow:
//!   it is stored on the node and shows up in the run report, but it never crosses a node
//!   boundary as an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dag::{ExecutionStatus, NodeIdentifier};
use crate::errors::ValidationError;

/// How the executor reacts to a FAILED node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStrategy {
    /// Skip the failed node's descendants, keep running every other branch.
    #[default]
    ContinueOnError,
    /// Cancel the run on the first failure: nothing new is dispatched, in-flight nodes finish.
    FailFast,
}

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Illegal status transition for node '{node}': {from} -> {to}")]
    IllegalTransition {
        node: NodeIdentifier,
        from: ExecutionStatus,
        to: ExecutionStatus,
    },

    #[error("Results of node '{node}' are not ready (status {status})")]
    ResultsNotReady {
        node: NodeIdentifier,
        status: ExecutionStatus,
    },

    #[error("Duplicate node identifier '{node}'")]
    DuplicateIdentifier { node: NodeIdentifier },

    #[error("No framework node registered for DAG node '{node}'")]
    MissingFrameworkNode { node: NodeIdentifier },

    #[error("Framework node registered under '{expected}' reports identifier '{actual}'")]
    IdentifierMismatch {
        expected: NodeIdentifier,
        actual: NodeIdentifier,
    },

    #[error("Invalid DAG: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    InvalidGraph(Vec<ValidationError>),

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Why a node ended up FAILED.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeFailure {
    #[error("Operator of node '{node}' failed after {attempts} attempt(s): {message}")]
    Operator {
        node: NodeIdentifier,
        attempts: u32,
        message: String,
    },

    #[error("Operator of node '{node}' timed out after {timeout_ms}ms")]
    Timeout { node: NodeIdentifier, timeout_ms: u64 },

    #[error("Operator of node '{node}' panicked: {message}")]
    Panicked { node: NodeIdentifier, message: String },

    #[error("Node '{node}': key {key} produced by both '{first}' and '{second}'")]
    KeyCollision {
        node: NodeIdentifier,
        key: String,
        first: NodeIdentifier,
        second: NodeIdentifier,
    },

    #[error("Node '{node}': {} of its physical units failed", .failures.len())]
    PhysicalUnits {
        node: NodeIdentifier,
        failures: Vec<NodeFailure>,
    },
}

impl NodeFailure {
    /// The node the failure was recorded on.
    pub fn node(&self) -> &NodeIdentifier {
        match self {
            NodeFailure::Operator { node, .. }
            | NodeFailure::Timeout { node, .. }
            | NodeFailure::Panicked { node, .. }
            | NodeFailure::KeyCollision { node, .. }
            | NodeFailure::PhysicalUnits { node, .. } => node,
        }
    }
}
