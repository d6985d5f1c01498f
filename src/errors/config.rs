// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while assembling a DAG, before anything executes.

use thiserror::Error;

use crate::dag::NodeIdentifier;

/// Errors that can occur during dependency graph validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A circular dependency was detected in the node graph
    #[error("Cyclic dependency detected: {}", .cycle.join(" -> "))]
    CyclicDependency {
        /// The cycle path showing the circular dependency
        cycle: Vec<String>,
    },
    /// A node references a dependency that doesn't exist
    #[error("Node '{node_id}' depends on '{missing_dependency}' which does not exist")]
    UnresolvedDependency {
        node_id: String,
        missing_dependency: String,
    },
    /// Two nodes share the same identifier
    #[error("Duplicate node ID: '{node_id}'")]
    DuplicateNodeId { node_id: String },
    /// A logical identifier contains the separator reserved for physical unit ids
    #[error("Node ID '{node_id}' contains the reserved separator '{separator}'")]
    ReservedSeparator { node_id: String, separator: char },
}

/// Configuration errors. All of them are fatal at assembly time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration option '{option}'")]
    MissingOption { option: String },

    #[error("Invalid value for configuration option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },

    #[error("Invalid concurrency {concurrency}: at least one physical unit is required")]
    InvalidConcurrency { concurrency: usize },

    #[error("Unknown operator '{operator}'")]
    UnknownOperator { operator: String },

    #[error("Failed to create operator '{operator}': {reason}")]
    OperatorCreationFailed { operator: String, reason: String },

    #[error("Node '{node}': {source}")]
    ForNode {
        node: NodeIdentifier,
        #[source]
        source: Box<ConfigError>,
    },

    #[error("Configuration validation failed:\n{}", render_validation(.0))]
    Validation(Vec<ValidationError>),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

impl ConfigError {
    /// Attach the node the error was raised for.
    pub fn for_node(self, node: &NodeIdentifier) -> Self {
        ConfigError::ForNode {
            node: node.clone(),
            source: Box::new(self),
        }
    }
}

fn render_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
