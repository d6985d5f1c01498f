// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The horizontal topology: logical nodes and the DAG they form.

use std::collections::HashMap;

use crate::config::validate_dependency_graph;
use crate::dag::{DependencyGraph, NodeConfig, NodeIdentifier};
use crate::errors::{ExecutionError, ValidationError};

/// A vertex of the user-authored workflow.
///
/// A logical node only says *what* runs (the operator name) and *after what* (its upstream
/// dependencies). *How* it runs is decided by the framework node built from its config.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeIdentifier,
    operator: String,
    depends_on: Vec<NodeIdentifier>,
    config: NodeConfig,
}

impl Node {
    pub fn new(id: impl Into<NodeIdentifier>, operator: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            operator: operator.into(),
            depends_on: Vec::new(),
            config: NodeConfig::default(),
        }
    }

    /// Declare an upstream dependency. Repeated declarations are ignored, order is kept.
    pub fn depends_on(mut self, upstream: impl Into<NodeIdentifier>) -> Self {
        let upstream = upstream.into();
        if !self.depends_on.contains(&upstream) {
            self.depends_on.push(upstream);
        }
        self
    }

    pub fn with_config(mut self, config: NodeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn id(&self) -> &NodeIdentifier {
        &self.id
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn dependencies(&self) -> &[NodeIdentifier] {
        &self.depends_on
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }
}

/// The horizontal DAG: logical nodes in insertion order plus their dependency edges.
#[derive(Debug, Clone, Default)]
pub struct LogicalDag {
    nodes: Vec<Node>,
    index: HashMap<NodeIdentifier, usize>,
}

impl LogicalDag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Identifiers must be unique within a DAG.
    pub fn add_node(&mut self, node: Node) -> Result<(), ExecutionError> {
        if self.index.contains_key(node.id()) {
            return Err(ExecutionError::DuplicateIdentifier {
                node: node.id().clone(),
            });
        }
        self.index.insert(node.id().clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    pub fn with_node(mut self, node: Node) -> Result<Self, ExecutionError> {
        self.add_node(node)?;
        Ok(self)
    }

    pub fn node(&self, id: &NodeIdentifier) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &NodeIdentifier) -> bool {
        self.index.contains_key(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &NodeIdentifier> {
        self.nodes.iter().map(Node::id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check that every edge resolves and the graph is acyclic.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let entries: Vec<(&str, Vec<&str>)> = self
            .nodes
            .iter()
            .map(|n| {
                (
                    n.id().as_str(),
                    n.dependencies().iter().map(NodeIdentifier::as_str).collect(),
                )
            })
            .collect();
        validate_dependency_graph(&entries)
    }

    /// Forward/backward adjacency for scheduling.
    pub fn dependency_graph(&self) -> DependencyGraph {
        DependencyGraph::from_edges(
            self.nodes
                .iter()
                .map(|n| (n.id().clone(), n.dependencies().to_vec())),
        )
    }
}
