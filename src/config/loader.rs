// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::consts::{FALLBACK_MAX_CONCURRENCY, MAX_CONCURRENCY_LIMIT};
use crate::config::validate_dependency_graph;
use crate::dag::{LogicalDag, Node, NodeConfig, NodeIdentifier};
use crate::errors::{ConfigError, FailureStrategy, ValidationError};

/// A complete workflow: scheduling options plus the nodes of the DAG.
///
/// # Fields
/// * `failure_strategy` - How the executor reacts to a FAILED node (defaults to `continue_on_error`)
/// * `executor_options` - Executor-wide options
/// * `nodes` - The logical nodes, in declaration order
///
/// # Example
/// ```yaml
/// failure_strategy: fail_fast
/// executor_options:
///   max_concurrency: 4
/// nodes:
///   - id: ingest
///     operator: partitioned_range
///     config:
///       strategy: multi_thread
///       concurrency: 4
///       options:
///         end: 64
///   - id: total
///     operator: sum
///     depends_on: [ingest]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub failure_strategy: FailureStrategy,
    #[serde(default)]
    pub executor_options: ExecutorOptions,
    pub nodes: Vec<NodeSpec>,
}

/// Executor-wide options.
///
/// # Fields
/// * `max_concurrency` - Upper bound on logical nodes in flight (defaults to the host's parallelism)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutorOptions {
    pub max_concurrency: Option<usize>,
}

impl ExecutorOptions {
    pub fn resolved_max_concurrency(&self) -> usize {
        self.max_concurrency.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(FALLBACK_MAX_CONCURRENCY)
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self.max_concurrency {
            Some(0) => Err(ConfigError::InvalidOption {
                option: "max_concurrency".to_string(),
                reason: "must be greater than zero".to_string(),
            }),
            Some(n) if n > MAX_CONCURRENCY_LIMIT => Err(ConfigError::InvalidOption {
                option: "max_concurrency".to_string(),
                reason: format!("must not exceed {}", MAX_CONCURRENCY_LIMIT),
            }),
            _ => Ok(()),
        }
    }
}

/// One logical node as written in the workflow file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    pub id: String,
    pub operator: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub config: NodeConfig,
}

impl WorkflowConfig {
    /// `(node, upstream dependencies)` pairs in declaration order.
    pub fn dependency_entries(&self) -> Vec<(&str, Vec<&str>)> {
        self.nodes
            .iter()
            .map(|n| {
                (
                    n.id.as_str(),
                    n.depends_on.iter().map(String::as_str).collect(),
                )
            })
            .collect()
    }

    /// Check the graph structure and every node configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.executor_options.validate()?;
        validate_dependency_graph(&self.dependency_entries()).map_err(ConfigError::Validation)?;
        for node in &self.nodes {
            node.config
                .validate()
                .map_err(|e| e.for_node(&NodeIdentifier::from_name(&node.id)))?;
        }
        Ok(())
    }

    /// The horizontal DAG described by this workflow.
    pub fn to_logical_dag(&self) -> Result<LogicalDag, ConfigError> {
        let mut dag = LogicalDag::new();
        for spec in &self.nodes {
            let node = spec
                .depends_on
                .iter()
                .fold(Node::new(spec.id.as_str(), spec.operator.as_str()), |node, upstream| {
                    node.depends_on(upstream.as_str())
                })
                .with_config(spec.config.clone());
            dag.add_node(node).map_err(|_| {
                ConfigError::Validation(vec![ValidationError::DuplicateNodeId {
                    node_id: spec.id.clone(),
                }])
            })?;
        }
        Ok(dag)
    }
}

pub fn parse_config(content: &str) -> Result<WorkflowConfig, ConfigError> {
    Ok(serde_yaml::from_str(content)?)
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<WorkflowConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<WorkflowConfig, ConfigError> {
    let cfg = load_config(path)?;
    cfg.validate()?;
    Ok(cfg)
}
