// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bookkeeping shared by the fan-out node variants.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use crate::dag::{ExecutionResults, ExecutionStatus, NodeConfig, NodeIdentifier};
use crate::errors::{ConfigError, ExecutionError, NodeFailure};
use crate::framework::single_thread::SingleThreadFrameworkNode;
use crate::framework::state::NodeState;
use crate::observability::messages::node::{NodeFailed, PhysicalUnitsDispatched, PhysicalUnitsMerged};
use crate::observability::messages::StructuredLog;
use crate::traits::{FrameworkNode, FrameworkNodeRef, Operator, OperatorDescriptor, ResultKey, ResultValue};

/// The logical side of a fan-out node: its own state plus the physical units it owns.
pub(crate) struct FanOutCore<K, V> {
    pub(crate) id: NodeIdentifier,
    pub(crate) operator_name: String,
    pub(crate) config: Arc<NodeConfig>,
    pub(crate) units: Vec<Arc<SingleThreadFrameworkNode<K, V>>>,
    pub(crate) state: NodeState<K, V>,
}

impl<K: ResultKey, V: ResultValue> FanOutCore<K, V> {
    /// One operator instance per physical unit. Runs before the node exists so that
    /// construction failures never leave a half-built node behind.
    pub(crate) fn instantiate_operators(
        id: &NodeIdentifier,
        descriptor: &OperatorDescriptor<K, V>,
        config: &NodeConfig,
    ) -> Result<Vec<Arc<dyn Operator<K, V>>>, ConfigError> {
        config.validate().map_err(|e| e.for_node(id))?;
        (0..config.physical_unit_count())
            .map(|_| descriptor.instantiate(config).map_err(|e| e.for_node(id)))
            .collect()
    }

    pub(crate) fn new(
        parent: Weak<dyn FrameworkNode<K, V>>,
        id: NodeIdentifier,
        operator_name: &str,
        config: NodeConfig,
        operators: Vec<Arc<dyn Operator<K, V>>>,
    ) -> Self {
        let config = Arc::new(config);
        let partitions = operators.len();
        let units = operators
            .into_iter()
            .enumerate()
            .map(|(partition, operator)| {
                Arc::new(SingleThreadFrameworkNode::physical_unit(
                    parent.clone(),
                    &id,
                    partition,
                    partitions,
                    operator_name,
                    operator,
                    Arc::clone(&config),
                ))
            })
            .collect();

        Self {
            state: NodeState::new(id.clone()),
            id,
            operator_name: operator_name.to_string(),
            config,
            units,
        }
    }

    pub(crate) fn physical_nodes(&self) -> Vec<FrameworkNodeRef<K, V>> {
        self.units
            .iter()
            .map(|unit| Arc::clone(unit) as FrameworkNodeRef<K, V>)
            .collect()
    }

    pub(crate) fn begin(&self, placement: &str) -> Result<(), ExecutionError> {
        self.state.begin()?;
        PhysicalUnitsDispatched {
            node_id: self.id.as_str(),
            strategy: placement,
            units: self.units.len(),
        }
        .log();
        Ok(())
    }

    /// Skip the logical node together with every unit it owns.
    pub(crate) fn skip(&self) -> Result<(), ExecutionError> {
        self.state.skip()?;
        for unit in &self.units {
            unit.skip()?;
        }
        Ok(())
    }

    /// Fold the terminal states of all units into the logical node's outcome.
    ///
    /// Any failed unit fails the node with the causes of every failed unit. Otherwise
    /// outputs are merged in partition order, and within a unit in the order of the keys'
    /// `Debug` text. The first key produced by two units fails the node and nothing is
    /// recorded as results.
    pub(crate) fn finish(&self) -> Result<NodeIdentifier, ExecutionError> {
        let mut failures = Vec::new();
        for unit in &self.units {
            match unit.execution_status() {
                ExecutionStatus::Success => {}
                ExecutionStatus::Failed => {
                    failures.push(unit.failure().ok_or_else(|| ExecutionError::InternalError {
                        message: format!("unit '{}' failed without a recorded cause", unit.identifier()),
                    })?);
                }
                status => {
                    return Err(ExecutionError::InternalError {
                        message: format!("unit '{}' returned in status {}", unit.identifier(), status),
                    })
                }
            }
        }

        if !failures.is_empty() {
            return self.record_failure(NodeFailure::PhysicalUnits {
                node: self.id.clone(),
                failures,
            });
        }

        let mut merged = ExecutionResults::new();
        let mut owners: HashMap<K, NodeIdentifier> = HashMap::new();
        for unit in &self.units {
            let reader = unit.execution_results_reader()?;
            let mut entries: Vec<(String, &K, &V)> = reader
                .iter()
                .map(|(key, value)| (format!("{:?}", key), key, value))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            for (rendered, key, value) in entries {
                if let Some(first) = owners.get(key) {
                    return self.record_failure(NodeFailure::KeyCollision {
                        node: self.id.clone(),
                        key: rendered,
                        first: first.clone(),
                        second: unit.identifier().clone(),
                    });
                }
                owners.insert(key.clone(), unit.identifier().clone());
                merged.insert(key.clone(), value.clone());
            }
        }

        PhysicalUnitsMerged {
            node_id: self.id.as_str(),
            units: self.units.len(),
            result_count: merged.len(),
        }
        .log();
        self.state.succeed(merged)?;
        Ok(self.id.clone())
    }

    fn record_failure(&self, failure: NodeFailure) -> Result<NodeIdentifier, ExecutionError> {
        NodeFailed {
            node_id: self.id.as_str(),
            failure: &failure,
        }
        .log();
        self.state.fail(failure)?;
        Ok(self.id.clone())
    }
}
