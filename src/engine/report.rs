// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Outcome of a DAG run.

use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::dag::{ExecutionStatus, NodeIdentifier};
use crate::errors::NodeFailure;

/// Terminal state of one logical node. Offsets are relative to the start of the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeReport {
    pub node: NodeIdentifier,
    pub status: ExecutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<NodeFailure>,
    pub started_at: Option<Duration>,
    pub finished_at: Option<Duration>,
}

impl NodeReport {
    /// Wall time between leaving PENDING and reaching a terminal state.
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.finished_at) {
            (Some(started), Some(finished)) => Some(finished.saturating_sub(started)),
            _ => None,
        }
    }
}

/// Every node of a run, in the order the executor observed them reach a terminal state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    nodes: Vec<NodeReport>,
    #[serde(skip)]
    index: HashMap<NodeIdentifier, usize>,
    cancelled: bool,
    duration: Duration,
}

impl RunReport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, report: NodeReport) {
        self.index.insert(report.node.clone(), self.nodes.len());
        self.nodes.push(report);
    }

    pub(crate) fn finish(&mut self, cancelled: bool, duration: Duration) {
        self.cancelled = cancelled;
        self.duration = duration;
    }

    pub fn node(&self, id: &NodeIdentifier) -> Option<&NodeReport> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn status(&self, id: &NodeIdentifier) -> Option<ExecutionStatus> {
        self.node(id).map(|r| r.status)
    }

    pub fn failure(&self, id: &NodeIdentifier) -> Option<&NodeFailure> {
        self.node(id).and_then(|r| r.failure.as_ref())
    }

    /// Position of a node in completion order.
    pub fn position(&self, id: &NodeIdentifier) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn nodes(&self) -> &[NodeReport] {
        &self.nodes
    }

    pub fn completion_order(&self) -> Vec<&NodeIdentifier> {
        self.nodes.iter().map(|r| &r.node).collect()
    }

    pub fn with_status(&self, status: ExecutionStatus) -> Vec<&NodeIdentifier> {
        self.nodes
            .iter()
            .filter(|r| r.status == status)
            .map(|r| &r.node)
            .collect()
    }

    pub fn succeeded(&self) -> Vec<&NodeIdentifier> {
        self.with_status(ExecutionStatus::Success)
    }

    pub fn failed(&self) -> Vec<&NodeIdentifier> {
        self.with_status(ExecutionStatus::Failed)
    }

    pub fn skipped(&self) -> Vec<&NodeIdentifier> {
        self.with_status(ExecutionStatus::Skipped)
    }

    /// Every node succeeded and the run was not cancelled.
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.nodes.iter().all(|r| r.status == ExecutionStatus::Success)
    }

    /// Whether cancellation (requested or fail-fast) took effect before the run drained.
    pub fn cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_report(id: &str, status: ExecutionStatus, started: Option<u64>, finished: Option<u64>) -> NodeReport {
        NodeReport {
            node: NodeIdentifier::from_name(id),
            status,
            failure: None,
            started_at: started.map(Duration::from_millis),
            finished_at: finished.map(Duration::from_millis),
        }
    }

    fn sample() -> RunReport {
        let mut report = RunReport::new();
        report.record(node_report("a", ExecutionStatus::Success, Some(0), Some(10)));
        report.record(node_report("b", ExecutionStatus::Failed, Some(10), Some(25)));
        report.record(node_report("c", ExecutionStatus::Skipped, None, Some(25)));
        report.finish(false, Duration::from_millis(30));
        report
    }

    #[test]
    fn test_queries() {
        let report = sample();
        let b = NodeIdentifier::from_name("b");

        assert_eq!(report.len(), 3);
        assert_eq!(report.status(&b), Some(ExecutionStatus::Failed));
        assert_eq!(report.position(&b), Some(1));
        assert_eq!(report.succeeded(), vec![&NodeIdentifier::from_name("a")]);
        assert_eq!(report.skipped(), vec![&NodeIdentifier::from_name("c")]);
        assert!(!report.is_success());
        assert_eq!(report.node(&b).unwrap().duration(), Some(Duration::from_millis(15)));
        assert_eq!(report.node(&NodeIdentifier::from_name("c")).unwrap().duration(), None);
        assert!(report.status(&NodeIdentifier::from_name("zzz")).is_none());
    }

    #[test]
    fn test_serializes_in_completion_order() {
        let json = serde_json::to_value(sample()).unwrap();
        let nodes = json["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0]["node"], "a");
        assert_eq!(nodes[1]["status"], "FAILED");
        assert_eq!(json["cancelled"], false);
        assert!(json.get("index").is_none());
    }
}
