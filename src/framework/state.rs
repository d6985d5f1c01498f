// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::OnceLock;
use std::time::Instant;

use crate::dag::{ExecutionResults, ExecutionResultsReader, ExecutionStatus, NodeIdentifier, StatusCell};
use crate::errors::{ExecutionError, NodeFailure};
use crate::traits::{NodeTiming, ResultKey, ResultValue};

/// Write-once execution record shared by every framework node variant.
///
/// Results and failure cause are published before the terminal status, so a reader that
/// observes SUCCESS always finds the results in place.
pub(crate) struct NodeState<K, V> {
    node: NodeIdentifier,
    status: StatusCell,
    results: OnceLock<ExecutionResultsReader<K, V>>,
    failure: OnceLock<NodeFailure>,
    started: OnceLock<Instant>,
    finished: OnceLock<Instant>,
}

impl<K: ResultKey, V: ResultValue> NodeState<K, V> {
    pub(crate) fn new(node: NodeIdentifier) -> Self {
        Self {
            status: StatusCell::new(node.clone()),
            node,
            results: OnceLock::new(),
            failure: OnceLock::new(),
            started: OnceLock::new(),
            finished: OnceLock::new(),
        }
    }

    pub(crate) fn status(&self) -> ExecutionStatus {
        self.status.get()
    }

    pub(crate) fn begin(&self) -> Result<(), ExecutionError> {
        self.status.transition(ExecutionStatus::Running)?;
        let _ = self.started.set(Instant::now());
        Ok(())
    }

    pub(crate) fn succeed(&self, results: ExecutionResults<K, V>) -> Result<(), ExecutionError> {
        self.ensure_can_enter(ExecutionStatus::Success)?;
        let reader = ExecutionResultsReader::new(self.node.clone(), results);
        if self.results.set(reader).is_err() {
            return Err(self.already_recorded("results"));
        }
        let _ = self.finished.set(Instant::now());
        self.status.transition(ExecutionStatus::Success)
    }

    pub(crate) fn fail(&self, failure: NodeFailure) -> Result<(), ExecutionError> {
        self.ensure_can_enter(ExecutionStatus::Failed)?;
        if self.failure.set(failure).is_err() {
            return Err(self.already_recorded("failure"));
        }
        let _ = self.finished.set(Instant::now());
        self.status.transition(ExecutionStatus::Failed)
    }

    pub(crate) fn skip(&self) -> Result<(), ExecutionError> {
        self.status.transition(ExecutionStatus::Skipped)?;
        let _ = self.finished.set(Instant::now());
        Ok(())
    }

    pub(crate) fn reader(&self) -> Result<ExecutionResultsReader<K, V>, ExecutionError> {
        match self.status.get() {
            ExecutionStatus::Success => self
                .results
                .get()
                .cloned()
                .ok_or_else(|| self.already_recorded("missing results")),
            status => Err(ExecutionError::ResultsNotReady {
                node: self.node.clone(),
                status,
            }),
        }
    }

    pub(crate) fn failure(&self) -> Option<NodeFailure> {
        self.failure.get().cloned()
    }

    pub(crate) fn timing(&self) -> NodeTiming {
        NodeTiming {
            started: self.started.get().copied(),
            finished: self.finished.get().copied(),
        }
    }

    fn ensure_can_enter(&self, next: ExecutionStatus) -> Result<(), ExecutionError> {
        let current = self.status.get();
        if current.can_transition_to(next) {
            Ok(())
        } else {
            Err(ExecutionError::IllegalTransition {
                node: self.node.clone(),
                from: current,
                to: next,
            })
        }
    }

    fn already_recorded(&self, what: &str) -> ExecutionError {
        ExecutionError::InternalError {
            message: format!("node '{}': inconsistent {}", self.node, what),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> NodeState<String, i32> {
        NodeState::new(NodeIdentifier::from_name("n"))
    }

    #[test]
    fn test_results_visible_only_after_success() {
        let state = state();
        assert!(matches!(
            state.reader(),
            Err(ExecutionError::ResultsNotReady { status: ExecutionStatus::Pending, .. })
        ));

        state.begin().unwrap();
        assert!(matches!(
            state.reader(),
            Err(ExecutionError::ResultsNotReady { status: ExecutionStatus::Running, .. })
        ));

        let results: ExecutionResults<String, i32> = [("k".to_string(), 7)].into_iter().collect();
        state.succeed(results).unwrap();
        assert_eq!(state.reader().unwrap().get(&"k".to_string()), Some(&7));
        let timing = state.timing();
        assert!(timing.started.unwrap() <= timing.finished.unwrap());
    }

    #[test]
    fn test_cannot_succeed_without_running() {
        let state = state();
        let err = state.succeed(ExecutionResults::new()).unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::IllegalTransition { from: ExecutionStatus::Pending, to: ExecutionStatus::Success, .. }
        ));
        assert_eq!(state.status(), ExecutionStatus::Pending);
    }

    #[test]
    fn test_failure_is_recorded_once() {
        let state = state();
        state.begin().unwrap();
        let failure = NodeFailure::Panicked {
            node: NodeIdentifier::from_name("n"),
            message: "boom".into(),
        };
        state.fail(failure.clone()).unwrap();
        assert_eq!(state.failure(), Some(failure.clone()));
        assert!(state.fail(failure).is_err());
        assert!(state.skip().is_err());
        assert_eq!(state.status(), ExecutionStatus::Failed);
    }
}
