// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Node lifecycle states and the guarded cell that owns them.
//!
//! ```text
//!   PENDING ──► RUNNING ──► SUCCESS
//!      │            └─────► FAILED
//!      └──────────────────► SKIPPED
//! ```
//!
//! Terminal states have no outgoing transitions. A node is executed at most once per run,
//! so any attempt to leave a terminal state (or to jump backwards) is a programming error.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::dag::NodeIdentifier;
use crate::errors::ExecutionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Success,
    Failed,
    Skipped,
}

impl ExecutionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExecutionStatus::Success | ExecutionStatus::Failed | ExecutionStatus::Skipped
        )
    }

    /// Whether `self -> next` is an edge of the state machine.
    pub fn can_transition_to(self, next: ExecutionStatus) -> bool {
        use ExecutionStatus::*;
        matches!(
            (self, next),
            (Pending, Running) | (Pending, Skipped) | (Running, Success) | (Running, Failed)
        )
    }

    fn to_u8(self) -> u8 {
        match self {
            ExecutionStatus::Pending => 0,
            ExecutionStatus::Running => 1,
            ExecutionStatus::Success => 2,
            ExecutionStatus::Failed => 3,
            ExecutionStatus::Skipped => 4,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => ExecutionStatus::Pending,
            1 => ExecutionStatus::Running,
            2 => ExecutionStatus::Success,
            3 => ExecutionStatus::Failed,
            _ => ExecutionStatus::Skipped,
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionStatus::Pending => "PENDING",
            ExecutionStatus::Running => "RUNNING",
            ExecutionStatus::Success => "SUCCESS",
            ExecutionStatus::Failed => "FAILED",
            ExecutionStatus::Skipped => "SKIPPED",
        };
        f.write_str(name)
    }
}

/// Atomic holder of a node's status.
///
/// Readers never block; writers go through [`StatusCell::transition`], which rejects any
/// move that is not an edge of the state machine. The compare-exchange makes concurrent
/// writers safe even though, by construction, only the owning node ever writes.
#[derive(Debug)]
pub struct StatusCell {
    node: NodeIdentifier,
    state: AtomicU8,
}

impl StatusCell {
    pub fn new(node: NodeIdentifier) -> Self {
        Self {
            node,
            state: AtomicU8::new(ExecutionStatus::Pending.to_u8()),
        }
    }

    pub fn get(&self) -> ExecutionStatus {
        ExecutionStatus::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn transition(&self, next: ExecutionStatus) -> Result<(), ExecutionError> {
        let mut current = self.get();
        loop {
            if !current.can_transition_to(next) {
                return Err(ExecutionError::IllegalTransition {
                    node: self.node.clone(),
                    from: current,
                    to: next,
                });
            }
            match self.state.compare_exchange(
                current.to_u8(),
                next.to_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(()),
                Err(observed) => current = ExecutionStatus::from_u8(observed),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let cell = StatusCell::new(NodeIdentifier::from_name("a"));
        assert_eq!(cell.get(), ExecutionStatus::Pending);

        cell.transition(ExecutionStatus::Running).unwrap();
        cell.transition(ExecutionStatus::Success).unwrap();
        assert_eq!(cell.get(), ExecutionStatus::Success);
        assert!(cell.get().is_terminal());
    }

    #[test]
    fn test_skip_only_from_pending() {
        let cell = StatusCell::new(NodeIdentifier::from_name("a"));
        cell.transition(ExecutionStatus::Skipped).unwrap();
        assert_eq!(cell.get(), ExecutionStatus::Skipped);

        let running = StatusCell::new(NodeIdentifier::from_name("b"));
        running.transition(ExecutionStatus::Running).unwrap();
        assert!(running.transition(ExecutionStatus::Skipped).is_err());
    }

    #[test]
    fn test_terminal_states_are_final() {
        let cell = StatusCell::new(NodeIdentifier::from_name("a"));
        cell.transition(ExecutionStatus::Running).unwrap();
        cell.transition(ExecutionStatus::Failed).unwrap();

        let err = cell.transition(ExecutionStatus::Running).unwrap_err();
        match err {
            ExecutionError::IllegalTransition { node, from, to } => {
                assert_eq!(node.as_str(), "a");
                assert_eq!(from, ExecutionStatus::Failed);
                assert_eq!(to, ExecutionStatus::Running);
            }
            other => panic!("Expected IllegalTransition, got {:?}", other),
        }
        assert_eq!(cell.get(), ExecutionStatus::Failed);
    }

    #[test]
    fn test_pending_cannot_jump_to_success() {
        let cell = StatusCell::new(NodeIdentifier::from_name("a"));
        assert!(cell.transition(ExecutionStatus::Success).is_err());
        assert_eq!(cell.get(), ExecutionStatus::Pending);
    }
}
