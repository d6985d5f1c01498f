// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::dag::NodeIdentifier;

/// A node whose dependencies have all completed successfully.
#[derive(Debug, Clone)]
pub struct ReadyNode {
    pub id: NodeIdentifier,
    pub topological_rank: usize,
}

impl ReadyNode {
    pub fn new(id: NodeIdentifier, topological_rank: usize) -> Self {
        Self { id, topological_rank }
    }
}

impl PartialEq for ReadyNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ReadyNode {}

impl PartialOrd for ReadyNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Deeper nodes first; equal ranks fall back to the identifier, smallest first.
impl Ord for ReadyNode {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.topological_rank.cmp(&other.topological_rank) {
            Ordering::Equal => other.id.cmp(&self.id),
            other_ordering => other_ordering,
        }
    }
}

/// Deterministic dispatch order for ready nodes.
#[derive(Debug, Default)]
pub struct ReadyQueue {
    heap: BinaryHeap<ReadyNode>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: ReadyNode) {
        self.heap.push(node);
    }

    pub fn extend<I>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = ReadyNode>,
    {
        self.heap.extend(nodes);
    }

    pub fn pop(&mut self) -> Option<ReadyNode> {
        self.heap.pop()
    }

    pub fn peek(&self) -> Option<&ReadyNode> {
        self.heap.peek()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(id: &str, rank: usize) -> ReadyNode {
        ReadyNode::new(NodeIdentifier::from_name(id), rank)
    }

    #[test]
    fn test_priority_ordering() {
        let mut queue = ReadyQueue::new();
        queue.push(ready("low_rank", 0));
        queue.push(ready("high_rank", 2));
        queue.push(ready("mid_rank", 1));

        assert_eq!(queue.pop().unwrap().id.as_str(), "high_rank");
        assert_eq!(queue.pop().unwrap().id.as_str(), "mid_rank");
        assert_eq!(queue.pop().unwrap().id.as_str(), "low_rank");
    }

    #[test]
    fn test_equal_rank_is_alphabetical() {
        let mut queue = ReadyQueue::new();
        queue.extend(vec![ready("c", 1), ready("a", 1), ready("b", 1)]);

        let order: Vec<String> = std::iter::from_fn(|| queue.pop())
            .map(|n| n.id.to_string())
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_queue() {
        let mut queue = ReadyQueue::new();
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert!(queue.peek().is_none());
    }
}
