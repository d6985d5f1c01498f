// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, VecDeque};

use crate::dag::NodeIdentifier;

/// Adjacency view of the horizontal DAG used for scheduling.
///
/// `dependents` is the forward graph (node -> nodes waiting on it), `dependencies` the
/// reverse one (node -> nodes it waits on). Every node appears as a key in both maps,
/// even when its adjacency list is empty.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    dependents: HashMap<NodeIdentifier, Vec<NodeIdentifier>>,
    dependencies: HashMap<NodeIdentifier, Vec<NodeIdentifier>>,
}

impl DependencyGraph {
    /// Build from `(node, upstream dependencies)` pairs.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (NodeIdentifier, Vec<NodeIdentifier>)>,
    {
        let mut graph = Self::default();
        for (node, upstream) in edges {
            graph.dependents.entry(node.clone()).or_default();
            for dependency in &upstream {
                graph
                    .dependents
                    .entry(dependency.clone())
                    .or_default()
                    .push(node.clone());
                graph.dependencies.entry(dependency.clone()).or_default();
            }
            graph.dependencies.entry(node).or_default().extend(upstream);
        }
        graph
    }

    pub fn dependents(&self, node: &NodeIdentifier) -> &[NodeIdentifier] {
        self.dependents.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dependencies(&self, node: &NodeIdentifier) -> &[NodeIdentifier] {
        self.dependencies.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeIdentifier> {
        self.dependents.keys()
    }

    pub fn len(&self) -> usize {
        self.dependents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependents.is_empty()
    }

    /// Nodes without upstream dependencies.
    pub fn entry_points(&self) -> Vec<NodeIdentifier> {
        let mut entries: Vec<NodeIdentifier> = self
            .dependencies
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(id, _)| id.clone())
            .collect();
        entries.sort();
        entries
    }

    /// Number of unresolved dependencies per node.
    pub fn dependency_counts(&self) -> HashMap<NodeIdentifier, usize> {
        self.dependencies
            .iter()
            .map(|(id, deps)| (id.clone(), deps.len()))
            .collect()
    }

    /// Longest distance from an entry point for every node, computed with Kahn's algorithm.
    ///
    /// Returns `None` when the graph contains a cycle.
    pub fn topological_ranks(&self) -> Option<HashMap<NodeIdentifier, usize>> {
        let mut remaining = self.dependency_counts();
        let mut ranks: HashMap<NodeIdentifier, usize> = HashMap::new();
        let mut queue: VecDeque<NodeIdentifier> = self.entry_points().into();

        for entry in &queue {
            ranks.insert(entry.clone(), 0);
        }

        while let Some(node) = queue.pop_front() {
            let rank = ranks.get(&node).copied().unwrap_or(0);
            for dependent in self.dependents(&node) {
                let dependent_rank = ranks.entry(dependent.clone()).or_insert(0);
                *dependent_rank = (*dependent_rank).max(rank + 1);

                if let Some(count) = remaining.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        queue.push_back(dependent.clone());
                    }
                }
            }
        }

        if remaining.values().all(|&count| count == 0) {
            Some(ranks)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> NodeIdentifier {
        NodeIdentifier::from_name(name)
    }

    fn diamond() -> DependencyGraph {
        DependencyGraph::from_edges(vec![
            (id("a"), vec![]),
            (id("b"), vec![id("a")]),
            (id("c"), vec![id("a")]),
            (id("d"), vec![id("b"), id("c")]),
        ])
    }

    #[test]
    fn test_build_dependency_counts() {
        let counts = diamond().dependency_counts();
        assert_eq!(counts.get(&id("a")), Some(&0));
        assert_eq!(counts.get(&id("b")), Some(&1));
        assert_eq!(counts.get(&id("c")), Some(&1));
        assert_eq!(counts.get(&id("d")), Some(&2));
    }

    #[test]
    fn test_forward_and_reverse_adjacency() {
        let graph = diamond();
        let mut dependents = graph.dependents(&id("a")).to_vec();
        dependents.sort();
        assert_eq!(dependents, vec![id("b"), id("c")]);
        assert_eq!(graph.dependencies(&id("d")), &[id("b"), id("c")]);
        assert_eq!(graph.entry_points(), vec![id("a")]);
    }

    #[test]
    fn test_topological_ranks_use_longest_path() {
        let graph = DependencyGraph::from_edges(vec![
            (id("a"), vec![]),
            (id("b"), vec![id("a")]),
            (id("c"), vec![id("b")]),
            (id("d"), vec![id("a"), id("c")]),
        ]);
        let ranks = graph.topological_ranks().unwrap();
        assert_eq!(ranks[&id("a")], 0);
        assert_eq!(ranks[&id("b")], 1);
        assert_eq!(ranks[&id("c")], 2);
        assert_eq!(ranks[&id("d")], 3);
    }

    #[test]
    fn test_cycle_has_no_ranks() {
        let graph = DependencyGraph::from_edges(vec![
            (id("a"), vec![id("b")]),
            (id("b"), vec![id("a")]),
        ]);
        assert!(graph.topological_ranks().is_none());
    }
}
