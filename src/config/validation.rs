// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structural validation of dependency graphs.
//!
//! # Validation Pipeline
//!
//! 1. **Uniqueness**: every node identifier appears once and none contains the
//!    separator reserved for physical unit identifiers
//! 2. **References**: every `depends_on` entry names an existing node
//! 3. **Cycles**: depth-first search with a recursion stack, reporting the cycle path
//!
//! Uniqueness and reference errors are accumulated so a broken workflow reports every
//! problem at once. Cycle detection needs a well-formed graph and only runs when the
//! first two stages pass.
//!
//! # Example
//! ```rust
//! use the_taskframe::config::validate_dependency_graph;
//! use the_taskframe::errors::ValidationError;
//!
//! let nodes = vec![
//!     ("ingest", vec![]),
//!     ("detect", vec!["ingest", "baseline"]),
//! ];
//!
//! match validate_dependency_graph(&nodes) {
//!     Err(errors) => assert!(matches!(
//!         &errors[0],
//!         ValidationError::UnresolvedDependency { missing_dependency, .. } if missing_dependency == "baseline"
//!     )),
//!     Ok(()) => unreachable!(),
//! }
//! ```

use std::collections::{HashMap, HashSet};

use crate::dag::PHYSICAL_SEPARATOR;
use crate::errors::ValidationError;
use crate::observability::messages::validation::{
    CyclicDependencyDetected, DuplicateNodeId, ReservedSeparatorInNodeId, UnresolvedDependency,
    ValidationCompleted, ValidationFailed, ValidationStarted,
};
use crate::observability::messages::StructuredLog;

/// Validate `(node, upstream dependencies)` pairs.
///
/// # Returns
///
/// * `Ok(())` - the graph is a DAG over unique identifiers
/// * `Err(Vec<ValidationError>)` - every problem found
pub fn validate_dependency_graph(nodes: &[(&str, Vec<&str>)]) -> Result<(), Vec<ValidationError>> {
    ValidationStarted {
        node_count: nodes.len(),
    }
    .log();

    let mut errors = Vec::new();

    if let Err(duplicate_errors) = validate_unique_node_ids(nodes) {
        errors.extend(duplicate_errors);
    }

    if let Err(unresolved_errors) = validate_dependency_references(nodes) {
        errors.extend(unresolved_errors);
    }

    if errors.is_empty() {
        if let Err(cycle_errors) = validate_acyclic_graph(nodes) {
            errors.extend(cycle_errors);
        }
    }

    if errors.is_empty() {
        ValidationCompleted {
            node_count: nodes.len(),
        }
        .log();
        Ok(())
    } else {
        ValidationFailed {
            error_count: errors.len(),
        }
        .log();
        Err(errors)
    }
}

fn validate_unique_node_ids(nodes: &[(&str, Vec<&str>)]) -> Result<(), Vec<ValidationError>> {
    let mut seen_ids = HashSet::new();
    let mut errors = Vec::new();

    for (id, _) in nodes {
        if id.contains(PHYSICAL_SEPARATOR) {
            ReservedSeparatorInNodeId {
                node_id: id,
                separator: PHYSICAL_SEPARATOR,
            }
            .log();
            errors.push(ValidationError::ReservedSeparator {
                node_id: id.to_string(),
                separator: PHYSICAL_SEPARATOR,
            });
        }
        if !seen_ids.insert(*id) {
            DuplicateNodeId { node_id: id }.log();
            errors.push(ValidationError::DuplicateNodeId {
                node_id: id.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_dependency_references(nodes: &[(&str, Vec<&str>)]) -> Result<(), Vec<ValidationError>> {
    let node_ids: HashSet<&str> = nodes.iter().map(|(id, _)| *id).collect();
    let mut errors = Vec::new();

    for (id, depends_on) in nodes {
        for dependency in depends_on {
            if !node_ids.contains(dependency) {
                UnresolvedDependency {
                    node_id: id,
                    missing_dependency: dependency,
                }
                .log();
                errors.push(ValidationError::UnresolvedDependency {
                    node_id: id.to_string(),
                    missing_dependency: dependency.to_string(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Three-color DFS over the forward graph (dependency -> dependents).
///
/// Roots are visited in declaration order so the reported cycle is deterministic.
fn validate_acyclic_graph(nodes: &[(&str, Vec<&str>)]) -> Result<(), Vec<ValidationError>> {
    let mut graph: HashMap<&str, Vec<&str>> = nodes.iter().map(|(id, _)| (*id, Vec::new())).collect();
    for (id, depends_on) in nodes {
        for dependency in depends_on {
            if let Some(dependents) = graph.get_mut(dependency) {
                dependents.push(*id);
            }
        }
    }

    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for (id, _) in nodes {
        if !visited.contains(id) {
            if let Some(cycle) = dfs_cycle_detection(id, &graph, &mut visited, &mut rec_stack, &mut path) {
                CyclicDependencyDetected { cycle: &cycle }.log();
                return Err(vec![ValidationError::CyclicDependency {
                    cycle: cycle.iter().map(|s| s.to_string()).collect(),
                }]);
            }
        }
    }

    Ok(())
}

/// Returns the cycle path, closed with the node it started from, when a back edge is found.
fn dfs_cycle_detection<'a>(
    node: &'a str,
    graph: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    rec_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<&'a str>> {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    if let Some(neighbors) = graph.get(node) {
        for &neighbor in neighbors {
            if !visited.contains(neighbor) {
                if let Some(cycle) = dfs_cycle_detection(neighbor, graph, visited, rec_stack, path) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(neighbor) {
                let cycle_start = path.iter().position(|x| *x == neighbor).unwrap_or(0);
                let mut cycle = path[cycle_start..].to_vec();
                cycle.push(neighbor);
                return Some(cycle);
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_empty_graph() {
        assert!(validate_dependency_graph(&[]).is_ok());
    }

    #[test]
    fn test_valid_linear_chain() {
        let nodes = vec![("a", vec![]), ("b", vec!["a"]), ("c", vec!["b"])];
        assert!(validate_dependency_graph(&nodes).is_ok());
    }

    #[test]
    fn test_valid_diamond_dependency() {
        let nodes = vec![
            ("a", vec![]),
            ("b", vec!["a"]),
            ("c", vec!["a"]),
            ("d", vec!["b", "c"]),
        ];
        assert!(validate_dependency_graph(&nodes).is_ok());
    }

    #[test]
    fn test_duplicate_node_ids() {
        let nodes = vec![("a", vec![]), ("a", vec![])];
        let errors = validate_dependency_graph(&nodes).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            ValidationError::DuplicateNodeId {
                node_id: "a".to_string()
            }
        );
    }

    #[test]
    fn test_physical_separator_is_reserved() {
        let nodes = vec![("a", vec![]), ("a#0", vec!["a"])];
        let errors = validate_dependency_graph(&nodes).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::ReservedSeparator {
                node_id: "a#0".to_string(),
                separator: '#',
            }]
        );
    }

    #[test]
    fn test_unresolved_dependency() {
        let nodes = vec![("a", vec!["nonexistent"])];
        let errors = validate_dependency_graph(&nodes).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UnresolvedDependency {
                node_id: "a".to_string(),
                missing_dependency: "nonexistent".to_string(),
            }]
        );
    }

    #[test]
    fn test_simple_cycle() {
        let nodes = vec![("a", vec!["b"]), ("b", vec!["a"])];
        let errors = validate_dependency_graph(&nodes).unwrap_err();
        match &errors[0] {
            ValidationError::CyclicDependency { cycle } => {
                assert_eq!(cycle.len(), 3);
                assert_eq!(cycle.first(), cycle.last());
            }
            other => panic!("Expected CyclicDependency, got {:?}", other),
        }
    }

    #[test]
    fn test_self_dependency_cycle() {
        let nodes = vec![("a", vec!["a"])];
        let errors = validate_dependency_graph(&nodes).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::CyclicDependency {
                cycle: vec!["a".to_string(), "a".to_string()]
            }]
        );
    }

    #[test]
    fn test_complex_cycle_reports_only_the_loop() {
        let nodes = vec![
            ("a", vec![]),
            ("b", vec!["a", "d"]),
            ("c", vec!["b"]),
            ("d", vec!["c"]),
        ];
        let errors = validate_dependency_graph(&nodes).unwrap_err();
        match &errors[0] {
            ValidationError::CyclicDependency { cycle } => {
                assert_eq!(cycle, &vec!["b", "c", "d", "b"]);
            }
            other => panic!("Expected CyclicDependency, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_errors_are_accumulated() {
        let nodes = vec![("a", vec![]), ("a", vec!["x"]), ("b", vec!["y"])];
        let errors = validate_dependency_graph(&nodes).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
