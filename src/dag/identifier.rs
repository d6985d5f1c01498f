// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Globally unique, immutable identity of a node.
///
/// The identifier is the only thing the DAG bookkeeping looks at: two nodes are the
/// same node if and only if their identifiers are equal. Workflow authors usually name
/// their logical nodes (`"detection"`), while framework-generated physical units derive
/// their identity from the logical node they realize (`"detection#2"`).
///
/// # Examples
/// ```
/// use the_taskframe::dag::NodeIdentifier;
///
/// let a = NodeIdentifier::new();
/// let b = NodeIdentifier::new();
/// assert_ne!(a, b);
///
/// let named = NodeIdentifier::from_name("detection");
/// assert_eq!(named, NodeIdentifier::from_name("detection"));
/// assert_eq!(named.physical(2).as_str(), "detection#2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeIdentifier(Arc<str>);

/// Separator between a logical identifier and a physical unit index.
pub const PHYSICAL_SEPARATOR: char = '#';

impl NodeIdentifier {
    /// Generate a fresh identifier backed by a random UUID.
    pub fn new() -> Self {
        Self(Arc::from(Uuid::new_v4().to_string()))
    }

    /// Identifier chosen by a workflow author.
    pub fn from_name(name: impl Into<String>) -> Self {
        Self(Arc::from(name.into()))
    }

    /// Identifier of the `index`-th physical unit realizing this node.
    pub fn physical(&self, index: usize) -> Self {
        Self(Arc::from(format!("{}{}{}", self.0, PHYSICAL_SEPARATOR, index)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NodeIdentifier {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeIdentifier {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl From<String> for NodeIdentifier {
    fn from(name: String) -> Self {
        Self::from_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fresh_identifiers_are_unique() {
        let ids: HashSet<NodeIdentifier> = (0..1000).map(|_| NodeIdentifier::new()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_physical_identifiers_derive_from_logical() {
        let logical = NodeIdentifier::from_name("merge");
        let units: Vec<_> = (0..3).map(|i| logical.physical(i)).collect();

        assert_eq!(units[0].as_str(), "merge#0");
        assert_eq!(units[2].as_str(), "merge#2");
        assert_ne!(units[0], logical);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = NodeIdentifier::from_name("data_preparation");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"data_preparation\"");

        let back: NodeIdentifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
