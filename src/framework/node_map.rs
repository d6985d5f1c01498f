// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::hash_map;
use std::collections::HashMap;

use crate::dag::NodeIdentifier;
use crate::errors::ExecutionError;
use crate::traits::FrameworkNodeRef;

/// Framework nodes keyed by the identifier of the logical node they implement.
pub struct FrameworkNodeMap<K, V>(HashMap<NodeIdentifier, FrameworkNodeRef<K, V>>);

impl<K, V> Default for FrameworkNodeMap<K, V> {
    fn default() -> Self {
        Self(HashMap::new())
    }
}

impl<K, V> Clone for FrameworkNodeMap<K, V> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<K, V> FrameworkNodeMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node under its own identifier.
    pub fn insert(&mut self, node: FrameworkNodeRef<K, V>) -> Result<(), ExecutionError> {
        let id = node.identifier().clone();
        self.insert_as(id, node)
    }

    /// Register a node under an explicit DAG identifier.
    pub fn insert_as(
        &mut self,
        id: NodeIdentifier,
        node: FrameworkNodeRef<K, V>,
    ) -> Result<(), ExecutionError> {
        match self.0.entry(id) {
            hash_map::Entry::Occupied(entry) => Err(ExecutionError::DuplicateIdentifier {
                node: entry.key().clone(),
            }),
            hash_map::Entry::Vacant(entry) => {
                entry.insert(node);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: &NodeIdentifier) -> Option<&FrameworkNodeRef<K, V>> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &NodeIdentifier) -> bool {
        self.0.contains_key(id)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, NodeIdentifier, FrameworkNodeRef<K, V>> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
