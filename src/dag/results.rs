// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Operator output and the read-only view handed to downstream consumers.

use std::collections::hash_map;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::dag::NodeIdentifier;

/// Mutable output an operator builds up during a single invocation.
#[derive(Debug, Clone)]
pub struct ExecutionResults<K, V> {
    entries: HashMap<K, V>,
}

impl<K: Eq + Hash, V: PartialEq> PartialEq for ExecutionResults<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq + Hash, V> ExecutionResults<K, V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Insert a result, returning the previous value for `key` if there was one.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_inner(self) -> HashMap<K, V> {
        self.entries
    }
}

impl<K: Eq + Hash, V> Default for ExecutionResults<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> From<HashMap<K, V>> for ExecutionResults<K, V> {
    fn from(entries: HashMap<K, V>) -> Self {
        Self { entries }
    }
}

impl<K: Eq + Hash, V> FromIterator<(K, V)> for ExecutionResults<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Read-only, cheaply clonable view over a node's recorded results.
///
/// There is no way to obtain a mutable handle from a reader: the map sits behind an `Arc`
/// and only shared references ever leave it.
#[derive(Debug)]
pub struct ExecutionResultsReader<K, V> {
    node: NodeIdentifier,
    entries: Arc<HashMap<K, V>>,
}

impl<K, V> Clone for ExecutionResultsReader<K, V> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K: Eq + Hash, V> ExecutionResultsReader<K, V> {
    pub fn new(node: NodeIdentifier, results: ExecutionResults<K, V>) -> Self {
        Self {
            node,
            entries: Arc::new(results.entries),
        }
    }

    /// The node whose results this reader exposes.
    pub fn node(&self) -> &NodeIdentifier {
        &self.node
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> hash_map::Keys<'_, K, V> {
        self.entries.keys()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, K, V> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy the results out for consumers that need ownership.
    pub fn to_map(&self) -> HashMap<K, V>
    where
        K: Clone,
        V: Clone,
    {
        (*self.entries).clone()
    }
}

impl<'a, K, V> IntoIterator for &'a ExecutionResultsReader<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = hash_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Results of a node's direct upstream dependencies, keyed by their identifiers.
#[derive(Debug)]
pub struct UpstreamResults<K, V> {
    readers: HashMap<NodeIdentifier, ExecutionResultsReader<K, V>>,
}

impl<K, V> Clone for UpstreamResults<K, V> {
    fn clone(&self) -> Self {
        Self {
            readers: self.readers.clone(),
        }
    }
}

impl<K, V> Default for UpstreamResults<K, V> {
    fn default() -> Self {
        Self {
            readers: HashMap::new(),
        }
    }
}

impl<K, V> UpstreamResults<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reader: ExecutionResultsReader<K, V>) {
        self.readers.insert(reader.node.clone(), reader);
    }

    pub fn get(&self, node: &NodeIdentifier) -> Option<&ExecutionResultsReader<K, V>> {
        self.readers.get(node)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, NodeIdentifier, ExecutionResultsReader<K, V>> {
        self.readers.iter()
    }

    pub fn len(&self) -> usize {
        self.readers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }
}

impl<K, V> FromIterator<ExecutionResultsReader<K, V>> for UpstreamResults<K, V> {
    fn from_iter<I: IntoIterator<Item = ExecutionResultsReader<K, V>>>(iter: I) -> Self {
        let mut upstream = Self::new();
        for reader in iter {
            upstream.insert(reader);
        }
        upstream
    }
}
