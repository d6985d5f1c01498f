// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::dag::NodeConfig;
use crate::errors::ConfigError;
use crate::traits::{Operator, OperatorDescriptor, ResultKey, ResultValue};

/// Resolves the operator names used in workflows into descriptors.
pub struct OperatorRegistry<K, V> {
    descriptors: HashMap<String, OperatorDescriptor<K, V>>,
}

impl<K, V> Default for OperatorRegistry<K, V> {
    fn default() -> Self {
        Self {
            descriptors: HashMap::new(),
        }
    }
}

impl<K: ResultKey, V: ResultValue> OperatorRegistry<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its name, replacing any previous registration.
    pub fn register(&mut self, descriptor: OperatorDescriptor<K, V>) -> Option<OperatorDescriptor<K, V>> {
        self.descriptors.insert(descriptor.name().to_string(), descriptor)
    }

    /// Register a factory closure; it is called once per physical unit.
    pub fn register_fn<F>(&mut self, name: &str, factory: F) -> Option<OperatorDescriptor<K, V>>
    where
        F: Fn(&NodeConfig) -> anyhow::Result<Arc<dyn Operator<K, V>>> + Send + Sync + 'static,
    {
        self.register(OperatorDescriptor::new(name, factory))
    }

    pub fn with(mut self, descriptor: OperatorDescriptor<K, V>) -> Self {
        self.register(descriptor);
        self
    }

    pub fn get(&self, name: &str) -> Result<&OperatorDescriptor<K, V>, ConfigError> {
        self.descriptors
            .get(name)
            .ok_or_else(|| ConfigError::UnknownOperator {
                operator: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    /// Registered operator names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.descriptors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::ExecutionResults;
    use crate::traits::OperatorContext;
    use async_trait::async_trait;

    struct Noop(&'static str);

    #[async_trait]
    impl Operator<String, u8> for Noop {
        async fn run(&self, _ctx: &OperatorContext<String, u8>) -> anyhow::Result<ExecutionResults<String, u8>> {
            Ok(ExecutionResults::new())
        }

        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_lookup_by_name() {
        let registry = OperatorRegistry::new()
            .with(OperatorDescriptor::shared(Arc::new(Noop("b")) as Arc<dyn Operator<String, u8>>))
            .with(OperatorDescriptor::shared(Arc::new(Noop("a")) as Arc<dyn Operator<String, u8>>));

        assert_eq!(registry.names(), vec!["a", "b"]);
        assert!(registry.contains("a"));
        assert_eq!(registry.get("b").unwrap().name(), "b");
    }

    #[test]
    fn test_unknown_operator() {
        let registry: OperatorRegistry<String, u8> = OperatorRegistry::new();
        assert!(matches!(
            registry.get("zscore"),
            Err(ConfigError::UnknownOperator { operator }) if operator == "zscore"
        ));
    }

    #[test]
    fn test_register_replaces_previous() {
        let mut registry: OperatorRegistry<String, u8> = OperatorRegistry::new();
        assert!(registry
            .register_fn("noop", |_| Ok(Arc::new(Noop("noop")) as Arc<dyn Operator<String, u8>>))
            .is_none());
        assert!(registry
            .register_fn("noop", |_| Ok(Arc::new(Noop("noop")) as Arc<dyn Operator<String, u8>>))
            .is_some());
        assert_eq!(registry.len(), 1);
    }
}
