// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::*;
use crate::dag::{ExecutionResults, ExecutionStatus, NodeConfig, NodeIdentifier, UpstreamResults};
use crate::errors::{ExecutionError, NodeFailure};
use crate::traits::{FrameworkNodeRef, Operator, OperatorContext, OperatorDescriptor};

/// Emits `keys_per_unit` keys per unit. With `overlap` every unit emits the same keys.
struct Partitioned {
    keys_per_unit: usize,
    overlap: bool,
    fail_partition: Option<usize>,
}

#[async_trait]
impl Operator<String, usize> for Partitioned {
    async fn run(&self, ctx: &OperatorContext<String, usize>) -> anyhow::Result<ExecutionResults<String, usize>> {
        if self.fail_partition == Some(ctx.partition()) {
            anyhow::bail!("partition {} is corrupt", ctx.partition());
        }
        let owner = if self.overlap { 0 } else { ctx.partition() };
        Ok((0..self.keys_per_unit)
            .map(|i| (format!("p{}-k{}", owner, i), ctx.partition()))
            .collect())
    }

    fn name(&self) -> &str {
        "partitioned"
    }
}

fn descriptor(keys_per_unit: usize, overlap: bool, fail_partition: Option<usize>) -> OperatorDescriptor<String, usize> {
    OperatorDescriptor::new("partitioned", move |_| {
        Ok(Arc::new(Partitioned {
            keys_per_unit,
            overlap,
            fail_partition,
        }) as Arc<dyn Operator<String, usize>>)
    })
}

fn same_allocation(a: &FrameworkNodeRef<String, usize>, b: &FrameworkNodeRef<String, usize>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

fn multi_thread(units: usize, descriptor: &OperatorDescriptor<String, usize>) -> FrameworkNodeRef<String, usize> {
    FrameworkNodeFactory::new()
        .create(NodeIdentifier::from_name("detect"), descriptor, NodeConfig::multi_thread(units))
        .unwrap()
}

#[tokio::test]
async fn test_multi_thread_merges_all_units() {
    let node = multi_thread(4, &descriptor(3, false, None));
    node.call(UpstreamResults::new()).await.unwrap();

    assert_eq!(node.execution_status(), ExecutionStatus::Success);
    let reader = node.execution_results_reader().unwrap();
    assert_eq!(reader.len(), 12);
    assert_eq!(reader.get(&"p3-k2".to_string()), Some(&3));

    for unit in Arc::clone(&node).physical_nodes() {
        assert_eq!(unit.execution_status(), ExecutionStatus::Success);
    }
}

#[tokio::test]
async fn test_key_collision_fails_the_node() {
    let node = multi_thread(2, &descriptor(1, true, None));
    node.call(UpstreamResults::new()).await.unwrap();

    assert_eq!(node.execution_status(), ExecutionStatus::Failed);
    match node.failure() {
        Some(NodeFailure::KeyCollision { key, first, second, .. }) => {
            assert_eq!(key, "\"p0-k0\"");
            assert_eq!(first.as_str(), "detect#0");
            assert_eq!(second.as_str(), "detect#1");
        }
        other => panic!("Expected key collision, got {:?}", other),
    }
    assert!(matches!(
        node.execution_results_reader(),
        Err(ExecutionError::ResultsNotReady { .. })
    ));
}

#[tokio::test]
async fn test_key_collision_reports_the_smallest_key() {
    for _ in 0..5 {
        let node = multi_thread(3, &descriptor(8, true, None));
        node.call(UpstreamResults::new()).await.unwrap();

        match node.failure() {
            Some(NodeFailure::KeyCollision { key, first, second, .. }) => {
                assert_eq!(key, "\"p0-k0\"");
                assert_eq!(first.as_str(), "detect#0");
                assert_eq!(second.as_str(), "detect#1");
            }
            other => panic!("Expected key collision, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_failed_unit_fails_the_node() {
    let node = multi_thread(3, &descriptor(1, false, Some(1)));
    node.call(UpstreamResults::new()).await.unwrap();

    assert_eq!(node.execution_status(), ExecutionStatus::Failed);
    match node.failure() {
        Some(NodeFailure::PhysicalUnits { node: id, failures }) => {
            assert_eq!(id.as_str(), "detect");
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].node().as_str(), "detect#1");
        }
        other => panic!("Expected physical unit failure, got {:?}", other),
    }

    let statuses: Vec<ExecutionStatus> = Arc::clone(&node)
        .physical_nodes()
        .iter()
        .map(|unit| unit.execution_status())
        .collect();
    assert_eq!(
        statuses,
        vec![ExecutionStatus::Success, ExecutionStatus::Failed, ExecutionStatus::Success]
    );
}

#[tokio::test]
async fn test_physical_nodes_are_stable_and_point_back_to_logical_node() {
    let node = multi_thread(3, &descriptor(1, false, None));

    let first: Vec<NodeIdentifier> = Arc::clone(&node)
        .physical_nodes()
        .iter()
        .map(|unit| unit.identifier().clone())
        .collect();
    let second: Vec<NodeIdentifier> = Arc::clone(&node)
        .physical_nodes()
        .iter()
        .map(|unit| unit.identifier().clone())
        .collect();
    assert_eq!(first, second);
    assert_eq!(
        first.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
        vec!["detect#0", "detect#1", "detect#2"]
    );

    for unit in Arc::clone(&node).physical_nodes() {
        let logical = unit.logical_node();
        assert!(same_allocation(&logical, &node));
    }
    assert!(same_allocation(&Arc::clone(&node).logical_node(), &node));

    node.call(UpstreamResults::new()).await.unwrap();
    let after: Vec<NodeIdentifier> = Arc::clone(&node)
        .physical_nodes()
        .iter()
        .map(|unit| unit.identifier().clone())
        .collect();
    assert_eq!(first, after);
}

#[tokio::test]
async fn test_skip_covers_physical_units() {
    let node = multi_thread(2, &descriptor(1, false, None));
    node.skip().unwrap();

    assert_eq!(node.execution_status(), ExecutionStatus::Skipped);
    for unit in Arc::clone(&node).physical_nodes() {
        assert_eq!(unit.execution_status(), ExecutionStatus::Skipped);
    }
    assert!(matches!(
        node.call(UpstreamResults::new()).await,
        Err(ExecutionError::IllegalTransition { .. })
    ));
}

#[tokio::test]
async fn test_distributed_runs_through_bounded_local_dispatcher() {
    let dispatcher = LocalDispatcher::with_slots(1);
    let factory: FrameworkNodeFactory<String, usize> =
        FrameworkNodeFactory::with_dispatcher(Arc::new(dispatcher.clone()));
    let node = factory
        .create(
            NodeIdentifier::from_name("score"),
            &descriptor(2, false, None),
            NodeConfig::distributed(3),
        )
        .unwrap();

    node.call(UpstreamResults::new()).await.unwrap();
    assert_eq!(node.execution_status(), ExecutionStatus::Success);
    assert_eq!(node.execution_results_reader().unwrap().len(), 6);
    assert_eq!(dispatcher.available_slots(), Some(1));
}

/// Records where each unit was placed.
#[derive(Default)]
struct RecordingDispatcher {
    placed: Mutex<Vec<NodeIdentifier>>,
    in_flight: AtomicUsize,
}

#[async_trait]
impl Dispatcher<String, usize> for RecordingDispatcher {
    fn name(&self) -> &str {
        "recording"
    }

    async fn dispatch(
        &self,
        unit: FrameworkNodeRef<String, usize>,
        inputs: UpstreamResults<String, usize>,
    ) -> Result<NodeIdentifier, ExecutionError> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut placed) = self.placed.lock() {
            placed.push(unit.identifier().clone());
        }
        let result = unit.call(inputs).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[tokio::test]
async fn test_distributed_hands_every_unit_to_the_dispatcher() {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let factory = FrameworkNodeFactory::with_dispatcher(dispatcher.clone() as Arc<dyn Dispatcher<String, usize>>);
    let node = factory
        .create(
            NodeIdentifier::from_name("score"),
            &descriptor(1, false, None),
            NodeConfig::distributed(4),
        )
        .unwrap();

    node.call(UpstreamResults::new()).await.unwrap();

    let mut placed: Vec<String> = dispatcher
        .placed
        .lock()
        .unwrap()
        .iter()
        .map(|id| id.to_string())
        .collect();
    placed.sort();
    assert_eq!(placed, vec!["score#0", "score#1", "score#2", "score#3"]);
    assert_eq!(dispatcher.in_flight.load(Ordering::SeqCst), 0);
}

#[test]
fn test_factory_follows_strategy() {
    let factory = FrameworkNodeFactory::new();
    let descriptor = descriptor(1, false, None);

    let single = factory
        .create(NodeIdentifier::from_name("a"), &descriptor, NodeConfig::single_thread())
        .unwrap();
    let multi = factory
        .create(NodeIdentifier::from_name("b"), &descriptor, NodeConfig::multi_thread(5))
        .unwrap();
    let distributed = factory
        .create(NodeIdentifier::from_name("c"), &descriptor, NodeConfig::distributed(2))
        .unwrap();

    assert_eq!(single.physical_nodes().len(), 1);
    assert_eq!(multi.physical_nodes().len(), 5);
    assert_eq!(distributed.physical_nodes().len(), 2);
}

#[test]
fn test_identity_is_the_identifier() {
    let factory = FrameworkNodeFactory::new();
    let a = factory
        .create(NodeIdentifier::from_name("same"), &descriptor(1, false, None), NodeConfig::single_thread())
        .unwrap();
    let b = factory
        .create(NodeIdentifier::from_name("same"), &descriptor(9, true, None), NodeConfig::multi_thread(3))
        .unwrap();
    let c = factory
        .create(NodeIdentifier::from_name("other"), &descriptor(1, false, None), NodeConfig::single_thread())
        .unwrap();

    assert!(*a == *b);
    assert!(*a != *c);

    let set: HashSet<FrameworkNodeRef<String, usize>> = vec![a, b, c].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn test_zero_units_is_rejected() {
    let result = FrameworkNodeFactory::new().create(
        NodeIdentifier::from_name("detect"),
        &descriptor(1, false, None),
        NodeConfig::multi_thread(0),
    );
    assert!(result.is_err());
}

#[test]
fn test_node_map_rejects_duplicates() {
    let factory = FrameworkNodeFactory::new();
    let mut map = FrameworkNodeMap::new();
    let node = factory
        .create(NodeIdentifier::from_name("a"), &descriptor(1, false, None), NodeConfig::single_thread())
        .unwrap();
    map.insert(Arc::clone(&node)).unwrap();
    assert!(matches!(
        map.insert(node),
        Err(ExecutionError::DuplicateIdentifier { .. })
    ));
    assert_eq!(map.len(), 1);
}
