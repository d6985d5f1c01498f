// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Placement of distributed physical units.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::dag::{NodeIdentifier, UpstreamResults};
use crate::errors::ExecutionError;
use crate::traits::{FrameworkNodeRef, ResultKey, ResultValue};

/// Decides where a physical unit of a distributed node runs and drives it to completion.
///
/// Implementations must resolve only once the unit reached a terminal state, and must
/// return the unit's identifier exactly as [`FrameworkNode::call`](crate::traits::FrameworkNode::call)
/// does.
#[async_trait]
pub trait Dispatcher<K, V>: Send + Sync {
    fn name(&self) -> &str;

    async fn dispatch(
        &self,
        unit: FrameworkNodeRef<K, V>,
        inputs: UpstreamResults<K, V>,
    ) -> Result<NodeIdentifier, ExecutionError>;
}

/// Runs units in-process, optionally through a bounded pool of worker slots shared by
/// every distributed node using the same dispatcher.
#[derive(Debug, Clone, Default)]
pub struct LocalDispatcher {
    slots: Option<Arc<Semaphore>>,
}

impl LocalDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slots(slots: usize) -> Self {
        Self {
            slots: Some(Arc::new(Semaphore::new(slots.max(1)))),
        }
    }

    /// Free slots, `None` when unbounded.
    pub fn available_slots(&self) -> Option<usize> {
        self.slots.as_ref().map(|s| s.available_permits())
    }
}

#[async_trait]
impl<K: ResultKey, V: ResultValue> Dispatcher<K, V> for LocalDispatcher {
    fn name(&self) -> &str {
        "local"
    }

    async fn dispatch(
        &self,
        unit: FrameworkNodeRef<K, V>,
        inputs: UpstreamResults<K, V>,
    ) -> Result<NodeIdentifier, ExecutionError> {
        let _permit = match &self.slots {
            Some(slots) => Some(Arc::clone(slots).acquire_owned().await.map_err(|e| {
                ExecutionError::InternalError {
                    message: format!("dispatcher closed: {}", e),
                }
            })?),
            None => None,
        };
        unit.call(inputs).await
    }
}
