// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod framework_node;
pub mod operator;

use std::fmt::Debug;
use std::hash::Hash;

pub use framework_node::{same_node, FrameworkNode, FrameworkNodeRef, NodeTiming};
pub use operator::{Operator, OperatorContext, OperatorDescriptor, OperatorFactoryFn};

/// Bounds every result key has to satisfy to travel between tasks.
///
/// `Debug` is needed to name colliding keys in failure reports.
pub trait ResultKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> ResultKey for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// Bounds every result value has to satisfy to travel between tasks.
pub trait ResultValue: Clone + Send + Sync + 'static {}

impl<T> ResultValue for T where T: Clone + Send + Sync + 'static {}
