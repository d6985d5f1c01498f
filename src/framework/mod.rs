// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Framework nodes: the vertical topology behind every logical node.
//!
//! * [`SingleThreadFrameworkNode`] runs its operator once, inline.
//! * [`MultiThreadFrameworkNode`] fans out into `concurrency` units on the local worker pool.
//! * [`DistributedFrameworkNode`] fans out into `concurrency` units placed by a [`Dispatcher`].
//!
//! All variants share the same lifecycle: PENDING, RUNNING, then SUCCESS or FAILED, or
//! straight from PENDING to SKIPPED. Fan-out variants merge the outputs of their units in
//! partition order and fail on the first key two units both produced.

mod distributed;
mod dispatcher;
mod factory;
mod fan_out;
mod multi_thread;
mod node_map;
mod operator_executor;
mod single_thread;
mod state;

pub use distributed::DistributedFrameworkNode;
pub use dispatcher::{Dispatcher, LocalDispatcher};
pub use factory::FrameworkNodeFactory;
pub use multi_thread::MultiThreadFrameworkNode;
pub use node_map::FrameworkNodeMap;
pub use operator_executor::OperatorExecutor;
pub use single_thread::SingleThreadFrameworkNode;

#[cfg(test)]
mod tests;
