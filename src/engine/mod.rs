// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod dag_executor;
pub mod ready_queue;
pub mod report;

pub use dag_executor::DagExecutor;
pub use ready_queue::{ReadyNode, ReadyQueue};
pub use report::{NodeReport, RunReport};
