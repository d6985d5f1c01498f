// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Value types of the horizontal topology.

mod graph;
mod identifier;
mod node;
mod node_config;
mod results;
mod status;

pub use graph::DependencyGraph;
pub use identifier::{NodeIdentifier, PHYSICAL_SEPARATOR};
pub use node::{LogicalDag, Node};
pub use node_config::{ExecutionStrategy, NodeConfig};
pub use results::{ExecutionResults, ExecutionResultsReader, UpstreamResults};
pub use status::{ExecutionStatus, StatusCell};
