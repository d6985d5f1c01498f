// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod consts;
mod loader;
mod registry;
mod runtime;
mod validation;


pub use loader::{
    load_and_validate_config, load_config, parse_config, ExecutorOptions, NodeSpec, WorkflowConfig,
};
pub use registry::OperatorRegistry;
pub use runtime::{Runtime, RuntimeBuilder};
pub use validation::validate_dependency_graph;
