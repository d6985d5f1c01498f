// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // workflow loading + runtime assembly
pub mod dag;        // identifiers, status, logical nodes
pub mod engine;     // DAG executor
pub mod errors;     // error handling
pub mod framework;  // framework node variants
pub mod observability;
pub mod operators;  // built-in local operators
pub mod traits;     // FrameworkNode and Operator abstractions
