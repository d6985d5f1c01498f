// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Every diagnostic the crate emits is a small struct with a `Display` implementation for
//! the human-readable text and a [`StructuredLog`] implementation that attaches the same
//! data as tracing fields.
//!
//! # Organization
//!
//! * `engine` - DAG executor lifecycle and scheduling events
//! * `node` - framework node and operator invocation events
//! * `validation` - configuration and graph validation results
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_taskframe::observability::messages::engine::ExecutionStarted;
//! use the_taskframe::observability::messages::StructuredLog;
//!
//! let msg = ExecutionStarted {
//!     node_count: 5,
//!     max_concurrency: 4,
//!     failure_strategy: "continue_on_error",
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod engine;
pub mod node;
pub mod validation;

/// A message that knows how to log itself with structured fields.
pub trait StructuredLog {
    /// Emit the message at its designated level.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
