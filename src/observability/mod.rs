// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Diagnostic and operational logging goes through message structs rather than inline
//! format strings, so the wording and the structured fields of every event live in one
//! place.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - DAG executor lifecycle and scheduling events
//! * `messages::node` - framework node and operator invocation events
//! * `messages::validation` - configuration and graph validation results
//!
//! # Usage
//!
//! ```rust
//! use the_taskframe::observability::messages::node::OperatorInvocationFailed;
//!
//! let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
//! let msg = OperatorInvocationFailed {
//!     node_id: "detect#0",
//!     operator: "zscore",
//!     attempt: 1,
//!     error: &error,
//! };
//!
//! tracing::warn!("{}", msg);
//! ```

pub mod messages;
