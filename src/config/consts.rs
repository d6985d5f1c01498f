// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Concurrency used when neither the workflow nor the host reports a usable value.
pub const FALLBACK_MAX_CONCURRENCY: usize = 4;
/// Upper bound for `executor_options.max_concurrency`.
pub const MAX_CONCURRENCY_LIMIT: usize = 1024;
