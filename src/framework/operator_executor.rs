// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Single operator invocation with timeout and panic capture.

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

use crate::dag::{ExecutionResults, NodeConfig};
use crate::errors::NodeFailure;
use crate::observability::messages::node::{
    OperatorInvocationCompleted, OperatorInvocationFailed, OperatorInvocationStarted,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Operator, OperatorContext, ResultKey, ResultValue};

/// Invokes an operator exactly once per call and reports the outcome to its owning node.
///
/// The executor never touches node status. Retry policy belongs to the node; the
/// executor only bounds one invocation in time and turns panics into failures.
pub struct OperatorExecutor<K, V> {
    operator: Arc<dyn Operator<K, V>>,
    timeout: Option<Duration>,
}

impl<K: ResultKey, V: ResultValue> OperatorExecutor<K, V> {
    pub fn new(operator: Arc<dyn Operator<K, V>>, config: &NodeConfig) -> Self {
        Self {
            operator,
            timeout: config.timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn operator_name(&self) -> &str {
        self.operator.name()
    }

    pub async fn execute(&self, ctx: OperatorContext<K, V>) -> Result<ExecutionResults<K, V>, NodeFailure> {
        let start_msg = OperatorInvocationStarted {
            node_id: ctx.node().as_str(),
            operator: self.operator_name(),
            attempt: ctx.attempt(),
        };
        let span = start_msg.span("operator_invocation");
        span.in_scope(|| start_msg.log());

        self.invoke(ctx).instrument(span).await
    }

    async fn invoke(&self, ctx: OperatorContext<K, V>) -> Result<ExecutionResults<K, V>, NodeFailure> {
        let node = ctx.node().clone();
        let attempt = ctx.attempt();
        let started = Instant::now();

        let operator = Arc::clone(&self.operator);
        let mut handle = tokio::spawn(async move { operator.run(&ctx).await }.in_current_span());

        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    handle.abort();
                    let failure = NodeFailure::Timeout {
                        node: node.clone(),
                        timeout_ms: limit.as_millis() as u64,
                    };
                    self.log_failure(&failure, attempt);
                    return Err(failure);
                }
            },
            None => handle.await,
        };

        let outcome = match joined {
            Ok(Ok(results)) => Ok(results),
            Ok(Err(error)) => Err(NodeFailure::Operator {
                node: node.clone(),
                attempts: attempt,
                message: format!("{:#}", error),
            }),
            Err(join_error) if join_error.is_panic() => Err(NodeFailure::Panicked {
                node: node.clone(),
                message: panic_message(join_error.into_panic()),
            }),
            Err(join_error) => Err(NodeFailure::Panicked {
                node: node.clone(),
                message: join_error.to_string(),
            }),
        };

        match &outcome {
            Ok(results) => OperatorInvocationCompleted {
                node_id: node.as_str(),
                operator: self.operator_name(),
                result_count: results.len(),
                duration: started.elapsed(),
            }
            .log(),
            Err(failure) => self.log_failure(failure, attempt),
        }

        outcome
    }

    fn log_failure(&self, failure: &NodeFailure, attempt: u32) {
        OperatorInvocationFailed {
            node_id: failure.node().as_str(),
            operator: self.operator_name(),
            attempt,
            error: failure,
        }
        .log();
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "operator panicked".to_string()
    }
}
