// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::Context;
use std::env;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use the_taskframe::config::{load_and_validate_config, RuntimeBuilder, Runtime};
use the_taskframe::dag::ExecutionStatus;
use the_taskframe::engine::RunReport;
use the_taskframe::operators::{builtin_registry, Key, Value};

/// Results printed per node before truncating.
const MAX_RESULTS_SHOWN: usize = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <workflow.yaml> [--json]", args[0]);
        eprintln!("Example: {} workflows/anomaly-detection.yaml", args[0]);
        std::process::exit(1);
    }
    let workflow_file = &args[1];
    let as_json = args.iter().skip(2).any(|a| a == "--json");

    let start_time = Instant::now();
    let config = load_and_validate_config(workflow_file)
        .with_context(|| format!("loading workflow {}", workflow_file))?;
    let runtime = RuntimeBuilder::from_config(&config, &builtin_registry())
        .with_context(|| format!("assembling workflow {}", workflow_file))?;

    println!("📋 Workflow: {}", workflow_file);
    println!("🔢 Nodes: {}", runtime.dag.len());
    println!("⚙️  Max Concurrency: {}", runtime.executor.max_concurrency());
    println!("🛡️  Failure Strategy: {:?}", runtime.executor.failure_strategy());

    let report = runtime.run().await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&runtime, &report);
    }

    println!("\n⏱️  Total Time (including config load): {:?}", start_time.elapsed());

    if !report.is_success() {
        std::process::exit(2);
    }
    Ok(())
}

fn print_report(runtime: &Runtime<Key, Value>, report: &RunReport) {
    println!("\n📊 Execution Results:");
    println!("⏱️  Execution Time: {:?}", report.duration());
    println!(
        "✅ {} succeeded, ❌ {} failed, ⏭️  {} skipped{}",
        report.succeeded().len(),
        report.failed().len(),
        report.skipped().len(),
        if report.cancelled() { " (cancelled)" } else { "" }
    );

    println!("\n🔄 Completion Order:");
    for (i, node) in report.nodes().iter().enumerate() {
        let timing = node
            .duration()
            .map(|d| format!(" in {:?}", d))
            .unwrap_or_default();
        println!(
            "  {}. {} [{}] x{}{}",
            i + 1,
            node.node,
            node.status,
            runtime
                .nodes
                .get(&node.node)
                .map(|n| Arc::clone(n).physical_nodes().len())
                .unwrap_or(1),
            timing
        );

        match node.status {
            ExecutionStatus::Success => {
                let Some(framework_node) = runtime.nodes.get(&node.node) else {
                    continue;
                };
                let Ok(reader) = framework_node.execution_results_reader() else {
                    continue;
                };
                let mut entries: Vec<_> = reader.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                for (key, value) in entries.iter().take(MAX_RESULTS_SHOWN) {
                    println!("     • {}: {}", key, value);
                }
                if entries.len() > MAX_RESULTS_SHOWN {
                    println!("     • ... and {} more", entries.len() - MAX_RESULTS_SHOWN);
                }
            }
            _ => {
                if let Some(failure) = &node.failure {
                    println!("     ⚠️  {}", failure);
                }
            }
        }
    }
}
