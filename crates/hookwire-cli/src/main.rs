//! `hookwire` binary: local tooling for hooks files.
//!
//! - `hookwire check <hooks.yaml>` loads the trigger registry and prints a
//!   summary, failing on parse errors.
//! - `hookwire fire <hooks.yaml> <path>` dispatches a synthetic request
//!   through the real engine with the dry-run executor, so a hooks file can
//!   be exercised without an HTTP listener or execution backend.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use hookwire_core::dispatcher::ActionDispatcher;
use hookwire_core::executor::DryRunExecutor;
use hookwire_core::registry::TriggerRegistry;

#[derive(Parser)]
#[command(name = "hookwire", about = "Trigger/action dispatch engine tooling")]
struct Cli {
    /// Enable the OpenTelemetry stdout trace bridge.
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a hooks file and print the registry summary.
    Check {
        /// Path to the hooks file.
        hooks: PathBuf,
    },
    /// Dispatch a synthetic request against a hooks file (dry run).
    Fire {
        /// Path to the hooks file.
        hooks: PathBuf,
        /// Request path to dispatch (e.g. /hooks/deploy).
        path: String,
        /// Request body as JSON.
        #[arg(long, default_value = "null")]
        body: String,
        /// Query parameter, key=value. Repeatable.
        #[arg(long = "query", value_parser = parse_kv)]
        query: Vec<(String, String)>,
        /// Request header, key=value. Repeatable.
        #[arg(long = "header", value_parser = parse_kv)]
        header: Vec<(String, String)>,
        /// Working directory recorded in the execution scope.
        #[arg(long)]
        cwd: Option<PathBuf>,
    },
}

fn parse_kv(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    hookwire_observe::tracing_setup::init_tracing(cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = match cli.command {
        Command::Check { hooks } => check(&hooks),
        Command::Fire {
            hooks,
            path,
            body,
            query,
            header,
            cwd,
        } => fire(&hooks, &path, &body, query, header, cwd).await,
    };

    hookwire_observe::tracing_setup::shutdown_tracing();
    result
}

fn check(hooks: &PathBuf) -> anyhow::Result<()> {
    let registry = TriggerRegistry::load(hooks)
        .with_context(|| format!("failed to load hooks file {}", hooks.display()))?;

    if registry.is_empty() {
        println!("no triggers configured");
        return Ok(());
    }

    let mut paths = registry.paths();
    paths.sort_unstable();
    println!("{} trigger(s) on {} path(s)", registry.trigger_count(), paths.len());
    for path in paths {
        for trigger in registry.lookup(path) {
            println!("  {path}  {}  ({} action(s))", trigger.name, trigger.actions.len());
        }
    }
    Ok(())
}

async fn fire(
    hooks: &PathBuf,
    path: &str,
    body: &str,
    query: Vec<(String, String)>,
    header: Vec<(String, String)>,
    cwd: Option<PathBuf>,
) -> anyhow::Result<()> {
    let registry = TriggerRegistry::load(hooks)
        .with_context(|| format!("failed to load hooks file {}", hooks.display()))?;
    let body: serde_json::Value =
        serde_json::from_str(body).context("request body is not valid JSON")?;
    let cwd = match cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot determine working directory")?,
    };

    let matched = registry.lookup(path).len();
    let dispatcher = ActionDispatcher::new(Arc::new(registry), Arc::new(DryRunExecutor), cwd);
    dispatcher.dispatch(
        path,
        body,
        query.into_iter().collect::<HashMap<_, _>>(),
        header.into_iter().collect::<HashMap<_, _>>(),
    );

    if matched == 0 {
        println!("no trigger matched {path}");
        return Ok(());
    }

    // Dispatch is fire-and-forget by contract; give the background tasks a
    // grace period to finish logging before the process exits.
    tokio::time::sleep(Duration::from_millis(200)).await;
    println!("dispatched {matched} trigger(s) on {path}");
    Ok(())
}
