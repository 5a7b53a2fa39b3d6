// crates/actioncli/src/main.rs

use actioncore::{
    ActionEdge, ActionFlow, ActionNode, ExecutionContext, ExecutionEvent, ExecutionServices,
    MessageType, NavigateOptions, Value,
};
use actionruntime::{load_flow, FlowRuntime, RuntimeConfig, StrategyRegistry};
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "actionflow")]
#[command(about = "Action flow runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a flow file
    Run {
        /// Path to flow JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Initial variables as a JSON object
        #[arg(long)]
        vars: Option<String>,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a flow file
    Validate {
        /// Path to flow JSON file
        file: PathBuf,
    },

    /// List available node types
    Nodes,

    /// Create a new example flow
    Init {
        /// Output file path
        #[arg(short, long, default_value = "flow.json")]
        output: PathBuf,
    },
}

/// Prints host side effects instead of driving a UI
struct ConsoleServices;

impl ExecutionServices for ConsoleServices {
    fn set_variable(&self, name: &str, value: &Value) {
        println!("     📝 {} = {}", name, value.to_display_string());
    }

    fn navigate(&self, url: &str, options: NavigateOptions) {
        let mode = if options.open_in_new_tab {
            "new tab"
        } else if options.replace {
            "replace"
        } else {
            "push"
        };
        println!("     🧭 navigate ({}) -> {}", mode, url);
    }

    fn show_message(&self, message_type: MessageType, content: &str, _duration_ms: u64) {
        println!("     💬 [{}] {}", message_type, content);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file, vars, verbose } => {
            let default_level = if verbose { "debug" } else { "info" };
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new(default_level)),
                )
                .init();

            run_flow(file, vars).await?;
        }

        Commands::Validate { file } => {
            validate_flow(file)?;
        }

        Commands::Nodes => {
            list_nodes();
        }

        Commands::Init { output } => {
            create_example_flow(output)?;
        }
    }

    Ok(())
}

fn builtin_registry() -> Arc<StrategyRegistry> {
    Arc::new(actionnodes::default_registry())
}

fn parse_vars(vars: Option<String>) -> Result<Vec<(String, Value)>> {
    let Some(raw) = vars else {
        return Ok(Vec::new());
    };
    match serde_json::from_str::<serde_json::Value>(&raw)? {
        serde_json::Value::Object(obj) => Ok(obj
            .into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect()),
        _ => bail!("--vars must be a JSON object"),
    }
}

async fn run_flow(file: PathBuf, vars: Option<String>) -> Result<()> {
    println!("🚀 Loading flow from: {}", file.display());

    let flow = load_flow(&file)?;

    println!("📋 Flow: {}", flow.name);
    println!("   Nodes: {}", flow.nodes.len());
    println!("   Edges: {}", flow.edges.len());
    println!();

    let runtime = FlowRuntime::with_registry(builtin_registry(), RuntimeConfig::default());
    let mut ctx = ExecutionContext::new(flow.id.clone())
        .with_variables(parse_vars(vars)?)
        .with_services(Arc::new(ConsoleServices));

    let mut events = runtime.subscribe_events();
    let event_task = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ExecutionEvent::FlowStarted { entry_nodes, .. } => {
                    println!("▶️  Flow started at {}", entry_nodes.join(", "));
                }
                ExecutionEvent::NodeStarted {
                    node_id, node_type, ..
                } => {
                    println!("  ⚡ Starting node: {} ({})", node_id, node_type);
                }
                ExecutionEvent::NodeCompleted {
                    node_id,
                    duration_ms,
                    ..
                } => {
                    println!("  ✅ Node {} completed in {}ms", node_id, duration_ms);
                }
                ExecutionEvent::NodeFailed { node_id, error, .. } => {
                    println!("  ❌ Node {} failed: {}", node_id, error);
                }
                ExecutionEvent::NodeSkipped { node_id, .. } => {
                    println!("  ⏭️  Node {} is disabled", node_id);
                }
                ExecutionEvent::EdgeSkipped {
                    source, target, ..
                } => {
                    println!("  🚫 Edge {} -> {} not taken", source, target);
                }
                ExecutionEvent::FlowCompleted {
                    success,
                    duration_ms,
                    ..
                } => {
                    if success {
                        println!("✨ Flow completed successfully in {}ms", duration_ms);
                    } else {
                        println!("💥 Flow finished with failures after {}ms", duration_ms);
                    }
                }
            }
        }
    });

    let outcome = runtime.execute(&flow, &mut ctx).await;

    // Let the listener drain before printing the summary
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    event_task.abort();

    let results = outcome?;
    let succeeded = results.iter().filter(|r| r.success).count();

    println!();
    println!("📊 Execution Summary:");
    println!("   {}/{} nodes succeeded", succeeded, results.len());
    for result in results.iter().filter(|r| !r.success) {
        println!(
            "   {}: {}",
            result.node_id,
            result.error.as_deref().unwrap_or("failed")
        );
    }

    let mut variables: Vec<_> = ctx.variables().into_iter().collect();
    if !variables.is_empty() {
        variables.sort_by(|a, b| a.0.cmp(&b.0));
        println!();
        println!("📤 Variables:");
        for (name, value) in variables {
            println!("   {}: {}", name, value.to_display_string());
        }
    }

    Ok(())
}

fn validate_flow(file: PathBuf) -> Result<()> {
    println!("🔍 Validating flow: {}", file.display());

    let flow = load_flow(&file)?;
    let runtime = FlowRuntime::with_registry(builtin_registry(), RuntimeConfig::default());
    let report = runtime.validate(&flow);

    for warning in &report.warnings {
        println!("   ⚠️  {}", warning);
    }

    if !report.is_valid() {
        for error in &report.errors {
            println!("   ❌ {}", error);
        }
        bail!("flow {} has {} error(s)", flow.id, report.errors.len());
    }

    println!("✅ Flow is valid:");
    println!("   Name: {}", flow.name);
    println!("   Nodes: {}", flow.nodes.len());
    println!("   Edges: {}", flow.edges.len());

    Ok(())
}

fn list_nodes() {
    println!("📦 Available Node Types:");
    println!();

    let registry = builtin_registry();

    for node_type in registry.list_node_types() {
        let Some(metadata) = registry.metadata(&node_type) else {
            continue;
        };
        let ports = |ports: &[actioncore::Port]| {
            ports
                .iter()
                .map(|p| p.id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!("  • {} - {} ({})", node_type, metadata.label, metadata.category);
        println!("    in:  {}", ports(&metadata.inputs));
        println!("    out: {}", ports(&metadata.outputs));
    }
}

fn create_example_flow(output: PathBuf) -> Result<()> {
    let mut flow = ActionFlow::new("example", "Example action flow").with_entry("fetch");
    flow.description = Some("Fetches a quote, stores it and shows it to the user".to_string());

    flow.add_node(
        ActionNode::new("fetch", "httpRequest")
            .with_label("Fetch Quote")
            .with_param("url", "https://api.github.com/zen")
            .with_param("method", "GET"),
    );
    flow.add_node(
        ActionNode::new("store", "setVariable")
            .with_label("Store Quote")
            .with_param("variableName", "quote"),
    );
    flow.add_node(
        ActionNode::new("notify", "showMessage")
            .with_label("Show Quote")
            .with_param("messageType", "success")
            .with_param("content", "Quote stored"),
    );
    flow.add_node(
        ActionNode::new("report", "log")
            .with_label("Report Failure")
            .with_param("message", "Request failed")
            .with_param("level", "warn"),
    );

    flow.add_edge(
        ActionEdge::new("fetch-store", "fetch", "store")
            .with_ports("response", "value")
            .with_condition("context.nodeOutputs.fetch.success === true"),
    );
    flow.add_edge(
        ActionEdge::new("fetch-report", "fetch", "report")
            .with_condition("context.nodeOutputs.fetch.success !== true"),
    );
    flow.connect("store", "value", "notify", "content");

    let json = serde_json::to_string_pretty(&flow)?;
    std::fs::write(&output, json)?;

    println!("✨ Created example flow: {}", output.display());
    println!();
    println!("Run it with:");
    println!("  actionflow run --file {}", output.display());

    Ok(())
}
