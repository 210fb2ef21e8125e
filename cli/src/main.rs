//! CLI entrypoint for toolflow
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use toolflow_application::ports::hooks::ExecutionHooks;
use toolflow_application::{
    CapabilityRegistryPort, ExecutionCoordinator, ExecutionParams, TurnProcessor,
};
use toolflow_domain::command::{Command, CommandResult, ExecutionBudget, KnownArgs};
use toolflow_domain::core::string::truncate;
use toolflow_infrastructure::{CapabilityRegistry, ConfigLoader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "toolflow", version, about = "Extract and execute tool commands from model output")]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a model response: extract, validate, and execute its commands
    Run {
        /// File containing the response text ("-" for stdin)
        #[arg(short, long)]
        file: PathBuf,

        /// Explicit config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Skip config file discovery and use built-in defaults
        #[arg(long, conflicts_with = "config")]
        no_config: bool,

        /// Override the execution budget
        #[arg(long)]
        max_tool_calls: Option<u32>,

        /// Override the per-command timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Emit the outcome as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List the registered capabilities
    Tools,
}

/// Hooks that narrate execution to the console.
struct ConsoleHooks;

impl ExecutionHooks for ConsoleHooks {
    fn on_display(&self, command: &Command, result: &CommandResult) {
        let detail = match KnownArgs::parse(command) {
            Some(KnownArgs::ReadFile(args)) => args.path,
            Some(KnownArgs::WriteFile(args)) => args.path,
            Some(KnownArgs::RenameFile(args)) => format!("{} -> {}", args.path, args.new_path),
            Some(KnownArgs::SearchFiles(args)) => args.pattern,
            Some(KnownArgs::Thought(args)) => truncate(&args.thought, 80),
            Some(KnownArgs::GetUserFeedback(args)) => args.question,
            Some(KnownArgs::Opaque(_)) | None => String::new(),
        };
        let marker = if result.success { "ok" } else { "failed" };
        if detail.is_empty() {
            println!("-> {} [{}] {marker}", command.action, command.request_id);
        } else {
            println!("-> {} {} [{}] {marker}", command.action, detail, command.request_id);
        }
    }

    fn on_result(&self, command: &Command, result: &CommandResult) {
        match (&result.data, &result.error) {
            (Some(data), _) if result.success => {
                println!("   ok: {}", truncate(&data.to_string(), 120));
            }
            (_, Some(error)) => println!("   {} failed: {error}", command.action),
            _ => println!("   done"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run {
            file,
            config,
            no_config,
            max_tool_calls,
            timeout_ms,
            json,
        } => run(file, config, no_config, max_tool_calls, timeout_ms, json).await,
        Commands::Tools => {
            let registry = CapabilityRegistry::builtin();
            let mut definitions: Vec<_> = registry.catalog().all().collect();
            definitions.sort_by(|a, b| a.name.cmp(&b.name));
            for definition in definitions {
                println!("{:<20} {}", definition.name, definition.description);
                for param in &definition.parameters {
                    let marker = if param.required { "required" } else { "optional" };
                    println!("    {:<16} {} ({marker})", param.name, param.description);
                }
            }
            Ok(())
        }
    }
}

async fn run(
    file: PathBuf,
    config_path: Option<PathBuf>,
    no_config: bool,
    max_tool_calls: Option<u32>,
    timeout_ms: Option<u64>,
    json: bool,
) -> Result<()> {
    let text = if file.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("reading stdin")?
    } else {
        std::fs::read_to_string(&file)
            .with_context(|| format!("reading {}", file.display()))?
    };

    let config = if no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(config_path.as_ref())
            .map_err(|e| anyhow::anyhow!("loading config: {e}"))?
    };
    let mut params: ExecutionParams = config.to_execution_params();
    if let Some(max) = max_tool_calls {
        params = params.with_max_tool_calls(max);
    }
    if let Some(ms) = timeout_ms {
        params = params.with_tool_timeout(std::time::Duration::from_millis(ms));
    }
    if params.working_dir.is_none()
        && let Ok(cwd) = std::env::current_dir()
    {
        params = params.with_working_dir(cwd);
    }
    info!(max_tool_calls = params.max_tool_calls, "processing response");

    let budget = Arc::new(ExecutionBudget::new(params.max_tool_calls));
    let registry = Arc::new(CapabilityRegistry::builtin());
    let coordinator = ExecutionCoordinator::new(registry, params);
    let coordinator = if json {
        coordinator
    } else {
        coordinator.with_hooks(Arc::new(ConsoleHooks))
    };
    let processor = TurnProcessor::new(coordinator, budget);

    let outcome = processor.process(&text, &[]).await;

    if json {
        let rendered = serde_json::json!({
            "report": outcome.report,
            "finished": outcome.finished,
            "records": outcome.records,
            "replayed": outcome.replayed,
            "dropped": outcome.dropped,
            "invalid": outcome.invalid.iter().map(|(command, error)| {
                serde_json::json!({"command": command, "reason": error.to_string()})
            }).collect::<Vec<_>>(),
            "cleanText": outcome.clean_text,
        });
        println!("{}", serde_json::to_string_pretty(&rendered)?);
        return Ok(());
    }

    if !outcome.clean_text.is_empty() {
        println!("{}", outcome.clean_text);
        println!();
    }
    for (command, error) in &outcome.invalid {
        println!("rejected {}: {error}", command.action);
    }
    if !outcome.dropped.is_empty() {
        println!("dropped {} commands (budget exhausted)", outcome.dropped.len());
    }
    println!(
        "status: {} ({}/{} tool calls{})",
        outcome.report.status,
        outcome.report.tool_execution_count,
        outcome.report.max_tool_executions,
        if outcome.finished { ", finished" } else { "" },
    );

    Ok(())
}
