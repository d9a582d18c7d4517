// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Yadon main entry point - agent endpoints and client commands.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::json;
use tracing::info;

use yadon::config::{self, AgentsConfig};
use yadon::orchestrate::{
    generate_task_id, ipc::send_message, AgentHandler, AgentIdentity, AgentServer, IpcClient,
    Manager, Message, StatusResponse, TaskMessage, TracingNotifier, Worker, WORKER_STOPPED,
    WORKER_UNREACHABLE,
};
use yadon::runner::{ModelTier, SubprocessRunner, TaskRunner};
use yadon::telemetry::{init_telemetry, TelemetryConfig};

/// Sender name used by client commands.
const CLI_AGENT: &str = "cli";

/// Yadon - hierarchical multi-agent task orchestration.
#[derive(Parser)]
#[command(name = "yadon")]
#[command(author, version, about = "Hierarchical multi-agent task orchestration", long_about = None)]
struct Cli {
    /// Debug logging with span events
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a worker endpoint
    Worker {
        /// Pool slot, 1-based
        #[arg(short, long)]
        number: usize,

        /// Default working directory for tasks
        #[arg(long)]
        project_dir: Option<PathBuf>,
    },

    /// Run the manager endpoint
    Manager {
        /// Default working directory for tasks
        #[arg(long)]
        project_dir: Option<PathBuf>,
    },

    /// Send a task and print the response
    Send {
        /// What to do
        instruction: String,

        /// Working directory the task runs in
        #[arg(long)]
        project_dir: Option<PathBuf>,

        /// Task ID (generated when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Target agent (defaults to the manager)
        #[arg(long)]
        to: Option<String>,
    },

    /// Show agent states
    Status {
        /// Agent to query (defaults to the manager and every worker)
        agent: Option<String>,

        /// Human-readable output
        #[arg(long)]
        pretty: bool,
    },

    /// Start the interactive coordinator session
    Coordinator {
        /// System prompt file
        #[arg(long)]
        system_prompt: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let telemetry = if cli.verbose {
        TelemetryConfig::development()
    } else {
        TelemetryConfig::default()
    };
    if let Err(e) = init_telemetry(&telemetry) {
        eprintln!("{}", format!("Failed to initialize logging: {}", e).red());
    }

    let workspace_root = std::env::current_dir()?;
    let config = Arc::new(config::load_config(&workspace_root)?);

    match cli.command {
        Commands::Worker { number, project_dir } => {
            run_worker(config, number, project_dir.unwrap_or(workspace_root)).await
        }
        Commands::Manager { project_dir } => {
            run_manager(config, project_dir.unwrap_or(workspace_root)).await
        }
        Commands::Send {
            instruction,
            project_dir,
            id,
            to,
        } => {
            let project_dir = project_dir.unwrap_or(workspace_root);
            send_task(&config, &instruction, &project_dir, id, to).await
        }
        Commands::Status { agent, pretty } => show_status(&config, agent, pretty).await,
        Commands::Coordinator { system_prompt } => {
            run_coordinator(&config, system_prompt, &workspace_root).await
        }
    }
}

async fn run_worker(config: Arc<AgentsConfig>, number: usize, project_dir: PathBuf) -> anyhow::Result<()> {
    let count = config.worker_count();
    if number == 0 || number > count {
        anyhow::bail!("worker number must be between 1 and {}, got {}", count, number);
    }

    let runner = Arc::new(SubprocessRunner::new(config.worker_backend(number)));
    info!(number, backend = %runner.backend().name, "Starting worker");
    let worker = Worker::new(number, Arc::clone(&config), runner, project_dir);
    let name = worker.identity().name.clone();
    let worker = worker.with_notifier(Arc::new(TracingNotifier::new(name)));
    let socket_path = worker.socket_path().to_path_buf();

    serve(worker, socket_path, &config).await
}

async fn run_manager(config: Arc<AgentsConfig>, project_dir: PathBuf) -> anyhow::Result<()> {
    let runner = Arc::new(SubprocessRunner::new(&config.backend));
    info!(workers = config.worker_count(), backend = %config.backend, "Starting manager");
    let manager = Manager::new(Arc::clone(&config), runner, project_dir);
    let name = manager.identity().name.clone();
    let manager = manager.with_notifier(Arc::new(TracingNotifier::new(name)));
    let socket_path = manager.socket_path().to_path_buf();

    serve(manager, socket_path, &config).await
}

/// Serve `handler` until Ctrl-C.
async fn serve<H: AgentHandler>(handler: H, socket_path: PathBuf, config: &AgentsConfig) -> anyhow::Result<()> {
    let server = AgentServer::new(Arc::new(handler), socket_path)
        .with_timeouts(config.timeouts.accept_poll(), config.timeouts.connection());

    let stop = server.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping");
            stop.stop();
        }
    });

    server.serve().await?;
    Ok(())
}

async fn send_task(
    config: &AgentsConfig,
    instruction: &str,
    project_dir: &std::path::Path,
    id: Option<String>,
    to: Option<String>,
) -> anyhow::Result<()> {
    let target = match to {
        Some(name) => AgentIdentity::from_config(config, name),
        None => AgentIdentity::manager(config),
    };
    let task = TaskMessage::new(
        id.unwrap_or_else(generate_task_id),
        CLI_AGENT,
        instruction,
        project_dir.display().to_string(),
    );

    let reply = send_message(target.socket_path(), &Message::from(task), config.timeouts.send()).await?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

/// Outcome of probing one agent.
enum Probe {
    Reported(StatusResponse),
    Stopped,
    Unreachable(String),
}

async fn probe(config: &AgentsConfig, agent: &AgentIdentity) -> Probe {
    let client = IpcClient::new(agent.socket_path(), CLI_AGENT);
    if !client.is_present() {
        return Probe::Stopped;
    }
    match client.query_status(config.timeouts.status()).await {
        Ok(status) => Probe::Reported(status),
        Err(e) => Probe::Unreachable(e.to_string()),
    }
}

async fn show_status(config: &AgentsConfig, agent: Option<String>, pretty: bool) -> anyhow::Result<()> {
    let targets = match agent {
        Some(name) => vec![AgentIdentity::from_config(config, name)],
        None => std::iter::once(AgentIdentity::manager(config))
            .chain((1..=config.worker_count()).map(|n| AgentIdentity::worker(config, n)))
            .collect(),
    };

    let mut report = BTreeMap::new();
    for target in &targets {
        let probe = probe(config, target).await;
        if pretty {
            print_probe(&target.name, &probe);
        }
        let value = match probe {
            Probe::Reported(status) => serde_json::to_value(&status)?,
            Probe::Stopped => json!({ "state": WORKER_STOPPED }),
            Probe::Unreachable(reason) => json!({ "state": WORKER_UNREACHABLE, "error": reason }),
        };
        report.insert(target.name.clone(), value);
    }

    if !pretty {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn colored_state(state: &str) -> colored::ColoredString {
    match state {
        "idle" => state.green(),
        "busy" => state.yellow(),
        WORKER_STOPPED => state.dimmed(),
        _ => state.red(),
    }
}

fn print_probe(name: &str, probe: &Probe) {
    match probe {
        Probe::Reported(status) => {
            let task = status
                .current_task
                .as_deref()
                .map(|t| format!(" ({})", t).dimmed().to_string())
                .unwrap_or_default();
            println!("{:<12} {}{}", name.bold(), colored_state(status.state.as_str()), task);
            if let Some(workers) = &status.workers {
                for (worker, state) in workers {
                    println!("  {:<10} {}", worker, colored_state(state));
                }
            }
        }
        Probe::Stopped => println!("{:<12} {}", name.bold(), colored_state(WORKER_STOPPED)),
        Probe::Unreachable(reason) => println!(
            "{:<12} {} {}",
            name.bold(),
            colored_state(WORKER_UNREACHABLE),
            reason.dimmed()
        ),
    }
}

async fn run_coordinator(
    config: &AgentsConfig,
    system_prompt: Option<PathBuf>,
    workspace_root: &std::path::Path,
) -> anyhow::Result<()> {
    let system_prompt = system_prompt.or_else(|| {
        let default = workspace_root.join(&config.prompts.coordinator_instructions);
        default.exists().then_some(default)
    });

    let runner = SubprocessRunner::new(&config.backend);
    let command = runner.build_interactive_command(ModelTier::Coordinator, system_prompt.as_deref())?;
    let Some((program, args)) = command.split_first() else {
        anyhow::bail!("backend produced an empty command");
    };

    println!("{} {}", "Starting".bright_blue().bold(), command.join(" ").dimmed());
    let status = tokio::process::Command::new(program)
        .args(args)
        .current_dir(workspace_root)
        .status()
        .await?;
    if !status.success() {
        anyhow::bail!("{} exited with {}", program, status);
    }
    Ok(())
}
