// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Manager role.
//!
//! # Lifecycle of a task
//!
//! 1. Decompose the instruction into ordered phases via the task runner
//! 2. For each phase, fan its subtasks out to workers and wait for all of them
//! 3. Aggregate every result into one report
//!
//! Phases never overlap. Within a phase at most `worker_count` subtasks are
//! dispatched, subtask `k` going to worker `k`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use minijinja::context;
use tracing::{debug, error, info, warn};

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::config::AgentsConfig;
use crate::runner::{ModelTier, TaskRunner};
use crate::template::render_or;

use super::agent::{resolve_project_dir, AgentHandler, TaskSlot};
use super::aggregate::aggregate;
use super::decompose::{build_decompose_prompt, fallback_phases, parse_decomposition};
use super::ipc::client::IpcClient;
use super::ipc::protocol::{
    subtask_id, ResultMessage, StatusQuery, StatusResponse, TaskMessage, TaskStatus,
};
use super::notify::{
    emit, summarize_for_bubble, BubbleKind, Notifier, SharedNotifier, DEFAULT_BUBBLE_DURATION,
    PHASE_BUBBLE_DURATION,
};
use super::types::{AgentIdentity, Phase};

/// Worker state reported when its socket file is absent.
pub const WORKER_STOPPED: &str = "stopped";

/// Worker state reported when its socket exists but the probe failed.
pub const WORKER_UNREACHABLE: &str = "unreachable";

/// Decomposing, dispatching, aggregating supervisor.
pub struct Manager {
    identity: AgentIdentity,
    project_dir: PathBuf,
    config: Arc<AgentsConfig>,
    runner: Arc<dyn TaskRunner>,
    notifier: SharedNotifier,
    slot: TaskSlot,
    worker_count: usize,
}

impl Manager {
    pub fn new(
        config: Arc<AgentsConfig>,
        runner: Arc<dyn TaskRunner>,
        project_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            identity: AgentIdentity::manager(&config),
            project_dir: project_dir.into(),
            worker_count: config.worker_count(),
            config,
            runner,
            notifier: None,
            slot: TaskSlot::new(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    pub fn socket_path(&self) -> &Path {
        self.identity.socket_path()
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    fn worker(&self, number: usize) -> AgentIdentity {
        AgentIdentity::worker(&self.config, number)
    }

    fn bubble(&self, text: &str, duration: Duration) {
        emit(&self.notifier, text, BubbleKind::Claude, duration);
    }

    fn render_bubble(&self, template: &str, summary: &str) -> String {
        render_or(template, context! { summary => summary }, || summary.to_string())
    }

    /// Split `instruction` into phases. Never fails: any problem yields the
    /// single-phase fallback.
    #[cfg_attr(feature = "telemetry", instrument(skip(self, instruction), fields(cwd = %project_dir.display())))]
    pub async fn decompose(&self, instruction: &str, project_dir: &Path) -> Vec<Phase> {
        let prompt = build_decompose_prompt(
            &self.config,
            instruction,
            &project_dir.display().to_string(),
            self.worker_count,
        );

        match self
            .runner
            .run(&prompt, ModelTier::Manager, project_dir, self.config.timeouts.decompose())
            .await
        {
            Ok(run) => {
                debug!(exit_code = run.exit_code, "Decomposition runner finished");
                match parse_decomposition(&run.output) {
                    Ok(plan) if !plan.phases.is_empty() => {
                        info!(
                            phases = plan.phases.len(),
                            subtasks = plan.subtask_count(),
                            strategy = plan.strategy.as_deref().unwrap_or(""),
                            "Task decomposed"
                        );
                        return plan.phases;
                    }
                    Ok(_) => warn!("Decomposition returned no phases, running as one task"),
                    Err(e) => {
                        let head: String = run.output.chars().take(500).collect();
                        warn!(error = %e, output = %head, "Could not parse decomposition, running as one task");
                    }
                }
            }
            Err(e) => warn!(error = %e, "Decomposition failed, running as one task"),
        }

        fallback_phases(instruction)
    }

    /// Dispatch one phase and wait for every subtask.
    ///
    /// At most `worker_count` subtasks are taken, one per worker, so the
    /// fan-out is bounded by the pool size. Returns one result per
    /// dispatched subtask, ordered by subtask index.
    #[cfg_attr(feature = "telemetry", instrument(skip(self, phase, project_dir), fields(phase = %phase.display_name(phase_index))))]
    pub async fn dispatch_phase(
        &self,
        phase: &Phase,
        phase_index: usize,
        task_id: &str,
        project_dir: &str,
    ) -> Vec<ResultMessage> {
        let phase_name = phase.display_name(phase_index);
        let mut handles = Vec::new();

        for (i, subtask) in phase.subtasks.iter().take(self.worker_count).enumerate() {
            let number = i + 1;
            let worker = self.worker(number);
            let sub_id = subtask_id(task_id, &phase_name, number);
            let task = TaskMessage::new(
                sub_id.clone(),
                self.identity.name.clone(),
                subtask.instruction.clone(),
                project_dir,
            );
            let client = IpcClient::new(&worker.socket_path, &self.identity.name);
            let timeout = self.config.timeouts.dispatch();
            let failure_summary = format!(
                "failed to send to {} {}",
                self.config.roles.worker_display, number
            );

            let handle = tokio::spawn(async move {
                match client.send_task(task, timeout).await {
                    Ok(result) => result,
                    Err(e) => {
                        error!(worker = %worker.name, error = %e, "Dispatch failed");
                        ResultMessage::new(
                            sub_id,
                            worker.name,
                            TaskStatus::Error,
                            format!("send failed: {}", e),
                            failure_summary,
                        )
                    }
                }
            });
            handles.push((number, handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (number, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    let worker_name = self.config.worker_name(number);
                    error!(worker = %worker_name, phase = %phase_name, error = %e, "Dispatch task failed");
                    results.push(ResultMessage::new(
                        subtask_id(task_id, &phase_name, number),
                        worker_name,
                        TaskStatus::Error,
                        e.to_string(),
                        "execution error",
                    ));
                }
            }
        }
        results
    }
}

#[async_trait]
impl AgentHandler for Manager {
    fn name(&self) -> &str {
        &self.identity.name
    }

    fn task_slot(&self) -> &TaskSlot {
        &self.slot
    }

    async fn handle_task(&self, task: TaskMessage) -> ResultMessage {
        let _guard = self.slot.begin(task.id.clone());
        let instruction = task.payload.instruction.as_str();
        let cwd = resolve_project_dir(&task.payload.project_dir, &self.project_dir);
        let project_dir = cwd.display().to_string();
        let limits = self.config.limits;
        let bubbles = &self.config.bubbles;

        let preview: String = instruction.chars().take(80).collect();
        info!(task_id = %task.id, "Task received: {}", preview);
        let task_summary = summarize_for_bubble(instruction, limits.bubble_task);
        self.bubble(&self.render_bubble(&bubbles.manager_task, &task_summary), DEFAULT_BUBBLE_DURATION);

        let phases = self.decompose(instruction, &cwd).await;

        let mut all_results = Vec::new();
        for (index, phase) in phases.iter().enumerate() {
            let phase_name = phase.display_name(index);
            let label = self.config.phase_label(&phase_name);
            let count = phase.subtasks.len().min(self.worker_count);
            let text = render_or(
                &bubbles.manager_phase,
                context! { label => &label, worker_name => &self.config.roles.worker_display, count => count },
                || format!("{} {}", label, count),
            );
            self.bubble(&text, PHASE_BUBBLE_DURATION);
            info!(phase = %phase_name, subtasks = phase.subtasks.len(), "Phase started");

            let results = self.dispatch_phase(phase, index, &task.id, &project_dir).await;
            if !results.iter().all(|r| r.status.is_success()) {
                warn!(phase = %phase_name, "Phase finished with failures");
            }
            all_results.extend(results);
        }

        let report = aggregate(&all_results);
        let result_summary = summarize_for_bubble(&report.summary, limits.bubble_result);
        let template = if report.status.is_success() {
            &bubbles.manager_success
        } else {
            &bubbles.manager_error
        };
        self.bubble(&self.render_bubble(template, &result_summary), DEFAULT_BUBBLE_DURATION);
        info!(task_id = %task.id, status = %report.status, results = all_results.len(), "Task finished");

        ResultMessage::new(task.id, self.name(), report.status, report.output, report.summary)
    }

    async fn handle_status(&self, _query: StatusQuery) -> StatusResponse {
        let timeout = self.config.timeouts.status();
        let mut workers = BTreeMap::new();

        for number in 1..=self.worker_count {
            let worker = self.worker(number);
            let state = if !worker.socket_path.exists() {
                WORKER_STOPPED.to_string()
            } else {
                match IpcClient::new(&worker.socket_path, &self.identity.name)
                    .query_status(timeout)
                    .await
                {
                    Ok(status) => status.state.to_string(),
                    Err(e) => {
                        debug!(worker = %worker.name, error = %e, "Status probe failed");
                        WORKER_UNREACHABLE.to_string()
                    }
                }
            };
            workers.insert(worker.name, state);
        }

        StatusResponse::new(self.name(), self.slot.current()).with_workers(workers)
    }
}
