// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Worker role.
//!
//! A worker executes one task at a time by invoking the task runner once
//! and mapping its exit code to a status.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use minijinja::context;
use tracing::{info, warn};

use crate::config::AgentsConfig;
use crate::runner::{ModelTier, TaskRunner};
use crate::template::render_or;

use super::agent::{resolve_project_dir, AgentHandler, TaskSlot};
use super::ipc::protocol::{ResultMessage, TaskMessage, TaskStatus};
use super::notify::{emit, summarize_for_bubble, truncate_chars, BubbleKind, Notifier, SharedNotifier, DEFAULT_BUBBLE_DURATION};
use super::types::AgentIdentity;

/// Summary used when the runner printed nothing.
pub const EMPTY_OUTPUT_SUMMARY: &str = "(no output)";

/// Single-task executor.
pub struct Worker {
    /// Pool slot, 1-based.
    number: usize,
    identity: AgentIdentity,
    /// Fallback working directory.
    project_dir: PathBuf,
    config: Arc<AgentsConfig>,
    runner: Arc<dyn TaskRunner>,
    notifier: SharedNotifier,
    slot: TaskSlot,
}

impl Worker {
    pub fn new(
        number: usize,
        config: Arc<AgentsConfig>,
        runner: Arc<dyn TaskRunner>,
        project_dir: impl Into<PathBuf>,
    ) -> Self {
        let identity = AgentIdentity::worker(&config, number);
        Self {
            number,
            identity,
            project_dir: project_dir.into(),
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

    /// Render the worker prompt for `instruction`.
    pub fn build_prompt(&self, instruction: &str) -> String {
        let instructions_path = self.config.prompts.worker_instructions.display().to_string();
        let worker_name = &self.config.roles.worker_display;
        render_or(
            &self.config.prompts.worker,
            context! {
                instructions_path => &instructions_path,
                worker_name => worker_name,
                number => self.number,
                instruction => instruction,
            },
            || {
                format!(
                    "Read {} and follow it.\n\nYou are {} {}.\n\nTask:\n{}",
                    instructions_path, worker_name, self.number, instruction
                )
            },
        )
    }

    fn bubble(&self, template: &str, summary: &str) {
        let text = render_or(template, context! { summary => summary }, || summary.to_string());
        emit(&self.notifier, &text, BubbleKind::Claude, DEFAULT_BUBBLE_DURATION);
    }
}

/// Non-empty, length-bounded prefix of `output`.
pub fn summarize_output(output: &str, max_len: usize) -> String {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        EMPTY_OUTPUT_SUMMARY.to_string()
    } else {
        trimmed.chars().take(max_len).collect()
    }
}

#[async_trait]
impl AgentHandler for Worker {
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
        let limits = self.config.limits;

        info!(task_id = %task.id, cwd = %cwd.display(), "Executing task");
        self.bubble(
            &self.config.bubbles.worker_task,
            &summarize_for_bubble(instruction, limits.bubble_default),
        );

        let prompt = self.build_prompt(instruction);
        let (status, output) = match self
            .runner
            .run(&prompt, ModelTier::Worker, &cwd, self.config.timeouts.runner())
            .await
        {
            Ok(run) => {
                let status = if run.success() {
                    TaskStatus::Success
                } else {
                    TaskStatus::Error
                };
                info!(task_id = %task.id, exit_code = run.exit_code, "Runner finished");
                (status, run.output)
            }
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "Runner failed");
                (TaskStatus::Error, format!("runner error: {}", e))
            }
        };

        let summary = summarize_output(&output, limits.summary);
        match status {
            TaskStatus::Success => self.bubble(
                &self.config.bubbles.worker_success,
                &truncate_chars(&summary, limits.bubble_default),
            ),
            _ => self.bubble(
                &self.config.bubbles.worker_error,
                &summarize_for_bubble(&summary, limits.bubble_default),
            ),
        }

        ResultMessage::new(task.id, self.name(), status, output, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RunnerError;
    use crate::orchestrate::ipc::protocol::{AgentState, StatusQuery};
    use crate::runner::RunOutput;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records the last call and replays a scripted outcome.
    struct StubRunner {
        reply: Mutex<Option<Result<RunOutput, RunnerError>>>,
        seen: Mutex<Vec<(String, ModelTier, PathBuf)>>,
    }

    impl StubRunner {
        fn replying(reply: Result<RunOutput, RunnerError>) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(reply)),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TaskRunner for StubRunner {
        async fn run(
            &self,
            prompt: &str,
            tier: ModelTier,
            cwd: &Path,
            _timeout: Duration,
        ) -> Result<RunOutput, RunnerError> {
            self.seen
                .lock()
                .unwrap()
                .push((prompt.to_string(), tier, cwd.to_path_buf()));
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(RunOutput::new("", 0)))
        }

        fn build_interactive_command(
            &self,
            _tier: ModelTier,
            _system_prompt: Option<&Path>,
        ) -> Result<Vec<String>, RunnerError> {
            Ok(vec!["stub".to_string()])
        }
    }

    fn worker(runner: Arc<StubRunner>) -> Worker {
        Worker::new(2, Arc::new(AgentsConfig::default()), runner, "/default/dir")
    }

    #[tokio::test]
    async fn test_success_maps_exit_zero() {
        let runner = StubRunner::replying(Ok(RunOutput::new("  all good\n", 0)));
        let w = worker(Arc::clone(&runner));

        let result = w.handle_task(TaskMessage::new("t-1", "yadoran", "fix bug", "/work")).await;
        assert_eq!(result.status, TaskStatus::Success);
        assert_eq!(result.from_agent, "yadon-2");
        assert_eq!(result.id, "t-1");
        assert_eq!(result.output(), "  all good\n");
        assert_eq!(result.summary(), "all good");

        let seen = runner.seen.lock().unwrap();
        assert_eq!(seen[0].1, ModelTier::Worker);
        assert_eq!(seen[0].2, PathBuf::from("/work"));
        assert!(seen[0].0.contains("You are Yadon 2."));
        assert!(seen[0].0.ends_with("Task:\nfix bug"));
    }

    #[tokio::test]
    async fn test_nonzero_and_signal_exit_are_errors() {
        for code in [1, -1] {
            let runner = StubRunner::replying(Ok(RunOutput::new("boom", code)));
            let result = worker(runner).handle_task(TaskMessage::new("t", "m", "x", "")).await;
            assert_eq!(result.status, TaskStatus::Error);
        }
    }

    #[tokio::test]
    async fn test_runner_error_is_reported() {
        let runner = StubRunner::replying(Err(RunnerError::Timeout(600_000)));
        let result = worker(runner).handle_task(TaskMessage::new("t", "m", "x", "")).await;
        assert_eq!(result.status, TaskStatus::Error);
        assert!(result.output().contains("timed out"));
        assert!(!result.summary().is_empty());
    }

    #[tokio::test]
    async fn test_empty_output_placeholder() {
        let runner = StubRunner::replying(Ok(RunOutput::new("   \n", 0)));
        let result = worker(runner).handle_task(TaskMessage::new("t", "m", "x", "")).await;
        assert_eq!(result.summary(), EMPTY_OUTPUT_SUMMARY);
    }

    #[tokio::test]
    async fn test_blank_project_dir_uses_default() {
        let runner = StubRunner::replying(Ok(RunOutput::new("ok", 0)));
        let w = worker(Arc::clone(&runner));
        w.handle_task(TaskMessage::new("t", "m", "x", "")).await;
        assert_eq!(runner.seen.lock().unwrap()[0].2, PathBuf::from("/default/dir"));
    }

    #[tokio::test]
    async fn test_idle_after_task() {
        let runner = StubRunner::replying(Ok(RunOutput::new("ok", 0)));
        let w = worker(runner);
        w.handle_task(TaskMessage::new("t", "m", "x", "")).await;
        let status = w.handle_status(StatusQuery::new("cli")).await;
        assert_eq!(status.state, AgentState::Idle);
        assert!(status.current_task.is_none());
    }

    #[tokio::test]
    async fn test_bubbles_before_and_after() {
        let bubbles = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = Arc::clone(&bubbles);
        let runner = StubRunner::replying(Ok(RunOutput::new("done", 0)));
        let w = worker(runner).with_notifier(Arc::new(move |text: &str, _k: BubbleKind, _d: Duration| {
            sink.lock().unwrap().push(text.to_string());
        }));

        w.handle_task(TaskMessage::new("t", "m", "edit /Users/me/app/main.rs", "")).await;

        let bubbles = bubbles.lock().unwrap();
        assert_eq!(bubbles.len(), 2);
        assert_eq!(bubbles[0], "...on it... \"edit main.rs\"");
        assert_eq!(bubbles[1], "...done... \"done\"");
    }

    #[test]
    fn test_summarize_output_bounds() {
        let long = "x".repeat(500);
        assert_eq!(summarize_output(&long, 200).len(), 200);
        assert_eq!(summarize_output("", 200), EMPTY_OUTPUT_SUMMARY);
    }
}
