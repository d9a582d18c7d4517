// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration type definitions.
//!
//! Every field has a default so a config file only needs to name what it
//! changes. Keys are camelCase in both JSON and YAML.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Resolved configuration shared by every agent in a process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentsConfig {
    /// Directory holding agent sockets.
    pub socket_dir: PathBuf,

    /// Namespace prefix for socket file names.
    pub socket_prefix: String,

    /// Role identities and display names.
    pub roles: RolesConfig,

    /// Worker pool size and bounds.
    pub workers: WorkerCountConfig,

    /// Default AI tool backend for every tier.
    pub backend: String,

    /// Per-worker backend overrides, keyed by worker number.
    pub worker_backends: BTreeMap<usize, String>,

    /// Prompt templates.
    pub prompts: PromptsConfig,

    /// Display labels for known phase names.
    pub phase_labels: BTreeMap<String, String>,

    /// Notification templates.
    pub bubbles: BubbleTemplates,

    pub timeouts: TimeoutsConfig,

    pub limits: LimitsConfig,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        let mut phase_labels = BTreeMap::new();
        phase_labels.insert("implement".to_string(), "...implementing...".to_string());
        phase_labels.insert("docs".to_string(), "...updating docs...".to_string());
        phase_labels.insert("review".to_string(), "...reviewing...".to_string());

        Self {
            socket_dir: PathBuf::from("/tmp"),
            socket_prefix: "yadon".to_string(),
            roles: RolesConfig::default(),
            workers: WorkerCountConfig::default(),
            backend: "claude".to_string(),
            worker_backends: BTreeMap::new(),
            prompts: PromptsConfig::default(),
            phase_labels,
            bubbles: BubbleTemplates::default(),
            timeouts: TimeoutsConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

impl AgentsConfig {
    /// Effective worker pool size, clamped into the configured bounds.
    pub fn worker_count(&self) -> usize {
        self.workers.clamp(self.workers.count)
    }

    /// Identity of worker `number` (1-based).
    pub fn worker_name(&self, number: usize) -> String {
        format!("{}-{}", self.roles.worker, number)
    }

    pub fn manager_name(&self) -> &str {
        &self.roles.manager
    }

    /// Backend name for worker `number`, honouring per-worker overrides.
    pub fn worker_backend(&self, number: usize) -> &str {
        self.worker_backends
            .get(&number)
            .map(String::as_str)
            .unwrap_or(&self.backend)
    }

    /// Display label for a phase, `...<name>...` when unknown.
    pub fn phase_label(&self, phase_name: &str) -> String {
        self.phase_labels
            .get(phase_name)
            .cloned()
            .unwrap_or_else(|| format!("...{}...", phase_name))
    }
}

/// Role identities (used in socket names and `from` fields) and display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RolesConfig {
    pub coordinator: String,
    pub manager: String,
    pub worker: String,
    pub coordinator_display: String,
    pub manager_display: String,
    pub worker_display: String,
}

impl Default for RolesConfig {
    fn default() -> Self {
        Self {
            coordinator: "yadoking".to_string(),
            manager: "yadoran".to_string(),
            worker: "yadon".to_string(),
            coordinator_display: "Yadoking".to_string(),
            manager_display: "Yadoran".to_string(),
            worker_display: "Yadon".to_string(),
        }
    }
}

/// Worker pool size: configured count plus inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkerCountConfig {
    pub count: usize,
    pub min: usize,
    pub max: usize,
}

impl Default for WorkerCountConfig {
    fn default() -> Self {
        Self {
            count: 4,
            min: 1,
            max: 8,
        }
    }
}

impl WorkerCountConfig {
    /// Clamp `n` into `[min, max]`. The pool never shrinks below one worker;
    /// a misordered pair of bounds is read as `min`.
    pub fn clamp(&self, n: usize) -> usize {
        let min = self.min.max(1);
        let max = self.max.max(min);
        n.max(min).min(max)
    }
}

/// Prompt templates. Rendered with `{{ name }}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptsConfig {
    /// Worker prompt. Context: `instructions_path`, `worker_name`, `number`, `instruction`.
    pub worker: String,

    /// Leading text of the decomposition prompt. Context: `instructions_path`, `manager_name`.
    pub manager_prefix: String,

    pub coordinator_instructions: PathBuf,
    pub manager_instructions: PathBuf,
    pub worker_instructions: PathBuf,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            worker: "Read {{ instructions_path }} and follow it.\n\n\
                     You are {{ worker_name }} {{ number }}.\n\n\
                     Task:\n{{ instruction }}"
                .to_string(),
            manager_prefix: "Read {{ instructions_path }} and follow it.\n\n\
                             You are {{ manager_name }}."
                .to_string(),
            coordinator_instructions: PathBuf::from("instructions/yadoking.md"),
            manager_instructions: PathBuf::from("instructions/yadoran.md"),
            worker_instructions: PathBuf::from("instructions/yadon.md"),
        }
    }
}

/// Notification templates.
///
/// Worker and manager task/success/error templates get `summary`; the
/// phase template gets `label`, `worker_name` and `count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BubbleTemplates {
    pub worker_task: String,
    pub worker_success: String,
    pub worker_error: String,
    pub manager_task: String,
    pub manager_phase: String,
    pub manager_success: String,
    pub manager_error: String,
}

impl Default for BubbleTemplates {
    fn default() -> Self {
        Self {
            worker_task: "...on it... \"{{ summary }}\"".to_string(),
            worker_success: "...done... \"{{ summary }}\"".to_string(),
            worker_error: "...failed... \"{{ summary }}\"".to_string(),
            manager_task: "...the king says... \"{{ summary }}\"".to_string(),
            manager_phase: "{{ label }} asking {{ count }} {{ worker_name }}...".to_string(),
            manager_success: "...everyone finished... \"{{ summary }}\"".to_string(),
            manager_error: "...some failed... \"{{ summary }}\"".to_string(),
        }
    }
}

/// Deadlines for every blocking step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeoutsConfig {
    /// Worker runner invocation.
    pub runner_secs: u64,
    /// Decomposition runner invocation.
    pub decompose_secs: u64,
    /// CLI request to an agent.
    pub send_secs: u64,
    /// Manager → worker dispatch.
    pub dispatch_secs: u64,
    /// Status probes.
    pub status_secs: u64,
    /// Server-side read of one request.
    pub connection_secs: u64,
    /// Accept poll interval.
    pub accept_poll_ms: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            runner_secs: 600,
            decompose_secs: 120,
            send_secs: 300,
            dispatch_secs: 600,
            status_secs: 5,
            connection_secs: 600,
            accept_poll_ms: 1000,
        }
    }
}

impl TimeoutsConfig {
    pub fn runner(&self) -> Duration {
        Duration::from_secs(self.runner_secs)
    }

    pub fn decompose(&self) -> Duration {
        Duration::from_secs(self.decompose_secs)
    }

    pub fn send(&self) -> Duration {
        Duration::from_secs(self.send_secs)
    }

    pub fn dispatch(&self) -> Duration {
        Duration::from_secs(self.dispatch_secs)
    }

    pub fn status(&self) -> Duration {
        Duration::from_secs(self.status_secs)
    }

    pub fn connection(&self) -> Duration {
        Duration::from_secs(self.connection_secs)
    }

    pub fn accept_poll(&self) -> Duration {
        Duration::from_millis(self.accept_poll_ms)
    }
}

/// Length limits, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LimitsConfig {
    pub summary: usize,
    pub bubble_task: usize,
    pub bubble_result: usize,
    pub bubble_default: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            summary: 200,
            bubble_task: 80,
            bubble_result: 60,
            bubble_default: 30,
        }
    }
}
